//! Network and RTC statistics
//!
//! Two independent channels with no ordering relation between them:
//!
//! - **Periodic network stats** - cumulative byte/packet counters pushed by
//!   the transport as [`NetworkStats`] samples, forwarded to observers as-is.
//! - **On-demand RTC reports** - [`StatsCollector`] bridges a pull-style
//!   request to the push-style arrival of an [`RtcStatsReport`], allowing at
//!   most one outstanding request.
//!
//! # Reading an RTC report
//!
//! ```rust
//! use subscriber_core::stats::{RtcStatsReport, RtcStatsType};
//!
//! let json = r#"[
//!   {"id": "RTCCodec_audio_Inbound_111", "type": "codec", "timestamp": 1603448671532842,
//!    "mimeType": "audio/opus", "clockRate": 48000},
//!   {"id": "IT01V", "type": "inbound-rtp", "timestamp": 1603448671532842,
//!    "kind": "video", "bytesReceived": 120000, "packetsReceived": 95, "packetsLost": 5}
//! ]"#;
//!
//! let report = RtcStatsReport::from_json(json).unwrap();
//! assert_eq!(report.entries_of(&RtcStatsType::Codec).count(), 1);
//!
//! let summary = report.inbound_rtp_summary();
//! assert_eq!(summary.bytes_received, 120000);
//! assert_eq!(summary.packet_loss_ratio(), 0.05);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{SubscriberError, SubscriberResult};
use crate::types::ConnectivityState;

// ===== PERIODIC NETWORK STATS =====

/// Cumulative counters for one media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaNetworkStats {
    pub bytes_received: u64,
    pub packets_received: u64,
    pub packets_lost: u64,
    /// Sample time in milliseconds since the UNIX epoch
    pub timestamp_ms: u64,
}

impl MediaNetworkStats {
    /// Lost packets over all packets seen so far.
    pub fn packet_loss_ratio(&self) -> f64 {
        loss_ratio(self.packets_received, self.packets_lost)
    }
}

/// One periodic sample. A side is `None` when the stream lacks that media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkStats {
    pub video: Option<MediaNetworkStats>,
    pub audio: Option<MediaNetworkStats>,
}

fn loss_ratio(received: u64, lost: u64) -> f64 {
    let total = received.saturating_add(lost);
    if total == 0 {
        0.0
    } else {
        lost as f64 / total as f64
    }
}

/// Throughput and loss over the interval between two samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalStats {
    pub interval_ms: u64,
    pub bitrate_kbps: f64,
    pub packet_loss_ratio: f64,
}

/// Derives per-interval bitrate and loss from cumulative samples.
///
/// A sample whose counters went backwards (transport restarted the stream)
/// becomes the new baseline instead of producing a bogus interval.
#[derive(Debug, Default)]
pub struct BitrateSampler {
    last: Option<MediaNetworkStats>,
}

impl BitrateSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: MediaNetworkStats) -> Option<IntervalStats> {
        let previous = self.last.replace(sample)?;

        if sample.timestamp_ms <= previous.timestamp_ms
            || sample.bytes_received < previous.bytes_received
            || sample.packets_received < previous.packets_received
            || sample.packets_lost < previous.packets_lost
        {
            return None;
        }

        let interval_ms = sample.timestamp_ms - previous.timestamp_ms;
        let bytes = sample.bytes_received - previous.bytes_received;
        Some(IntervalStats {
            interval_ms,
            bitrate_kbps: (bytes as f64 * 8.0) / interval_ms as f64,
            packet_loss_ratio: loss_ratio(
                sample.packets_received - previous.packets_received,
                sample.packets_lost - previous.packets_lost,
            ),
        })
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

// ===== RTC STATS REPORT =====

/// The `type` tag of an RTC stats entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RtcStatsType {
    MediaSource,
    Certificate,
    Codec,
    InboundRtp,
    OutboundRtp,
    RemoteInboundRtp,
    RemoteOutboundRtp,
    CandidatePair,
    LocalCandidate,
    RemoteCandidate,
    Transport,
    Track,
    PeerConnection,
    DataChannel,
    /// A tag this crate does not know; kept verbatim
    Other(String),
}

impl RtcStatsType {
    pub fn as_str(&self) -> &str {
        match self {
            RtcStatsType::MediaSource => "media-source",
            RtcStatsType::Certificate => "certificate",
            RtcStatsType::Codec => "codec",
            RtcStatsType::InboundRtp => "inbound-rtp",
            RtcStatsType::OutboundRtp => "outbound-rtp",
            RtcStatsType::RemoteInboundRtp => "remote-inbound-rtp",
            RtcStatsType::RemoteOutboundRtp => "remote-outbound-rtp",
            RtcStatsType::CandidatePair => "candidate-pair",
            RtcStatsType::LocalCandidate => "local-candidate",
            RtcStatsType::RemoteCandidate => "remote-candidate",
            RtcStatsType::Transport => "transport",
            RtcStatsType::Track => "track",
            RtcStatsType::PeerConnection => "peer-connection",
            RtcStatsType::DataChannel => "data-channel",
            RtcStatsType::Other(tag) => tag,
        }
    }
}

impl From<String> for RtcStatsType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "media-source" => RtcStatsType::MediaSource,
            "certificate" => RtcStatsType::Certificate,
            "codec" => RtcStatsType::Codec,
            "inbound-rtp" => RtcStatsType::InboundRtp,
            "outbound-rtp" => RtcStatsType::OutboundRtp,
            "remote-inbound-rtp" => RtcStatsType::RemoteInboundRtp,
            "remote-outbound-rtp" => RtcStatsType::RemoteOutboundRtp,
            "candidate-pair" => RtcStatsType::CandidatePair,
            "local-candidate" => RtcStatsType::LocalCandidate,
            "remote-candidate" => RtcStatsType::RemoteCandidate,
            "transport" => RtcStatsType::Transport,
            "track" => RtcStatsType::Track,
            "peer-connection" => RtcStatsType::PeerConnection,
            "data-channel" => RtcStatsType::DataChannel,
            _ => RtcStatsType::Other(tag),
        }
    }
}

impl From<RtcStatsType> for String {
    fn from(kind: RtcStatsType) -> Self {
        match kind {
            RtcStatsType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// One entry of an RTC stats report.
///
/// Only `id`, `type` and `timestamp` are interpreted; everything else is
/// carried untouched in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtcStatsEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub stats_type: RtcStatsType,
    /// Microseconds
    pub timestamp: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RtcStatsEntry {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    fn counter(&self, name: &str) -> u64 {
        self.fields.get(name).and_then(Value::as_u64).unwrap_or(0)
    }
}

/// An immutable, ordered RTC stats report as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RtcStatsReport {
    entries: Vec<RtcStatsEntry>,
}

impl RtcStatsReport {
    pub fn new(entries: Vec<RtcStatsEntry>) -> Self {
        Self { entries }
    }

    /// Parse the JSON array form of a report.
    pub fn from_json(json: &str) -> SubscriberResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| SubscriberError::transport_error(format!("malformed RTC stats report: {}", e)))
    }

    pub fn to_json(&self) -> String {
        // A Vec of string-keyed maps always serializes
        serde_json::to_string(&self.entries).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn entries(&self) -> &[RtcStatsEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries_of<'a>(
        &'a self,
        stats_type: &'a RtcStatsType,
    ) -> impl Iterator<Item = &'a RtcStatsEntry> + 'a {
        self.entries.iter().filter(move |e| &e.stats_type == stats_type)
    }

    /// Sum of the inbound RTP counters across all received streams.
    /// Counters saturate at `u64::MAX`.
    pub fn inbound_rtp_summary(&self) -> InboundRtpSummary {
        self.entries_of(&RtcStatsType::InboundRtp)
            .fold(InboundRtpSummary::default(), |acc, entry| InboundRtpSummary {
                bytes_received: acc.bytes_received.saturating_add(entry.counter("bytesReceived")),
                packets_received: acc.packets_received.saturating_add(entry.counter("packetsReceived")),
                packets_lost: acc.packets_lost.saturating_add(entry.counter("packetsLost")),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InboundRtpSummary {
    pub bytes_received: u64,
    pub packets_received: u64,
    pub packets_lost: u64,
}

impl InboundRtpSummary {
    pub fn packet_loss_ratio(&self) -> f64 {
        loss_ratio(self.packets_received, self.packets_lost)
    }
}

// ===== ON-DEMAND REQUESTS =====

#[derive(Debug, Clone)]
pub struct PendingStatsRequest {
    pub request_id: u64,
    pub requested_at: DateTime<Utc>,
}

/// At-most-one-outstanding bridge for RTC stats requests.
#[derive(Debug, Default)]
pub struct StatsCollector {
    pending: Option<PendingStatsRequest>,
    next_request_id: u64,
    delivered: u64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the request slot. The caller asks the transport for the
    /// report only after this returns `Ok`.
    pub fn begin(&mut self, state: ConnectivityState) -> SubscriberResult<u64> {
        if let Some(pending) = &self.pending {
            tracing::warn!(request_id = pending.request_id, "RTC stats request rejected: already in flight");
            return Err(SubscriberError::AlreadyInFlight);
        }
        if !state.is_connected() {
            tracing::warn!(state = ?state, "RTC stats request rejected: not connected");
            return Err(SubscriberError::NotConnected { state });
        }

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.pending = Some(PendingStatsRequest {
            request_id,
            requested_at: Utc::now(),
        });
        Ok(request_id)
    }

    /// Returns the report to deliver, or `None` if nothing was requested.
    pub fn complete(&mut self, report: RtcStatsReport) -> Option<RtcStatsReport> {
        let pending = self.pending.take()?;
        self.delivered += 1;
        let elapsed = Utc::now() - pending.requested_at;
        tracing::debug!(
            request_id = pending.request_id,
            entries = report.len(),
            elapsed_ms = elapsed.num_milliseconds(),
            "RTC stats report completed"
        );
        Some(report)
    }

    /// Frees the slot after a failed request. `None` if nothing was pending.
    pub fn fail(&mut self) -> Option<PendingStatsRequest> {
        self.pending.take()
    }

    /// Drops the pending request so its result is never delivered.
    pub fn cancel(&mut self) -> Option<PendingStatsRequest> {
        self.pending.take()
    }

    pub fn is_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn sample(bytes: u64, received: u64, lost: u64, ts: u64) -> MediaNetworkStats {
        MediaNetworkStats {
            bytes_received: bytes,
            packets_received: received,
            packets_lost: lost,
            timestamp_ms: ts,
        }
    }

    #[test]
    fn collector_allows_one_outstanding_request() {
        let mut collector = StatsCollector::new();
        assert_eq!(collector.begin(ConnectivityState::Connected), Ok(1));
        assert_eq!(
            collector.begin(ConnectivityState::Connected),
            Err(SubscriberError::AlreadyInFlight)
        );

        assert!(collector.complete(RtcStatsReport::default()).is_some());
        assert!(!collector.is_in_flight());
        assert_eq!(collector.begin(ConnectivityState::Connected), Ok(2));
    }

    #[test]
    fn collector_rejects_when_not_connected() {
        let mut collector = StatsCollector::new();
        assert_eq!(
            collector.begin(ConnectivityState::Reconnecting),
            Err(SubscriberError::NotConnected {
                state: ConnectivityState::Reconnecting
            })
        );
        assert!(!collector.is_in_flight());
    }

    #[test]
    #[traced_test]
    fn rejected_request_is_logged() {
        let mut collector = StatsCollector::new();
        let _ = collector.begin(ConnectivityState::Disconnected);
        assert!(logs_contain("RTC stats request rejected: not connected"));
    }

    #[test]
    fn unsolicited_report_is_dropped() {
        let mut collector = StatsCollector::new();
        assert!(collector.complete(RtcStatsReport::default()).is_none());
        assert_eq!(collector.delivered_count(), 0);
    }

    #[test]
    fn failure_frees_the_slot() {
        let mut collector = StatsCollector::new();
        collector.begin(ConnectivityState::Connected).unwrap();
        assert!(collector.fail().is_some());
        assert!(collector.begin(ConnectivityState::Connected).is_ok());
    }

    #[test]
    fn unknown_fields_and_types_survive_a_round_trip() {
        let json = r#"[{"id":"RTCAudioSource_1","type":"media-source","timestamp":1603448671532842,"audioLevel":0,"kind":"audio","totalSamplesDuration":4.249999999999954},{"id":"X","type":"vendor-specific","timestamp":1603448671532843,"nested":{"a":[1,2,3]}}]"#;
        let report = RtcStatsReport::from_json(json).unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report.entries()[0].stats_type, RtcStatsType::MediaSource);
        assert_eq!(
            report.entries()[1].stats_type,
            RtcStatsType::Other("vendor-specific".to_string())
        );

        assert_eq!(report.to_json(), json);
    }

    #[test]
    fn float_fields_keep_their_exact_text() {
        let json = r#"[{"id":"RTCMediaSource_v","type":"media-source","timestamp":1603448671532842,"framesPerSecond":989.8597941207809,"jitter":0.30000000000000004,"totalSamplesDuration":4.249999999999954,"audioLevel":0.0078125}]"#;
        let report = RtcStatsReport::from_json(json).unwrap();
        let text = report.to_json();

        for literal in ["989.8597941207809", "0.30000000000000004", "4.249999999999954", "0.0078125"] {
            assert!(text.contains(literal), "{} was altered in {}", literal, text);
        }
        assert_eq!(text, json);
    }

    #[test]
    fn huge_counters_saturate_instead_of_overflowing() {
        let stats = MediaNetworkStats {
            bytes_received: 0,
            packets_received: u64::MAX,
            packets_lost: 1,
            timestamp_ms: 0,
        };
        let ratio = stats.packet_loss_ratio();
        assert!(ratio >= 0.0 && ratio < 1e-18);

        let json = format!(
            r#"[{{"id":"a","type":"inbound-rtp","timestamp":1,"bytesReceived":{max},"packetsReceived":{max},"packetsLost":3}},{{"id":"b","type":"inbound-rtp","timestamp":1,"bytesReceived":1,"packetsReceived":1,"packetsLost":{max}}}]"#,
            max = u64::MAX
        );
        let summary = RtcStatsReport::from_json(&json).unwrap().inbound_rtp_summary();
        assert_eq!(summary.bytes_received, u64::MAX);
        assert_eq!(summary.packets_received, u64::MAX);
        assert_eq!(summary.packets_lost, u64::MAX);
        assert_eq!(summary.packet_loss_ratio(), 1.0);
    }

    #[test]
    fn malformed_report_is_rejected() {
        assert!(RtcStatsReport::from_json(r#"[{"type":"codec"}]"#).is_err());
    }

    #[test]
    fn sampler_computes_interval_bitrate() {
        let mut sampler = BitrateSampler::new();
        assert!(sampler.push(sample(0, 0, 0, 1_000)).is_none());

        let interval = sampler.push(sample(125_000, 90, 10, 2_000)).unwrap();
        assert_eq!(interval.interval_ms, 1_000);
        assert_eq!(interval.bitrate_kbps, 1000.0);
        assert_eq!(interval.packet_loss_ratio, 0.1);
    }

    #[test]
    fn sampler_rebaselines_after_counter_reset() {
        let mut sampler = BitrateSampler::new();
        sampler.push(sample(50_000, 50, 0, 1_000));
        assert!(sampler.push(sample(1_000, 1, 0, 2_000)).is_none());
        let interval = sampler.push(sample(2_000, 2, 0, 3_000)).unwrap();
        assert_eq!(interval.bitrate_kbps, 8.0);
    }
}
