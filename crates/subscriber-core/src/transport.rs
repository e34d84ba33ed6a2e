//! Boundary with the media transport collaborator
//!
//! The transport owns the actual media pipeline. This crate talks to it in
//! two directions:
//!
//! ```text
//!            MediaTransport (commands, non-blocking)
//!   Subscription ───────────────────────────────────► transport
//!        ▲
//!        │   TransportSignal (single ordered channel)
//!        └──────────────────────────────────────────── transport
//! ```
//!
//! Signals are handed to [`Subscription::deliver_signal`](crate::Subscription::deliver_signal)
//! in the order the transport observed them; they are processed strictly in
//! that order.

use serde::{Deserialize, Serialize};

use crate::error::{FailureCode, SubscriberResult};
use crate::stats::{NetworkStats, RtcStatsReport};
use crate::types::{Resolution, StreamInfo};

/// Which media kinds the subscription wants from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSelection {
    pub audio: bool,
    pub video: bool,
    pub captions: bool,
}

/// Commands sent to the transport.
///
/// Every method must return without waiting on the network; the effect of a
/// command is reported back later as a [`TransportSignal`] where applicable.
pub trait MediaTransport: Send + Sync {
    /// Start acquiring transport resources for `stream`.
    fn attach(&self, stream: &StreamInfo, selection: &MediaSelection) -> SubscriberResult<()>;

    /// Applied on the next renegotiation.
    fn update_selection(&self, selection: &MediaSelection);

    fn set_audio_volume(&self, volume: f64);

    /// `None` removes the constraint.
    fn set_preferred_resolution(&self, resolution: Option<Resolution>);

    /// `None` removes the constraint.
    fn set_preferred_frame_rate(&self, frame_rate: Option<f32>);

    /// Answered with `StatsReportReady` or `StatsReportFailed`.
    fn request_rtc_stats(&self);

    /// Audio level sampling costs CPU, so it only runs while someone listens.
    fn set_audio_level_sampling(&self, _enabled: bool) {}

    /// Release everything acquired by `attach`.
    fn detach(&self);
}

/// Signals raised by the transport for one subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportSignal {
    StreamConnected,
    StreamDisconnected,
    /// The transport started retrying after a disconnect
    StreamReconnecting,
    StreamReconnected,
    StreamFailed { code: FailureCode, reason: String },

    /// `score` is the current quality estimate in `[0, 1]`
    QualityDegraded { score: f32 },
    QualityImproved { score: f32 },
    CodecUnsupported { codec: String },
    PublisherVideoChanged { enabled: bool },

    CaptionFragment { text: String, is_final: bool },
    AudioLevel(f32),
    NetworkStatsSample(NetworkStats),

    StatsReportReady(RtcStatsReport),
    StatsReportFailed { reason: String },
}

impl TransportSignal {
    pub fn name(&self) -> &'static str {
        match self {
            TransportSignal::StreamConnected => "stream_connected",
            TransportSignal::StreamDisconnected => "stream_disconnected",
            TransportSignal::StreamReconnecting => "stream_reconnecting",
            TransportSignal::StreamReconnected => "stream_reconnected",
            TransportSignal::StreamFailed { .. } => "stream_failed",
            TransportSignal::QualityDegraded { .. } => "quality_degraded",
            TransportSignal::QualityImproved { .. } => "quality_improved",
            TransportSignal::CodecUnsupported { .. } => "codec_unsupported",
            TransportSignal::PublisherVideoChanged { .. } => "publisher_video_changed",
            TransportSignal::CaptionFragment { .. } => "caption_fragment",
            TransportSignal::AudioLevel(_) => "audio_level",
            TransportSignal::NetworkStatsSample(_) => "network_stats_sample",
            TransportSignal::StatsReportReady(_) => "stats_report_ready",
            TransportSignal::StatsReportFailed { .. } => "stats_report_failed",
        }
    }
}
