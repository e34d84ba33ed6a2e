//! Subscriber walkthrough
//!
//! Subscribes to a simulated stream whose transport replays a scripted
//! session: connect, a quality dip, a network blip, captions and an RTC stats
//! report. Every observer callback is printed.
//!
//! Run with `RUST_LOG=subscriber_core=debug cargo run --example subscriber_walkthrough`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use subscriber_core::logging::{LoggingConfig, setup_logging};
use subscriber_core::{
    BitrateSampler, CaptionEvent, MediaNetworkStats, MediaSelection, MediaTransport, NetworkStats,
    Resolution, RtcStatsReport, SessionRef, StreamInfo, SubscriberConfig, SubscriberError,
    SubscriberEventHandler, SubscriberResult, Subscription, SubscriptionId, TransportSignal,
    VideoEventReason,
};

const STATS_JSON: &str = r#"[
  {"id":"RTCCodec_video_Inbound_96","type":"codec","timestamp":1603448671532842,"mimeType":"video/VP8","clockRate":90000},
  {"id":"RTCInboundRTPVideoStream_1","type":"inbound-rtp","timestamp":1603448671532842,"kind":"video","bytesReceived":482133,"packetsReceived":512,"packetsLost":3},
  {"id":"RTCInboundRTPAudioStream_2","type":"inbound-rtp","timestamp":1603448671532842,"kind":"audio","bytesReceived":30211,"packetsReceived":250,"packetsLost":0}
]"#;

/// Answers stats requests by pushing a canned report back as a signal.
struct SimulatedTransport {
    signals: mpsc::UnboundedSender<TransportSignal>,
    volume: Mutex<Option<f64>>,
}

impl MediaTransport for SimulatedTransport {
    fn attach(&self, stream: &StreamInfo, selection: &MediaSelection) -> SubscriberResult<()> {
        println!("transport: attach {} {:?}", stream.stream_id, selection);
        Ok(())
    }

    fn update_selection(&self, selection: &MediaSelection) {
        println!("transport: renegotiate {:?}", selection);
    }

    fn set_audio_volume(&self, volume: f64) {
        *self.volume.lock() = Some(volume);
        println!("transport: volume {}", volume);
    }

    fn set_preferred_resolution(&self, resolution: Option<Resolution>) {
        println!("transport: preferred resolution {:?}", resolution);
    }

    fn set_preferred_frame_rate(&self, frame_rate: Option<f32>) {
        println!("transport: preferred frame rate {:?}", frame_rate);
    }

    fn request_rtc_stats(&self) {
        let signal = match RtcStatsReport::from_json(STATS_JSON) {
            Ok(report) => TransportSignal::StatsReportReady(report),
            Err(e) => TransportSignal::StatsReportFailed { reason: e.to_string() },
        };
        let _ = self.signals.send(signal);
    }

    fn set_audio_level_sampling(&self, enabled: bool) {
        println!("transport: audio level sampling {}", enabled);
    }

    fn detach(&self) {
        println!("transport: detach");
    }
}

struct ConsoleObserver {
    video_bitrate: Mutex<BitrateSampler>,
}

#[async_trait]
impl SubscriberEventHandler for ConsoleObserver {
    async fn on_connected(&self, id: SubscriptionId) {
        println!("[{}] connected", id);
    }

    async fn on_failed(&self, id: SubscriptionId, error: SubscriberError) {
        println!("[{}] failed: {}", id, error);
    }

    async fn on_disconnected(&self, id: SubscriptionId) {
        println!("[{}] disconnected", id);
    }

    async fn on_reconnected(&self, id: SubscriptionId) {
        println!("[{}] reconnected", id);
    }

    async fn on_video_disabled(&self, id: SubscriptionId, reason: VideoEventReason) {
        println!("[{}] video disabled ({:?})", id, reason);
    }

    async fn on_video_enabled(&self, id: SubscriptionId, reason: VideoEventReason) {
        println!("[{}] video enabled ({:?})", id, reason);
    }

    async fn on_video_disable_warning(&self, id: SubscriptionId) {
        println!("[{}] video may be disabled soon", id);
    }

    async fn on_video_disable_warning_lifted(&self, id: SubscriptionId) {
        println!("[{}] video warning lifted", id);
    }

    async fn on_audio_level(&self, id: SubscriptionId, level: f32) {
        println!("[{}] audio level {:.2}", id, level);
    }

    async fn on_caption(&self, id: SubscriptionId, caption: CaptionEvent) {
        let marker = if caption.is_final { "final" } else { "partial" };
        println!("[{}] caption ({}): {}", id, marker, caption.text);
    }

    async fn on_video_network_stats(&self, id: SubscriptionId, stats: MediaNetworkStats) {
        if let Some(interval) = self.video_bitrate.lock().push(stats) {
            println!(
                "[{}] video {:.0} kbps, {:.1}% loss",
                id,
                interval.bitrate_kbps,
                interval.packet_loss_ratio * 100.0
            );
        }
    }

    async fn on_rtc_stats_report(&self, id: SubscriptionId, report: RtcStatsReport) {
        let inbound = report.inbound_rtp_summary();
        println!(
            "[{}] rtc stats: {} entries, {} bytes in, {:.2}% loss",
            id,
            report.len(),
            inbound.bytes_received,
            inbound.packet_loss_ratio() * 100.0
        );
    }

    fn wants_audio_levels(&self) -> bool {
        true
    }
}

fn video_sample(seconds: u64, kbps: u64) -> TransportSignal {
    let bytes = seconds * kbps * 1000 / 8;
    TransportSignal::NetworkStatsSample(NetworkStats {
        video: Some(MediaNetworkStats {
            bytes_received: bytes,
            packets_received: seconds * 90,
            packets_lost: seconds / 2,
            timestamp_ms: 1_700_000_000_000 + seconds * 1000,
        }),
        audio: None,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging(LoggingConfig::default())?;

    let (signals, signal_rx) = mpsc::unbounded_channel();
    let transport = Arc::new(SimulatedTransport {
        signals: signals.clone(),
        volume: Mutex::new(None),
    });

    let observer: Arc<dyn SubscriberEventHandler> = Arc::new(ConsoleObserver {
        video_bitrate: Mutex::new(BitrateSampler::new()),
    });

    let stream = StreamInfo::new("stream-alice", "session-42")
        .with_name("alice")
        .with_captions(true)
        .with_video_dimensions(Resolution::new(1280, 720))
        .with_scalable_video(true);

    let config = SubscriberConfig::new()
        .with_preferred_resolution(Resolution::new(640, 360))
        .with_audio_volume(80.0);

    let subscription = Subscription::create(
        SessionRef::new("session-42"),
        stream,
        config,
        transport.clone(),
        Some(&observer),
    )?;
    let driver = subscription.drive(signal_rx);

    let script = [
        TransportSignal::StreamConnected,
        video_sample(1, 900),
        TransportSignal::AudioLevel(0.42),
        TransportSignal::QualityDegraded { score: 0.4 },
        TransportSignal::QualityDegraded { score: 0.2 },
        video_sample(2, 850),
        TransportSignal::QualityImproved { score: 0.7 },
        TransportSignal::CaptionFragment { text: "good mor".into(), is_final: false },
        TransportSignal::CaptionFragment { text: "good morning".into(), is_final: true },
        TransportSignal::StreamDisconnected,
        TransportSignal::StreamReconnecting,
        TransportSignal::StreamReconnected,
    ];
    for signal in script {
        signals.send(signal)?;
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    subscription.request_stats_report()?;
    if let Err(e) = subscription.request_stats_report() {
        println!("second stats request rejected: {}", e);
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    println!("snapshot: {}", serde_json::to_string_pretty(&subscription.snapshot())?);
    println!("volume applied by transport: {:?}", *transport.volume.lock());

    subscription.close();
    // The transport keeps its own sender, so the channel never closes here
    driver.abort();
    Ok(())
}
