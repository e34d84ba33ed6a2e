//! Events emitted by a subscription and the observer trait that receives them
//!
//! Every event has a default no-op handler on [`SubscriberEventHandler`], so
//! an observer overrides only what it cares about. Events are delivered to
//! [`SubscriberEventHandler::on_subscriber_event`], which routes to the
//! specific handler methods.
//!
//! # Basic Observer
//!
//! ```rust
//! use async_trait::async_trait;
//! use subscriber_core::events::SubscriberEventHandler;
//! use subscriber_core::types::{SubscriptionId, VideoEventReason};
//!
//! struct VideoBadge;
//!
//! #[async_trait]
//! impl SubscriberEventHandler for VideoBadge {
//!     async fn on_video_disabled(&self, _id: SubscriptionId, reason: VideoEventReason) {
//!         println!("video off: {:?}", reason);
//!     }
//!
//!     async fn on_video_enabled(&self, _id: SubscriptionId, reason: VideoEventReason) {
//!         println!("video on: {:?}", reason);
//!     }
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SubscriberError;
use crate::stats::{MediaNetworkStats, RtcStatsReport};
use crate::types::{CaptionEvent, SubscriptionId, VideoEventReason};

#[derive(Debug, Clone, PartialEq)]
pub enum SubscriberEventKind {
    Connected,
    Failed { error: SubscriberError },
    Disconnected,
    Reconnected,

    VideoDisabled { reason: VideoEventReason },
    VideoEnabled { reason: VideoEventReason },
    VideoDisableWarning,
    VideoDisableWarningLifted,

    /// In `[0, 1]`
    AudioLevel { level: f32 },
    Caption(CaptionEvent),

    VideoNetworkStats(MediaNetworkStats),
    AudioNetworkStats(MediaNetworkStats),
    RtcStatsReport(RtcStatsReport),
    RtcStatsReportFailed { reason: String },
}

impl SubscriberEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            SubscriberEventKind::Connected => "connected",
            SubscriberEventKind::Failed { .. } => "failed",
            SubscriberEventKind::Disconnected => "disconnected",
            SubscriberEventKind::Reconnected => "reconnected",
            SubscriberEventKind::VideoDisabled { .. } => "video_disabled",
            SubscriberEventKind::VideoEnabled { .. } => "video_enabled",
            SubscriberEventKind::VideoDisableWarning => "video_disable_warning",
            SubscriberEventKind::VideoDisableWarningLifted => "video_disable_warning_lifted",
            SubscriberEventKind::AudioLevel { .. } => "audio_level",
            SubscriberEventKind::Caption(_) => "caption",
            SubscriberEventKind::VideoNetworkStats(_) => "video_network_stats",
            SubscriberEventKind::AudioNetworkStats(_) => "audio_network_stats",
            SubscriberEventKind::RtcStatsReport(_) => "rtc_stats_report",
            SubscriberEventKind::RtcStatsReportFailed { .. } => "rtc_stats_report_failed",
        }
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            SubscriberEventKind::Connected
                | SubscriberEventKind::Failed { .. }
                | SubscriberEventKind::Disconnected
                | SubscriberEventKind::Reconnected
        )
    }

    pub fn is_video_adaptation(&self) -> bool {
        matches!(
            self,
            SubscriberEventKind::VideoDisabled { .. }
                | SubscriberEventKind::VideoEnabled { .. }
                | SubscriberEventKind::VideoDisableWarning
                | SubscriberEventKind::VideoDisableWarningLifted
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriberEvent {
    pub subscription_id: SubscriptionId,
    pub kind: SubscriberEventKind,
    pub timestamp: DateTime<Utc>,
}

impl SubscriberEvent {
    pub fn new(subscription_id: SubscriptionId, kind: SubscriberEventKind) -> Self {
        Self {
            subscription_id,
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// Observer of one or more subscriptions.
///
/// Observers are held without ownership: keep the `Arc` alive for as long as
/// events should arrive.
#[async_trait]
pub trait SubscriberEventHandler: Send + Sync {
    async fn on_connected(&self, _subscription_id: SubscriptionId) {}

    async fn on_failed(&self, _subscription_id: SubscriptionId, _error: SubscriberError) {}

    async fn on_disconnected(&self, _subscription_id: SubscriptionId) {}

    async fn on_reconnected(&self, _subscription_id: SubscriptionId) {}

    async fn on_video_disabled(&self, _subscription_id: SubscriptionId, _reason: VideoEventReason) {}

    async fn on_video_enabled(&self, _subscription_id: SubscriptionId, _reason: VideoEventReason) {}

    async fn on_video_disable_warning(&self, _subscription_id: SubscriptionId) {}

    async fn on_video_disable_warning_lifted(&self, _subscription_id: SubscriptionId) {}

    /// Only called when [`wants_audio_levels`](Self::wants_audio_levels) returns true.
    async fn on_audio_level(&self, _subscription_id: SubscriptionId, _level: f32) {}

    async fn on_caption(&self, _subscription_id: SubscriptionId, _caption: CaptionEvent) {}

    async fn on_video_network_stats(&self, _subscription_id: SubscriptionId, _stats: MediaNetworkStats) {}

    async fn on_audio_network_stats(&self, _subscription_id: SubscriptionId, _stats: MediaNetworkStats) {}

    async fn on_rtc_stats_report(&self, _subscription_id: SubscriptionId, _report: RtcStatsReport) {}

    async fn on_rtc_stats_report_failed(&self, _subscription_id: SubscriptionId, _reason: String) {}

    /// Audio level sampling runs only while some registered observer opts in.
    fn wants_audio_levels(&self) -> bool {
        false
    }

    /// Routes an event to the specific handler. Override only for custom routing.
    async fn on_subscriber_event(&self, event: SubscriberEvent) {
        let id = event.subscription_id;
        match event.kind {
            SubscriberEventKind::Connected => self.on_connected(id).await,
            SubscriberEventKind::Failed { error } => self.on_failed(id, error).await,
            SubscriberEventKind::Disconnected => self.on_disconnected(id).await,
            SubscriberEventKind::Reconnected => self.on_reconnected(id).await,
            SubscriberEventKind::VideoDisabled { reason } => self.on_video_disabled(id, reason).await,
            SubscriberEventKind::VideoEnabled { reason } => self.on_video_enabled(id, reason).await,
            SubscriberEventKind::VideoDisableWarning => self.on_video_disable_warning(id).await,
            SubscriberEventKind::VideoDisableWarningLifted => {
                self.on_video_disable_warning_lifted(id).await
            }
            SubscriberEventKind::AudioLevel { level } => {
                if self.wants_audio_levels() {
                    self.on_audio_level(id, level).await
                }
            }
            SubscriberEventKind::Caption(caption) => self.on_caption(id, caption).await,
            SubscriberEventKind::VideoNetworkStats(stats) => self.on_video_network_stats(id, stats).await,
            SubscriberEventKind::AudioNetworkStats(stats) => self.on_audio_network_stats(id, stats).await,
            SubscriberEventKind::RtcStatsReport(report) => self.on_rtc_stats_report(id, report).await,
            SubscriberEventKind::RtcStatsReportFailed { reason } => {
                self.on_rtc_stats_report_failed(id, reason).await
            }
        }
    }
}
