//! Video adaptation state machine
//!
//! Video for a subscription flows only while four independent conditions
//! hold: the subscriber wants video, the publisher sends it, its codec is
//! decodable, and quality has not fallen below the hard threshold. The
//! monitor tracks each condition separately and reports the transitions of
//! their conjunction, tagged with the [`VideoEventReason`] that caused them.
//!
//! ## Quality lattice
//!
//! ```text
//!            score < warning_below          score < disable_below
//!   Normal ─────────────────────► Warning ─────────────────────► Disabled
//!     ▲  ◄─────────────────────────┘                                │
//!     │     score >= warning_below                                  │
//!     └─────────────────────────────────────────────────────────────┘
//!                         score >= warning_below
//! ```
//!
//! A score in the warning band keeps Disabled video disabled, so a stream
//! hovering around the hard threshold does not flap.
//!
//! Warnings are only announced while video is otherwise flowing. Dropping
//! video for any reason ends the current warning episode silently.

use crate::config::QualityThresholds;
use crate::events::SubscriberEventKind;
use crate::types::{VideoAdaptationState, VideoEventReason};

#[derive(Debug, Clone)]
pub struct QualityAdaptationMonitor {
    thresholds: QualityThresholds,
    lattice: VideoAdaptationState,
    last_score: Option<f32>,

    codec_blocked: bool,
    subscriber_off: bool,
    publisher_off: bool,

    video_enabled: bool,
    warning_announced: bool,
    last_reason: Option<VideoEventReason>,
}

impl QualityAdaptationMonitor {
    /// Video starts enabled exactly when the subscriber asked for it.
    pub fn new(thresholds: QualityThresholds, subscribe_video: bool) -> Self {
        Self {
            thresholds,
            lattice: VideoAdaptationState::Normal,
            last_score: None,
            codec_blocked: false,
            subscriber_off: !subscribe_video,
            publisher_off: false,
            video_enabled: subscribe_video,
            warning_announced: false,
            last_reason: None,
        }
    }

    /// Adaptation state as observers see it.
    pub fn state(&self) -> VideoAdaptationState {
        if !self.video_enabled {
            VideoAdaptationState::Disabled
        } else if self.warning_announced {
            VideoAdaptationState::Warning
        } else {
            VideoAdaptationState::Normal
        }
    }

    /// State derived from quality alone, ignoring the other conditions.
    pub fn quality_level(&self) -> VideoAdaptationState {
        self.lattice
    }

    pub fn last_reason(&self) -> Option<VideoEventReason> {
        self.last_reason
    }

    pub fn last_score(&self) -> Option<f32> {
        self.last_score
    }

    pub fn is_video_enabled(&self) -> bool {
        self.video_enabled
    }

    pub fn is_codec_blocked(&self) -> bool {
        self.codec_blocked
    }

    fn classify(&self, score: f32) -> VideoAdaptationState {
        if score < self.thresholds.disable_below {
            VideoAdaptationState::Disabled
        } else if score < self.thresholds.warning_below {
            if self.lattice == VideoAdaptationState::Disabled {
                VideoAdaptationState::Disabled
            } else {
                VideoAdaptationState::Warning
            }
        } else {
            VideoAdaptationState::Normal
        }
    }

    fn unblocked_except_quality(&self) -> bool {
        !self.codec_blocked && !self.subscriber_off && !self.publisher_off
    }

    fn effective_enabled(&self) -> bool {
        self.unblocked_except_quality() && self.lattice != VideoAdaptationState::Disabled
    }

    /// Reconcile `video_enabled` with the current conditions, emitting
    /// enabled/disabled tagged with `reason` if it changed.
    fn settle(&mut self, reason: VideoEventReason, events: &mut Vec<SubscriberEventKind>) {
        let enabled = self.effective_enabled();
        if enabled == self.video_enabled {
            return;
        }

        self.video_enabled = enabled;
        self.last_reason = Some(reason);

        if enabled {
            tracing::info!(?reason, "video enabled");
            events.push(SubscriberEventKind::VideoEnabled { reason });
            if self.lattice == VideoAdaptationState::Warning {
                self.warning_announced = true;
                events.push(SubscriberEventKind::VideoDisableWarning);
            }
        } else {
            tracing::info!(?reason, "video disabled");
            self.warning_announced = false;
            events.push(SubscriberEventKind::VideoDisabled { reason });
        }
    }

    /// Feed a quality estimate in `[0, 1]`. Non-finite scores are ignored.
    pub fn on_quality_score(&mut self, score: f32) -> Vec<SubscriberEventKind> {
        let mut events = Vec::new();
        if !score.is_finite() {
            tracing::warn!(score, "ignoring non-finite quality score");
            return events;
        }

        let score = score.clamp(0.0, 1.0);
        self.last_score = Some(score);

        let previous = self.lattice;
        let next = self.classify(score);
        if next == previous {
            return events;
        }
        self.lattice = next;
        tracing::debug!(score, from = ?previous, to = ?next, "quality level changed");

        if !self.unblocked_except_quality() {
            return events;
        }

        use VideoAdaptationState::*;
        match (previous, next) {
            (Normal, Warning) => {
                self.warning_announced = true;
                events.push(SubscriberEventKind::VideoDisableWarning);
            }
            (Normal, Disabled) => {
                self.warning_announced = true;
                events.push(SubscriberEventKind::VideoDisableWarning);
                self.settle(VideoEventReason::QualityChanged, &mut events);
            }
            (Warning, Disabled) | (Disabled, Normal) => {
                self.settle(VideoEventReason::QualityChanged, &mut events);
            }
            (Warning, Normal) => {
                if self.warning_announced {
                    self.warning_announced = false;
                    events.push(SubscriberEventKind::VideoDisableWarningLifted);
                }
            }
            // Disabled -> Warning is absorbed by hysteresis in classify
            _ => {}
        }

        events
    }

    /// The stream's video codec cannot be decoded. Latches until the
    /// subscriber turns video off and on again.
    pub fn on_codec_unsupported(&mut self) -> Vec<SubscriberEventKind> {
        let mut events = Vec::new();
        if self.codec_blocked {
            return events;
        }
        self.codec_blocked = true;

        if self.video_enabled {
            self.settle(VideoEventReason::CodecNotSupported, &mut events);
        } else {
            self.last_reason = Some(VideoEventReason::CodecNotSupported);
        }
        events
    }

    pub fn on_subscriber_video(&mut self, enabled: bool) -> Vec<SubscriberEventKind> {
        let mut events = Vec::new();
        if self.subscriber_off == !enabled {
            return events;
        }
        self.subscriber_off = !enabled;
        if enabled && self.codec_blocked {
            tracing::debug!("codec block cleared by subscriber");
            self.codec_blocked = false;
        }
        self.settle(VideoEventReason::SubscriberPropertyChanged, &mut events);
        events
    }

    pub fn on_publisher_video(&mut self, enabled: bool) -> Vec<SubscriberEventKind> {
        let mut events = Vec::new();
        if self.publisher_off == !enabled {
            return events;
        }
        self.publisher_off = !enabled;
        self.settle(VideoEventReason::PublisherPropertyChanged, &mut events);
        events
    }
}
