//! Subscription configuration
//!
//! [`SubscriberConfig`] carries the initial values of every option a caller
//! can later change on a live [`Subscription`](crate::Subscription), plus the
//! [`QualityThresholds`] that drive video adaptation.
//!
//! # Usage Examples
//!
//! ```rust
//! use subscriber_core::config::SubscriberConfig;
//! use subscriber_core::types::Resolution;
//!
//! let config = SubscriberConfig::new()
//!     .with_video(false)
//!     .with_preferred_resolution(Resolution::new(320, 240))
//!     .with_audio_volume(250.0);
//!
//! assert!(!config.subscribe_to_video);
//! assert_eq!(config.audio_volume, 100.0); // clamped
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Loading from JSON
//!
//! Missing fields take their defaults:
//!
//! ```rust
//! use subscriber_core::config::SubscriberConfig;
//!
//! let config = SubscriberConfig::from_json_str(r#"{ "subscribe_to_audio": false }"#).unwrap();
//! assert!(!config.subscribe_to_audio);
//! assert!(config.subscribe_to_video);
//! assert_eq!(config.subscribe_to_captions, None);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{SubscriberError, SubscriberResult};
use crate::types::Resolution;

pub const MIN_AUDIO_VOLUME: f64 = 0.0;
pub const MAX_AUDIO_VOLUME: f64 = 100.0;

/// Clamp a volume into `[0, 100]`. `None` for NaN.
pub fn clamp_volume(volume: f64) -> Option<f64> {
    if volume.is_nan() {
        None
    } else {
        Some(volume.clamp(MIN_AUDIO_VOLUME, MAX_AUDIO_VOLUME))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriberConfig {
    pub subscribe_to_audio: bool,
    pub subscribe_to_video: bool,
    /// `None` inherits the stream's caption availability
    pub subscribe_to_captions: Option<bool>,

    /// Only honored for streams with scalable video
    pub preferred_resolution: Option<Resolution>,
    /// Only honored for streams with scalable video
    pub preferred_frame_rate: Option<f32>,

    pub audio_volume: f64,

    pub quality: QualityThresholds,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            subscribe_to_audio: true,
            subscribe_to_video: true,
            subscribe_to_captions: None,
            preferred_resolution: None,
            preferred_frame_rate: None,
            audio_volume: MAX_AUDIO_VOLUME,
            quality: QualityThresholds::default(),
        }
    }
}

impl SubscriberConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> SubscriberResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SubscriberError::invalid_configuration("json", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.subscribe_to_audio = enabled;
        self
    }

    pub fn with_video(mut self, enabled: bool) -> Self {
        self.subscribe_to_video = enabled;
        self
    }

    pub fn with_captions(mut self, enabled: bool) -> Self {
        self.subscribe_to_captions = Some(enabled);
        self
    }

    pub fn with_preferred_resolution(mut self, resolution: Resolution) -> Self {
        self.preferred_resolution = Some(resolution);
        self
    }

    pub fn with_preferred_frame_rate(mut self, frame_rate: f32) -> Self {
        self.preferred_frame_rate = Some(frame_rate);
        self
    }

    /// Out-of-range values are clamped; NaN keeps the current volume.
    pub fn with_audio_volume(mut self, volume: f64) -> Self {
        if let Some(volume) = clamp_volume(volume) {
            self.audio_volume = volume;
        }
        self
    }

    pub fn with_quality_thresholds(mut self, quality: QualityThresholds) -> Self {
        self.quality = quality;
        self
    }

    pub fn validate(&self) -> SubscriberResult<()> {
        if !self.audio_volume.is_finite() {
            return Err(SubscriberError::invalid_configuration(
                "audio_volume",
                "must be a finite number",
            ));
        }
        if let Some(rate) = self.preferred_frame_rate {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(SubscriberError::invalid_configuration(
                    "preferred_frame_rate",
                    "must be a positive number",
                ));
            }
        }
        if let Some(res) = self.preferred_resolution {
            if res.width == 0 || res.height == 0 {
                return Err(SubscriberError::invalid_configuration(
                    "preferred_resolution",
                    "width and height must be non-zero",
                ));
            }
        }
        self.quality.validate()
    }
}

/// Score boundaries for the video adaptation lattice.
///
/// Scores run from 0.0 (unusable) to 1.0 (perfect). Below `warning_below`
/// observers are warned; below `disable_below` video is dropped. Video that
/// was dropped only comes back once the score is at or above `warning_below`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub warning_below: f32,
    pub disable_below: f32,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            warning_below: 0.5,
            disable_below: 0.25,
        }
    }
}

impl QualityThresholds {
    pub fn new(warning_below: f32, disable_below: f32) -> Self {
        Self {
            warning_below,
            disable_below,
        }
    }

    pub fn validate(&self) -> SubscriberResult<()> {
        let in_range = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_range(self.warning_below) {
            return Err(SubscriberError::invalid_configuration(
                "quality.warning_below",
                "must be within [0, 1]",
            ));
        }
        if !in_range(self.disable_below) {
            return Err(SubscriberError::invalid_configuration(
                "quality.disable_below",
                "must be within [0, 1]",
            ));
        }
        if self.disable_below > self.warning_below {
            return Err(SubscriberError::invalid_configuration(
                "quality.disable_below",
                "must not exceed warning_below",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_surface() {
        let config = SubscriberConfig::default();
        assert!(config.subscribe_to_audio);
        assert!(config.subscribe_to_video);
        assert_eq!(config.subscribe_to_captions, None);
        assert_eq!(config.preferred_resolution, None);
        assert_eq!(config.preferred_frame_rate, None);
        assert_eq!(config.audio_volume, 100.0);
        tokio_test::assert_ok!(config.validate());
    }

    #[test]
    fn clamp_volume_handles_edges() {
        assert_eq!(clamp_volume(150.0), Some(100.0));
        assert_eq!(clamp_volume(-5.0), Some(0.0));
        assert_eq!(clamp_volume(42.5), Some(42.5));
        assert_eq!(clamp_volume(f64::INFINITY), Some(100.0));
        assert_eq!(clamp_volume(f64::NAN), None);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let config = SubscriberConfig::new()
            .with_quality_thresholds(QualityThresholds::new(0.2, 0.6));
        let err = config.validate().unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn zero_frame_rate_is_rejected() {
        let config = SubscriberConfig::new().with_preferred_frame_rate(0.0);
        tokio_test::assert_err!(config.validate());
    }

    #[test]
    fn json_round_trip_keeps_preferences() {
        let config = SubscriberConfig::new()
            .with_captions(true)
            .with_preferred_resolution(Resolution::new(640, 480))
            .with_preferred_frame_rate(15.0);
        let json = serde_json::to_string(&config).unwrap();
        let parsed = SubscriberConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        let err = SubscriberConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SubscriberError::InvalidConfiguration { .. }));
    }
}
