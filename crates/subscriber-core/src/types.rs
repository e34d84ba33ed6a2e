//! Core data types shared by every subscriber component
//!
//! - **Identity** - [`SubscriptionId`], [`SessionRef`], [`StreamInfo`]
//! - **State** - [`ConnectivityState`], [`VideoAdaptationState`]
//! - **Causation** - [`VideoEventReason`]
//! - **Payloads** - [`Resolution`], [`CaptionEvent`]

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SubscriptionId = Uuid;

/// The session that owns a subscription. Set once at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionRef {
    pub session_id: String,
}

impl SessionRef {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

/// A remote participant's published stream, as advertised by the session.
///
/// # Examples
///
/// ```rust
/// use subscriber_core::types::{Resolution, StreamInfo};
///
/// let stream = StreamInfo::new("stream-1", "session-1")
///     .with_name("alice")
///     .with_captions(true)
///     .with_video_dimensions(Resolution::new(1280, 720))
///     .with_scalable_video(true);
///
/// assert!(stream.has_audio && stream.has_video);
/// assert!(stream.has_captions);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub stream_id: String,
    pub session_id: String,
    pub name: Option<String>,
    pub has_audio: bool,
    pub has_video: bool,
    pub has_captions: bool,
    /// Maximum dimensions the publisher sends
    pub video_dimensions: Option<Resolution>,
    /// Whether the publisher offers several layers a subscriber can pick from
    pub scalable_video: bool,
}

impl StreamInfo {
    /// An audio+video stream without captions or scalable video.
    pub fn new(stream_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
            session_id: session_id.into(),
            name: None,
            has_audio: true,
            has_video: true,
            has_captions: false,
            video_dimensions: None,
            scalable_video: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_audio(mut self, has_audio: bool) -> Self {
        self.has_audio = has_audio;
        self
    }

    pub fn with_video(mut self, has_video: bool) -> Self {
        self.has_video = has_video;
        self
    }

    pub fn with_captions(mut self, has_captions: bool) -> Self {
        self.has_captions = has_captions;
        self
    }

    pub fn with_video_dimensions(mut self, dimensions: Resolution) -> Self {
        self.video_dimensions = Some(dimensions);
        self
    }

    pub fn with_scalable_video(mut self, scalable: bool) -> Self {
        self.scalable_video = scalable;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Transport connectivity of a subscription.
///
/// ```text
/// Initializing ──► Connected ──► Disconnected ◄──► Reconnecting
///      │               ▲               │                │
///      │               └───────────────┴────────────────┘
///      └──────────────────────────► Failed
/// any ──► Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectivityState {
    Initializing,
    Connected,
    Disconnected,
    Reconnecting,
    Failed,
    Closed,
}

impl ConnectivityState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectivityState::Connected)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectivityState::Failed | ConnectivityState::Closed)
    }

    /// Disconnected or Reconnecting.
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            ConnectivityState::Disconnected | ConnectivityState::Reconnecting
        )
    }
}

/// Video adaptation lattice as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoAdaptationState {
    /// Video flows
    Normal,
    /// Video flows but is at risk of being dropped
    Warning,
    /// Video does not flow
    Disabled,
}

/// Why video was enabled or disabled. Attached to every enable/disable event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoEventReason {
    /// The publisher turned its video on or off
    PublisherPropertyChanged,
    /// This subscriber changed `subscribe_to_video`
    SubscriberPropertyChanged,
    /// Stream quality crossed an adaptation threshold
    QualityChanged,
    /// The stream's video codec cannot be decoded on this device
    CodecNotSupported,
}

/// One caption fragment. Non-final fragments may be superseded by later ones
/// until a final fragment closes the segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionEvent {
    pub text: String,
    pub is_final: bool,
}

impl CaptionEvent {
    pub fn new(text: impl Into<String>, is_final: bool) -> Self {
        Self {
            text: text.into(),
            is_final,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_state_predicates() {
        assert!(ConnectivityState::Connected.is_connected());
        assert!(ConnectivityState::Failed.is_terminal());
        assert!(ConnectivityState::Closed.is_terminal());
        assert!(!ConnectivityState::Disconnected.is_terminal());
        assert!(ConnectivityState::Reconnecting.is_interrupted());
        assert!(!ConnectivityState::Initializing.is_interrupted());
    }

    #[test]
    fn resolution_display() {
        let res = Resolution::new(640, 360);
        assert_eq!(res.to_string(), "640x360");
        assert_eq!(res.pixel_count(), 230_400);
    }
}
