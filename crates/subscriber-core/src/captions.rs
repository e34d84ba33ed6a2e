//! Caption fragment gating
//!
//! Captions are forwarded in arrival order and only while the subscription
//! asks for them. There is no replay: fragments that arrive while captions
//! are off are dropped, and an observer that registers late only sees what
//! follows.

use crate::types::CaptionEvent;

#[derive(Debug, Clone, Default)]
pub struct CaptionStream {
    enabled: bool,
    closed: bool,
    /// Text of the segment still open, if any
    partial: Option<String>,
    finalized_segments: u64,
}

impl CaptionStream {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.closed
    }

    /// Turning captions off abandons the open segment.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled && !enabled {
            self.partial = None;
        }
        self.enabled = enabled;
    }

    /// Returns the event to deliver, or `None` if captions are gated off.
    pub fn on_fragment(&mut self, text: impl Into<String>, is_final: bool) -> Option<CaptionEvent> {
        if !self.is_enabled() {
            tracing::trace!("caption fragment dropped");
            return None;
        }

        let text = text.into();
        if is_final {
            self.partial = None;
            self.finalized_segments += 1;
        } else {
            self.partial = Some(text.clone());
        }
        Some(CaptionEvent::new(text, is_final))
    }

    /// Latest non-final text of the open segment.
    pub fn current_partial(&self) -> Option<&str> {
        self.partial.as_deref()
    }

    pub fn finalized_segments(&self) -> u64 {
        self.finalized_segments
    }

    pub fn close(&mut self) {
        self.closed = true;
        self.partial = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_fragments_are_superseded_until_final() {
        let mut captions = CaptionStream::new(true);
        captions.on_fragment("hel", false);
        captions.on_fragment("hello wor", false);
        assert_eq!(captions.current_partial(), Some("hello wor"));

        let event = captions.on_fragment("hello world", true).unwrap();
        assert!(event.is_final);
        assert_eq!(captions.current_partial(), None);
        assert_eq!(captions.finalized_segments(), 1);
    }

    #[test]
    fn disabled_stream_drops_fragments() {
        let mut captions = CaptionStream::new(false);
        assert!(captions.on_fragment("ignored", true).is_none());

        captions.set_enabled(true);
        assert!(captions.on_fragment("heard", false).is_some());

        captions.set_enabled(false);
        assert_eq!(captions.current_partial(), None);
        assert!(captions.on_fragment("ignored", true).is_none());
        assert_eq!(captions.finalized_segments(), 0);
    }

    #[test]
    fn nothing_after_close() {
        let mut captions = CaptionStream::new(true);
        captions.close();
        captions.set_enabled(true);
        assert!(captions.on_fragment("late", true).is_none());
    }
}
