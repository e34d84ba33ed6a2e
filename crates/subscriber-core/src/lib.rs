//! Subscriber-core: media subscription client core
//!
//! Binds a local endpoint to one remote audio/video/caption stream of a
//! real-time session, tracks its connectivity and video quality, and reports
//! everything that happens to it through observer events.
//!
//! ## Layering
//! ```text
//! application observers <- Subscription <- transport signals
//!                               |
//!                               +--> MediaTransport commands
//! ```
//!
//! Subscriber-core focuses on:
//! - Subscription configuration (media toggles, preferences, volume)
//! - Video adaptation (quality warnings, codec support, publisher/subscriber toggles)
//! - Connectivity reporting (connect, disconnect, reconnect, failure)
//! - On-demand RTC stats and periodic network stats
//! - Caption delivery
//!
//! Decoding, rendering and the network transport itself live outside this
//! crate, behind [`MediaTransport`].

pub mod captions;
pub mod config;
pub mod connectivity;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod logging;
pub mod quality;
pub mod stats;
pub mod subscription;
pub mod transport;
pub mod types;

pub use config::{QualityThresholds, SubscriberConfig};
pub use dispatcher::{EventDispatcher, ObserverHandle};
pub use error::{FailureCode, SubscriberError, SubscriberResult};
pub use events::{SubscriberEvent, SubscriberEventHandler, SubscriberEventKind};
pub use stats::{
    BitrateSampler, IntervalStats, MediaNetworkStats, NetworkStats, RtcStatsEntry, RtcStatsReport,
    RtcStatsType,
};
pub use subscription::{Subscription, SubscriptionSnapshot};
pub use transport::{MediaSelection, MediaTransport, TransportSignal};
pub use types::{
    CaptionEvent, ConnectivityState, Resolution, SessionRef, StreamInfo, SubscriptionId,
    VideoAdaptationState, VideoEventReason,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
