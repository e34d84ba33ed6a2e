//! Error types for subscriber-core
//!
//! Every failure is scoped to a single [`Subscription`](crate::Subscription);
//! nothing here is fatal to the host process.
//!
//! # Error Categories
//!
//! - **Stream Errors** - the stream handed to `create` cannot be subscribed to
//! - **Request Errors** - a stats request was rejected synchronously
//! - **Connection Errors** - the stream never connected or dropped terminally
//! - **Configuration Errors** - invalid settings, fix the config and retry
//!
//! # Handling a rejected stats request
//!
//! ```rust
//! use subscriber_core::SubscriberError;
//!
//! fn describe(result: Result<(), SubscriberError>) -> &'static str {
//!     match result {
//!         Ok(()) => "report will arrive through the observers",
//!         Err(SubscriberError::AlreadyInFlight) => "wait for the pending report",
//!         Err(SubscriberError::NotConnected { .. }) => "retry once connected",
//!         Err(_) => "subscription cannot serve stats",
//!     }
//! }
//!
//! assert_eq!(describe(Err(SubscriberError::AlreadyInFlight)), "wait for the pending report");
//! ```

use thiserror::Error;

use crate::types::ConnectivityState;

pub type SubscriberResult<T> = Result<T, SubscriberError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubscriberError {
    #[error("Invalid stream: {reason}")]
    InvalidStream { reason: String },

    #[error("A stats report request is already in flight")]
    AlreadyInFlight,

    #[error("Subscription is not connected (state: {state:?})")]
    NotConnected { state: ConnectivityState },

    #[error("Connection failed ({code}): {reason}")]
    ConnectionFailed { code: FailureCode, reason: String },

    #[error("Subscription is closed")]
    Closed,

    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Transport error: {reason}")]
    TransportError { reason: String },
}

impl SubscriberError {
    pub fn invalid_stream(reason: impl Into<String>) -> Self {
        Self::InvalidStream { reason: reason.into() }
    }

    pub fn connection_failed(code: FailureCode, reason: impl Into<String>) -> Self {
        Self::ConnectionFailed { code, reason: reason.into() }
    }

    pub fn invalid_configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn transport_error(reason: impl Into<String>) -> Self {
        Self::TransportError { reason: reason.into() }
    }

    /// Whether retrying the same operation later can succeed without the
    /// caller changing anything.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SubscriberError::AlreadyInFlight | SubscriberError::NotConnected { .. } => true,
            SubscriberError::TransportError { .. } => true,

            SubscriberError::InvalidStream { .. }
            | SubscriberError::InvalidConfiguration { .. }
            | SubscriberError::ConnectionFailed { .. }
            | SubscriberError::Closed => false,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            SubscriberError::InvalidStream { .. } => "stream",
            SubscriberError::AlreadyInFlight | SubscriberError::NotConnected { .. } => "request",
            SubscriberError::ConnectionFailed { .. } | SubscriberError::TransportError { .. } => {
                "connection"
            }
            SubscriberError::InvalidConfiguration { .. } => "configuration",
            SubscriberError::Closed => "lifecycle",
        }
    }
}

/// Failure codes reported by the transport with `streamFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCode {
    /// The session the stream belongs to went away
    SessionDisconnected,
    /// The stream did not connect in time
    ConnectionTimedOut,
    /// The peer connection reported an unrecoverable error
    WebRtcError,
    /// The media server no longer knows the stream
    StreamNotFound,
    /// Too many simultaneous subscriptions
    StreamLimitExceeded,
    /// The transport hit an internal error
    Internal,
    /// Any code the transport reports that is not listed above
    Other(i32),
}

impl FailureCode {
    pub fn code(&self) -> i32 {
        match self {
            FailureCode::SessionDisconnected => 1541,
            FailureCode::ConnectionTimedOut => 1542,
            FailureCode::WebRtcError => 1600,
            FailureCode::StreamNotFound => 1604,
            FailureCode::StreamLimitExceeded => 1605,
            FailureCode::Internal => 2000,
            FailureCode::Other(code) => *code,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            1541 => FailureCode::SessionDisconnected,
            1542 => FailureCode::ConnectionTimedOut,
            1600 => FailureCode::WebRtcError,
            1604 => FailureCode::StreamNotFound,
            1605 => FailureCode::StreamLimitExceeded,
            2000 => FailureCode::Internal,
            other => FailureCode::Other(other),
        }
    }
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
