//! Connectivity state tracking
//!
//! [`ReconnectionSupervisor`] turns the raw connectivity signals of the
//! transport into the public connected/disconnected/reconnected/failed
//! sequence. It never retries anything itself; retries belong to the
//! transport and show up here only as signals.
//!
//! | state         | connected    | disconnected | reconnecting | reconnected  | failed  |
//! |---------------|--------------|--------------|--------------|--------------|---------|
//! | Initializing  | Connected *c*| -            | -            | -            | Failed *f* |
//! | Connected     | -            | Disconnected *d* | Reconnecting *d* | -    | Failed *f* |
//! | Disconnected  | Connected *r*| -            | Reconnecting | Connected *r*| Failed *f* |
//! | Reconnecting  | Connected *r*| -            | -            | Connected *r*| Failed *f* |
//! | Failed/Closed | -            | -            | -            | -            | -       |
//!
//! *c* connected, *d* disconnected, *r* reconnected, *f* failed; `-` means
//! the signal is ignored.

use crate::error::{FailureCode, SubscriberError};
use crate::events::SubscriberEventKind;
use crate::types::ConnectivityState;

/// A state change caused by one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: ConnectivityState,
    pub to: ConnectivityState,
    /// Event to publish, if the change is observable
    pub event: Option<SubscriberEventKind>,
}

impl Transition {
    /// The media path just came (back) up.
    pub fn established(&self) -> bool {
        self.to.is_connected() && !self.from.is_connected()
    }
}

#[derive(Debug, Clone)]
pub struct ReconnectionSupervisor {
    state: ConnectivityState,
    disconnect_count: u32,
    failure: Option<SubscriberError>,
}

impl Default for ReconnectionSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconnectionSupervisor {
    pub fn new() -> Self {
        Self {
            state: ConnectivityState::Initializing,
            disconnect_count: 0,
            failure: None,
        }
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    /// Number of disconnect episodes seen so far.
    pub fn disconnect_count(&self) -> u32 {
        self.disconnect_count
    }

    /// The error reported with `on_failed`, once failed.
    pub fn failure(&self) -> Option<&SubscriberError> {
        self.failure.as_ref()
    }

    fn move_to(&mut self, to: ConnectivityState, event: Option<SubscriberEventKind>) -> Option<Transition> {
        let from = self.state;
        self.state = to;
        tracing::debug!(?from, ?to, "connectivity transition");
        Some(Transition { from, to, event })
    }

    fn ignore(&self, signal: &'static str) -> Option<Transition> {
        tracing::trace!(state = ?self.state, signal, "connectivity signal ignored");
        None
    }

    pub fn on_connected(&mut self) -> Option<Transition> {
        match self.state {
            ConnectivityState::Initializing => {
                tracing::info!("stream connected");
                self.move_to(ConnectivityState::Connected, Some(SubscriberEventKind::Connected))
            }
            ConnectivityState::Disconnected | ConnectivityState::Reconnecting => {
                tracing::info!("stream reconnected");
                self.move_to(ConnectivityState::Connected, Some(SubscriberEventKind::Reconnected))
            }
            _ => self.ignore("connected"),
        }
    }

    pub fn on_disconnected(&mut self) -> Option<Transition> {
        match self.state {
            ConnectivityState::Connected => {
                self.disconnect_count += 1;
                tracing::warn!(episode = self.disconnect_count, "stream disconnected");
                self.move_to(ConnectivityState::Disconnected, Some(SubscriberEventKind::Disconnected))
            }
            _ => self.ignore("disconnected"),
        }
    }

    /// The transport began retrying. Reported as a disconnect only when no
    /// disconnect was seen first.
    pub fn on_reconnecting(&mut self) -> Option<Transition> {
        match self.state {
            ConnectivityState::Connected => {
                self.disconnect_count += 1;
                tracing::warn!(episode = self.disconnect_count, "stream reconnecting");
                self.move_to(ConnectivityState::Reconnecting, Some(SubscriberEventKind::Disconnected))
            }
            ConnectivityState::Disconnected => self.move_to(ConnectivityState::Reconnecting, None),
            _ => self.ignore("reconnecting"),
        }
    }

    pub fn on_reconnected(&mut self) -> Option<Transition> {
        match self.state {
            ConnectivityState::Disconnected | ConnectivityState::Reconnecting => {
                tracing::info!("stream reconnected");
                self.move_to(ConnectivityState::Connected, Some(SubscriberEventKind::Reconnected))
            }
            _ => self.ignore("reconnected"),
        }
    }

    pub fn on_failed(&mut self, code: FailureCode, reason: impl Into<String>) -> Option<Transition> {
        if self.state.is_terminal() {
            return self.ignore("failed");
        }
        let error = SubscriberError::connection_failed(code, reason);
        tracing::error!(%code, error = %error, "stream failed");
        self.failure = Some(error.clone());
        self.move_to(ConnectivityState::Failed, Some(SubscriberEventKind::Failed { error }))
    }

    /// Unconditional; returns false if already closed.
    pub fn close(&mut self) -> bool {
        if self.state == ConnectivityState::Closed {
            return false;
        }
        self.move_to(ConnectivityState::Closed, None);
        true
    }
}
