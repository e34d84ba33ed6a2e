//! The subscription controller
//!
//! A [`Subscription`] binds one local endpoint to one remote stream for its
//! whole lifetime. It owns every piece of mutable state (toggles,
//! preferences, volume, and the connectivity, adaptation, stats and caption
//! state machines) behind a single lock, and it is the only entry point for
//! both callers and the transport.
//!
//! ## Ordering
//!
//! Every state change and the events it produces happen under that lock;
//! events are pushed to an outbox while the lock is still held, so observers
//! see events in exactly the order the state changed. A per-subscription task
//! drains the outbox and awaits each observer in turn.
//!
//! Transport commands are issued after the state lock is released, so a
//! transport may call back into [`Subscription::deliver_signal`] from inside a
//! command. A second, reentrant lock is held from the state change until its
//! commands have been issued, so the transport receives commands in the same
//! order as the state changes that produced them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use subscriber_core::{
//!     MediaSelection, MediaTransport, Resolution, SessionRef, StreamInfo,
//!     SubscriberConfig, SubscriberResult, Subscription, TransportSignal,
//! };
//!
//! struct NullTransport;
//!
//! impl MediaTransport for NullTransport {
//!     fn attach(&self, _: &StreamInfo, _: &MediaSelection) -> SubscriberResult<()> { Ok(()) }
//!     fn update_selection(&self, _: &MediaSelection) {}
//!     fn set_audio_volume(&self, _: f64) {}
//!     fn set_preferred_resolution(&self, _: Option<Resolution>) {}
//!     fn set_preferred_frame_rate(&self, _: Option<f32>) {}
//!     fn request_rtc_stats(&self) {}
//!     fn detach(&self) {}
//! }
//!
//! # async fn run() -> SubscriberResult<()> {
//! let subscription = Subscription::create(
//!     SessionRef::new("session-1"),
//!     StreamInfo::new("stream-1", "session-1"),
//!     SubscriberConfig::default(),
//!     Arc::new(NullTransport),
//!     None,
//! )?;
//!
//! subscription.deliver_signal(TransportSignal::StreamConnected);
//! subscription.set_volume(150.0);
//! assert_eq!(subscription.audio_volume(), 100.0);
//!
//! subscription.close();
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::captions::CaptionStream;
use crate::config::{SubscriberConfig, clamp_volume};
use crate::connectivity::{ReconnectionSupervisor, Transition};
use crate::dispatcher::{EventDispatcher, ObserverHandle};
use crate::error::{SubscriberError, SubscriberResult};
use crate::events::{SubscriberEvent, SubscriberEventHandler, SubscriberEventKind};
use crate::quality::QualityAdaptationMonitor;
use crate::stats::StatsCollector;
use crate::transport::{MediaSelection, MediaTransport, TransportSignal};
use crate::types::{
    ConnectivityState, Resolution, SessionRef, StreamInfo, SubscriptionId, VideoAdaptationState,
    VideoEventReason,
};

/// Point-in-time view of a subscription.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionSnapshot {
    pub subscription_id: SubscriptionId,
    pub session_id: String,
    pub stream_id: String,
    pub subscribe_audio: bool,
    pub subscribe_video: bool,
    pub subscribe_captions: bool,
    pub preferred_resolution: Option<Resolution>,
    pub preferred_frame_rate: Option<f32>,
    pub audio_volume: f64,
    pub connectivity_state: ConnectivityState,
    pub video_state: VideoAdaptationState,
    pub last_video_reason: Option<VideoEventReason>,
    pub stats_in_flight: bool,
    pub stats_reports_delivered: u64,
    /// Disconnect episodes since creation
    pub disconnect_count: u32,
    /// Text of the caption segment still open
    pub open_caption: Option<String>,
    pub finalized_captions: u64,
}

/// Transport calls decided under the lock and issued after it is released.
enum Deferred {
    Volume(f64),
    AudioSampling(bool),
}

struct SubscriptionState {
    id: SubscriptionId,

    subscribe_audio: bool,
    subscribe_video: bool,
    subscribe_captions: bool,
    preferred_resolution: Option<Resolution>,
    preferred_frame_rate: Option<f32>,

    audio_volume: f64,
    /// Volume changed while not connected; applied on the next connect
    volume_pending: bool,
    audio_sampling: bool,

    connectivity: ReconnectionSupervisor,
    quality: QualityAdaptationMonitor,
    stats: StatsCollector,
    captions: CaptionStream,

    outbox: Option<mpsc::UnboundedSender<SubscriberEvent>>,
}

impl SubscriptionState {
    fn is_closed(&self) -> bool {
        self.connectivity.state() == ConnectivityState::Closed
    }

    fn is_failed(&self) -> bool {
        self.connectivity.state() == ConnectivityState::Failed
    }

    fn selection(&self) -> MediaSelection {
        MediaSelection {
            audio: self.subscribe_audio,
            video: self.subscribe_video,
            captions: self.subscribe_captions,
        }
    }

    fn emit(&self, kind: SubscriberEventKind) {
        if let Some(outbox) = &self.outbox {
            tracing::trace!(event = kind.name(), "event queued");
            // The pump only goes away on close, which also clears the outbox
            let _ = outbox.send(SubscriberEvent::new(self.id, kind));
        }
    }

    fn emit_all(&self, kinds: Vec<SubscriberEventKind>) {
        for kind in kinds {
            self.emit(kind);
        }
    }

    fn apply_transition(&mut self, transition: Option<Transition>, deferred: &mut Vec<Deferred>) {
        let Some(transition) = transition else {
            return;
        };
        if transition.established() && self.volume_pending {
            self.volume_pending = false;
            deferred.push(Deferred::Volume(self.audio_volume));
        }
        if transition.to == ConnectivityState::Failed {
            if let Some(pending) = self.stats.cancel() {
                tracing::debug!(request_id = pending.request_id, "stats request abandoned on failure");
            }
        }
        if let Some(event) = transition.event {
            self.emit(event);
        }
    }
}

pub struct Subscription {
    id: SubscriptionId,
    session: SessionRef,
    stream: StreamInfo,
    transport: Arc<dyn MediaTransport>,
    dispatcher: Arc<EventDispatcher>,
    state: Mutex<SubscriptionState>,
    /// Held across a state change and the transport commands it produces
    commands: ReentrantMutex<()>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl Subscription {
    /// Bind to `stream` and start acquiring transport resources right away.
    ///
    /// Must be called from within a tokio runtime. `initial_observer` is
    /// registered before the transport is attached, so it cannot miss any
    /// event. Like every observer it is held weakly.
    pub fn create(
        session: SessionRef,
        stream: StreamInfo,
        config: SubscriberConfig,
        transport: Arc<dyn MediaTransport>,
        initial_observer: Option<&Arc<dyn SubscriberEventHandler>>,
    ) -> SubscriberResult<Arc<Self>> {
        validate_stream(&session, &stream)?;
        config.validate()?;
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(SubscriberError::invalid_configuration(
                "runtime",
                "Subscription::create must be called within a tokio runtime",
            ));
        }

        let id = Uuid::new_v4();
        let subscribe_audio = config.subscribe_to_audio && stream.has_audio;
        let subscribe_video = config.subscribe_to_video && stream.has_video;
        let subscribe_captions =
            config.subscribe_to_captions.unwrap_or(stream.has_captions) && stream.has_captions;
        let (preferred_resolution, preferred_frame_rate) = if stream.scalable_video {
            (config.preferred_resolution, config.preferred_frame_rate)
        } else {
            (None, None)
        };

        let dispatcher = Arc::new(EventDispatcher::new());
        if let Some(observer) = initial_observer {
            dispatcher.add_observer(observer);
        }
        let audio_sampling = dispatcher.audio_level_listeners() > 0;

        let selection = MediaSelection {
            audio: subscribe_audio,
            video: subscribe_video,
            captions: subscribe_captions,
        };
        transport.attach(&stream, &selection)?;
        if preferred_resolution.is_some() {
            transport.set_preferred_resolution(preferred_resolution);
        }
        if preferred_frame_rate.is_some() {
            transport.set_preferred_frame_rate(preferred_frame_rate);
        }
        if audio_sampling {
            transport.set_audio_level_sampling(true);
        }

        let (outbox, events) = mpsc::unbounded_channel();
        let pump = dispatcher.spawn_pump(events);

        tracing::info!(
            subscription_id = %id,
            stream_id = %stream.stream_id,
            session_id = %session.session_id,
            audio = subscribe_audio,
            video = subscribe_video,
            captions = subscribe_captions,
            "subscription created"
        );

        let state = SubscriptionState {
            id,
            subscribe_audio,
            subscribe_video,
            subscribe_captions,
            preferred_resolution,
            preferred_frame_rate,
            audio_volume: config.audio_volume,
            volume_pending: true,
            audio_sampling,
            connectivity: ReconnectionSupervisor::new(),
            quality: QualityAdaptationMonitor::new(config.quality, subscribe_video),
            stats: StatsCollector::new(),
            captions: CaptionStream::new(subscribe_captions),
            outbox: Some(outbox),
        };

        Ok(Arc::new(Self {
            id,
            session,
            stream,
            transport,
            dispatcher,
            state: Mutex::new(state),
            commands: ReentrantMutex::new(()),
            pump: Mutex::new(Some(pump)),
        }))
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn session(&self) -> &SessionRef {
        &self.session
    }

    pub fn stream(&self) -> &StreamInfo {
        &self.stream
    }

    pub fn connectivity_state(&self) -> ConnectivityState {
        self.state.lock().connectivity.state()
    }

    pub fn video_state(&self) -> VideoAdaptationState {
        self.state.lock().quality.state()
    }

    pub fn last_video_reason(&self) -> Option<VideoEventReason> {
        self.state.lock().quality.last_reason()
    }

    pub fn audio_volume(&self) -> f64 {
        self.state.lock().audio_volume
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().is_closed()
    }

    /// The error the transport reported, once the subscription has failed.
    pub fn failure(&self) -> Option<SubscriberError> {
        self.state.lock().connectivity.failure().cloned()
    }

    pub fn snapshot(&self) -> SubscriptionSnapshot {
        let state = self.state.lock();
        SubscriptionSnapshot {
            subscription_id: self.id,
            session_id: self.session.session_id.clone(),
            stream_id: self.stream.stream_id.clone(),
            subscribe_audio: state.subscribe_audio,
            subscribe_video: state.subscribe_video,
            subscribe_captions: state.subscribe_captions,
            preferred_resolution: state.preferred_resolution,
            preferred_frame_rate: state.preferred_frame_rate,
            audio_volume: state.audio_volume,
            connectivity_state: state.connectivity.state(),
            video_state: state.quality.state(),
            last_video_reason: state.quality.last_reason(),
            stats_in_flight: state.stats.is_in_flight(),
            stats_reports_delivered: state.stats.delivered_count(),
            disconnect_count: state.connectivity.disconnect_count(),
            open_caption: state.captions.current_partial().map(str::to_string),
            finalized_captions: state.captions.finalized_segments(),
        }
    }

    // ===== OBSERVERS =====

    pub fn add_observer(&self, observer: &Arc<dyn SubscriberEventHandler>) -> ObserverHandle {
        let handle = self.dispatcher.add_observer(observer);
        self.refresh_audio_sampling();
        handle
    }

    pub fn remove_observer(&self, handle: ObserverHandle) -> bool {
        let removed = self.dispatcher.remove_observer(handle);
        if removed {
            self.refresh_audio_sampling();
        }
        removed
    }

    pub fn observer_count(&self) -> usize {
        self.dispatcher.observer_count()
    }

    fn refresh_audio_sampling(&self) {
        let _commands = self.commands.lock();
        let wanted = self.dispatcher.audio_level_listeners() > 0;
        let changed = {
            let mut state = self.state.lock();
            if state.is_closed() || state.audio_sampling == wanted {
                false
            } else {
                state.audio_sampling = wanted;
                true
            }
        };
        if changed {
            tracing::debug!(subscription_id = %self.id, enabled = wanted, "audio level sampling toggled");
            self.transport.set_audio_level_sampling(wanted);
        }
    }

    // ===== CONFIGURATION =====

    /// No-op if the stream carries no audio.
    pub fn set_subscribe_audio(&self, enabled: bool) {
        if !self.stream.has_audio {
            tracing::debug!(subscription_id = %self.id, "stream has no audio, ignoring audio toggle");
            return;
        }
        let _commands = self.commands.lock();
        let selection = {
            let mut state = self.state.lock();
            if state.is_closed() || state.subscribe_audio == enabled {
                return;
            }
            state.subscribe_audio = enabled;
            state.selection()
        };
        self.transport.update_selection(&selection);
    }

    /// No-op if the stream carries no video.
    pub fn set_subscribe_video(&self, enabled: bool) {
        if !self.stream.has_video {
            tracing::debug!(subscription_id = %self.id, "stream has no video, ignoring video toggle");
            return;
        }
        let _commands = self.commands.lock();
        let selection = {
            let mut state = self.state.lock();
            if state.is_closed() || state.subscribe_video == enabled {
                return;
            }
            state.subscribe_video = enabled;
            if !state.is_failed() {
                let events = state.quality.on_subscriber_video(enabled);
                state.emit_all(events);
            }
            state.selection()
        };
        self.transport.update_selection(&selection);
    }

    /// No-op if the stream carries no captions.
    pub fn set_subscribe_captions(&self, enabled: bool) {
        if !self.stream.has_captions {
            tracing::debug!(subscription_id = %self.id, "stream has no captions, ignoring caption toggle");
            return;
        }
        let _commands = self.commands.lock();
        let selection = {
            let mut state = self.state.lock();
            if state.is_closed() || state.subscribe_captions == enabled {
                return;
            }
            state.subscribe_captions = enabled;
            state.captions.set_enabled(enabled);
            state.selection()
        };
        self.transport.update_selection(&selection);
    }

    /// Clamped to `[0, 100]`. Applied now if connected, otherwise on the next
    /// connect. NaN is ignored.
    pub fn set_volume(&self, volume: f64) {
        let Some(clamped) = clamp_volume(volume) else {
            tracing::warn!(subscription_id = %self.id, "ignoring NaN volume");
            return;
        };
        if clamped != volume {
            tracing::warn!(subscription_id = %self.id, requested = volume, applied = clamped, "volume clamped");
        }

        let _commands = self.commands.lock();
        let apply_now = {
            let mut state = self.state.lock();
            if state.is_closed() {
                return;
            }
            state.audio_volume = clamped;
            let connected = state.connectivity.state().is_connected();
            state.volume_pending = !connected;
            connected
        };
        if apply_now {
            self.transport.set_audio_volume(clamped);
        }
    }

    /// Advisory. Ignored unless the stream offers scalable video. A zero
    /// width or height removes the preference.
    pub fn set_preferred_resolution(&self, resolution: Option<Resolution>) {
        if !self.stream.scalable_video {
            tracing::debug!(subscription_id = %self.id, "stream is not scalable, ignoring preferred resolution");
            return;
        }
        let resolution = resolution.filter(|r| r.width > 0 && r.height > 0);
        let _commands = self.commands.lock();
        {
            let mut state = self.state.lock();
            if state.is_closed() || state.preferred_resolution == resolution {
                return;
            }
            state.preferred_resolution = resolution;
        }
        self.transport.set_preferred_resolution(resolution);
    }

    /// Advisory. Ignored unless the stream offers scalable video. A
    /// non-finite or non-positive rate removes the preference.
    pub fn set_preferred_frame_rate(&self, frame_rate: Option<f32>) {
        if !self.stream.scalable_video {
            tracing::debug!(subscription_id = %self.id, "stream is not scalable, ignoring preferred frame rate");
            return;
        }
        let frame_rate = frame_rate.filter(|rate| rate.is_finite() && *rate > 0.0);
        let _commands = self.commands.lock();
        {
            let mut state = self.state.lock();
            if state.is_closed() || state.preferred_frame_rate == frame_rate {
                return;
            }
            state.preferred_frame_rate = frame_rate;
        }
        self.transport.set_preferred_frame_rate(frame_rate);
    }

    // ===== STATS =====

    /// Ask the transport for an RTC stats report. The report arrives later
    /// through `on_rtc_stats_report`, exactly once.
    pub fn request_stats_report(&self) -> SubscriberResult<()> {
        let _commands = self.commands.lock();
        let request_id = {
            let mut state = self.state.lock();
            if state.is_closed() {
                return Err(SubscriberError::Closed);
            }
            let connectivity = state.connectivity.state();
            state.stats.begin(connectivity)?
        };
        tracing::debug!(subscription_id = %self.id, request_id, "RTC stats requested");
        self.transport.request_rtc_stats();
        Ok(())
    }

    /// Same as [`request_stats_report`](Self::request_stats_report) with the
    /// rejection discarded.
    #[deprecated(note = "use request_stats_report, which reports why a request was rejected")]
    pub fn get_rtc_stats_report(&self) {
        let _ = self.request_stats_report();
    }

    // ===== TRANSPORT SIGNALS =====

    /// Feed one transport signal. Signals must be delivered in the order the
    /// transport observed them. Never blocks on observers.
    pub fn deliver_signal(&self, signal: TransportSignal) {
        let _span = tracing::debug_span!("subscription", subscription_id = %self.id).entered();
        let _commands = self.commands.lock();
        let mut deferred = Vec::new();
        {
            let mut state = self.state.lock();
            if state.is_closed() {
                tracing::trace!(signal = signal.name(), "signal after close dropped");
                return;
            }
            if state.is_failed() && drops_after_failure(&signal) {
                tracing::debug!(signal = signal.name(), "signal after failure dropped");
                return;
            }

            match signal {
                TransportSignal::StreamConnected => {
                    let t = state.connectivity.on_connected();
                    state.apply_transition(t, &mut deferred);
                }
                TransportSignal::StreamDisconnected => {
                    let t = state.connectivity.on_disconnected();
                    state.apply_transition(t, &mut deferred);
                }
                TransportSignal::StreamReconnecting => {
                    let t = state.connectivity.on_reconnecting();
                    state.apply_transition(t, &mut deferred);
                }
                TransportSignal::StreamReconnected => {
                    let t = state.connectivity.on_reconnected();
                    state.apply_transition(t, &mut deferred);
                }
                TransportSignal::StreamFailed { code, reason } => {
                    let t = state.connectivity.on_failed(code, reason);
                    state.apply_transition(t, &mut deferred);
                }

                TransportSignal::QualityDegraded { score } | TransportSignal::QualityImproved { score } => {
                    let events = state.quality.on_quality_score(score);
                    state.emit_all(events);
                }
                TransportSignal::CodecUnsupported { codec } => {
                    tracing::warn!(%codec, "video codec not supported");
                    let events = state.quality.on_codec_unsupported();
                    state.emit_all(events);
                }
                TransportSignal::PublisherVideoChanged { enabled } => {
                    let events = state.quality.on_publisher_video(enabled);
                    state.emit_all(events);
                }

                TransportSignal::CaptionFragment { text, is_final } => {
                    if let Some(caption) = state.captions.on_fragment(text, is_final) {
                        state.emit(SubscriberEventKind::Caption(caption));
                    }
                }
                TransportSignal::AudioLevel(level) => {
                    if !state.audio_sampling || level.is_nan() {
                        return;
                    }
                    if self.dispatcher.audio_level_listeners() == 0 {
                        state.audio_sampling = false;
                        deferred.push(Deferred::AudioSampling(false));
                    } else {
                        state.emit(SubscriberEventKind::AudioLevel {
                            level: level.clamp(0.0, 1.0),
                        });
                    }
                }
                TransportSignal::NetworkStatsSample(stats) => {
                    if let Some(video) = stats.video {
                        state.emit(SubscriberEventKind::VideoNetworkStats(video));
                    }
                    if let Some(audio) = stats.audio {
                        state.emit(SubscriberEventKind::AudioNetworkStats(audio));
                    }
                }

                TransportSignal::StatsReportReady(report) => {
                    let completed = state.stats.complete(report);
                    match completed {
                        Some(report) => state.emit(SubscriberEventKind::RtcStatsReport(report)),
                        None => tracing::debug!("unsolicited RTC stats report dropped"),
                    }
                }
                TransportSignal::StatsReportFailed { reason } => {
                    if state.stats.fail().is_some() {
                        tracing::warn!(%reason, "RTC stats request failed");
                        state.emit(SubscriberEventKind::RtcStatsReportFailed { reason });
                    }
                }
            }
        }

        for command in deferred {
            match command {
                Deferred::Volume(volume) => self.transport.set_audio_volume(volume),
                Deferred::AudioSampling(enabled) => self.transport.set_audio_level_sampling(enabled),
            }
        }
    }

    /// Spawn a task that feeds every signal from `signals` into
    /// [`deliver_signal`](Self::deliver_signal), in order.
    ///
    /// The task holds the subscription weakly and stops when it is closed or
    /// dropped, or when the channel closes.
    pub fn drive(self: &Arc<Self>, mut signals: mpsc::UnboundedReceiver<TransportSignal>) -> JoinHandle<()> {
        let subscription: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            while let Some(signal) = signals.recv().await {
                let Some(subscription) = subscription.upgrade() else {
                    break;
                };
                if subscription.is_closed() {
                    break;
                }
                subscription.deliver_signal(signal);
            }
        })
    }

    // ===== LIFECYCLE =====

    /// Tear the subscription down. Idempotent; an outstanding stats request
    /// never completes.
    ///
    /// No event is handed to an observer once this returns, with one
    /// exception on a multi-threaded runtime: a callback that was already
    /// starting on another thread may still run once. Callbacks already
    /// running are not waited for.
    pub fn close(&self) {
        let _commands = self.commands.lock();
        {
            let mut state = self.state.lock();
            if !state.connectivity.close() {
                return;
            }
            self.dispatcher.close();
            if let Some(pending) = state.stats.cancel() {
                tracing::debug!(request_id = pending.request_id, "stats request abandoned on close");
            }
            state.captions.close();
            state.outbox = None;
        }

        if let Some(pump) = self.pump.lock().take() {
            pump.abort();
        }
        self.transport.detach();
        tracing::info!(subscription_id = %self.id, stream_id = %self.stream.stream_id, "subscription closed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("stream_id", &self.stream.stream_id)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

fn validate_stream(session: &SessionRef, stream: &StreamInfo) -> SubscriberResult<()> {
    if stream.stream_id.trim().is_empty() {
        return Err(SubscriberError::invalid_stream("stream id is empty"));
    }
    if !stream.has_audio && !stream.has_video {
        return Err(SubscriberError::invalid_stream(format!(
            "stream {} carries neither audio nor video",
            stream.stream_id
        )));
    }
    if stream.session_id != session.session_id {
        return Err(SubscriberError::invalid_stream(format!(
            "stream {} belongs to session {}, not {}",
            stream.stream_id, stream.session_id, session.session_id
        )));
    }
    Ok(())
}

/// Everything except stats completion is meaningless once failed.
fn drops_after_failure(signal: &TransportSignal) -> bool {
    !matches!(
        signal,
        TransportSignal::StatsReportReady(_) | TransportSignal::StatsReportFailed { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_validation() {
        let session = SessionRef::new("s1");
        assert!(validate_stream(&session, &StreamInfo::new("a", "s1")).is_ok());
        assert!(matches!(
            validate_stream(&session, &StreamInfo::new("  ", "s1")),
            Err(SubscriberError::InvalidStream { .. })
        ));
        assert!(validate_stream(&session, &StreamInfo::new("a", "s1").with_audio(false).with_video(false)).is_err());
        assert!(validate_stream(&session, &StreamInfo::new("a", "s2")).is_err());
    }

    #[test]
    fn create_outside_runtime_is_rejected() {
        struct Unused;
        impl MediaTransport for Unused {
            fn attach(&self, _: &StreamInfo, _: &MediaSelection) -> SubscriberResult<()> {
                Ok(())
            }
            fn update_selection(&self, _: &MediaSelection) {}
            fn set_audio_volume(&self, _: f64) {}
            fn set_preferred_resolution(&self, _: Option<Resolution>) {}
            fn set_preferred_frame_rate(&self, _: Option<f32>) {}
            fn request_rtc_stats(&self) {}
            fn detach(&self) {}
        }

        let err = Subscription::create(
            SessionRef::new("s1"),
            StreamInfo::new("a", "s1"),
            SubscriberConfig::default(),
            Arc::new(Unused),
            None,
        )
        .unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn stats_signals_survive_failure() {
        assert!(!drops_after_failure(&TransportSignal::StatsReportFailed {
            reason: "x".into()
        }));
        assert!(drops_after_failure(&TransportSignal::AudioLevel(0.5)));
    }
}
