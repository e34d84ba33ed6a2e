//! Shared fixtures for subscriber-core integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::timeout;

use subscriber_core::{
    MediaSelection, MediaTransport, Resolution, SessionRef, StreamInfo, SubscriberConfig,
    SubscriberError, SubscriberEvent, SubscriberEventHandler, SubscriberEventKind, SubscriberResult,
    Subscription,
};

pub const SESSION_ID: &str = "session-1";

/// Everything the subscription asked the transport to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Attach(MediaSelection),
    UpdateSelection(MediaSelection),
    SetVolume(f64),
    SetResolution(Option<Resolution>),
    SetFrameRate(Option<f32>),
    RequestStats,
    AudioSampling(bool),
    Detach,
}

#[derive(Default)]
pub struct MockTransport {
    commands: Mutex<Vec<Command>>,
    attach_error: Option<SubscriberError>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refusing(error: SubscriberError) -> Arc<Self> {
        Arc::new(Self {
            commands: Mutex::new(Vec::new()),
            attach_error: Some(error),
        })
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Command) -> bool) -> usize {
        self.commands.lock().iter().filter(|c| predicate(c)).count()
    }

    pub fn last_volume(&self) -> Option<f64> {
        self.commands.lock().iter().rev().find_map(|c| match c {
            Command::SetVolume(v) => Some(*v),
            _ => None,
        })
    }

    fn record(&self, command: Command) {
        self.commands.lock().push(command);
    }
}

impl MediaTransport for MockTransport {
    fn attach(&self, _stream: &StreamInfo, selection: &MediaSelection) -> SubscriberResult<()> {
        if let Some(err) = &self.attach_error {
            return Err(err.clone());
        }
        self.record(Command::Attach(*selection));
        Ok(())
    }

    fn update_selection(&self, selection: &MediaSelection) {
        self.record(Command::UpdateSelection(*selection));
    }

    fn set_audio_volume(&self, volume: f64) {
        self.record(Command::SetVolume(volume));
    }

    fn set_preferred_resolution(&self, resolution: Option<Resolution>) {
        self.record(Command::SetResolution(resolution));
    }

    fn set_preferred_frame_rate(&self, frame_rate: Option<f32>) {
        self.record(Command::SetFrameRate(frame_rate));
    }

    fn request_rtc_stats(&self) {
        self.record(Command::RequestStats);
    }

    fn set_audio_level_sampling(&self, enabled: bool) {
        self.record(Command::AudioSampling(enabled));
    }

    fn detach(&self) {
        self.record(Command::Detach);
    }
}

/// Forwards every event it receives into a channel.
pub struct RecordingObserver {
    events: mpsc::UnboundedSender<SubscriberEventKind>,
    audio_levels: bool,
}

#[async_trait]
impl SubscriberEventHandler for RecordingObserver {
    fn wants_audio_levels(&self) -> bool {
        self.audio_levels
    }

    async fn on_subscriber_event(&self, event: SubscriberEvent) {
        let _ = self.events.send(event.kind);
    }
}

pub type EventRx = mpsc::UnboundedReceiver<SubscriberEventKind>;

pub fn recording_observer() -> (Arc<dyn SubscriberEventHandler>, EventRx) {
    observer_with_audio_levels(false)
}

pub fn observer_with_audio_levels(audio_levels: bool) -> (Arc<dyn SubscriberEventHandler>, EventRx) {
    let (tx, rx) = mpsc::unbounded_channel();
    let observer: Arc<dyn SubscriberEventHandler> = Arc::new(RecordingObserver {
        events: tx,
        audio_levels,
    });
    (observer, rx)
}

pub fn stream() -> StreamInfo {
    StreamInfo::new("stream-1", SESSION_ID)
}

pub struct Fixture {
    pub subscription: Arc<Subscription>,
    pub transport: Arc<MockTransport>,
    pub observer: Arc<dyn SubscriberEventHandler>,
    pub events: EventRx,
}

pub fn fixture_with(stream: StreamInfo, config: SubscriberConfig) -> Fixture {
    let transport = MockTransport::new();
    let (observer, events) = recording_observer();
    let subscription = Subscription::create(
        SessionRef::new(SESSION_ID),
        stream,
        config,
        transport.clone(),
        Some(&observer),
    )
    .expect("subscription should be created");
    Fixture {
        subscription,
        transport,
        observer,
        events,
    }
}

pub fn fixture() -> Fixture {
    fixture_with(stream(), SubscriberConfig::default())
}

pub async fn next_event(events: &mut EventRx) -> SubscriberEventKind {
    timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

pub async fn expect_no_event(events: &mut EventRx) {
    if let Ok(Some(event)) = timeout(Duration::from_millis(100), events.recv()).await {
        panic!("unexpected event: {:?}", event);
    }
}

/// Collects events until none arrives for a short while.
pub async fn drain(events: &mut EventRx) -> Vec<SubscriberEventKind> {
    let mut collected = Vec::new();
    while let Ok(Some(event)) = timeout(Duration::from_millis(100), events.recv()).await {
        collected.push(event);
    }
    collected
}
