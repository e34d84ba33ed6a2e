//! Concurrent access tests
//!
//! Setters, observer registration and transport signals racing on a
//! multi-threaded runtime must leave events ordered and the transport in
//! step with the stored state.

mod common;

use std::sync::Arc;

use tokio::task::yield_now;

use subscriber_core::{
    SubscriberConfig, SubscriberEventKind, TransportSignal, VideoEventReason,
};

use common::*;

const ROUNDS: usize = 50;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_keep_state_and_transport_in_step() {
    let mut f = fixture_with(stream().with_captions(true), SubscriberConfig::default());
    f.subscription.deliver_signal(TransportSignal::StreamConnected);

    let signals = {
        let subscription = Arc::clone(&f.subscription);
        tokio::spawn(async move {
            for _ in 0..ROUNDS {
                for signal in [
                    TransportSignal::StreamDisconnected,
                    TransportSignal::QualityDegraded { score: 0.4 },
                    TransportSignal::StreamReconnecting,
                    TransportSignal::AudioLevel(0.5),
                    TransportSignal::QualityDegraded { score: 0.2 },
                    TransportSignal::StreamReconnected,
                    TransportSignal::QualityImproved { score: 0.9 },
                ] {
                    subscription.deliver_signal(signal);
                    yield_now().await;
                }
            }
        })
    };

    let volumes = {
        let subscription = Arc::clone(&f.subscription);
        tokio::spawn(async move {
            for i in 0..ROUNDS * 3 {
                subscription.set_volume((i % 101) as f64);
                yield_now().await;
            }
        })
    };

    let captions = {
        let subscription = Arc::clone(&f.subscription);
        tokio::spawn(async move {
            for i in 0..ROUNDS * 2 {
                subscription.set_subscribe_captions(i % 3 != 0);
                yield_now().await;
            }
        })
    };

    let (listener, _levels) = observer_with_audio_levels(true);
    let registrations = {
        let subscription = Arc::clone(&f.subscription);
        let listener = Arc::clone(&listener);
        tokio::spawn(async move {
            for _ in 0..ROUNDS {
                let handle = subscription.add_observer(&listener);
                yield_now().await;
                subscription.remove_observer(handle);
                yield_now().await;
            }
        })
    };

    signals.await.unwrap();
    volumes.await.unwrap();
    captions.await.unwrap();
    registrations.await.unwrap();

    // Stored volume is what the transport last applied
    assert_eq!(f.transport.last_volume(), Some(f.subscription.audio_volume()));

    // Sampling toggles strictly alternate and end off with no listener left
    let toggles: Vec<bool> = f
        .transport
        .commands()
        .into_iter()
        .filter_map(|c| match c {
            Command::AudioSampling(enabled) => Some(enabled),
            _ => None,
        })
        .collect();
    assert_eq!(toggles.first(), Some(&true));
    assert_eq!(toggles.last(), Some(&false));
    assert!(toggles.windows(2).all(|w| w[0] != w[1]), "toggles: {:?}", toggles);

    let last_selection = f
        .transport
        .commands()
        .into_iter()
        .rev()
        .find_map(|c| match c {
            Command::UpdateSelection(selection) => Some(selection),
            _ => None,
        })
        .expect("captions were toggled");
    assert_eq!(last_selection.captions, f.subscription.snapshot().subscribe_captions);

    let events = drain(&mut f.events).await;

    let connectivity: Vec<_> = events.iter().filter(|e| e.is_connectivity()).collect();
    assert_eq!(connectivity.len(), 1 + 2 * ROUNDS);
    assert_eq!(connectivity[0], &SubscriberEventKind::Connected);
    for pair in connectivity[1..].chunks(2) {
        assert_eq!(pair[0], &SubscriberEventKind::Disconnected);
        assert_eq!(pair[1], &SubscriberEventKind::Reconnected);
    }

    let adaptation: Vec<_> = events.iter().filter(|e| e.is_video_adaptation()).collect();
    assert_eq!(adaptation.len(), 3 * ROUNDS);
    for cycle in adaptation.chunks(3) {
        assert_eq!(cycle[0], &SubscriberEventKind::VideoDisableWarning);
        assert_eq!(
            cycle[1],
            &SubscriberEventKind::VideoDisabled {
                reason: VideoEventReason::QualityChanged
            }
        );
        assert_eq!(
            cycle[2],
            &SubscriberEventKind::VideoEnabled {
                reason: VideoEventReason::QualityChanged
            }
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_volume_set_during_reconnect_is_not_overwritten() {
    for _ in 0..ROUNDS {
        let f = fixture();
        f.subscription.deliver_signal(TransportSignal::StreamConnected);
        f.subscription.deliver_signal(TransportSignal::StreamDisconnected);
        f.subscription.set_volume(0.0);

        let reconnect = {
            let subscription = Arc::clone(&f.subscription);
            tokio::spawn(async move {
                subscription.deliver_signal(TransportSignal::StreamReconnected);
            })
        };
        let setter = {
            let subscription = Arc::clone(&f.subscription);
            tokio::spawn(async move {
                subscription.set_volume(30.0);
            })
        };
        reconnect.await.unwrap();
        setter.await.unwrap();

        assert_eq!(f.subscription.audio_volume(), 30.0);
        assert_eq!(f.transport.last_volume(), Some(30.0));
    }
}
