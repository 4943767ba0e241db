//! Clock-driven media element
//!
//! [`ClockElement`] is a headless stand-in for a platform media element. It
//! resolves each source URL's duration through an injected lookup, then
//! advances a position clock on a tick task while playing, reporting
//! `DurationKnown`, `TimeUpdate` and `Ended` exactly like a real element
//! would. It never produces sound; it exists so the engine runs end to end on
//! hardware with no media stack and in integration tests.

use crate::playback::adapter::MediaElement;
use crate::playback::events::{ElementEventKind, ElementListener};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::debug;

/// Lookup from media URL to advisory duration in seconds
///
/// `None` means the duration is unknown (live stream); position then advances
/// without an upper bound and `Ended` is never reached.
pub type DurationResolver = Arc<dyn Fn(&str) -> Option<f64> + Send + Sync>;

#[derive(Default)]
struct ClockState {
    source: Option<String>,
    position_secs: f64,
    duration_secs: Option<f64>,
    playing: bool,
    listener: Option<ElementListener>,
}

/// Headless media element that simulates playback in real time
pub struct ClockElement {
    resolver: DurationResolver,
    tick: Duration,
    state: Arc<Mutex<ClockState>>,
    ticker: Option<JoinHandle<()>>,
}

impl ClockElement {
    /// Create an element; `tick` controls the `TimeUpdate` cadence
    pub fn new(resolver: DurationResolver, tick: Duration) -> Self {
        Self {
            resolver,
            tick,
            state: Arc::new(Mutex::new(ClockState::default())),
            ticker: None,
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl MediaElement for ClockElement {
    fn attach(&mut self, listener: ElementListener) {
        self.state.lock().unwrap().listener = Some(listener);
    }

    fn set_source(&mut self, url: &str) {
        self.stop_ticker();

        let duration_secs = (self.resolver)(url);
        debug!(
            "Clock element source set to {} (duration {:?}s)",
            url, duration_secs
        );

        let listener = {
            let mut state = self.state.lock().unwrap();
            state.source = Some(url.to_string());
            state.position_secs = 0.0;
            state.duration_secs = duration_secs;
            state.playing = false;
            state.listener.clone()
        };

        // The ticker reports through the listener captured here. A later
        // attach belongs to a later set_source, which replaces this task
        // first, so a replaced ticker can never emit under a fresh token.
        let state = Arc::clone(&self.state);
        let tick = self.tick;
        self.ticker = Some(tokio::spawn(async move {
            let Some(listener) = listener else {
                return;
            };

            // Metadata arrives asynchronously, like a real element
            if let Some(duration_secs) = duration_secs {
                listener.send(ElementEventKind::DurationKnown { duration_secs });
            }

            let mut interval = time::interval(tick);
            let mut last = time::Instant::now();
            loop {
                interval.tick().await;
                let now = time::Instant::now();
                let elapsed = now.duration_since(last).as_secs_f64();
                last = now;

                let mut state = state.lock().unwrap();
                if !state.playing {
                    continue;
                }

                state.position_secs += elapsed;

                if let Some(duration) = state.duration_secs {
                    if state.position_secs >= duration {
                        state.position_secs = duration;
                        state.playing = false;
                        drop(state);
                        listener.send(ElementEventKind::TimeUpdate {
                            position_secs: duration,
                        });
                        listener.send(ElementEventKind::Ended);
                        continue;
                    }
                }

                let position_secs = state.position_secs;
                drop(state);
                listener.send(ElementEventKind::TimeUpdate { position_secs });
            }
        }));
    }

    fn request_play(&mut self) {
        let mut state = self.state.lock().unwrap();
        if state.source.is_none() {
            // Nothing loaded; mirrors a platform element rejecting play
            if let Some(listener) = state.listener.clone() {
                drop(state);
                listener.send(ElementEventKind::PlayRejected);
            }
            return;
        }

        state.playing = true;
        if let Some(listener) = state.listener.clone() {
            drop(state);
            listener.send(ElementEventKind::PlayStateChanged { playing: true });
        }
    }

    fn pause(&mut self) {
        let mut state = self.state.lock().unwrap();
        if !state.playing {
            return;
        }

        state.playing = false;
        if let Some(listener) = state.listener.clone() {
            drop(state);
            listener.send(ElementEventKind::PlayStateChanged { playing: false });
        }
    }

    fn set_position(&mut self, position_secs: f64) {
        let mut state = self.state.lock().unwrap();
        if state.source.is_none() {
            return;
        }

        let mut target = position_secs.max(0.0);
        if let Some(duration) = state.duration_secs {
            target = target.min(duration);
        }
        state.position_secs = target;

        if let Some(listener) = state.listener.clone() {
            drop(state);
            listener.send(ElementEventKind::TimeUpdate {
                position_secs: target,
            });
        }
    }

    fn position(&self) -> f64 {
        self.state.lock().unwrap().position_secs
    }

    fn duration(&self) -> Option<f64> {
        self.state.lock().unwrap().duration_secs
    }

    fn set_volume(&mut self, _volume: f32) {
        // Nothing to attenuate
    }

    fn set_muted(&mut self, _muted: bool) {
        // Nothing to silence
    }
}

impl Drop for ClockElement {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
