//! Media element abstraction and load-token bookkeeping
//!
//! [`MediaElement`] is the narrow element-binding surface the engine drives:
//! listener attachment, source assignment, play/pause intent, position and
//! volume. Elements run their own internals (tick tasks, network fetches) and
//! report back through the attached [`ElementListener`].
//!
//! [`MediaElementAdapter`] owns the element plus the load token counter. Each
//! `load` bumps the token and attaches a fresh listener carrying it, which
//! replaces the previous one, so rebinding never leaks listeners; events
//! stamped with an older token are recognized as stale by
//! [`MediaElementAdapter::accepts`] and discarded by the engine.

use crate::playback::events::{ElementEvent, ElementListener};
use tokio::sync::mpsc;
use tracing::debug;

/// Low-level media element driven by the engine
///
/// All calls are synchronous and issued from the single engine task. An
/// element that does asynchronous work internally must keep honoring calls
/// in the order received.
pub trait MediaElement: Send {
    /// Attach `listener`, replacing any previously attached one
    fn attach(&mut self, listener: ElementListener);

    /// Assign a new media source, resetting the element position to 0
    ///
    /// Activity from a previous source must stop; anything it still reports
    /// carries a superseded listener's token and is discarded upstream.
    fn set_source(&mut self, url: &str);

    /// Ask the element to start playing
    ///
    /// Fire-and-forget: the outcome arrives later as `PlayStateChanged` or
    /// `PlayRejected` (platform autoplay policy).
    fn request_play(&mut self);

    /// Suspend playback, retaining the current position
    fn pause(&mut self);

    /// Move the playback position to `position_secs`
    fn set_position(&mut self, position_secs: f64);

    /// Current element-reported position in seconds
    fn position(&self) -> f64;

    /// Media duration in seconds, once the element knows it
    fn duration(&self) -> Option<f64>;

    /// Set output gain, 0.0 (silent) to 1.0 (full)
    fn set_volume(&mut self, volume: f32);

    /// Mute or unmute without touching the stored volume
    fn set_muted(&mut self, muted: bool);
}

/// Owns a [`MediaElement`] and enforces load-token discipline
pub struct MediaElementAdapter {
    element: Box<dyn MediaElement>,
    event_tx: mpsc::UnboundedSender<ElementEvent>,
    token: u64,
    loaded_url: Option<String>,
}

impl MediaElementAdapter {
    /// Wrap an element; its events will arrive on the paired receiver
    pub fn new(element: Box<dyn MediaElement>, event_tx: mpsc::UnboundedSender<ElementEvent>) -> Self {
        Self {
            element,
            event_tx,
            token: 0,
            loaded_url: None,
        }
    }

    /// Load `url`, superseding any outstanding load
    ///
    /// Attaches a fresh listener stamped with the new token, then assigns the
    /// source. Returns the token, or `None` for an empty URL: the element is
    /// left untouched and the player stays out of `Playing` for that item.
    /// Tokens are monotonic; the first load gets token 1.
    pub fn load(&mut self, url: &str) -> Option<u64> {
        if url.is_empty() {
            debug!("Ignoring load with empty media URL");
            return None;
        }

        self.token += 1;
        debug!("Loading {} (token {})", url, self.token);
        let listener = ElementListener::new(self.token, self.event_tx.clone());
        self.element.attach(listener);
        self.element.set_source(url);
        self.loaded_url = Some(url.to_string());
        Some(self.token)
    }

    pub fn play(&mut self) {
        self.element.request_play();
    }

    pub fn pause(&mut self) {
        self.element.pause();
    }

    /// Move position, clamped to `[0, duration]` when duration is known
    pub fn seek(&mut self, position_secs: f64) {
        let mut target = position_secs.max(0.0);
        if let Some(duration) = self.element.duration() {
            target = target.min(duration);
        }
        self.element.set_position(target);
    }

    /// Element-reported position in seconds
    pub fn position(&self) -> f64 {
        self.element.position()
    }

    /// Element-reported duration, once known
    pub fn duration(&self) -> Option<f64> {
        self.element.duration()
    }

    /// Set element gain, clamped to 0.0..=1.0
    pub fn set_volume(&mut self, volume: f32) {
        self.element.set_volume(volume.clamp(0.0, 1.0));
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.element.set_muted(muted);
    }

    /// Stop the element and invalidate every outstanding listener
    pub fn clear(&mut self) {
        if self.loaded_url.is_some() {
            debug!("Unloading element (token {} invalidated)", self.token);
        }
        self.token += 1;
        self.loaded_url = None;
        self.element.pause();
    }

    /// Token the next accepted event must carry
    pub fn current_token(&self) -> u64 {
        self.token
    }

    /// URL of the load currently in effect, if any
    pub fn loaded_url(&self) -> Option<&str> {
        self.loaded_url.as_deref()
    }

    /// Whether `event` belongs to the load currently in effect
    pub fn accepts(&self, event: &ElementEvent) -> bool {
        self.loaded_url.is_some() && event.token == self.token
    }
}
