//! Internal element events
//!
//! Media elements report what actually happened (position updates, metadata
//! arrival, natural end, play-state changes, errors) through an
//! [`ElementListener`] handle.
//!
//! These events are private plumbing between an element and the engine task:
//! - NOT serialized or sent over SSE
//! - One-to-one MPSC pattern (element -> engine)
//! - Every listener is stamped with the load token current at attach time,
//!   so events from a superseded load can be recognized and discarded

use tokio::sync::mpsc;
use tracing::trace;

/// What a media element observed
#[derive(Debug, Clone, PartialEq)]
pub enum ElementEventKind {
    /// Periodic position report while the element is playing
    ///
    /// Monotonically non-decreasing within one load, except a single backward
    /// jump after an explicit position change.
    TimeUpdate { position_secs: f64 },

    /// The element learned the real media duration
    ///
    /// Never emitted for live streams and containers without a length; until
    /// it arrives, duration is unknown and rendered as a placeholder.
    DurationKnown { duration_secs: f64 },

    /// Playback reached the natural end of the media
    Ended,

    /// The element started or stopped advancing
    PlayStateChanged { playing: bool },

    /// The element refused a play request (platform autoplay policy)
    PlayRejected,

    /// The element could not fetch or decode the media
    LoadError { message: String },
}

/// An element event stamped with the load it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct ElementEvent {
    /// Load token captured when the reporting listener was attached
    pub token: u64,
    pub kind: ElementEventKind,
}

/// Handle a media element uses to report events for one load
///
/// Cloned freely by element internals; every clone carries the same token.
/// A listener for a superseded load keeps working, but its events carry the
/// old token and the engine drops them.
#[derive(Debug, Clone)]
pub struct ElementListener {
    token: u64,
    tx: mpsc::UnboundedSender<ElementEvent>,
}

impl ElementListener {
    pub fn new(token: u64, tx: mpsc::UnboundedSender<ElementEvent>) -> Self {
        Self { token, tx }
    }

    /// Token of the load this listener was attached for
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Report an event; silently dropped when the engine has shut down
    pub fn send(&self, kind: ElementEventKind) {
        let event = ElementEvent {
            token: self.token,
            kind,
        };
        if self.tx.send(event).is_err() {
            trace!("Element event dropped, engine receiver closed");
        }
    }
}
