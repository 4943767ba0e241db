//! Scripted media element for tests
//!
//! Test helpers only. These are NOT behind `#[cfg(test)]` so integration
//! tests can drive the engine with a fully controllable element.

use crate::history::{CompletionRecord, FavoriteRecord, HistorySink};
use crate::playback::adapter::MediaElement;
use crate::playback::events::{ElementEventKind, ElementListener};
use std::sync::{Arc, Mutex};

/// One call a [`ScriptedElement`] received, in order
#[derive(Debug, Clone, PartialEq)]
pub enum ElementCommand {
    Attach { token: u64 },
    SetSource { url: String },
    RequestPlay,
    Pause,
    SetPosition { position_secs: f64 },
    SetVolume { volume: f32 },
    SetMuted { muted: bool },
}

#[derive(Default)]
struct ScriptedState {
    commands: Vec<ElementCommand>,
    // Every listener ever attached, in order, so tests can emit through
    // superseded listeners.
    listeners: Vec<ElementListener>,
    position_secs: f64,
    duration_secs: Option<f64>,
}

/// Shared view into a [`ScriptedElement`]'s recorded calls and listeners
///
/// Test helper only, hidden from public docs.
#[doc(hidden)]
#[derive(Clone, Default)]
pub struct ScriptedHandle {
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedHandle {
    /// All commands the element received so far
    pub fn commands(&self) -> Vec<ElementCommand> {
        self.state.lock().unwrap().commands.clone()
    }

    /// Forget recorded commands, keeping listeners and reported values
    pub fn clear_commands(&self) {
        self.state.lock().unwrap().commands.clear();
    }

    /// Number of listeners attached so far (one per load)
    pub fn listener_count(&self) -> usize {
        self.state.lock().unwrap().listeners.len()
    }

    /// Set the position the element reports from `position()`
    pub fn set_reported_position(&self, position_secs: f64) {
        self.state.lock().unwrap().position_secs = position_secs;
    }

    /// Set the duration the element reports from `duration()`
    pub fn set_reported_duration(&self, duration_secs: Option<f64>) {
        self.state.lock().unwrap().duration_secs = duration_secs;
    }

    /// Emit an event through the most recently attached listener
    ///
    /// Panics if nothing was attached yet.
    pub fn emit(&self, kind: ElementEventKind) {
        let state = self.state.lock().unwrap();
        state
            .listeners
            .last()
            .expect("no listener attached")
            .send(kind);
    }

    /// Emit through the listener attached by load number `index` (0-based)
    ///
    /// Lets tests replay events from a superseded load.
    pub fn emit_for(&self, index: usize, kind: ElementEventKind) {
        let state = self.state.lock().unwrap();
        state.listeners[index].send(kind);
    }
}

/// Media element that records calls and emits only what tests script
///
/// Test helper only, hidden from public docs.
#[doc(hidden)]
pub struct ScriptedElement {
    handle: ScriptedHandle,
}

impl ScriptedElement {
    pub fn new() -> (Self, ScriptedHandle) {
        let handle = ScriptedHandle::default();
        (
            Self {
                handle: handle.clone(),
            },
            handle,
        )
    }

    fn record(&self, command: ElementCommand) {
        self.handle.state.lock().unwrap().commands.push(command);
    }
}

impl MediaElement for ScriptedElement {
    fn attach(&mut self, listener: ElementListener) {
        let mut state = self.handle.state.lock().unwrap();
        state.commands.push(ElementCommand::Attach {
            token: listener.token(),
        });
        state.listeners.push(listener);
    }

    fn set_source(&mut self, url: &str) {
        let mut state = self.handle.state.lock().unwrap();
        state.commands.push(ElementCommand::SetSource {
            url: url.to_string(),
        });
        state.position_secs = 0.0;
        state.duration_secs = None;
    }

    fn request_play(&mut self) {
        self.record(ElementCommand::RequestPlay);
    }

    fn pause(&mut self) {
        self.record(ElementCommand::Pause);
    }

    fn set_position(&mut self, position_secs: f64) {
        let mut state = self.handle.state.lock().unwrap();
        state.commands.push(ElementCommand::SetPosition { position_secs });
        state.position_secs = position_secs;
    }

    fn position(&self) -> f64 {
        self.handle.state.lock().unwrap().position_secs
    }

    fn duration(&self) -> Option<f64> {
        self.handle.state.lock().unwrap().duration_secs
    }

    fn set_volume(&mut self, volume: f32) {
        self.record(ElementCommand::SetVolume { volume });
    }

    fn set_muted(&mut self, muted: bool) {
        self.record(ElementCommand::SetMuted { muted });
    }
}

/// History sink that records everything it is handed
///
/// Test helper only, hidden from public docs.
#[doc(hidden)]
#[derive(Default)]
pub struct RecordingSink {
    completions: Mutex<Vec<CompletionRecord>>,
    favorites: Mutex<Vec<FavoriteRecord>>,
}

impl RecordingSink {
    pub fn completions(&self) -> Vec<CompletionRecord> {
        self.completions.lock().unwrap().clone()
    }

    pub fn favorites(&self) -> Vec<FavoriteRecord> {
        self.favorites.lock().unwrap().clone()
    }
}

impl HistorySink for RecordingSink {
    fn record_completion(&self, record: CompletionRecord) {
        self.completions.lock().unwrap().push(record);
    }

    fn record_favorite(&self, record: FavoriteRecord) {
        self.favorites.lock().unwrap().push(record);
    }
}
