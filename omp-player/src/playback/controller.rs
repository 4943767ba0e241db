//! Playback orchestration
//!
//! [`PlaybackController`] binds the transport state machine, the playlist
//! cursor and the element adapter into the single public surface the engine
//! task drives. Every operation runs synchronously to completion; element
//! outcomes arrive later as events and are reconciled through
//! [`PlaybackController::handle_element_event`].
//!
//! Policies applied here rather than in the parts:
//! - Auto-advance on natural completion, repeat-all past the end; a
//!   single-item playlist restarts in place without reloading.
//! - Manual skips preserve the play/pause status they were issued under.
//! - Stale element events (superseded load token) are discarded.
//! - Natural completions and favorite toggles go to the history sink,
//!   fire-and-forget.

use crate::error::{Error, Result};
use crate::history::{CompletionRecord, FavoriteRecord, HistorySink};
use crate::playback::adapter::MediaElementAdapter;
use crate::playback::cursor::PlaylistCursor;
use crate::playback::events::{ElementEvent, ElementEventKind};
use crate::playback::transport::{TransportSnapshot, TransportState};
use chrono::Utc;
use omp_common::time::secs_to_ms;
use omp_common::{EventBus, MediaItem, PlayerEvent, TransportStatus};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct PlaybackController {
    transport: TransportState,
    cursor: PlaylistCursor,
    adapter: MediaElementAdapter,
    bus: Arc<EventBus>,
    sink: Arc<dyn HistorySink>,
    progress_interval: Duration,
    last_progress: Option<Instant>,
}

impl PlaybackController {
    pub fn new(
        mut adapter: MediaElementAdapter,
        bus: Arc<EventBus>,
        sink: Arc<dyn HistorySink>,
        initial_volume: f32,
        controls_hide: Duration,
        progress_interval: Duration,
    ) -> Self {
        adapter.set_volume(initial_volume);
        Self {
            transport: TransportState::new(initial_volume, controls_hide),
            cursor: PlaylistCursor::new(),
            adapter,
            bus,
            sink,
            progress_interval,
            last_progress: None,
        }
    }

    /// Select `item_id` in the playlist, load it and start playing
    ///
    /// Fails with `NotInPlaylist` when the item is absent; the transport is
    /// left untouched in that case and the caller must rebuild the playlist
    /// first.
    pub fn select_and_play(&mut self, item_id: Uuid, now: Instant) -> Result<()> {
        info!("Select-and-play command received for {}", item_id);
        let index = self
            .cursor
            .position_of(item_id)
            .ok_or(Error::NotInPlaylist(item_id))?;
        self.emit_current_skipped();
        self.cursor.select_index(index)?;
        self.load_current(true, now);
        Ok(())
    }

    /// Select the playlist entry at `index`, load it and start playing
    pub fn select_index(&mut self, index: usize, now: Instant) -> Result<()> {
        info!("Select command received for index {}", index);
        if index >= self.cursor.len() {
            return Err(Error::OutOfRange {
                index,
                len: self.cursor.len(),
            });
        }
        self.emit_current_skipped();
        self.cursor.select_index(index)?;
        self.load_current(true, now);
        Ok(())
    }

    /// Toggle between `Playing` and `Paused`; no-op while nothing is loaded
    pub fn toggle_play_pause(&mut self, now: Instant) {
        if self.transport.current_item().is_none() {
            debug!("Toggle ignored, no current item");
            return;
        }

        let old_state = self.transport.status();
        if old_state == TransportStatus::Playing {
            info!("Pause command received");
            self.adapter.pause();
            if self.transport.set_paused() {
                self.emit_state_change_from(old_state);
            }
        } else {
            info!("Play command received");
            self.adapter.play();
            if self.transport.set_playing(now) {
                self.emit_state_change_from(old_state);
            }
        }
    }

    /// Skip to the next item, preserving the current play/pause status
    pub fn next(&mut self, now: Instant) {
        info!("Next command received");
        self.step(true, now);
    }

    /// Skip to the previous item, preserving the current play/pause status
    pub fn previous(&mut self, now: Instant) {
        info!("Previous command received");
        self.step(false, now);
    }

    /// Seek to an absolute position in the current item
    pub fn seek_to(&mut self, position_secs: f64, now: Instant) {
        if self.transport.current_item().is_none() {
            debug!("Seek ignored, no current item");
            return;
        }
        let applied = self.transport.apply_seek(position_secs);
        debug!("Seeking to {:.1}s", applied);
        self.adapter.seek(applied);
        self.maybe_emit_progress(now, true);
    }

    /// Seek relative to the current position (skip-back/skip-forward)
    pub fn skip_by(&mut self, delta_secs: f64, now: Instant) {
        if self.transport.current_item().is_none() {
            debug!("Skip ignored, no current item");
            return;
        }
        let target = self.transport.position_secs() + delta_secs;
        self.seek_to(target, now);
    }

    /// Set volume on the internal 0.0..=1.0 scale
    pub fn set_volume(&mut self, volume: f32) {
        let (old_volume, new_volume) = self.transport.set_volume(volume);
        self.adapter.set_volume(new_volume);
        if (old_volume - new_volume).abs() > f32::EPSILON {
            info!("Volume changed: {:.2} -> {:.2}", old_volume, new_volume);
            self.bus.emit_lossy(PlayerEvent::VolumeChanged {
                old_volume,
                new_volume,
                timestamp: Utc::now(),
            });
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        if self.transport.muted() == muted {
            return;
        }
        info!("Muted set to {}", muted);
        self.transport.set_muted(muted);
        self.adapter.set_muted(muted);
        self.bus.emit_lossy(PlayerEvent::MutedChanged {
            muted,
            timestamp: Utc::now(),
        });
    }

    /// Replace the playlist wholesale
    ///
    /// A loaded item that survives the replacement stays current (selection
    /// follows it to its new index); a loaded item that vanished, or an
    /// empty replacement, drops the player to `Idle`.
    pub fn replace_playlist(&mut self, items: Vec<Arc<MediaItem>>) {
        info!("Playlist replaced ({} items)", items.len());
        let current_id = self.transport.current_item().map(|item| item.id);
        self.cursor.replace_items(items);

        if self.cursor.is_empty() {
            self.to_idle();
        } else if let Some(id) = current_id {
            match self.cursor.position_of(id) {
                Some(index) => {
                    let _ = self.cursor.select_index(index);
                }
                None => {
                    debug!("Current item removed by playlist replacement");
                    self.to_idle();
                }
            }
        }
        self.emit_playlist_changed();
    }

    /// Randomly reorder the playlist, keeping the current item current
    pub fn shuffle_playlist(&mut self) {
        if self.cursor.is_empty() {
            return;
        }
        info!("Shuffle command received");
        self.cursor.shuffle();
        self.emit_playlist_changed();
    }

    /// Pointer activity: show controls and re-arm the hide deadline
    pub fn pointer_activity(&mut self, now: Instant) {
        if self.transport.pointer_activity(now) {
            self.bus.emit_lossy(PlayerEvent::ControlsVisibility {
                visible: true,
                timestamp: Utc::now(),
            });
        }
    }

    /// Forward a favorite toggle to the history sink; no transport effect
    pub fn set_favorite(&mut self, item_id: Uuid, favorited: bool) {
        debug!("Favorite {} set to {}", item_id, favorited);
        self.sink.record_favorite(FavoriteRecord {
            item_id,
            favorited,
            marked_at: Utc::now(),
        });
    }

    /// Periodic housekeeping driven by the engine interval
    pub fn tick(&mut self, now: Instant) {
        if self.transport.evaluate_controls(now) {
            debug!("Controls hidden after inactivity");
            self.bus.emit_lossy(PlayerEvent::ControlsVisibility {
                visible: false,
                timestamp: Utc::now(),
            });
        }
    }

    /// Reconcile one element event into the transport state
    ///
    /// Events stamped with a superseded load token are discarded here; a
    /// rapid double-skip therefore settles on the second target and the
    /// first item's late callbacks never touch state.
    pub fn handle_element_event(&mut self, event: ElementEvent, now: Instant) {
        if !self.adapter.accepts(&event) {
            debug!(
                "Ignoring stale element event (token {}, current {})",
                event.token,
                self.adapter.current_token()
            );
            return;
        }

        match event.kind {
            ElementEventKind::TimeUpdate { position_secs } => {
                self.transport.apply_time_update(position_secs);
                self.maybe_emit_progress(now, false);
            }
            ElementEventKind::DurationKnown { duration_secs } => {
                debug!("Duration known: {:.1}s", duration_secs);
                self.transport.apply_duration(duration_secs);
                self.maybe_emit_progress(now, true);
            }
            ElementEventKind::PlayStateChanged { playing } => {
                let old_state = self.transport.status();
                let changed = if playing {
                    self.transport.set_playing(now)
                } else {
                    self.transport.set_paused()
                };
                if changed {
                    debug!("Element reconciled play state (playing={})", playing);
                    self.emit_state_change_from(old_state);
                }
            }
            ElementEventKind::PlayRejected => {
                let Some(item_id) = self.transport.current_item().map(|item| item.id) else {
                    return;
                };
                warn!("Play request rejected for {}", item_id);
                let old_state = self.transport.status();
                if self.transport.set_paused() {
                    self.emit_state_change_from(old_state);
                }
                self.bus.emit_lossy(PlayerEvent::PlaybackBlocked {
                    item_id,
                    timestamp: Utc::now(),
                });
            }
            ElementEventKind::LoadError { message } => {
                let Some(item_id) = self.transport.current_item().map(|item| item.id) else {
                    return;
                };
                warn!("Load error for {}: {}", item_id, message);
                let old_state = self.transport.status();
                self.adapter.clear();
                self.transport.reset_idle();
                self.bus.emit_lossy(PlayerEvent::LoadFailed {
                    item_id,
                    reason: message,
                    timestamp: Utc::now(),
                });
                if old_state != TransportStatus::Idle {
                    self.emit_state_change_from(old_state);
                }
            }
            ElementEventKind::Ended => self.handle_ended(now),
        }
    }

    /// Current transport view for the API and SSE initial state
    pub fn snapshot(&self) -> TransportSnapshot {
        self.transport
            .snapshot(self.cursor.items(), self.cursor.current_index())
    }

    fn step(&mut self, forward: bool, now: Instant) {
        if self.cursor.is_empty() {
            debug!("Skip on empty playlist, dropping to idle");
            self.to_idle();
            return;
        }

        let resume = self.transport.status() == TransportStatus::Playing;
        self.emit_current_skipped();
        if forward {
            self.cursor.next();
        } else {
            self.cursor.previous();
        }
        self.load_current(resume, now);
    }

    fn load_current(&mut self, play_after: bool, now: Instant) {
        let Some(item) = self.cursor.current() else {
            self.to_idle();
            return;
        };
        let old_state = self.transport.status();

        match self.adapter.load(&item.media_url) {
            None => {
                warn!("Cannot load {} (empty media URL)", item.id);
                self.adapter.clear();
                self.transport.reset_idle();
                self.bus.emit_lossy(PlayerEvent::LoadFailed {
                    item_id: item.id,
                    reason: "empty media URL".to_string(),
                    timestamp: Utc::now(),
                });
                if old_state != TransportStatus::Idle {
                    self.emit_state_change_from(old_state);
                }
            }
            Some(token) => {
                debug!("Loaded '{}' (token {})", item.title, token);
                self.transport.item_loaded(item.clone());
                self.last_progress = None;
                self.bus.emit_lossy(PlayerEvent::ItemStarted {
                    item_id: item.id,
                    title: item.title.clone(),
                    timestamp: Utc::now(),
                });
                if play_after {
                    self.adapter.play();
                    self.transport.set_playing(now);
                }
                if self.transport.status() != old_state {
                    self.emit_state_change_from(old_state);
                }
            }
        }
    }

    fn handle_ended(&mut self, now: Instant) {
        let Some(item) = self.transport.current_item().cloned() else {
            return;
        };
        info!("Item '{}' completed", item.title);

        let duration_played_secs = self.transport.position_secs();
        self.bus.emit_lossy(PlayerEvent::ItemCompleted {
            item_id: item.id,
            duration_played_secs,
            completed: true,
            timestamp: Utc::now(),
        });
        self.sink.record_completion(CompletionRecord {
            item_id: item.id,
            title: item.title.clone(),
            kind: item.kind,
            duration_played_secs,
            completed_at: Utc::now(),
        });

        if self.cursor.len() == 1 {
            // Restart in place: same load, same token, no second ItemStarted
            debug!("Single-item playlist, restarting '{}'", item.title);
            self.transport.apply_seek(0.0);
            self.adapter.seek(0.0);
            self.adapter.play();
            self.transport.set_playing(now);
            self.last_progress = None;
            return;
        }

        self.cursor.next();
        self.load_current(true, now);
    }

    fn to_idle(&mut self) {
        let old_state = self.transport.status();
        self.adapter.clear();
        if self.transport.reset_idle() {
            self.emit_state_change_from(old_state);
        }
    }

    fn emit_current_skipped(&self) {
        if let Some(item) = self.transport.current_item() {
            self.bus.emit_lossy(PlayerEvent::ItemCompleted {
                item_id: item.id,
                duration_played_secs: self.transport.position_secs(),
                completed: false,
                timestamp: Utc::now(),
            });
        }
    }

    fn emit_state_change_from(&self, old_state: TransportStatus) {
        let new_state = self.transport.status();
        debug!("Playback state: {} -> {}", old_state, new_state);
        self.bus.emit_lossy(PlayerEvent::PlaybackStateChanged {
            old_state,
            new_state,
            timestamp: Utc::now(),
        });
    }

    fn emit_playlist_changed(&self) {
        self.bus.emit_lossy(PlayerEvent::PlaylistChanged {
            item_ids: self.cursor.item_ids(),
            current_index: self.cursor.current_index(),
            timestamp: Utc::now(),
        });
    }

    fn maybe_emit_progress(&mut self, now: Instant, force: bool) {
        let Some(item) = self.transport.current_item() else {
            return;
        };
        if !force {
            if let Some(last) = self.last_progress {
                if now.duration_since(last) < self.progress_interval {
                    return;
                }
            }
        }
        self.last_progress = Some(now);
        self.bus.emit_lossy(PlayerEvent::PlaybackProgress {
            item_id: item.id,
            position_ms: secs_to_ms(self.transport.position_secs()),
            duration_ms: self.transport.duration_secs().map(secs_to_ms),
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::testing::{
        ElementCommand, RecordingSink, ScriptedElement, ScriptedHandle,
    };
    use omp_common::MediaKind;
    use tokio::sync::{broadcast, mpsc};

    struct Harness {
        controller: PlaybackController,
        handle: ScriptedHandle,
        element_rx: mpsc::UnboundedReceiver<ElementEvent>,
        events: broadcast::Receiver<PlayerEvent>,
        sink: Arc<RecordingSink>,
        t0: Instant,
    }

    impl Harness {
        fn new() -> Self {
            let (element, handle) = ScriptedElement::new();
            let (element_tx, element_rx) = mpsc::unbounded_channel();
            let adapter = MediaElementAdapter::new(Box::new(element), element_tx);
            let bus = Arc::new(EventBus::new(100));
            let events = bus.subscribe();
            let sink = Arc::new(RecordingSink::default());
            let controller = PlaybackController::new(
                adapter,
                bus,
                sink.clone(),
                0.7,
                Duration::from_secs(3),
                Duration::from_secs(1),
            );
            Self {
                controller,
                handle,
                element_rx,
                events,
                sink,
                t0: Instant::now(),
            }
        }

        /// Feed everything the element emitted back into the controller
        fn pump(&mut self) {
            self.pump_at(self.t0);
        }

        fn pump_at(&mut self, now: Instant) {
            while let Ok(event) = self.element_rx.try_recv() {
                self.controller.handle_element_event(event, now);
            }
        }

        fn drain_events(&mut self) -> Vec<PlayerEvent> {
            let mut out = Vec::new();
            while let Ok(event) = self.events.try_recv() {
                out.push(event);
            }
            out
        }

        fn load_playlist(&mut self, n: usize) -> Vec<Arc<MediaItem>> {
            let items = make_items(n);
            self.controller.replace_playlist(items.clone());
            items
        }
    }

    fn make_items(n: usize) -> Vec<Arc<MediaItem>> {
        (0..n)
            .map(|i| {
                Arc::new(MediaItem {
                    id: Uuid::new_v4(),
                    kind: MediaKind::Audio,
                    title: format!("Item {}", i),
                    artist: "Artist".to_string(),
                    duration_secs: Some(180.0),
                    media_url: format!("https://media.example/{}.mp3", i),
                    artwork_url: None,
                    category: None,
                    album: None,
                    year: None,
                    featured: false,
                    tags: Vec::new(),
                })
            })
            .collect()
    }

    fn started_titles(events: &[PlayerEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                PlayerEvent::ItemStarted { title, .. } => Some(title.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_select_and_play_loads_and_plays() {
        let mut h = Harness::new();
        let items = h.load_playlist(3);
        h.drain_events();

        h.controller.select_and_play(items[1].id, h.t0).unwrap();

        assert_eq!(h.controller.transport.status(), TransportStatus::Playing);
        assert_eq!(
            h.controller.transport.current_item().unwrap().id,
            items[1].id
        );
        assert_eq!(h.controller.cursor.current_index(), Some(1));

        assert_eq!(
            h.handle.commands(),
            vec![
                ElementCommand::SetVolume { volume: 0.7 },
                ElementCommand::Attach { token: 1 },
                ElementCommand::SetSource {
                    url: items[1].media_url.clone(),
                },
                ElementCommand::RequestPlay,
            ]
        );

        let events = h.drain_events();
        assert_eq!(started_titles(&events), vec!["Item 1"]);
        assert!(events.iter().any(|event| matches!(
            event,
            PlayerEvent::PlaybackStateChanged {
                old_state: TransportStatus::Idle,
                new_state: TransportStatus::Playing,
                ..
            }
        )));
    }

    #[test]
    fn test_select_and_play_absent_fails_without_touching_transport() {
        let mut h = Harness::new();
        h.load_playlist(3);
        h.drain_events();
        h.handle.clear_commands();

        let absent = Uuid::new_v4();
        let err = h.controller.select_and_play(absent, h.t0).unwrap_err();
        assert!(matches!(err, Error::NotInPlaylist(id) if id == absent));

        assert_eq!(h.controller.transport.status(), TransportStatus::Idle);
        assert!(h.controller.transport.current_item().is_none());
        assert_eq!(h.controller.cursor.current_index(), None);
        assert!(h.handle.commands().is_empty());
        assert!(h.drain_events().is_empty());
    }

    #[test]
    fn test_select_index_out_of_range() {
        let mut h = Harness::new();
        h.load_playlist(2);

        let err = h.controller.select_index(2, h.t0).unwrap_err();
        assert!(matches!(err, Error::OutOfRange { index: 2, len: 2 }));
        assert_eq!(h.controller.transport.status(), TransportStatus::Idle);
    }

    #[test]
    fn test_toggle_without_item_is_noop() {
        let mut h = Harness::new();
        h.load_playlist(2);
        h.drain_events();
        h.handle.clear_commands();

        h.controller.toggle_play_pause(h.t0);

        assert_eq!(h.controller.transport.status(), TransportStatus::Idle);
        assert!(h.handle.commands().is_empty());
        assert!(h.drain_events().is_empty());
    }

    #[test]
    fn test_double_toggle_restores_status() {
        let mut h = Harness::new();
        let items = h.load_playlist(2);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();

        // From Playing
        h.controller.toggle_play_pause(h.t0);
        assert_eq!(h.controller.transport.status(), TransportStatus::Paused);
        h.controller.toggle_play_pause(h.t0);
        assert_eq!(h.controller.transport.status(), TransportStatus::Playing);

        // From Paused
        h.controller.toggle_play_pause(h.t0);
        h.drain_events();
        h.controller.toggle_play_pause(h.t0);
        h.controller.toggle_play_pause(h.t0);
        assert_eq!(h.controller.transport.status(), TransportStatus::Paused);
    }

    #[test]
    fn test_manual_next_preserves_paused() {
        let mut h = Harness::new();
        let items = h.load_playlist(3);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();
        h.controller.toggle_play_pause(h.t0);
        h.drain_events();
        h.handle.clear_commands();

        h.controller.next(h.t0);

        assert_eq!(h.controller.transport.status(), TransportStatus::Paused);
        assert_eq!(
            h.controller.transport.current_item().unwrap().id,
            items[1].id
        );
        let commands = h.handle.commands();
        assert!(!commands.contains(&ElementCommand::RequestPlay));
        assert!(commands.contains(&ElementCommand::SetSource {
            url: items[1].media_url.clone(),
        }));

        let events = h.drain_events();
        // The skipped item completes unnaturally, the next one starts
        assert!(events.iter().any(|event| matches!(
            event,
            PlayerEvent::ItemCompleted {
                completed: false,
                ..
            }
        )));
        assert_eq!(started_titles(&events), vec!["Item 1"]);
        // Manual skip never reaches the history sink
        assert!(h.sink.completions().is_empty());
    }

    #[test]
    fn test_manual_next_preserves_playing() {
        let mut h = Harness::new();
        let items = h.load_playlist(3);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();
        h.handle.clear_commands();

        h.controller.next(h.t0);

        assert_eq!(h.controller.transport.status(), TransportStatus::Playing);
        assert!(h.handle.commands().contains(&ElementCommand::RequestPlay));
    }

    #[test]
    fn test_previous_wraps_to_end() {
        let mut h = Harness::new();
        let items = h.load_playlist(3);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();

        h.controller.previous(h.t0);

        assert_eq!(
            h.controller.transport.current_item().unwrap().id,
            items[2].id
        );
        assert_eq!(h.controller.cursor.current_index(), Some(2));
    }

    #[test]
    fn test_auto_advance_wraps_repeat_all() {
        let mut h = Harness::new();
        let items = h.load_playlist(3);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();
        h.drain_events();

        // Three natural completions: play order wraps B, C, A
        for _ in 0..3 {
            h.handle.emit(ElementEventKind::Ended);
            h.pump();
        }

        let events = h.drain_events();
        assert_eq!(started_titles(&events), vec!["Item 1", "Item 2", "Item 0"]);
        assert_eq!(h.controller.transport.status(), TransportStatus::Playing);
        assert_eq!(h.controller.cursor.current_index(), Some(0));

        let completions = h.sink.completions();
        assert_eq!(completions.len(), 3);
        assert_eq!(completions[0].item_id, items[0].id);
        assert_eq!(completions[1].item_id, items[1].id);
        assert_eq!(completions[2].item_id, items[2].id);

        let naturally_completed = events
            .iter()
            .filter(|event| matches!(event, PlayerEvent::ItemCompleted { completed: true, .. }))
            .count();
        assert_eq!(naturally_completed, 3);
    }

    #[test]
    fn test_single_item_restarts_in_place() {
        let mut h = Harness::new();
        let items = h.load_playlist(1);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();
        h.handle.emit(ElementEventKind::DurationKnown {
            duration_secs: 60.0,
        });
        h.handle.emit(ElementEventKind::TimeUpdate {
            position_secs: 60.0,
        });
        h.pump();
        h.drain_events();
        h.handle.clear_commands();

        h.handle.emit(ElementEventKind::Ended);
        h.pump();

        // Same load restarts: seek to zero and play again, no new attach
        assert_eq!(h.handle.listener_count(), 1);
        assert_eq!(
            h.handle.commands(),
            vec![
                ElementCommand::SetPosition { position_secs: 0.0 },
                ElementCommand::RequestPlay,
            ]
        );
        assert_eq!(h.controller.transport.position_secs(), 0.0);
        assert_eq!(h.controller.transport.status(), TransportStatus::Playing);

        let events = h.drain_events();
        assert!(events.iter().any(|event| matches!(
            event,
            PlayerEvent::ItemCompleted {
                completed: true,
                ..
            }
        )));
        // No second start: the item never left the transport
        assert!(started_titles(&events).is_empty());
    }

    #[test]
    fn test_rapid_double_next_settles_on_second_target() {
        let mut h = Harness::new();
        let items = h.load_playlist(3);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();

        // Two skips before the first target's metadata arrives
        h.controller.next(h.t0);
        h.controller.next(h.t0);

        // Late callback from the superseded load of Item 1
        h.handle.emit_for(1, ElementEventKind::DurationKnown {
            duration_secs: 999.0,
        });
        h.pump();

        assert_eq!(
            h.controller.transport.current_item().unwrap().id,
            items[2].id
        );
        assert_eq!(h.controller.transport.duration_secs(), None);

        // The live load's metadata is applied normally
        h.handle.emit(ElementEventKind::DurationKnown {
            duration_secs: 45.0,
        });
        h.pump();
        assert_eq!(h.controller.transport.duration_secs(), Some(45.0));
    }

    #[test]
    fn test_position_stays_clamped_through_any_sequence() {
        let mut h = Harness::new();
        let items = h.load_playlist(1);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();

        h.handle.emit(ElementEventKind::DurationKnown {
            duration_secs: 100.0,
        });
        h.pump();

        h.controller.seek_to(500.0, h.t0);
        assert_eq!(h.controller.transport.position_secs(), 100.0);

        h.controller.seek_to(-20.0, h.t0);
        assert_eq!(h.controller.transport.position_secs(), 0.0);

        h.handle.emit(ElementEventKind::TimeUpdate {
            position_secs: 250.0,
        });
        h.pump();
        assert_eq!(h.controller.transport.position_secs(), 100.0);

        h.controller.skip_by(-500.0, h.t0);
        assert_eq!(h.controller.transport.position_secs(), 0.0);
    }

    #[test]
    fn test_skip_by_moves_relative() {
        let mut h = Harness::new();
        let items = h.load_playlist(1);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();
        h.handle.emit(ElementEventKind::DurationKnown {
            duration_secs: 100.0,
        });
        h.handle.emit(ElementEventKind::TimeUpdate {
            position_secs: 30.0,
        });
        h.pump();

        h.controller.skip_by(10.0, h.t0);
        assert_eq!(h.controller.transport.position_secs(), 40.0);

        h.controller.skip_by(-15.0, h.t0);
        assert_eq!(h.controller.transport.position_secs(), 25.0);
    }

    #[test]
    fn test_next_on_empty_playlist_goes_idle() {
        let mut h = Harness::new();
        let items = h.load_playlist(2);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();
        h.drain_events();

        h.controller.replace_playlist(Vec::new());

        assert_eq!(h.controller.transport.status(), TransportStatus::Idle);
        assert!(h.controller.transport.current_item().is_none());

        let events = h.drain_events();
        assert!(events.iter().any(|event| matches!(
            event,
            PlayerEvent::PlaybackStateChanged {
                new_state: TransportStatus::Idle,
                ..
            }
        )));

        // Further skips stay idle without new events
        h.controller.next(h.t0);
        assert_eq!(h.controller.transport.status(), TransportStatus::Idle);
    }

    #[test]
    fn test_replace_playlist_keeps_surviving_current() {
        let mut h = Harness::new();
        let items = h.load_playlist(3);
        h.controller.select_and_play(items[1].id, h.t0).unwrap();
        h.drain_events();

        // Item 1 survives at a new position
        h.controller
            .replace_playlist(vec![items[2].clone(), items[1].clone()]);

        assert_eq!(h.controller.transport.status(), TransportStatus::Playing);
        assert_eq!(
            h.controller.transport.current_item().unwrap().id,
            items[1].id
        );
        assert_eq!(h.controller.cursor.current_index(), Some(1));

        let events = h.drain_events();
        assert!(events.iter().any(|event| matches!(
            event,
            PlayerEvent::PlaylistChanged {
                current_index: Some(1),
                ..
            }
        )));
    }

    #[test]
    fn test_replace_playlist_drops_removed_current() {
        let mut h = Harness::new();
        let items = h.load_playlist(3);
        h.controller.select_and_play(items[1].id, h.t0).unwrap();
        h.handle.clear_commands();

        h.controller
            .replace_playlist(vec![items[0].clone(), items[2].clone()]);

        assert_eq!(h.controller.transport.status(), TransportStatus::Idle);
        assert!(h.handle.commands().contains(&ElementCommand::Pause));
        assert_eq!(h.controller.cursor.len(), 2);
        assert_eq!(h.controller.cursor.current_index(), None);
    }

    #[test]
    fn test_empty_url_reports_load_failure() {
        let mut h = Harness::new();
        let mut item = (*make_items(1)[0]).clone();
        item.media_url = String::new();
        let item = Arc::new(item);
        h.controller.replace_playlist(vec![item.clone()]);
        h.drain_events();

        h.controller.select_and_play(item.id, h.t0).unwrap();

        assert_eq!(h.controller.transport.status(), TransportStatus::Idle);
        let events = h.drain_events();
        assert!(events.iter().any(|event| matches!(
            event,
            PlayerEvent::LoadFailed { item_id, .. } if *item_id == item.id
        )));
        // Never entered Playing
        assert!(!events.iter().any(|event| matches!(
            event,
            PlayerEvent::PlaybackStateChanged {
                new_state: TransportStatus::Playing,
                ..
            }
        )));
    }

    #[test]
    fn test_play_rejected_falls_back_to_paused() {
        let mut h = Harness::new();
        let items = h.load_playlist(2);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();
        h.drain_events();

        h.handle.emit(ElementEventKind::PlayRejected);
        h.pump();

        // Recoverable: the item stays loaded for a direct user gesture
        assert_eq!(h.controller.transport.status(), TransportStatus::Paused);
        assert_eq!(
            h.controller.transport.current_item().unwrap().id,
            items[0].id
        );

        let events = h.drain_events();
        assert!(events.iter().any(|event| matches!(
            event,
            PlayerEvent::PlaybackBlocked { item_id, .. } if *item_id == items[0].id
        )));
    }

    #[test]
    fn test_load_error_drops_to_idle() {
        let mut h = Harness::new();
        let items = h.load_playlist(2);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();
        h.drain_events();

        h.handle.emit(ElementEventKind::LoadError {
            message: "404 from CDN".to_string(),
        });
        h.pump();

        assert_eq!(h.controller.transport.status(), TransportStatus::Idle);
        let events = h.drain_events();
        assert!(events.iter().any(|event| matches!(
            event,
            PlayerEvent::LoadFailed { reason, .. } if reason == "404 from CDN"
        )));
    }

    #[test]
    fn test_volume_and_mute_events() {
        let mut h = Harness::new();
        h.drain_events();

        h.controller.set_volume(0.5);
        h.controller.set_volume(0.5);
        h.controller.set_muted(true);
        h.controller.set_muted(true);

        let events = h.drain_events();
        let volume_changes: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                PlayerEvent::VolumeChanged {
                    old_volume,
                    new_volume,
                    ..
                } => Some((*old_volume, *new_volume)),
                _ => None,
            })
            .collect();
        assert_eq!(volume_changes, vec![(0.7, 0.5)]);

        let mute_changes = events
            .iter()
            .filter(|event| matches!(event, PlayerEvent::MutedChanged { muted: true, .. }))
            .count();
        assert_eq!(mute_changes, 1);

        assert!(h
            .handle
            .commands()
            .contains(&ElementCommand::SetMuted { muted: true }));
    }

    #[test]
    fn test_controls_hide_and_reappear() {
        let mut h = Harness::new();
        let items = h.load_playlist(1);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();
        h.drain_events();

        // Before the deadline nothing happens
        h.controller.tick(h.t0 + Duration::from_secs(2));
        assert!(h.drain_events().is_empty());

        // Past the deadline controls hide
        h.controller.tick(h.t0 + Duration::from_secs(4));
        let events = h.drain_events();
        assert!(events.iter().any(|event| matches!(
            event,
            PlayerEvent::ControlsVisibility { visible: false, .. }
        )));

        // Pointer activity shows them again
        h.controller.pointer_activity(h.t0 + Duration::from_secs(5));
        let events = h.drain_events();
        assert!(events.iter().any(|event| matches!(
            event,
            PlayerEvent::ControlsVisibility { visible: true, .. }
        )));
    }

    #[test]
    fn test_progress_throttled_to_interval() {
        let mut h = Harness::new();
        let items = h.load_playlist(1);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();
        h.drain_events();

        // Burst of element updates within one interval
        for i in 0..5 {
            h.handle.emit(ElementEventKind::TimeUpdate {
                position_secs: i as f64 * 0.2,
            });
        }
        h.pump_at(h.t0 + Duration::from_millis(200));

        let progress = h
            .drain_events()
            .into_iter()
            .filter(|event| matches!(event, PlayerEvent::PlaybackProgress { .. }))
            .count();
        assert_eq!(progress, 1);

        // After the interval elapses the next update goes out
        h.handle.emit(ElementEventKind::TimeUpdate { position_secs: 2.0 });
        h.pump_at(h.t0 + Duration::from_millis(1500));
        let progress = h
            .drain_events()
            .into_iter()
            .filter(|event| matches!(event, PlayerEvent::PlaybackProgress { .. }))
            .count();
        assert_eq!(progress, 1);
    }

    #[test]
    fn test_seek_emits_progress_immediately() {
        let mut h = Harness::new();
        let items = h.load_playlist(1);
        h.controller.select_and_play(items[0].id, h.t0).unwrap();
        h.handle.emit(ElementEventKind::DurationKnown {
            duration_secs: 300.0,
        });
        h.pump();
        h.drain_events();

        h.controller.seek_to(42.0, h.t0);

        let events = h.drain_events();
        assert!(events.iter().any(|event| matches!(
            event,
            PlayerEvent::PlaybackProgress {
                position_ms: 42000,
                duration_ms: Some(300000),
                ..
            }
        )));
    }

    #[test]
    fn test_shuffle_keeps_current_and_notifies() {
        let mut h = Harness::new();
        let items = h.load_playlist(6);
        h.controller.select_and_play(items[2].id, h.t0).unwrap();
        h.drain_events();

        h.controller.shuffle_playlist();

        assert_eq!(
            h.controller.transport.current_item().unwrap().id,
            items[2].id
        );
        let events = h.drain_events();
        assert!(events
            .iter()
            .any(|event| matches!(event, PlayerEvent::PlaylistChanged { .. })));
    }

    #[test]
    fn test_favorite_reaches_sink() {
        let mut h = Harness::new();
        let items = h.load_playlist(2);

        h.controller.set_favorite(items[0].id, true);
        h.controller.set_favorite(items[0].id, false);

        let favorites = h.sink.favorites();
        assert_eq!(favorites.len(), 2);
        assert!(favorites[0].favorited);
        assert!(!favorites[1].favorited);
        assert_eq!(favorites[0].item_id, items[0].id);
    }

    #[test]
    fn test_snapshot_reflects_playlist_and_transport() {
        let mut h = Harness::new();
        let items = h.load_playlist(3);
        h.controller.select_and_play(items[1].id, h.t0).unwrap();
        h.handle.emit(ElementEventKind::DurationKnown {
            duration_secs: 187.0,
        });
        h.handle.emit(ElementEventKind::TimeUpdate {
            position_secs: 61.0,
        });
        h.pump();

        let snap = h.controller.snapshot();
        assert_eq!(snap.status, TransportStatus::Playing);
        assert_eq!(snap.current_index, Some(1));
        assert_eq!(snap.playlist.len(), 3);
        assert_eq!(snap.position_display, "1:01");
        assert_eq!(snap.duration_display, "3:07");
        assert_eq!(snap.volume, 70);
    }
}
