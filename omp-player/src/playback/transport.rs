//! Transport state machine
//!
//! [`TransportState`] is the authoritative record of what the player surface
//! shows: current item, status, position, duration, volume, mute and
//! controls visibility. Transitions:
//!
//! - `Idle -> Paused` on a successful load (loads always land paused; any
//!   auto-play afterwards is controller policy)
//! - `Paused -> Playing` on play intent, applied optimistically and
//!   reconciled by the element's `PlayStateChanged` / `PlayRejected`
//! - `Playing -> Paused` on pause intent or a rejected play
//! - any -> `Idle` when the playlist empties or the current item vanishes
//!
//! Position comes only from element `TimeUpdate`s or an explicit seek
//! (optimistic, reconciled by the next `TimeUpdate`); duration comes only
//! from `DurationKnown` and renders as a placeholder until then. Controls
//! hide after an inactivity deadline that only runs while `Playing`.

use chrono::{DateTime, Utc};
use omp_common::time::{format_clock, format_clock_or_placeholder};
use omp_common::{MediaItem, MediaKind, TransportStatus};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Authoritative transport state for one player surface
pub struct TransportState {
    current_item: Option<Arc<MediaItem>>,
    status: TransportStatus,
    position_secs: f64,
    duration_secs: Option<f64>,
    volume: f32,
    muted: bool,
    controls_visible: bool,
    controls_deadline: Option<Instant>,
    controls_hide: Duration,
}

impl TransportState {
    pub fn new(volume: f32, controls_hide: Duration) -> Self {
        Self {
            current_item: None,
            status: TransportStatus::Idle,
            position_secs: 0.0,
            duration_secs: None,
            volume: volume.clamp(0.0, 1.0),
            muted: false,
            controls_visible: true,
            controls_deadline: None,
            controls_hide,
        }
    }

    pub fn status(&self) -> TransportStatus {
        self.status
    }

    pub fn current_item(&self) -> Option<&Arc<MediaItem>> {
        self.current_item.as_ref()
    }

    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    /// A load succeeded; the item becomes current in `Paused`
    ///
    /// Position resets to 0 and duration returns to unknown until the
    /// element reports metadata for the new source.
    pub fn item_loaded(&mut self, item: Arc<MediaItem>) {
        self.current_item = Some(item);
        self.status = TransportStatus::Paused;
        self.position_secs = 0.0;
        self.duration_secs = None;
        self.show_controls_unarmed();
    }

    /// Enter `Playing`; refused while no item is current
    ///
    /// Arms the controls-hide deadline relative to `now`.
    pub fn set_playing(&mut self, now: Instant) -> bool {
        if self.current_item.is_none() || self.status == TransportStatus::Playing {
            return false;
        }
        self.status = TransportStatus::Playing;
        self.controls_deadline = Some(now + self.controls_hide);
        true
    }

    /// Leave `Playing` for `Paused`; controls stay visible while paused
    pub fn set_paused(&mut self) -> bool {
        if self.status != TransportStatus::Playing {
            return false;
        }
        self.status = TransportStatus::Paused;
        self.show_controls_unarmed();
        true
    }

    /// Drop to `Idle`: no item, zero position, unknown duration
    pub fn reset_idle(&mut self) -> bool {
        let changed = self.status != TransportStatus::Idle;
        self.current_item = None;
        self.status = TransportStatus::Idle;
        self.position_secs = 0.0;
        self.duration_secs = None;
        self.show_controls_unarmed();
        changed
    }

    /// Element-reported position; clamped once duration is known
    pub fn apply_time_update(&mut self, position_secs: f64) {
        self.position_secs = self.clamp_position(position_secs);
    }

    /// Element-reported duration; replaces the placeholder immediately
    pub fn apply_duration(&mut self, duration_secs: f64) {
        self.duration_secs = Some(duration_secs.max(0.0));
        self.position_secs = self.clamp_position(self.position_secs);
    }

    /// Optimistic seek; returns the position actually applied
    ///
    /// The next `TimeUpdate` reconciles whatever the element really did.
    pub fn apply_seek(&mut self, position_secs: f64) -> f64 {
        self.position_secs = self.clamp_position(position_secs);
        self.position_secs
    }

    /// Set volume; returns `(old, new)` after clamping to 0.0..=1.0
    pub fn set_volume(&mut self, volume: f32) -> (f32, f32) {
        let old = self.volume;
        self.volume = volume.clamp(0.0, 1.0);
        (old, self.volume)
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Pointer activity: show controls, re-arm the hide deadline
    ///
    /// Returns whether visibility flipped from hidden to shown.
    pub fn pointer_activity(&mut self, now: Instant) -> bool {
        let flipped = !self.controls_visible;
        self.controls_visible = true;
        if self.status == TransportStatus::Playing {
            self.controls_deadline = Some(now + self.controls_hide);
        }
        flipped
    }

    /// Evaluate the controls-hide deadline; returns whether controls hid
    ///
    /// The deadline only runs while `Playing`; paused and idle players keep
    /// their controls visible.
    pub fn evaluate_controls(&mut self, now: Instant) -> bool {
        if self.status != TransportStatus::Playing {
            return false;
        }
        match self.controls_deadline {
            Some(deadline) if now >= deadline && self.controls_visible => {
                self.controls_visible = false;
                self.controls_deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Serializable view for the API and the SSE initial state
    pub fn snapshot(
        &self,
        playlist: &[Arc<MediaItem>],
        current_index: Option<usize>,
    ) -> TransportSnapshot {
        TransportSnapshot {
            status: self.status,
            current_index,
            current_item: self.current_item.as_deref().map(PlaylistItemInfo::from),
            position_secs: self.position_secs,
            duration_secs: self.duration_secs,
            position_display: format_clock(self.position_secs),
            duration_display: format_clock_or_placeholder(self.duration_secs),
            volume: (self.volume * 100.0).round() as u8,
            muted: self.muted,
            controls_visible: self.controls_visible,
            playlist: playlist
                .iter()
                .map(|item| PlaylistItemInfo::from(item.as_ref()))
                .collect(),
            timestamp: Utc::now(),
        }
    }

    fn show_controls_unarmed(&mut self) {
        self.controls_visible = true;
        self.controls_deadline = None;
    }

    fn clamp_position(&self, position_secs: f64) -> f64 {
        let mut position = position_secs.max(0.0);
        if let Some(duration) = self.duration_secs {
            position = position.min(duration);
        }
        position
    }
}

/// Playlist entry as shown to API and SSE clients
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistItemInfo {
    pub id: Uuid,
    pub kind: MediaKind,
    pub title: String,
    pub artist: String,
    /// Advisory catalog duration for list display; the transport's own
    /// duration field carries element truth
    pub duration_secs: Option<f64>,
    pub artwork_url: Option<String>,
}

impl From<&MediaItem> for PlaylistItemInfo {
    fn from(item: &MediaItem) -> Self {
        Self {
            id: item.id,
            kind: item.kind,
            title: item.title.clone(),
            artist: item.artist.clone(),
            duration_secs: item.duration_secs,
            artwork_url: item.artwork_url.clone(),
        }
    }
}

/// Full transport view sent on `GET /playback/state` and as the SSE
/// initial state event
#[derive(Debug, Clone, Serialize)]
pub struct TransportSnapshot {
    pub status: TransportStatus,
    pub current_index: Option<usize>,
    pub current_item: Option<PlaylistItemInfo>,
    pub position_secs: f64,
    /// None until the element reports metadata
    pub duration_secs: Option<f64>,
    /// Clock-style rendering of the position, e.g. "3:07"
    pub position_display: String,
    /// Clock-style rendering of the duration, "--:--" while unknown
    pub duration_display: String,
    /// User-facing volume, 0-100
    pub volume: u8,
    pub muted: bool,
    pub controls_visible: bool,
    pub playlist: Vec<PlaylistItemInfo>,
    pub timestamp: DateTime<Utc>,
}
