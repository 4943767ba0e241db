//! Playback engine, transport state and playlist navigation

pub mod adapter;
pub mod controller;
pub mod cursor;
pub mod element;
pub mod engine;
pub mod events;
pub mod testing;
pub mod transport;

pub use adapter::{MediaElement, MediaElementAdapter};
pub use controller::PlaybackController;
pub use cursor::PlaylistCursor;
pub use element::{ClockElement, DurationResolver};
pub use engine::{Player, PlayerCommand};
pub use events::{ElementEvent, ElementEventKind, ElementListener};
pub use transport::{PlaylistItemInfo, TransportSnapshot, TransportState};
