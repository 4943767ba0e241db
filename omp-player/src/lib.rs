//! # OMP Player Library (omp-player)
//!
//! Playback and playlist-navigation engine for the onboard media catalog.
//!
//! **Purpose:** Hold the playlist and transport state, drive a pluggable
//! media element, auto-advance through the playlist, and expose an HTTP/SSE
//! control surface for the cabin UI.
//!
//! **Architecture:** One engine task owns all playback state; cloneable
//! [`Player`](playback::Player) handles feed it commands over channels and
//! subscribers observe it through a broadcast event stream.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod history;
pub mod playback;

pub use config::PlayerConfig;
pub use error::{Error, Result};
pub use playback::Player;
