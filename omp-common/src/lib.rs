//! # OMP Common Library
//!
//! Shared code for the Onboard Media Player:
//! - Unified catalog item shape (`MediaItem`)
//! - Player event types (`PlayerEvent` enum) and `EventBus`
//! - Configuration file resolution
//! - Error types
//! - Clock-style time formatting for transport display

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use catalog::{MediaItem, MediaKind};
pub use error::{Error, Result};
pub use events::{EventBus, PlayerEvent, TransportStatus};
