//! Error types for the player engine

use thiserror::Error;
use uuid::Uuid;

/// Player error types
///
/// `OutOfRange` and `NotInPlaylist` are contract violations surfaced to the
/// caller immediately. Expected runtime conditions (blocked autoplay, failed
/// loads) are not errors; they travel as `PlayerEvent` state flags instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Playlist index outside the current playlist bounds
    #[error("Playlist index {index} out of range (length {len})")]
    OutOfRange { index: usize, len: usize },

    /// Selection request for an item not present in the current playlist
    ///
    /// Recoverable: the caller rebuilds the playlist and reselects.
    #[error("Item {0} is not in the current playlist")]
    NotInPlaylist(Uuid),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog loading or lookup error
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the shared OMP library
    #[error(transparent)]
    Common(#[from] omp_common::Error),

    /// Internal error (engine task gone, channel closed)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for player operations
pub type Result<T> = std::result::Result<T, Error>;
