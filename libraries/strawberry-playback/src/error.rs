//! Error types for the playback controller

use thiserror::Error;

/// Playback errors
///
/// None of these are fatal to the controller. They are either swallowed at the
/// call site (and logged) or surfaced to observers as advisory flags.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// Catalog provider failed or returned nothing
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Output device refused to start or resume audio (host autoplay policy)
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    /// Track index outside the active catalog
    #[error("Index out of range: {index} (catalog length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Controller has been disposed and no longer accepts events
    #[error("Controller disposed")]
    Disposed,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
