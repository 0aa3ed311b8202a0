/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Playback error: {0}")]
    Playback(#[from] strawberry_playback::PlaybackError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CliError> for strawberry_playback::PlaybackError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Playback(inner) => inner,
            other => strawberry_playback::PlaybackError::CatalogUnavailable(other.to_string()),
        }
    }
}
