use thiserror::Error;

/// Errors surfaced by the provider and its backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The URI does not name a resource shape this provider serves.
    #[error("Unknown uri: {0}")]
    UnsupportedRequest(String),

    /// The backend refused the row and reported a non-positive id.
    #[error("Failed to insert row into {0}")]
    WriteRejected(String),

    #[error("sqlite error: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("invalid uri: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
