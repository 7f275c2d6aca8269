//! Error types for the quote manager.

/// Errors surfaced by quote store operations and sync cycles.
///
/// The `Display` output of every variant starts with the failure category so it
/// can be shown to users verbatim.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("format error: {0}")]
    Format(String),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Failures talking to the remote mirror.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Failures reading or writing the persistence slot.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not read slot \"{key}\": {message}")]
    Read { key: String, message: String },

    #[error("could not write slot \"{key}\": {message}")]
    Write { key: String, message: String },

    #[error("could not serialize quotes: {0}")]
    Serialize(#[from] serde_json::Error),
}
