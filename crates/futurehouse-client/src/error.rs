//! Error types for the job client.

use thiserror::Error;

/// Errors that can occur when talking to the platform.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No API key configured.
    #[error("missing API credential: set FUTUREHOUSE_API_KEY")]
    MissingCredential,

    /// Transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform rejected the request.
    #[error("platform returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Status string the client does not know how to map.
    #[error("unknown task status: {0}")]
    UnknownStatus(String),
}
