//! Error types for editor operations.

use thiserror::Error;

/// Errors surfaced by the editor core.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EditorError {
    /// The media catalog could not be reached or answered with a failure.
    #[error("media catalog request failed: {0}")]
    Catalog(String),

    /// A catalog payload could not be decoded.
    #[error("failed to decode catalog response: {0}")]
    Decode(String),

    /// Invalid editor configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        EditorError::Decode(e.to_string())
    }
}
