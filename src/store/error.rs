//! Store error types

use thiserror::Error;

/// Failures reported by a resource store
///
/// None of these reach the caller of `decide`; the engine resolves each
/// one to a deny.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Resource does not exist, or is not of the probed kind
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Integration lacks access to the resource
    #[error("Access to resource refused: {0}")]
    Unauthorized(String),

    /// Unexpected HTTP status
    #[error("Store returned {status}: {body}")]
    Http { status: u16, body: String },

    /// Network or client failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response did not have the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        StoreError::Decode(msg.into())
    }
}
