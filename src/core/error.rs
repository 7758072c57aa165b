//! Guard error types

use thiserror::Error;

/// Errors surfaced by the guard to the command layer
///
/// Permission denials are normally carried by `PermissionDecision`, not by
/// this type. `PermissionDenied` only appears when a caller opts into
/// `PermissionDecision::into_result`.
#[derive(Error, Debug)]
pub enum GuardError {
    /// Operation string outside the `kind:action` vocabulary
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Rule failed upstream validation
    #[error("Invalid rule #{index} ({name}): {reason}")]
    InvalidRule {
        index: usize,
        name: String,
        reason: String,
    },

    /// Identifier could not be extracted from user input
    #[error("Invalid resource id: {0}")]
    InvalidResourceId(String),

    /// Required environment configuration is missing or malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Access denied by the permission engine
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl GuardError {
    /// Create an invalid-rule error
    pub fn invalid_rule(index: usize, name: impl Into<String>, reason: impl Into<String>) -> Self {
        GuardError::InvalidRule {
            index,
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for guard operations
pub type GuardResult<T> = Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GuardError::UnknownOperation("page:destroy".into());
        assert_eq!(err.to_string(), "Unknown operation: page:destroy");

        let err = GuardError::invalid_rule(2, "docs", "no scope");
        assert_eq!(err.to_string(), "Invalid rule #2 (docs): no scope");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "rules not found");
        let guard_err: GuardError = io_err.into();
        assert!(matches!(guard_err, GuardError::Io(_)));
    }
}
