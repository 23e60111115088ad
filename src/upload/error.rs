//! Logo upload error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the upload workflow
///
/// `Rejected`, `Transport` and `InvalidResponse` are upload failures shown
/// inline; the rest are refused user actions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("No company selected")]
    NoSelection,

    #[error("An upload is already in progress")]
    AlreadyUploading,

    #[error("Cannot {event} while {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },

    /// Endpoint answered with a non-success status
    #[error("Upload rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Request never completed
    #[error("Upload failed: {0}")]
    Transport(String),

    /// 2xx response without a JSON body
    #[error("Unexpected upload response: {0}")]
    InvalidResponse(String),

    #[error("Failed to read {path:?}: {error}")]
    Io { path: PathBuf, error: String },
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UploadError::Transport("request timed out".to_string())
        } else {
            UploadError::Transport(err.to_string())
        }
    }
}

/// Result type alias for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UploadError::Rejected {
            status: 413,
            message: "Payload Too Large".into(),
        };
        assert_eq!(err.to_string(), "Upload rejected with HTTP 413: Payload Too Large");

        let err = UploadError::InvalidTransition {
            state: "idle",
            event: "confirm",
        };
        assert_eq!(err.to_string(), "Cannot confirm while idle");
    }
}
