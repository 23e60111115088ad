//! Company loading error types

use thiserror::Error;

/// Errors that halt the initial company load
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Transport failure or non-success HTTP status
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match any accepted shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LoadError::Parse(err.to_string())
        } else {
            LoadError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Parse(err.to_string())
    }
}

/// Result type alias for loading operations
pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoadError::Network("HTTP 500 Internal Server Error".to_string());
        assert_eq!(err.to_string(), "Network error: HTTP 500 Internal Server Error");

        let err = LoadError::Parse("expected array".to_string());
        assert_eq!(err.to_string(), "Parse error: expected array");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: LoadError = json_err.into();
        assert!(matches!(err, LoadError::Parse(_)));
    }
}
