//! Dashboard embed error types

use thiserror::Error;

/// Why a dashboard could not be shown inline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmbedError {
    /// The browser's content security policy refused the provider
    #[error("Blocked by content security policy: {blocked_uri}")]
    Blocked { blocked_uri: String },

    /// The frame reported a load failure
    #[error("Frame load failed: {0}")]
    LoadFailed(String),
}

impl EmbedError {
    pub fn is_blocked(&self) -> bool {
        matches!(self, EmbedError::Blocked { .. })
    }

    /// Message shown in place of the frame
    pub fn user_message(&self) -> &'static str {
        match self {
            EmbedError::Blocked { .. } => {
                "This dashboard was blocked by the browser's security policy and cannot be shown inline."
            }
            EmbedError::LoadFailed(_) => "Failed to load the dashboard.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_distinct() {
        let blocked = EmbedError::Blocked {
            blocked_uri: "https://lookerstudio.google.com".into(),
        };
        let failed = EmbedError::LoadFailed("timeout".into());
        assert_ne!(blocked.user_message(), failed.user_message());
        assert!(blocked.is_blocked());
        assert!(!failed.is_blocked());
        assert_eq!(failed.to_string(), "Frame load failed: timeout");
    }
}
