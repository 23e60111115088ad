//! Upload state machine
//!
//! ```text
//! Idle ──pick──▶ Selected ──confirm──▶ Uploading ──ok──▶ Success
//!  ▲               │                      │               │
//!  └────cancel─────┘                      └──fail──▶ Error│
//!                  ▲                                 │    │
//!                  └──────────────pick───────────────┴────┘
//! ```
//!
//! `Reset` returns to `Idle` from any state.

use super::error::UploadError;
use super::file::LogoFile;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    Selected(LogoFile),
    Uploading(LogoFile),
    Success,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Pick(LogoFile),
    Cancel,
    Confirm,
    Succeeded,
    Failed(String),
    Reset,
}

impl UploadEvent {
    fn name(&self) -> &'static str {
        match self {
            UploadEvent::Pick(_) => "pick a file",
            UploadEvent::Cancel => "cancel",
            UploadEvent::Confirm => "confirm",
            UploadEvent::Succeeded => "complete",
            UploadEvent::Failed(_) => "fail",
            UploadEvent::Reset => "reset",
        }
    }
}

impl UploadState {
    pub fn name(&self) -> &'static str {
        match self {
            UploadState::Idle => "idle",
            UploadState::Selected(_) => "selected",
            UploadState::Uploading(_) => "uploading",
            UploadState::Success => "success",
            UploadState::Error(_) => "error",
        }
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self, UploadState::Uploading(_))
    }

    /// File picked or in flight
    pub fn file(&self) -> Option<&LogoFile> {
        match self {
            UploadState::Selected(file) | UploadState::Uploading(file) => Some(file),
            _ => None,
        }
    }

    /// Apply an event; on rejection the state is left as it was
    pub fn apply(&mut self, event: UploadEvent) -> Result<(), UploadError> {
        let current = std::mem::take(self);
        let (next, result) = match (current, event) {
            (UploadState::Uploading(file), UploadEvent::Pick(_))
            | (UploadState::Uploading(file), UploadEvent::Confirm) => {
                (UploadState::Uploading(file), Err(UploadError::AlreadyUploading))
            }
            (UploadState::Uploading(_), UploadEvent::Succeeded) => (UploadState::Success, Ok(())),
            (UploadState::Uploading(_), UploadEvent::Failed(message)) => {
                (UploadState::Error(message), Ok(()))
            }
            (_, UploadEvent::Reset) => (UploadState::Idle, Ok(())),
            (_, UploadEvent::Pick(file)) => (UploadState::Selected(file), Ok(())),
            (UploadState::Selected(_), UploadEvent::Cancel) => (UploadState::Idle, Ok(())),
            (UploadState::Selected(file), UploadEvent::Confirm) => {
                (UploadState::Uploading(file), Ok(()))
            }
            (state, event) => {
                let err = UploadError::InvalidTransition {
                    state: state.name(),
                    event: event.name(),
                };
                (state, Err(err))
            }
        };
        *self = next;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logo(name: &str) -> LogoFile {
        LogoFile::new(name, vec![1, 2, 3])
    }

    #[test]
    fn test_happy_path() {
        let mut state = UploadState::Idle;
        state.apply(UploadEvent::Pick(logo("a.png"))).unwrap();
        assert_eq!(state.name(), "selected");
        state.apply(UploadEvent::Confirm).unwrap();
        assert!(state.is_uploading());
        state.apply(UploadEvent::Succeeded).unwrap();
        assert_eq!(state, UploadState::Success);
        assert!(state.file().is_none());
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut state = UploadState::Selected(logo("a.png"));
        state.apply(UploadEvent::Cancel).unwrap();
        assert_eq!(state, UploadState::Idle);
    }

    #[test]
    fn test_no_second_upload_while_uploading() {
        let mut state = UploadState::Uploading(logo("a.png"));
        assert_eq!(state.apply(UploadEvent::Confirm), Err(UploadError::AlreadyUploading));
        assert_eq!(
            state.apply(UploadEvent::Pick(logo("b.png"))),
            Err(UploadError::AlreadyUploading)
        );
        assert_eq!(state, UploadState::Uploading(logo("a.png")));
    }

    #[test]
    fn test_error_then_pick_goes_to_selected() {
        let mut state = UploadState::Uploading(logo("a.png"));
        state.apply(UploadEvent::Failed("HTTP 413".into())).unwrap();
        assert_eq!(state, UploadState::Error("HTTP 413".into()));
        state.apply(UploadEvent::Pick(logo("small.png"))).unwrap();
        assert_eq!(state, UploadState::Selected(logo("small.png")));
    }

    #[test]
    fn test_invalid_transitions_keep_state() {
        let mut state = UploadState::Idle;
        assert!(matches!(
            state.apply(UploadEvent::Confirm),
            Err(UploadError::InvalidTransition { state: "idle", event: "confirm" })
        ));
        assert_eq!(state, UploadState::Idle);

        let mut state = UploadState::Success;
        assert!(state.apply(UploadEvent::Cancel).is_err());
        assert!(state.apply(UploadEvent::Succeeded).is_err());
        assert_eq!(state, UploadState::Success);
    }

    #[test]
    fn test_reset_from_any_state() {
        for mut state in [
            UploadState::Selected(logo("a.png")),
            UploadState::Uploading(logo("a.png")),
            UploadState::Success,
            UploadState::Error("x".into()),
        ] {
            state.apply(UploadEvent::Reset).unwrap();
            assert_eq!(state, UploadState::Idle);
        }
    }
}
