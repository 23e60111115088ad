//! Upload manager
//!
//! Binds the upload state machine to the active company. Every selection
//! change bumps a generation counter; completions carrying an older
//! generation are dropped. Only one request is ever in flight: a request
//! abandoned by a selection change still blocks new uploads until its
//! completion arrives.

use uuid::Uuid;

use super::client::{LogoUploader, UploadReceipt};
use super::error::{UploadError, UploadResult};
use super::file::LogoFile;
use super::state::{UploadEvent, UploadState};

/// Handle for one in-flight upload
#[derive(Debug, Clone)]
pub struct UploadTicket {
    pub request_id: Uuid,
    pub generation: u64,
    pub company_id: String,
    pub file: LogoFile,
}

/// Rendered upload controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadView {
    /// False when no company is selected
    pub enabled: bool,
    pub state: &'static str,
    pub file_name: Option<String>,
    pub can_pick: bool,
    pub can_confirm: bool,
    pub can_cancel: bool,
    pub message: Option<String>,
}

#[derive(Debug, Default)]
pub struct UploadManager {
    company_id: Option<String>,
    state: UploadState,
    generation: u64,
    /// Request still running, whether or not its result is wanted
    in_flight: Option<Uuid>,
}

impl UploadManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn company_id(&self) -> Option<&str> {
        self.company_id.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a request is still running, possibly for a previous selection
    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Rebind to a new selection (or none); always returns to `Idle`
    pub fn reset_for(&mut self, company_id: Option<&str>) {
        if let Some(request_id) = self.in_flight {
            tracing::debug!(request_id = %request_id, "Discarding interest in in-flight upload");
        }
        self.company_id = company_id.map(str::to_string);
        self.generation += 1;
        // Reset is valid from every state
        let _ = self.state.apply(UploadEvent::Reset);
    }

    fn require_selection(&self) -> UploadResult<&str> {
        self.company_id.as_deref().ok_or(UploadError::NoSelection)
    }

    fn require_no_request(&self) -> UploadResult<()> {
        match self.in_flight {
            Some(_) => Err(UploadError::AlreadyUploading),
            None => Ok(()),
        }
    }

    pub fn pick(&mut self, file: LogoFile) -> UploadResult<()> {
        self.require_selection()?;
        self.require_no_request()?;
        tracing::debug!(file = %file.name, bytes = file.len(), "Logo picked");
        self.state.apply(UploadEvent::Pick(file))
    }

    pub fn cancel(&mut self) -> UploadResult<()> {
        self.require_selection()?;
        self.state.apply(UploadEvent::Cancel)
    }

    /// Whether confirm is currently allowed
    pub fn can_submit(&self) -> bool {
        self.company_id.is_some()
            && self.in_flight.is_none()
            && matches!(self.state, UploadState::Selected(_))
    }

    /// Confirm the picked file and move to `Uploading`
    pub fn begin(&mut self) -> UploadResult<UploadTicket> {
        let company_id = self.require_selection()?.to_string();
        self.require_no_request()?;
        self.state.apply(UploadEvent::Confirm)?;

        let file = match &self.state {
            UploadState::Uploading(file) => file.clone(),
            _ => return Err(UploadError::AlreadyUploading),
        };

        let request_id = Uuid::new_v4();
        self.in_flight = Some(request_id);

        tracing::info!(
            request_id = %request_id,
            company_id = %company_id,
            file = %file.name,
            "Uploading logo"
        );

        Ok(UploadTicket {
            request_id,
            generation: self.generation,
            company_id,
            file,
        })
    }

    /// Apply an upload outcome; returns false if the ticket is stale
    ///
    /// A stale completion still frees the in-flight slot.
    pub fn complete(&mut self, ticket: &UploadTicket, result: UploadResult<UploadReceipt>) -> bool {
        let finished = self.in_flight == Some(ticket.request_id);
        if finished {
            self.in_flight = None;
        }
        if !finished || ticket.generation != self.generation {
            tracing::debug!(request_id = %ticket.request_id, "Ignoring stale upload result");
            return false;
        }

        let event = match result {
            Ok(_) => {
                tracing::info!(request_id = %ticket.request_id, "Logo uploaded");
                UploadEvent::Succeeded
            }
            Err(e) => {
                tracing::warn!(request_id = %ticket.request_id, error = %e, "Logo upload failed");
                UploadEvent::Failed(e.to_string())
            }
        };
        self.state.apply(event).is_ok()
    }

    /// Confirm and run the upload to completion
    pub async fn submit(&mut self, uploader: &dyn LogoUploader) -> UploadResult<()> {
        let ticket = self.begin()?;
        let result = uploader.upload(&ticket.company_id, &ticket.file).await;
        let outcome = result.clone().map(|_| ());
        self.complete(&ticket, result);
        outcome
    }

    pub fn render(&self) -> UploadView {
        let enabled = self.company_id.is_some();
        let message = match &self.state {
            UploadState::Uploading(_) => Some("Uploading...".to_string()),
            UploadState::Success => Some("Logo uploaded".to_string()),
            UploadState::Error(message) => Some(message.clone()),
            UploadState::Idle | UploadState::Selected(_) => None,
        };

        UploadView {
            enabled,
            state: self.state.name(),
            file_name: self.state.file().map(|f| f.name.clone()),
            can_pick: enabled && !self.state.is_uploading() && self.in_flight.is_none(),
            can_confirm: self.can_submit(),
            can_cancel: enabled && matches!(self.state, UploadState::Selected(_)),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;

    fn logo() -> LogoFile {
        LogoFile::new("logo.png", vec![9; 16])
    }

    fn receipt() -> UploadReceipt {
        UploadReceipt {
            response: serde_json::json!({ "ok": true }),
            uploaded_at: Utc::now(),
        }
    }

    struct FixedUploader(UploadResult<UploadReceipt>);

    #[async_trait]
    impl LogoUploader for FixedUploader {
        async fn upload(&self, _company_id: &str, _file: &LogoFile) -> UploadResult<UploadReceipt> {
            self.0.clone()
        }
    }

    #[test]
    fn test_inert_without_selection() {
        let mut manager = UploadManager::new();
        assert_eq!(manager.pick(logo()), Err(UploadError::NoSelection));
        assert!(matches!(manager.begin(), Err(UploadError::NoSelection)));
        let view = manager.render();
        assert!(!view.enabled);
        assert!(!view.can_pick);
    }

    #[test]
    fn test_begin_complete_success() {
        let mut manager = UploadManager::new();
        manager.reset_for(Some("1"));
        manager.pick(logo()).unwrap();
        let ticket = manager.begin().unwrap();
        assert_eq!(ticket.company_id, "1");
        assert!(!manager.can_submit());
        assert!(!manager.render().can_pick);

        assert!(manager.complete(&ticket, Ok(receipt())));
        assert_eq!(manager.state(), &UploadState::Success);
        assert_eq!(manager.render().file_name, None);
    }

    #[test]
    fn test_second_begin_rejected_while_uploading() {
        let mut manager = UploadManager::new();
        manager.reset_for(Some("1"));
        manager.pick(logo()).unwrap();
        manager.begin().unwrap();
        assert!(matches!(manager.begin(), Err(UploadError::AlreadyUploading)));
    }

    #[test]
    fn test_selection_change_resets_and_drops_stale_result() {
        let mut manager = UploadManager::new();
        manager.reset_for(Some("1"));
        manager.pick(logo()).unwrap();
        let ticket = manager.begin().unwrap();

        manager.reset_for(Some("2"));
        assert_eq!(manager.state(), &UploadState::Idle);
        assert!(!manager.complete(&ticket, Ok(receipt())));
        assert_eq!(manager.state(), &UploadState::Idle);
    }

    #[test]
    fn test_abandoned_request_blocks_next_upload_until_it_finishes() {
        let mut manager = UploadManager::new();
        manager.reset_for(Some("1"));
        manager.pick(logo()).unwrap();
        let first = manager.begin().unwrap();

        manager.reset_for(Some("2"));
        assert!(manager.has_in_flight());
        assert_eq!(manager.pick(logo()), Err(UploadError::AlreadyUploading));
        assert!(matches!(manager.begin(), Err(UploadError::AlreadyUploading)));
        let view = manager.render();
        assert!(view.enabled);
        assert!(!view.can_pick);
        assert!(!view.can_confirm);

        assert!(!manager.complete(&first, Err(UploadError::Transport("late".into()))));
        assert!(!manager.has_in_flight());
        assert_eq!(manager.state(), &UploadState::Idle);

        manager.pick(logo()).unwrap();
        let second = manager.begin().unwrap();
        assert_eq!(second.company_id, "2");
        assert!(manager.complete(&second, Ok(receipt())));
        assert_eq!(manager.state(), &UploadState::Success);
    }

    #[test]
    fn test_reset_from_every_state() {
        let mut manager = UploadManager::new();
        manager.reset_for(Some("1"));
        manager.pick(logo()).unwrap();
        manager.reset_for(Some("1"));
        assert_eq!(manager.state(), &UploadState::Idle);

        manager.pick(logo()).unwrap();
        let ticket = manager.begin().unwrap();
        manager.complete(
            &ticket,
            Err(UploadError::Transport("connection reset".into())),
        );
        assert!(matches!(manager.state(), UploadState::Error(_)));
        manager.reset_for(None);
        assert_eq!(manager.state(), &UploadState::Idle);
        assert_eq!(manager.company_id(), None);
    }

    #[tokio::test]
    async fn test_submit_rejected_keeps_detail_and_allows_repick() {
        let mut manager = UploadManager::new();
        manager.reset_for(Some("1"));
        manager.pick(logo()).unwrap();

        let uploader = FixedUploader(Err(UploadError::Rejected {
            status: 413,
            message: "Payload Too Large".into(),
        }));
        let result = manager.submit(&uploader).await;
        assert!(result.is_err());

        let view = manager.render();
        assert_eq!(view.state, "error");
        assert!(view.message.unwrap().contains("413"));

        manager.pick(LogoFile::new("small.png", vec![1])).unwrap();
        assert_eq!(manager.state().name(), "selected");
    }

    #[tokio::test]
    async fn test_submit_success() {
        let mut manager = UploadManager::new();
        manager.reset_for(Some("1"));
        manager.pick(logo()).unwrap();
        manager.submit(&FixedUploader(Ok(receipt()))).await.unwrap();
        assert_eq!(manager.state(), &UploadState::Success);
        assert_eq!(manager.render().message.as_deref(), Some("Logo uploaded"));
    }
}
