//! Event loop driver
//!
//! Runs the controller on a single task. Network work is spawned and
//! reports back through the same event channel as user input, so every
//! state change happens in [`App::dispatch`], one event at a time.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::upload::LogoUploader;

use super::controller::{AppController, AppEvent, Command};
use super::error::ActionError;
use super::view::AppView;

/// Cloneable sender for posting events from front-end code
#[derive(Clone)]
pub struct AppHandle {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl AppHandle {
    /// Post an event; false once the app is gone
    pub fn send(&self, event: AppEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

pub struct App {
    controller: AppController,
    uploader: Arc<dyn LogoUploader>,
    tx: mpsc::UnboundedSender<AppEvent>,
    rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(controller: AppController, uploader: Arc<dyn LogoUploader>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller,
            uploader,
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> AppHandle {
        AppHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn controller(&self) -> &AppController {
        &self.controller
    }

    pub fn render(&self) -> AppView {
        self.controller.render()
    }

    /// Issue the session's company fetch; later calls do nothing
    pub fn start(&mut self) {
        let Some(source) = self.controller.begin_load() else {
            return;
        };
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.fetch().await;
            // Receiver gone means the app was torn down; the result is stale
            let _ = tx.send(AppEvent::LoadFinished(result));
        });
    }

    /// Apply an event and carry out the resulting command
    ///
    /// Returns a URL when the front-end should open it in a new browsing context.
    pub fn dispatch(&mut self, event: AppEvent) -> Result<Option<String>, ActionError> {
        match self.controller.apply(event)? {
            Some(Command::StartUpload(ticket)) => {
                let uploader = Arc::clone(&self.uploader);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = uploader.upload(&ticket.company_id, &ticket.file).await;
                    let _ = tx.send(AppEvent::UploadFinished { ticket, result });
                });
                Ok(None)
            }
            Some(Command::OpenExternal(url)) => {
                tracing::info!(url = %url, "Opening dashboard externally");
                Ok(Some(url))
            }
            None => Ok(None),
        }
    }

    /// Wait for the next event: posted input, task results, or a policy report
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        tokio::select! {
            event = self.rx.recv() => event,
            Some(violation) = self.controller.next_violation() => {
                Some(AppEvent::PolicyViolation(violation))
            }
        }
    }

    /// Wait for one event and dispatch it
    pub async fn step(&mut self) -> Option<Result<Option<String>, ActionError>> {
        let event = self.next_event().await?;
        Some(self.dispatch(event))
    }

    /// Release the dashboard's listeners
    pub fn shutdown(mut self) {
        self.controller.shutdown();
    }
}
