//! # Clientboard
//!
//! Client dashboard directory - browse a directory of companies and view each
//! company's embedded analytics report inline, with a logo upload workflow.
//!
//! ## Features
//!
//! - **Directory**: one-shot company fetch tolerant of three response shapes
//! - **Sidebar**: case-insensitive search, name/id sorting, selection
//! - **Embedding**: viewer → embed link rewriting, sandboxed frames, and a
//!   distinct fallback when a security policy blocks the provider
//! - **Uploads**: a small state machine bound to the selected company
//!
//! ## Modules
//!
//! - [`directory`]: company records, normalization and loading
//! - [`sidebar`]: filtered/sorted projection of the directory
//! - [`embed`]: dashboard frames and the policy-violation bus
//! - [`upload`]: logo upload state machine and endpoint client
//! - [`app`]: controller owning the selection, plus its event loop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clientboard::app::{App, AppController, AppEvent, AppSettings};
//! use clientboard::directory::HttpCompanySource;
//! use clientboard::embed::PolicyBus;
//! use clientboard::upload::HttpLogoUploader;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let timeout = Duration::from_secs(30);
//!     let source = Arc::new(HttpCompanySource::new("https://example.com/companies", timeout)?);
//!     let uploader = Arc::new(HttpLogoUploader::new("https://example.com/upload", timeout)?);
//!
//!     let controller = AppController::new(AppSettings::default(), source, PolicyBus::default());
//!     let mut app = App::new(controller, uploader);
//!
//!     // Fetch the directory, then show the first company's dashboard
//!     app.start();
//!     app.step().await;
//!     if let Some(first) = app.controller().companies().first().cloned() {
//!         app.dispatch(AppEvent::SelectCompany(first.id))?;
//!     }
//!     println!("{}", app.render());
//!
//!     app.shutdown();
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod directory;
pub mod embed;
pub mod logging;
pub mod sidebar;
pub mod upload;

// Re-export top-level types for convenience
pub use app::{ActionError, App, AppController, AppEvent, AppHandle, AppSettings, AppView, Command, MainView};

pub use directory::{Company, CompanySource, DataLoader, HttpCompanySource, LoadError, LoadState, SidebarItem};

pub use sidebar::{Sidebar, SidebarEvent, SidebarOutput, SidebarView, SortDirection, SortKey, Viewport};

pub use embed::{
    DashboardEmbed, EmbedError, EmbedRule, EmbedState, EmbedView, FrameEvent, PolicyBus,
    PolicyViolation,
};

pub use upload::{
    HttpLogoUploader, LogoFile, LogoUploader, UploadError, UploadManager, UploadState, UploadView,
};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig};
