//! Logo Upload
//!
//! Picking and submitting a logo image for the selected company.
//!
//! - **UploadState**: the `Idle → Selected → Uploading → Success | Error` machine
//! - **UploadManager**: binds the machine to the current selection
//! - **LogoUploader**: the endpoint, behind a trait so tests can stub it

mod client;
mod error;
mod file;
mod manager;
mod state;

pub use client::{HttpLogoUploader, LogoUploader, UploadReceipt};
pub use error::{UploadError, UploadResult};
pub use file::{content_type_for, LogoFile};
pub use manager::{UploadManager, UploadTicket, UploadView};
pub use state::{UploadEvent, UploadState};
