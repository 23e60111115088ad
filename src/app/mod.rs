//! Application Orchestration
//!
//! ## Architecture
//!
//! - **AppController**: owns the selection and resets dependent state on change
//! - **App**: async driver feeding events to the controller one at a time
//! - **AppView**: snapshot for rendering
//!
//! ## Data Flow
//!
//! 1. `App::start` issues the single company fetch
//! 2. The result arrives as `AppEvent::LoadFinished` and fills the sidebar
//! 3. Sidebar selection mounts the dashboard and rebinds the upload manager
//! 4. Uploads and policy reports come back as further events

mod controller;
mod error;
mod runtime;
mod view;

pub use controller::{AppController, AppEvent, AppSettings, Command};
pub use error::ActionError;
pub use runtime::{App, AppHandle};
pub use view::{AppView, MainView};
