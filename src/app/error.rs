//! Refused user actions

use thiserror::Error;

use crate::upload::UploadError;

/// An action the controller would not perform
///
/// None of these change state; the view stays as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Unknown company: {0}")]
    UnknownCompany(String),

    #[error("No dashboard is shown")]
    NoDashboard,
}
