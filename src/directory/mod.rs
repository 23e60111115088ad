//! Company Directory
//!
//! Loads the company list once per session and normalizes the endpoint's
//! response into [`Company`] records.
//!
//! ## Accepted response shapes
//!
//! ```text
//! [ {company_id, company_name, looker_link}, ... ]              bare array
//! { "body": [ ... ] }                                          envelope
//! { "body": "[{\"company_id\": ...}]" }                        envelope, encoded
//! ```
//!
//! Anything else is a [`LoadError::Parse`].

mod company;
mod error;
mod loader;
mod normalize;

pub use company::{Company, SidebarItem};
pub use error::{LoadError, LoadResult};
pub use loader::{CompanySource, DataLoader, HttpCompanySource, LoadState};
pub use normalize::{normalize_payload, normalize_text};
