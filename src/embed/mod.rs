//! Dashboard Embedding
//!
//! Shows a company's external report inline in a sandboxed frame.
//!
//! ## Architecture
//!
//! - **EmbedRule**: rewrites a shareable report link into its embeddable form
//! - **PolicyBus**: process-wide channel of security-policy violation reports
//! - **DashboardEmbed**: one mounted frame and its `Loading → Ready | Blocked | Failed` state
//!
//! Blocked and failed frames both fall back to opening the original link in
//! a new browsing context.

mod error;
mod frame;
mod policy;
mod url;
mod view;

pub use error::EmbedError;
pub use frame::{DashboardEmbed, EmbedState, FrameEvent, MountId};
pub use policy::{host_matches, link_host, PolicyBus, PolicySubscription, PolicyViolation, SubscriptionId};
pub use url::{EmbedRule, EmbedRuleError};
pub use view::{EmbedView, ExternalLink, FrameSpec, FRAME_SANDBOX};
