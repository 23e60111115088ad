//! Dashboard view model

use serde::Serialize;
use std::fmt;

use super::frame::MountId;

/// Sandbox tokens granted to embedded content: scripts and same-origin only
pub const FRAME_SANDBOX: &str = "allow-scripts allow-same-origin";

/// Sandboxed frame to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSpec {
    pub mount_id: MountId,
    pub src: String,
    pub title: String,
    pub sandbox: &'static str,
    pub allow_fullscreen: bool,
}

impl FrameSpec {
    pub fn new(mount_id: MountId, src: &str, title: &str) -> Self {
        Self {
            mount_id,
            src: src.to_string(),
            title: title.to_string(),
            sandbox: FRAME_SANDBOX,
            allow_fullscreen: true,
        }
    }
}

/// Action that opens the unmodified dashboard link in a new browsing context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalLink {
    pub url: String,
    pub label: String,
    pub new_context: bool,
    pub rel: &'static str,
}

impl ExternalLink {
    pub fn new(url: &str, label: &str) -> Self {
        Self {
            url: url.to_string(),
            label: label.to_string(),
            new_context: true,
            rel: "noopener noreferrer",
        }
    }
}

/// Rendered dashboard area
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EmbedView {
    /// Frame mounted behind a blocking loading indicator
    Loading { frame: FrameSpec },
    Ready {
        frame: FrameSpec,
        external: ExternalLink,
    },
    /// Shown in place of the frame
    Error {
        message: String,
        detail: String,
        blocked: bool,
        external: ExternalLink,
    },
}

impl EmbedView {
    pub fn external(&self) -> Option<&ExternalLink> {
        match self {
            EmbedView::Loading { .. } => None,
            EmbedView::Ready { external, .. } | EmbedView::Error { external, .. } => Some(external),
        }
    }
}

impl fmt::Display for EmbedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedView::Loading { frame } => {
                writeln!(f, "<frame #{} src={} sandbox=\"{}\">", frame.mount_id, frame.src, frame.sandbox)?;
                write!(f, "  Loading dashboard...")
            }
            EmbedView::Ready { frame, external } => {
                writeln!(f, "<frame #{} src={} sandbox=\"{}\">", frame.mount_id, frame.src, frame.sandbox)?;
                write!(f, "  [{}] {}", external.label, external.url)
            }
            EmbedView::Error {
                message,
                detail,
                external,
                ..
            } => {
                writeln!(f, "  ! {}", message)?;
                writeln!(f, "    {}", detail)?;
                write!(f, "  [{}] {}", external.label, external.url)
            }
        }
    }
}
