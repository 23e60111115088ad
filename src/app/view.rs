//! Application view model

use std::fmt;

use crate::directory::Company;
use crate::embed::EmbedView;
use crate::sidebar::SidebarView;
use crate::upload::UploadView;

/// Everything a front-end needs to draw one frame of the app
#[derive(Debug, Clone, PartialEq)]
pub struct AppView {
    pub sidebar_open: bool,
    /// Persistent load-failure banner
    pub banner: Option<String>,
    pub sidebar: SidebarView,
    pub main: MainView,
}

impl AppView {
    /// Label of the sidebar toggle button
    pub fn toggle_label(&self) -> &'static str {
        if self.sidebar_open {
            "Close companies list"
        } else {
            "Open companies list"
        }
    }
}

/// Main content area
#[derive(Debug, Clone, PartialEq)]
pub enum MainView {
    /// Nothing but the banner
    Blank,
    Message(&'static str),
    Dashboard {
        company: Company,
        embed: EmbedView,
        upload: UploadView,
    },
}

impl MainView {
    pub const LOADING: &'static str = "Loading companies...";
    pub const PROMPT: &'static str = "Select a company to see their report.";
    pub const NO_COMPANIES: &'static str = "No companies available.";
}

impl fmt::Display for UploadView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.enabled {
            return write!(f, "Logo upload: select a company first");
        }
        write!(f, "Logo upload [{}]", self.state)?;
        if let Some(name) = &self.file_name {
            write!(f, " file={}", name)?;
        }
        if let Some(message) = &self.message {
            write!(f, " - {}", message)?;
        }
        let mut actions = Vec::new();
        if self.can_pick {
            actions.push("pick");
        }
        if self.can_confirm {
            actions.push("confirm");
        }
        if self.can_cancel {
            actions.push("cancel");
        }
        if !actions.is_empty() {
            write!(f, " (actions: {})", actions.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for AppView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.toggle_label())?;
        if let Some(banner) = &self.banner {
            writeln!(f, "!! {}", banner)?;
        }
        if self.sidebar_open {
            writeln!(f, "{}", self.sidebar)?;
            writeln!(f, "--")?;
        }
        match &self.main {
            MainView::Blank => Ok(()),
            MainView::Message(message) => write!(f, "{}", message),
            MainView::Dashboard {
                company,
                embed,
                upload,
            } => {
                writeln!(f, "# {} ({})", company.name, company.id)?;
                writeln!(f, "{}", embed)?;
                write!(f, "{}", upload)
            }
        }
    }
}
