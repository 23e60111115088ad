//! Sidebar view model

use std::fmt;

use super::sort::{SortDirection, SortKey};

/// Search box placeholder
pub const SEARCH_PLACEHOLDER: &str = "Search companies...";

/// Rendered sidebar
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarView {
    pub title: String,
    pub search_term: String,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub body: SidebarBody,
    pub footer: String,
}

/// List area; loading and "no results" are distinct states
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarBody {
    Loading,
    Empty,
    Items(Vec<SidebarRow>),
}

impl SidebarBody {
    /// Placeholder message, if the list has no rows to show
    pub fn message(&self) -> Option<&'static str> {
        match self {
            SidebarBody::Loading => Some("Loading companies..."),
            SidebarBody::Empty => Some("No companies found"),
            SidebarBody::Items(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SidebarRow {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

impl fmt::Display for SidebarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        if self.search_term.is_empty() {
            writeln!(f, "[{}]", SEARCH_PLACEHOLDER)?;
        } else {
            writeln!(f, "[search: {}]", self.search_term)?;
        }
        let arrow = match self.sort_direction {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        };
        writeln!(
            f,
            "Sort: {} {} ({})",
            self.sort_key.label(),
            arrow,
            self.sort_direction.toggle_tooltip()
        )?;

        match &self.body {
            SidebarBody::Items(rows) => {
                for row in rows {
                    let marker = if row.selected { '>' } else { ' ' };
                    writeln!(f, "{} {:>6}  {}", marker, row.id, row.name)?;
                }
            }
            other => {
                writeln!(f, "  {}", other.message().unwrap_or_default())?;
            }
        }

        write!(f, "{}", self.footer)
    }
}
