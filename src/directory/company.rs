//! Directory records

use serde::Serialize;

/// A directory entry with a link to its external analytics dashboard
///
/// Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub dashboard_link: String,
}

impl Company {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        dashboard_link: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dashboard_link: dashboard_link.into(),
        }
    }
}

/// Read-only sidebar projection of a [`Company`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarItem {
    pub id: String,
    pub name: String,
    pub source_company: Company,
}

impl From<&Company> for SidebarItem {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id.clone(),
            name: company.name.clone(),
            source_company: company.clone(),
        }
    }
}

impl SidebarItem {
    /// Project a company list, preserving order
    pub fn project(companies: &[Company]) -> Vec<SidebarItem> {
        companies.iter().map(SidebarItem::from).collect()
    }
}
