//! Company Sidebar
//!
//! Search, sort and selection over the company directory.
//!
//! The visible list is never stored: [`visible_items`] derives it from
//! `(items, search_term, sort_key, sort_direction)` each time it is asked
//! for, borrowing from the source list without reordering it.

mod sort;
mod view;

pub use sort::{collation_key, compare_ids, compare_names, SortDirection, SortKey};
pub use view::{SidebarBody, SidebarRow, SidebarView};

use std::cmp::Ordering;

use crate::directory::{Company, SidebarItem};

/// Default sidebar heading
pub const DEFAULT_TITLE: &str = "Companies";

/// Viewport width classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width_px: u32,
    pub narrow_breakpoint_px: u32,
}

impl Viewport {
    pub fn new(width_px: u32, narrow_breakpoint_px: u32) -> Self {
        Self {
            width_px,
            narrow_breakpoint_px,
        }
    }

    pub fn is_narrow(&self) -> bool {
        self.width_px < self.narrow_breakpoint_px
    }
}

/// Inputs the sidebar reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarEvent {
    /// Replace the item set (after the directory loads)
    SetItems(Vec<SidebarItem>),
    SetLoading(bool),
    Search(String),
    SortBy(SortKey),
    SetDirection(SortDirection),
    ToggleDirection,
    /// User clicked an item
    Select(String),
}

/// What a sidebar event asks of its owner
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarOutput {
    Selected {
        company: Company,
        /// Narrow viewports collapse the sidebar after a pick
        collapse: bool,
    },
}

/// Sidebar state owner
#[derive(Debug, Clone)]
pub struct Sidebar {
    title: String,
    items: Vec<SidebarItem>,
    search_term: String,
    sort_key: SortKey,
    sort_direction: SortDirection,
    selected_id: Option<String>,
    loading: bool,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

impl Sidebar {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
            search_term: String::new(),
            sort_key: SortKey::default(),
            sort_direction: SortDirection::default(),
            selected_id: None,
            loading: false,
        }
    }

    pub fn items(&self) -> &[SidebarItem] {
        &self.items
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Apply one input
    ///
    /// Selecting an id that is not in the item set is ignored.
    pub fn apply(&mut self, event: SidebarEvent, viewport: Viewport) -> Option<SidebarOutput> {
        match event {
            SidebarEvent::SetItems(items) => {
                if let Some(id) = &self.selected_id {
                    if !items.iter().any(|item| &item.id == id) {
                        self.selected_id = None;
                    }
                }
                self.items = items;
                None
            }
            SidebarEvent::SetLoading(loading) => {
                self.loading = loading;
                None
            }
            SidebarEvent::Search(term) => {
                self.search_term = term;
                None
            }
            SidebarEvent::SortBy(key) => {
                self.sort_key = key;
                None
            }
            SidebarEvent::SetDirection(direction) => {
                self.sort_direction = direction;
                None
            }
            SidebarEvent::ToggleDirection => {
                self.sort_direction = self.sort_direction.toggled();
                None
            }
            SidebarEvent::Select(id) => {
                let company = self
                    .items
                    .iter()
                    .find(|item| item.id == id)
                    .map(|item| item.source_company.clone());

                match company {
                    Some(company) => {
                        self.selected_id = Some(id);
                        Some(SidebarOutput::Selected {
                            company,
                            collapse: viewport.is_narrow(),
                        })
                    }
                    None => {
                        tracing::warn!(company_id = %id, "Ignoring selection of unknown company");
                        None
                    }
                }
            }
        }
    }

    /// Mirror a selection made elsewhere (e.g. by the controller)
    pub fn mark_selected(&mut self, id: Option<&str>) {
        self.selected_id = id.map(str::to_string);
    }

    /// Current visible list
    pub fn visible(&self) -> Vec<&SidebarItem> {
        visible_items(
            &self.items,
            &self.search_term,
            self.sort_key,
            self.sort_direction,
        )
    }

    /// Render the sidebar view model
    pub fn render(&self) -> SidebarView {
        let visible = self.visible();
        let footer = if self.loading {
            "Loading companies...".to_string()
        } else {
            format!("{} of {} companies", visible.len(), self.items.len())
        };

        let body = if self.loading {
            SidebarBody::Loading
        } else if visible.is_empty() {
            SidebarBody::Empty
        } else {
            SidebarBody::Items(
                visible
                    .iter()
                    .map(|item| SidebarRow {
                        id: item.id.clone(),
                        name: item.name.clone(),
                        selected: self.selected_id.as_deref() == Some(item.id.as_str()),
                    })
                    .collect(),
            )
        };

        SidebarView {
            title: self.title.clone(),
            search_term: self.search_term.clone(),
            sort_key: self.sort_key,
            sort_direction: self.sort_direction,
            body,
            footer,
        }
    }
}

/// Case-insensitive substring match on the name
pub fn matches_search(item: &SidebarItem, search_term: &str) -> bool {
    search_term.is_empty() || item.name.to_lowercase().contains(&search_term.to_lowercase())
}

/// A visible item with its collation key computed once per derivation
struct Keyed<'a> {
    index: usize,
    item: &'a SidebarItem,
    name_key: String,
}

/// Same order as [`compare_names`], without refolding on every comparison
fn compare_keyed_names(a: &Keyed, b: &Keyed) -> Ordering {
    a.name_key
        .cmp(&b.name_key)
        .then_with(|| a.item.name.cmp(&b.item.name))
}

fn compare_items(key: SortKey, a: &Keyed, b: &Keyed) -> Ordering {
    let by_id = || compare_ids(&a.item.id, &b.item.id);
    match key {
        SortKey::Name => compare_keyed_names(a, b).then_with(by_id),
        SortKey::Id => by_id().then_with(|| compare_keyed_names(a, b)),
    }
}

/// Filter and sort without touching `items`
///
/// Ascending order is total (source position breaks remaining ties), and
/// descending is its exact reverse.
pub fn visible_items<'a>(
    items: &'a [SidebarItem],
    search_term: &str,
    sort_key: SortKey,
    sort_direction: SortDirection,
) -> Vec<&'a SidebarItem> {
    let mut visible: Vec<Keyed<'a>> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| matches_search(item, search_term))
        .map(|(index, item)| Keyed {
            index,
            item,
            name_key: collation_key(&item.name),
        })
        .collect();

    visible.sort_by(|a, b| compare_items(sort_key, a, b).then_with(|| a.index.cmp(&b.index)));

    if sort_direction == SortDirection::Desc {
        visible.reverse();
    }

    visible.into_iter().map(|k| k.item).collect()
}
