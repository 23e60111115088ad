//! Sort keys and comparison
//!
//! Name comparison folds case and accents so "Émile" sorts beside "emile";
//! id comparison is numeric, with non-numeric ids after all numeric ones.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Field the sidebar is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Id,
}

impl SortKey {
    /// Label shown in the sort selector
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Name => "Company Name",
            SortKey::Id => "Company ID",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "id" => Ok(SortKey::Id),
            other => Err(format!("unknown sort key '{}', expected name or id", other)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Name => write!(f, "name"),
            SortKey::Id => write!(f, "id"),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Tooltip of the toggle button: names the direction it switches to
    pub fn toggle_tooltip(&self) -> &'static str {
        match self {
            SortDirection::Asc => "Sort Descending",
            SortDirection::Desc => "Sort Ascending",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Case- and accent-folded form of a name
pub fn collation_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Locale-style name comparison; falls back to raw code points on ties
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn numeric_value(id: &str) -> Option<f64> {
    id.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric id comparison
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (numeric_value(a), numeric_value(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
