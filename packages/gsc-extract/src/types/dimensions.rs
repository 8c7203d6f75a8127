//! Breakdown dimensions for analytics reports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A categorical breakdown axis for analytics rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Destination page URL.
    Page,
    /// Search query the impression was served for.
    Query,
}

impl Dimension {
    /// Wire name used by the reporting API.
    pub fn api_name(self) -> &'static str {
        match self {
            Dimension::Page => "page",
            Dimension::Query => "query",
        }
    }

    /// Column header used in exported tables.
    pub fn column_name(self) -> &'static str {
        self.api_name()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// An ordered, non-empty set of breakdown dimensions.
///
/// Order is significant: it fixes the position of each key inside a
/// decoded record's key list, and therefore the column order of the
/// exported table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimensionSet {
    dims: Vec<Dimension>,
}

impl DimensionSet {
    /// Breakdown by destination page only.
    pub fn pages() -> Self {
        Self {
            dims: vec![Dimension::Page],
        }
    }

    /// Breakdown by search query only.
    pub fn queries() -> Self {
        Self {
            dims: vec![Dimension::Query],
        }
    }

    /// Joint breakdown by page and query, in that order.
    pub fn pages_and_queries() -> Self {
        Self {
            dims: vec![Dimension::Page, Dimension::Query],
        }
    }

    /// Build a custom set. Returns `None` for an empty list, which the
    /// reporting API rejects.
    pub fn new(dims: Vec<Dimension>) -> Option<Self> {
        if dims.is_empty() {
            None
        } else {
            Some(Self { dims })
        }
    }

    /// The dimensions, in key order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dims
    }

    /// Position of a dimension within the set.
    pub fn position(&self, dim: Dimension) -> Option<usize> {
        self.dims.iter().position(|d| *d == dim)
    }

    /// Wire names, in key order.
    pub fn api_names(&self) -> Vec<&'static str> {
        self.dims.iter().map(|d| d.api_name()).collect()
    }
}

impl fmt::Display for DimensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            fmt::Display::fmt(dim, f)?;
        }
        Ok(())
    }
}
