//! Decoded analytics records and export-ready tables.

use serde::{Deserialize, Serialize};

use super::dimensions::{Dimension, DimensionSet};

/// One decoded analytics row.
///
/// Dimension values are stored positionally, in the order of the
/// [`DimensionSet`] the row was fetched under. Records are immutable
/// once decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    keys: Vec<String>,
    /// Click count for this key combination.
    pub clicks: u64,
    /// Impression count for this key combination.
    pub impressions: u64,
    /// Click-through rate, a fraction in [0, 1].
    pub ctr: f64,
    /// Average position, a 1-based rank.
    pub position: f64,
}

impl Record {
    pub fn new(keys: Vec<String>, clicks: u64, impressions: u64, ctr: f64, position: f64) -> Self {
        Self {
            keys,
            clicks,
            impressions,
            ctr,
            position,
        }
    }

    /// Dimension values, in set order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Value for one dimension, resolved through the set that produced
    /// this record.
    pub fn value(&self, set: &DimensionSet, dim: Dimension) -> Option<&str> {
        set.position(dim)
            .and_then(|i| self.keys.get(i))
            .map(String::as_str)
    }
}

/// A fully extracted dataset for one dimension set.
///
/// This is the shape handed to export sinks: a header row derived from
/// the dimension set followed by one stringified row per record. The
/// engine itself never serializes; callers pick the file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    dimensions: DimensionSet,
    records: Vec<Record>,
}

impl ReportTable {
    pub fn new(dimensions: DimensionSet, records: Vec<Record>) -> Self {
        Self {
            dimensions,
            records,
        }
    }

    pub fn dimensions(&self) -> &DimensionSet {
        &self.dimensions
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column headers: one per dimension, then the four metrics.
    pub fn headers(&self) -> Vec<&'static str> {
        let mut headers: Vec<&'static str> = self
            .dimensions
            .dimensions()
            .iter()
            .map(|d| d.column_name())
            .collect();
        headers.extend(["clicks", "impressions", "ctr", "position"]);
        headers
    }

    /// Rows as strings, aligned with [`ReportTable::headers`].
    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.records.iter().map(|record| {
            let mut row: Vec<String> = record.keys().to_vec();
            row.push(record.clicks.to_string());
            row.push(record.impressions.to_string());
            row.push(record.ctr.to_string());
            row.push(record.position.to_string());
            row
        })
    }
}
