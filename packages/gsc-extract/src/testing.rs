//! Testing utilities including a mock reporting backend.
//!
//! Useful for testing drivers of the extraction engine without a
//! network or real credentials.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{ReportError, ReportResult};
use crate::traits::reporting::{PageQuery, ReportRow, ReportingClient};

/// A mock reporting backend for tests.
///
/// Pages are scripted by start offset, so repeated fetches against the
/// same mock return identical data. Unscripted offsets yield an empty
/// page, which is exactly how the real API signals exhaustion.
#[derive(Default)]
pub struct MockReportingClient {
    /// Scripted pages by start offset.
    pages: Arc<RwLock<HashMap<u32, Vec<ReportRow>>>>,

    /// Sites every query is denied for.
    denied_sites: Arc<RwLock<Vec<String>>>,

    /// Scripted failures by start offset.
    failures: Arc<RwLock<HashMap<u32, ScriptedFailure>>>,

    /// Call tracking for assertions.
    calls: Arc<RwLock<Vec<RecordedQuery>>>,
}

#[derive(Debug, Clone, Copy)]
enum ScriptedFailure {
    Transient,
    PermissionDenied,
}

/// Record of one query received by the mock.
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    pub site: String,
    pub start_row: u32,
    pub row_limit: u32,
    pub dimension_count: usize,
}

impl MockReportingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the page returned for a given start offset.
    pub fn with_page(self, start_row: u32, rows: Vec<ReportRow>) -> Self {
        self.pages.write().unwrap().insert(start_row, rows);
        self
    }

    /// Deny permission for a site; every query against it fails.
    pub fn deny_site(self, site: impl Into<String>) -> Self {
        self.denied_sites.write().unwrap().push(site.into());
        self
    }

    /// Fail the query at a given start offset with a transient error.
    pub fn fail_at(self, start_row: u32) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(start_row, ScriptedFailure::Transient);
        self
    }

    /// Fail the query at a given start offset with a permission error.
    pub fn deny_at(self, start_row: u32) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(start_row, ScriptedFailure::PermissionDenied);
        self
    }

    /// All queries received, in order.
    pub fn calls(&self) -> Vec<RecordedQuery> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl ReportingClient for MockReportingClient {
    async fn query(&self, site: &str, query: &PageQuery) -> ReportResult<Vec<ReportRow>> {
        self.calls.write().unwrap().push(RecordedQuery {
            site: site.to_string(),
            start_row: query.start_row,
            row_limit: query.row_limit,
            dimension_count: query.dimensions.dimensions().len(),
        });

        if self.denied_sites.read().unwrap().iter().any(|s| s == site) {
            return Err(ReportError::PermissionDenied {
                site: site.to_string(),
            });
        }

        if let Some(failure) = self.failures.read().unwrap().get(&query.start_row) {
            return Err(match failure {
                ScriptedFailure::Transient => {
                    ReportError::Request("mock transient failure".into())
                }
                ScriptedFailure::PermissionDenied => ReportError::PermissionDenied {
                    site: site.to_string(),
                },
            });
        }

        let mut rows = self
            .pages
            .read()
            .unwrap()
            .get(&query.start_row)
            .cloned()
            .unwrap_or_default();
        rows.truncate(query.row_limit as usize);
        Ok(rows)
    }
}

/// Build `count` single-key rows with deterministic values, keyed
/// `{prefix}{start}` through `{prefix}{start + count - 1}`.
pub fn rows(prefix: &str, start: usize, count: usize) -> Vec<ReportRow> {
    (start..start + count)
        .map(|i| ReportRow {
            keys: vec![format!("{prefix}{i}")],
            clicks: 2.0,
            impressions: 10.0,
            ctr: 0.2,
            position: 3.5,
        })
        .collect()
}
