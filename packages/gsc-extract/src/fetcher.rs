//! The paginated fetch engine.
//!
//! The reporting API caps every response at a fixed row ceiling and
//! offers no continuation token, only a client-maintained numeric
//! offset. Exhaustive extraction therefore walks that offset page by
//! page and detects completion from a short or empty page. One generic
//! loop, parameterized by dimension set, serves every breakdown.

use std::time::Duration;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::traits::progress::ProgressSink;
use crate::traits::reporting::{PageQuery, ReportRow, ReportingClient};
use crate::types::dimensions::DimensionSet;
use crate::types::record::Record;

/// The API's own maximum rows per response.
pub const MAX_ROWS_PER_PAGE: u32 = 25_000;

/// Default pause between successive page requests. The upstream
/// enforces request-rate quotas that would otherwise abort the session.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(500);

/// Parameters for one extraction run.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Property identifier, e.g. `sc-domain:example.com`.
    pub site: String,
    /// Inclusive start of the reporting window.
    pub start_date: NaiveDate,
    /// Inclusive end of the reporting window.
    pub end_date: NaiveDate,
    /// Breakdown axes for this run.
    pub dimensions: DimensionSet,
}

impl FetchRequest {
    pub fn new(
        site: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        dimensions: DimensionSet,
    ) -> Self {
        Self {
            site: site.into(),
            start_date,
            end_date,
            dimensions,
        }
    }
}

/// Everything a fetch session produced.
///
/// Rows accumulated before a failing page are always returned; `fault`
/// carries the failure for that page, if any. Callers wanting
/// all-or-nothing semantics can use [`FetchOutcome::into_result`].
#[derive(Debug)]
pub struct FetchOutcome {
    pub records: Vec<Record>,
    pub fault: Option<FetchError>,
}

impl FetchOutcome {
    /// True when the session ran to exhaustion without a fault.
    pub fn is_complete(&self) -> bool {
        self.fault.is_none()
    }

    /// All-or-nothing view: the records on success, the fault otherwise.
    pub fn into_result(self) -> Result<Vec<Record>, FetchError> {
        match self.fault {
            Some(fault) => Err(fault),
            None => Ok(self.records),
        }
    }
}

/// Drives bounded queries against a reporting backend until the result
/// set is exhausted.
///
/// The engine issues one request at a time, appends each page's decoded
/// records, and stops on the first empty or short page. Any request
/// error aborts the session immediately; there is no retry.
#[derive(Debug, Clone)]
pub struct Fetcher {
    row_limit: u32,
    throttle: Duration,
    cancel: Option<CancellationToken>,
}

impl Fetcher {
    /// Engine with the API-maximum page size and the default throttle.
    /// Requesting the largest allowed page minimizes round-trips.
    pub fn new() -> Self {
        Self {
            row_limit: MAX_ROWS_PER_PAGE,
            throttle: DEFAULT_THROTTLE,
            cancel: None,
        }
    }

    /// Override the per-request row ceiling.
    pub fn with_row_limit(mut self, row_limit: u32) -> Self {
        self.row_limit = row_limit;
        self
    }

    /// Override the inter-page pause. `Duration::ZERO` disables it.
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Observe a caller-supplied cancellation signal. The token is
    /// checked once per iteration boundary.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fetch every row for one site, date range, and dimension set.
    ///
    /// Progress is reported after each page. The loop terminates on an
    /// empty page, a short page, a fault, or cancellation; each
    /// iteration otherwise strictly advances the row offset.
    pub async fn fetch<C>(
        &self,
        client: &C,
        request: &FetchRequest,
        progress: &dyn ProgressSink,
    ) -> FetchOutcome
    where
        C: ReportingClient + ?Sized,
    {
        let mut session = Session::new();
        info!(
            site = %request.site,
            dimensions = %request.dimensions,
            start = %request.start_date,
            end = %request.end_date,
            "starting extraction"
        );

        loop {
            if let Some(token) = &self.cancel {
                if token.is_cancelled() {
                    warn!(rows = session.offset(), "extraction cancelled");
                    return session.abort(FetchError::Cancelled);
                }
            }

            // Cooperative throttle between pages, not before the first.
            if session.offset() > 0 {
                tokio::time::sleep(self.throttle).await;
            }

            let query = PageQuery {
                start_date: request.start_date,
                end_date: request.end_date,
                dimensions: request.dimensions.clone(),
                row_limit: self.row_limit,
                start_row: session.offset() as u32,
            };

            let rows = match client.query(&request.site, &query).await {
                Ok(rows) => rows,
                Err(err) => {
                    warn!(
                        site = %request.site,
                        offset = session.offset(),
                        error = %err,
                        "page request failed"
                    );
                    return session.abort(err.into());
                }
            };

            if rows.is_empty() {
                session.finish(progress);
                break;
            }

            let page_size = rows.len();
            for row in rows {
                match decode_row(row, &request.dimensions) {
                    Ok(record) => session.push(record),
                    Err(err) => {
                        warn!(site = %request.site, error = %err, "row decode failed");
                        return session.abort(err);
                    }
                }
            }

            let exhausted = page_size < self.row_limit as usize;
            session.report(progress, page_size, self.row_limit, exhausted);
            debug!(
                rows = page_size,
                total = session.offset(),
                exhausted,
                "page fetched"
            );

            if exhausted {
                break;
            }
        }

        info!(site = %request.site, rows = session.offset(), "extraction complete");
        session.complete()
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Transient state for one extraction run.
///
/// The accumulated record count doubles as the row offset for the next
/// query, which keeps the offset/accumulator invariant structural.
struct Session {
    records: Vec<Record>,
    best_estimate: f64,
}

impl Session {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            best_estimate: 0.0,
        }
    }

    fn offset(&self) -> usize {
        self.records.len()
    }

    fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Report progress for a non-empty page. The estimate is capped
    /// below 1.0 until exhaustion (the true total is unknown until the
    /// last page) and folded through a running maximum so the reported
    /// sequence never decreases.
    fn report(
        &mut self,
        progress: &dyn ProgressSink,
        page_size: usize,
        row_limit: u32,
        exhausted: bool,
    ) {
        let estimate = if exhausted {
            1.0
        } else {
            (page_size as f64 / f64::from(row_limit)).min(0.9)
        };
        self.best_estimate = self.best_estimate.max(estimate);
        progress.on_progress(self.offset(), self.best_estimate);
    }

    /// Report the terminal update for an empty page.
    fn finish(&mut self, progress: &dyn ProgressSink) {
        self.best_estimate = 1.0;
        progress.on_progress(self.offset(), 1.0);
    }

    fn abort(self, fault: FetchError) -> FetchOutcome {
        FetchOutcome {
            records: self.records,
            fault: Some(fault),
        }
    }

    fn complete(self) -> FetchOutcome {
        FetchOutcome {
            records: self.records,
            fault: None,
        }
    }
}

/// Decode one raw row, assigning each key positionally to the
/// corresponding dimension.
fn decode_row(row: ReportRow, dimensions: &DimensionSet) -> Result<Record, FetchError> {
    let expected = dimensions.dimensions().len();
    if row.keys.len() != expected {
        return Err(FetchError::RowShape {
            expected,
            got: row.keys.len(),
        });
    }
    Ok(Record::new(
        row.keys,
        row.clicks.round() as u64,
        row.impressions.round() as u64,
        row.ctr,
        row.position,
    ))
}
