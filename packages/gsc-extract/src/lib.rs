//! Search-analytics extraction engine.
//!
//! The Search Console reporting API silently caps every response at a
//! fixed row ceiling and paginates by a client-maintained row offset,
//! with no server-side continuation token. This crate implements the
//! loop that walks that offset to completion: one generic engine,
//! parameterized by dimension set, in place of a hand-written copy of
//! the algorithm per breakdown.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gsc_extract::{DimensionSet, FetchRequest, Fetcher, NoProgress};
//!
//! let fetcher = Fetcher::new();
//! let request = FetchRequest::new("sc-domain:example.com", start, end, DimensionSet::pages());
//!
//! let outcome = fetcher.fetch(&client, &request, &NoProgress).await;
//! println!("{} rows", outcome.records.len());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Reporting-backend and progress-sink seams
//! - [`types`] - Dimensions, records, and export-ready tables
//! - [`fetcher`] - The pagination engine
//! - [`testing`] - Mock backend for tests

pub mod error;
pub mod fetcher;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{FetchError, ReportError, ReportResult};
pub use fetcher::{FetchOutcome, FetchRequest, Fetcher, DEFAULT_THROTTLE, MAX_ROWS_PER_PAGE};
pub use traits::{
    progress::{NoProgress, ProgressSink},
    reporting::{PageQuery, ReportRow, ReportingClient},
};
pub use types::{
    dimensions::{Dimension, DimensionSet},
    record::{Record, ReportTable},
};
