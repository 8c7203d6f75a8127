//! Integration tests for the pagination engine.
//!
//! These exercise the full fetch loop against the mock backend:
//! termination, ordering, progress, throttling, and fault isolation.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

use gsc_extract::testing::{rows, MockReportingClient};
use gsc_extract::{
    Dimension, DimensionSet, FetchError, FetchRequest, Fetcher, NoProgress, ProgressSink,
    ReportRow,
};

fn request(dimensions: DimensionSet) -> FetchRequest {
    FetchRequest::new(
        "sc-domain:example.com",
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        dimensions,
    )
}

fn fast_fetcher(row_limit: u32) -> Fetcher {
    Fetcher::new()
        .with_row_limit(row_limit)
        .with_throttle(Duration::ZERO)
}

/// Sink that records every update for later assertions.
#[derive(Default)]
struct RecordingSink {
    updates: Mutex<Vec<(usize, f64)>>,
}

impl RecordingSink {
    fn updates(&self) -> Vec<(usize, f64)> {
        self.updates.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn on_progress(&self, rows_fetched: usize, completion: f64) {
        self.updates
            .lock()
            .unwrap()
            .push((rows_fetched, completion));
    }
}

#[tokio::test]
async fn returns_every_row_in_page_order() {
    let client = MockReportingClient::new()
        .with_page(0, rows("/p", 0, 5))
        .with_page(5, rows("/p", 5, 5))
        .with_page(10, rows("/p", 10, 2));

    let outcome = fast_fetcher(5)
        .fetch(&client, &request(DimensionSet::pages()), &NoProgress)
        .await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.records.len(), 12);
    for (i, record) in outcome.records.iter().enumerate() {
        assert_eq!(record.keys(), &[format!("/p{i}")]);
    }

    let offsets: Vec<u32> = client.calls().iter().map(|c| c.start_row).collect();
    assert_eq!(offsets, vec![0, 5, 10]);
}

#[tokio::test]
async fn empty_first_page_issues_exactly_one_request() {
    let client = MockReportingClient::new();

    let outcome = fast_fetcher(5)
        .fetch(&client, &request(DimensionSet::queries()), &NoProgress)
        .await;

    assert!(outcome.is_complete());
    assert!(outcome.records.is_empty());
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn short_page_terminates_at_api_scale() {
    let client = MockReportingClient::new()
        .with_page(0, rows("/p", 0, 25_000))
        .with_page(25_000, rows("/p", 25_000, 3_000));

    let outcome = Fetcher::new()
        .with_throttle(Duration::ZERO)
        .fetch(&client, &request(DimensionSet::pages()), &NoProgress)
        .await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.records.len(), 28_000);

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].start_row, 0);
    assert_eq!(calls[1].start_row, 25_000);
}

#[tokio::test]
async fn exact_multiple_needs_a_trailing_empty_page() {
    // Two full pages; the short-page heuristic alone cannot see the end.
    let client = MockReportingClient::new()
        .with_page(0, rows("/p", 0, 4))
        .with_page(4, rows("/p", 4, 4));

    let outcome = fast_fetcher(4)
        .fetch(&client, &request(DimensionSet::pages()), &NoProgress)
        .await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.records.len(), 8);

    let offsets: Vec<u32> = client.calls().iter().map(|c| c.start_row).collect();
    assert_eq!(offsets, vec![0, 4, 8]);
}

#[tokio::test]
async fn joint_dimension_keys_map_positionally() {
    let row = ReportRow {
        keys: vec!["/x".to_string(), "shoe".to_string()],
        clicks: 7.0,
        impressions: 90.0,
        ctr: 0.0778,
        position: 1.8,
    };
    let client = MockReportingClient::new().with_page(0, vec![row]);

    let set = DimensionSet::pages_and_queries();
    let outcome = fast_fetcher(5)
        .fetch(&client, &request(set.clone()), &NoProgress)
        .await;

    assert!(outcome.is_complete());
    let record = &outcome.records[0];
    assert_eq!(record.value(&set, Dimension::Page), Some("/x"));
    assert_eq!(record.value(&set, Dimension::Query), Some("shoe"));
    assert_eq!(record.clicks, 7);
}

#[tokio::test]
async fn permission_denial_keeps_rows_from_prior_pages() {
    let client = MockReportingClient::new()
        .with_page(0, rows("/p", 0, 5))
        .deny_at(5);

    let outcome = fast_fetcher(5)
        .fetch(&client, &request(DimensionSet::pages()), &NoProgress)
        .await;

    assert_eq!(outcome.records.len(), 5);
    match outcome.fault {
        Some(FetchError::PermissionDenied { ref site }) => {
            assert_eq!(site, "sc-domain:example.com");
        }
        other => panic!("expected permission denial, got {other:?}"),
    }
}

#[tokio::test]
async fn transient_failure_keeps_rows_from_prior_pages() {
    let client = MockReportingClient::new()
        .with_page(0, rows("/p", 0, 5))
        .fail_at(5);

    let outcome = fast_fetcher(5)
        .fetch(&client, &request(DimensionSet::pages()), &NoProgress)
        .await;

    assert_eq!(outcome.records.len(), 5);
    assert!(matches!(outcome.fault, Some(FetchError::Request(_))));
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn malformed_row_aborts_with_partial_rows() {
    let bad_row = ReportRow {
        keys: vec!["/x".to_string(), "unexpected".to_string()],
        clicks: 1.0,
        impressions: 1.0,
        ctr: 1.0,
        position: 1.0,
    };
    let client = MockReportingClient::new()
        .with_page(0, rows("/p", 0, 3))
        .with_page(3, vec![bad_row]);

    let outcome = fast_fetcher(3)
        .fetch(&client, &request(DimensionSet::pages()), &NoProgress)
        .await;

    assert_eq!(outcome.records.len(), 3);
    assert!(matches!(
        outcome.fault,
        Some(FetchError::RowShape {
            expected: 1,
            got: 2
        })
    ));
}

#[tokio::test]
async fn refetching_yields_identical_sequences() {
    let client = MockReportingClient::new()
        .with_page(0, rows("/p", 0, 5))
        .with_page(5, rows("/p", 5, 3));
    let fetcher = fast_fetcher(5);
    let req = request(DimensionSet::pages());

    let first = fetcher.fetch(&client, &req, &NoProgress).await;
    let second = fetcher.fetch(&client, &req, &NoProgress).await;

    assert!(first.is_complete());
    assert!(second.is_complete());
    assert_eq!(first.records, second.records);

    let offsets: Vec<u32> = client.calls().iter().map(|c| c.start_row).collect();
    assert_eq!(offsets, vec![0, 5, 0, 5]);
}

#[tokio::test]
async fn throttle_pauses_between_pages() {
    let client = MockReportingClient::new()
        .with_page(0, rows("/p", 0, 2))
        .with_page(2, rows("/p", 2, 2));

    let fetcher = Fetcher::new()
        .with_row_limit(2)
        .with_throttle(Duration::from_millis(40));

    let start = Instant::now();
    let outcome = fetcher
        .fetch(&client, &request(DimensionSet::pages()), &NoProgress)
        .await;
    let elapsed = start.elapsed();

    assert!(outcome.is_complete());
    // Three requests, so two inter-page pauses.
    assert_eq!(client.call_count(), 3);
    assert!(elapsed >= Duration::from_millis(80), "no throttle: {elapsed:?}");
}

#[tokio::test]
async fn progress_is_monotone_and_ends_at_one() {
    let client = MockReportingClient::new()
        .with_page(0, rows("/p", 0, 4))
        .with_page(4, rows("/p", 4, 4))
        .with_page(8, rows("/p", 8, 1));
    let sink = RecordingSink::default();

    let outcome = fast_fetcher(4)
        .fetch(&client, &request(DimensionSet::pages()), &sink)
        .await;
    assert!(outcome.is_complete());

    let updates = sink.updates();
    assert_eq!(updates.len(), 3);
    assert_eq!(updates[0].0, 4);
    assert_eq!(updates[1].0, 8);
    assert_eq!(updates[2].0, 9);
    for pair in updates.windows(2) {
        assert!(pair[1].1 >= pair[0].1, "estimate decreased: {updates:?}");
    }
    assert!(updates.iter().all(|(_, c)| (0.0..=1.0).contains(c)));
    assert!((updates[2].1 - 1.0).abs() < f64::EPSILON);
    // Full pages stay below 1.0; the total is unknown until the end.
    assert!(updates[0].1 < 1.0);
}

#[tokio::test]
async fn cancellation_is_checked_between_pages() {
    let token = CancellationToken::new();
    let client = MockReportingClient::new().with_page(0, rows("/p", 0, 2));

    let fetcher = Fetcher::new()
        .with_row_limit(2)
        .with_throttle(Duration::ZERO)
        .with_cancellation(token.clone());

    // Cancel once the first page reports progress.
    let sink = move |_rows: usize, _completion: f64| token.cancel();

    let outcome = fetcher
        .fetch(&client, &request(DimensionSet::pages()), &sink)
        .await;

    assert_eq!(outcome.records.len(), 2);
    assert!(matches!(outcome.fault, Some(FetchError::Cancelled)));
    assert_eq!(client.call_count(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// For any total row count and ceiling, the engine returns exactly
    /// the upstream rows, in order, with the expected request count.
    #[test]
    fn completeness_for_any_paging_shape(total in 0usize..120, limit in 1u32..20) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (got, calls) = rt.block_on(async {
            let mut client = MockReportingClient::new();
            let mut offset = 0usize;
            while offset < total {
                let page = (total - offset).min(limit as usize);
                client = client.with_page(offset as u32, rows("/p", offset, page));
                offset += page;
            }

            let outcome = fast_fetcher(limit)
                .fetch(&client, &request(DimensionSet::pages()), &NoProgress)
                .await;
            prop_assert!(outcome.is_complete());
            Ok((outcome.records, client.call_count()))
        })?;

        prop_assert_eq!(got.len(), total);
        for (i, record) in got.iter().enumerate() {
            prop_assert_eq!(record.keys(), &[format!("/p{i}")]);
        }

        // A trailing short page terminates on its own; an exact multiple
        // costs one extra empty-page probe. Either way the request count
        // is the full-page count plus one.
        let expected_calls = if total == 0 {
            1
        } else {
            total / limit as usize + 1
        };
        prop_assert_eq!(calls, expected_calls);
    }
}
