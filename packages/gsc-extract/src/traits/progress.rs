//! Progress reporting seam.
//!
//! The engine pushes (rows-so-far, completion estimate) through a sink
//! after every page instead of mutating any presentation state itself,
//! so the same loop can feed a terminal bar, a log line, or nothing.

/// Observer for incremental fetch progress.
///
/// Purely observational: the engine never waits on the sink, and the
/// sink cannot apply backpressure.
pub trait ProgressSink: Send + Sync {
    /// Called after every iteration. `completion` is monotonically
    /// non-decreasing within a session, stays in [0, 1], and is exactly
    /// 1.0 once the session is exhausted.
    fn on_progress(&self, rows_fetched: usize, completion: f64);
}

/// Sink that discards all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _rows_fetched: usize, _completion: f64) {}
}

impl<F> ProgressSink for F
where
    F: Fn(usize, f64) + Send + Sync,
{
    fn on_progress(&self, rows_fetched: usize, completion: f64) {
        self(rows_fetched, completion);
    }
}
