//! Progress bar bridge for the engine's progress sink.

use indicatif::{ProgressBar, ProgressStyle};

use gsc_extract::ProgressSink;

/// Bar positions are scaled from the engine's [0, 1] estimate.
const SCALE: u64 = 1000;

pub fn extraction_bar(label: &str) -> ProgressBar {
    let bar = ProgressBar::new(SCALE);
    bar.set_style(
        ProgressStyle::with_template("{msg:32} [{bar:40.cyan/blue}] {percent:>3}%")
            .expect("static progress template parses")
            .progress_chars("##-"),
    );
    bar.set_message(format!("Extracting {label} data"));
    bar
}

/// Feeds engine progress into an indicatif bar.
pub struct BarSink {
    bar: ProgressBar,
}

impl BarSink {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl ProgressSink for BarSink {
    fn on_progress(&self, rows_fetched: usize, completion: f64) {
        self.bar.set_position((completion * SCALE as f64) as u64);
        self.bar.set_message(format!("{rows_fetched} rows fetched"));
    }
}
