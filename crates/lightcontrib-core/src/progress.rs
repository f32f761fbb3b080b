//! Progress reporting for long-running scene operations

use tracing::info;

/// Consumer of a counted progress signal
pub trait ProgressSink {
    /// Work is about to start on `total` units
    fn begin(&mut self, total: usize, labels: &[String]);

    /// `completed` out of `total` units are done
    fn advance(&mut self, completed: usize, total: usize);

    /// All work has stopped, successfully or not
    fn finish(&mut self) {}
}

/// Discards progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn begin(&mut self, _total: usize, _labels: &[String]) {}

    fn advance(&mut self, _completed: usize, _total: usize) {}
}

/// Logs progress through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn begin(&mut self, total: usize, labels: &[String]) {
        info!(total, units = ?labels, "Rendering lights");
    }

    fn advance(&mut self, completed: usize, total: usize) {
        info!("Rendered {}/{}", completed, total);
    }
}

/// Records every progress signal, for tests and summaries
#[derive(Debug, Default, Clone)]
pub struct RecordingProgress {
    pub total: Option<usize>,
    pub labels: Vec<String>,
    pub steps: Vec<usize>,
    pub finished: bool,
}

impl ProgressSink for RecordingProgress {
    fn begin(&mut self, total: usize, labels: &[String]) {
        self.total = Some(total);
        self.labels = labels.to_vec();
    }

    fn advance(&mut self, completed: usize, _total: usize) {
        self.steps.push(completed);
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}
