//! Progress tracking for concurrent resizes

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use tracing::debug;

/// Thread-safe progress tracker, optionally mirrored on a terminal bar
pub struct ProgressTracker {
    total: AtomicU64,
    completed: AtomicUsize,
    failed: AtomicUsize,
    start_time: Mutex<Option<Instant>>,
    bar: Option<ProgressBar>,
}

/// Snapshot of a batch in flight
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    pub total_files: u64,
    pub completed_files: usize,
    pub failed_files: usize,
    pub elapsed_time: Duration,
}

impl ProgressState {
    pub fn completion_percentage(&self) -> f64 {
        if self.total_files == 0 {
            return 100.0;
        }
        (self.completed_files + self.failed_files) as f64 / self.total_files as f64 * 100.0
    }
}

impl ProgressTracker {
    /// Create a new progress tracker
    pub fn new() -> Self {
        Self {
            total: AtomicU64::new(0),
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            start_time: Mutex::new(None),
            bar: None,
        }
    }

    /// Mirror progress on `bar`
    pub fn with_bar(mut self, bar: ProgressBar) -> Self {
        self.bar = Some(bar);
        self
    }

    /// Start tracking a batch of `total_files`
    pub fn start(&self, total_files: u64) {
        self.total.store(total_files, Ordering::SeqCst);
        self.completed.store(0, Ordering::SeqCst);
        self.failed.store(0, Ordering::SeqCst);
        if let Ok(mut start) = self.start_time.lock() {
            *start = Some(Instant::now());
        }
        if let Some(bar) = &self.bar {
            bar.set_length(total_files);
            bar.set_position(0);
        }
        debug!("Progress tracking started for {} files", total_files);
    }

    /// Record a settled job
    pub fn complete_file(&self, filename: &str, success: bool) {
        if success {
            self.completed.fetch_add(1, Ordering::SeqCst);
        } else {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(bar) = &self.bar {
            bar.set_message(filename.to_string());
            bar.inc(1);
        }
    }

    /// Close the terminal bar, if any
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn get_state(&self) -> ProgressState {
        let elapsed_time = self
            .start_time
            .lock()
            .ok()
            .and_then(|start| *start)
            .map(|start| start.elapsed())
            .unwrap_or_default();

        ProgressState {
            total_files: self.total.load(Ordering::SeqCst),
            completed_files: self.completed.load(Ordering::SeqCst),
            failed_files: self.failed.load(Ordering::SeqCst),
            elapsed_time,
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let tracker = ProgressTracker::new();
        tracker.start(4);
        tracker.complete_file("a.jpg", true);
        tracker.complete_file("b.jpg", true);
        tracker.complete_file("c.jpg", false);

        let state = tracker.get_state();
        assert_eq!(state.total_files, 4);
        assert_eq!(state.completed_files, 2);
        assert_eq!(state.failed_files, 1);
        assert!((state.completion_percentage() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_restart_resets_counts() {
        let tracker = ProgressTracker::new().with_bar(ProgressBar::hidden());
        tracker.start(1);
        tracker.complete_file("a.jpg", true);
        tracker.start(2);

        assert_eq!(tracker.get_state().completed_files, 0);
        tracker.finish();
    }

    #[test]
    fn test_empty_batch_is_complete() {
        let tracker = ProgressTracker::new();
        assert_eq!(tracker.get_state().completion_percentage(), 100.0);
    }
}
