//! Scan progress reporting.

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Number of files examined so far.
    pub files_scanned: u64,
    /// Number of directories examined so far.
    pub dirs_scanned: u64,
    /// Number of files kept so far.
    pub files_included: u64,
    /// Most recently examined path.
    pub current_path: PathBuf,
    /// Number of warnings so far.
    pub warnings_count: u64,
    /// Time elapsed since the scan started.
    pub elapsed: Duration,
    /// Whether this is the final update of the scan.
    pub finished: bool,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            files_scanned: 0,
            dirs_scanned: 0,
            files_included: 0,
            current_path: PathBuf::new(),
            warnings_count: 0,
            elapsed: Duration::ZERO,
            finished: false,
        }
    }

    /// Calculate scan rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_scanned as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Get total items examined (files + dirs).
    pub fn total_items(&self) -> u64 {
        self.files_scanned + self.dirs_scanned
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Running counters for one scan.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    files_scanned: u64,
    dirs_scanned: u64,
    files_included: u64,
    warnings_count: u64,
    current_path: PathBuf,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            files_scanned: 0,
            dirs_scanned: 0,
            files_included: 0,
            warnings_count: 0,
            current_path: PathBuf::new(),
        }
    }

    /// Record an examined file; returns the running file count.
    pub fn record_file(&mut self, included: bool) -> u64 {
        self.files_scanned += 1;
        if included {
            self.files_included += 1;
        }
        self.files_scanned
    }

    pub fn record_dir(&mut self) {
        self.dirs_scanned += 1;
    }

    pub fn set_warnings(&mut self, count: usize) {
        self.warnings_count = count as u64;
    }

    pub fn set_current_path(&mut self, path: PathBuf) {
        self.current_path = path;
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self, finished: bool) -> ScanProgress {
        ScanProgress {
            files_scanned: self.files_scanned,
            dirs_scanned: self.dirs_scanned,
            files_included: self.files_included,
            current_path: self.current_path.clone(),
            warnings_count: self.warnings_count,
            elapsed: self.start_time.elapsed(),
            finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_snapshot() {
        let mut tracker = ProgressTracker::new();
        tracker.record_dir();
        assert_eq!(tracker.record_file(true), 1);
        assert_eq!(tracker.record_file(false), 2);
        tracker.set_current_path(PathBuf::from("/x"));

        let snapshot = tracker.snapshot(true);
        assert_eq!(snapshot.files_scanned, 2);
        assert_eq!(snapshot.files_included, 1);
        assert_eq!(snapshot.total_items(), 3);
        assert!(snapshot.finished);
    }
}
