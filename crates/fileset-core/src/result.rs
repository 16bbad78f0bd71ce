//! Scan results and statistics.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;

/// Counters collected while scanning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Files examined, whether kept or not.
    pub files_seen: u64,
    /// Directories examined, the base directory included.
    pub dirs_seen: u64,
    /// Symbolic links encountered.
    pub symlinks_seen: u64,
    /// Directories whose contents were skipped by pruning.
    pub dirs_pruned: u64,
    /// Total size of the included files in bytes.
    pub included_size: u64,
    /// Deepest level reached below the base directory.
    pub max_depth: u32,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an examined file.
    pub fn record_file(&mut self, depth: u32) {
        self.files_seen += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    /// Record an examined directory.
    pub fn record_dir(&mut self, depth: u32) {
        self.dirs_seen += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    pub fn record_symlink(&mut self) {
        self.symlinks_seen += 1;
    }

    /// Record directories skipped without being read.
    pub fn record_pruned(&mut self, count: u64) {
        self.dirs_pruned += count;
    }
}

/// Outcome of one directory scan.
///
/// Paths are relative to `base_dir` and use the scanner's path family
/// separator. The base directory itself appears in `included_dirs` as the
/// empty string when it qualifies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Directory that was scanned.
    pub base_dir: PathBuf,

    /// Files matching the patterns and accepted by every selector.
    pub included_files: Vec<String>,

    /// Directories matching the patterns.
    pub included_dirs: Vec<String>,

    /// Files matching the patterns but rejected by a selector.
    pub deselected_files: Vec<String>,

    /// Symbolic links left alone because link following was off.
    pub not_followed_symlinks: Vec<String>,

    /// Non-fatal problems.
    pub warnings: Vec<ScanWarning>,

    /// Counters.
    pub stats: ScanStats,

    /// When the scan finished.
    pub scanned_at: SystemTime,

    /// Wall-clock duration of the scan.
    pub scan_duration: Duration,
}

impl ScanResult {
    /// Result of a tolerated scan of a missing base directory.
    pub fn empty(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            included_files: Vec::new(),
            included_dirs: Vec::new(),
            deselected_files: Vec::new(),
            not_followed_symlinks: Vec::new(),
            warnings: Vec::new(),
            stats: ScanStats::default(),
            scanned_at: SystemTime::now(),
            scan_duration: Duration::ZERO,
        }
    }

    /// Whether nothing was included.
    pub fn is_empty(&self) -> bool {
        self.included_files.is_empty() && self.included_dirs.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
