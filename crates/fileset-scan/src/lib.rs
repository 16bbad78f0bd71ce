//! Directory scanning for fileset.
//!
//! This crate walks a base directory and sorts its entries into included
//! files, included directories and files rejected by a selector.
//!
//! # Overview
//!
//! `fileset-scan` is responsible for traversing directories and applying the
//! patterns and selectors of a [`ScanConfig`]. Key features:
//!
//! - **Pruning** of subtrees no include can reach or an exclude covers
//! - **Selectors** from configuration plus caller-supplied ones
//! - **Progress updates** via broadcast channels
//! - **Link following** with protection against cycles
//!
//! # Example
//!
//! ```rust,no_run
//! use fileset_scan::{DirectoryScanner, ScanConfig};
//!
//! let config = ScanConfig::builder()
//!     .base_dir("/path/to/project")
//!     .includes(vec!["src/**/*.rs".to_string()])
//!     .excludes(vec!["**/generated/**".to_string()])
//!     .build()
//!     .unwrap();
//! let mut scanner = DirectoryScanner::native().unwrap();
//! let result = scanner.scan(&config).unwrap();
//!
//! for file in &result.included_files {
//!     println!("{file}");
//! }
//! ```
//!
//! # Progress Monitoring
//!
//! Subscribe to progress updates:
//!
//! ```rust,no_run
//! use fileset_scan::{DirectoryScanner, ScanConfig};
//!
//! let mut scanner = DirectoryScanner::native().unwrap();
//! let mut progress_rx = scanner.subscribe();
//!
//! scanner.scan(&ScanConfig::new(".")).unwrap();
//! while let Ok(progress) = progress_rx.try_recv() {
//!     println!("Scanned {} files", progress.files_scanned);
//! }
//! ```

mod progress;
mod scanner;
mod visited;

pub use progress::ScanProgress;
pub use scanner::{DirectoryScanner, ScanState};
pub use visited::VisitedDirs;

// Re-export core types for convenience
pub use fileset_core::{
    PathModel, ScanConfig, ScanError, ScanResult, ScanStats, ScanWarning, WarningKind,
};
pub use fileset_select::FileSelector;
