//! Core types for fileset.
//!
//! This crate provides the pieces every other fileset crate builds on: the
//! per-OS path model, glob patterns with the `**` wildcard, scan and selector
//! configuration, and the result and error types.

mod config;
mod error;
pub mod path;
mod pattern;
mod pattern_set;
mod record;
mod result;
mod selector;

pub use config::{ScanConfig, ScanConfigBuilder, ScanConfigBuilderError};
pub use error::{ConfigError, PathError, ScanError, ScanWarning, WarningKind};
pub use path::{DosFamily, FamilyKind, PathFamily, PathModel, UnixFamily};
pub use pattern::{
    DEEP_TREE_MATCH, EntryKind, Pattern, Segment, TokenizedPath, has_wildcards, match_path,
    match_pattern_start, match_segment,
};
pub use pattern_set::{DEFAULT_EXCLUDES, PatternSet};
pub use record::{DEFAULT_DATETIME_PATTERN, OptionValue, SelectorRecord};
pub use result::{ScanResult, ScanStats};
pub use selector::{
    FingerprintAlgorithm, PosixMode, PresentMode, SelectorConfig, SizeComparison, TimeComparison,
};
