//! Error types for configuration, path resolution and scanning.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid scan or selector configuration.
///
/// Always raised while a configuration is being built or validated, before
/// the scanner touches the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The selector type tag is not known.
    #[error("Unknown selector type: {kind}")]
    UnknownSelector { kind: String },

    /// An option key is not understood by the selector.
    #[error("Selector '{selector}' does not support the '{key}' attribute")]
    UnknownAttribute { selector: String, key: String },

    /// A required option is absent.
    #[error("Selector '{selector}' requires the '{attribute}' attribute")]
    MissingAttribute { selector: String, attribute: String },

    /// An option value could not be parsed or is out of range.
    #[error("Invalid value '{value}' for '{key}' on selector '{selector}': {reason}")]
    InvalidValue {
        selector: String,
        key: String,
        value: String,
        reason: String,
    },

    /// A POSIX permission string is malformed.
    #[error("Malformed permissions '{value}': {reason}")]
    MalformedPermissions { value: String, reason: String },

    /// Scan configuration is invalid.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    /// Create an invalid-value error.
    pub fn invalid_value(
        selector: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            selector: selector.into(),
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing-attribute error.
    pub fn missing(selector: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            selector: selector.into(),
            attribute: attribute.into(),
        }
    }

    /// Create a generic invalid-configuration error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Path arithmetic failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path cannot be made absolute with the information available.
    #[error("Unresolvable path: {path}")]
    Unresolvable { path: String },

    /// A `..` segment climbs above the root of the path.
    #[error("Cannot normalize '{path}': '..' escapes the root")]
    EscapesRoot { path: String },
}

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Base directory does not exist and the scan was not tolerant.
    #[error("basedir does not exist: {path}")]
    BaseDirMissing { path: PathBuf },

    /// Base directory exists but is not a directory.
    #[error("basedir is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory entry could not be read during traversal.
    #[error("Failed to read {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// Selector state (the fingerprint cache) could not be loaded or saved.
    #[error("Selector cache error at {path}: {message}")]
    Cache { path: PathBuf, message: String },

    /// Invalid configuration detected before the scan started.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create a traversal error.
    pub fn walk(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Walk {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a cache persistence error.
    pub fn cache(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Cache {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Symbolic link target does not exist.
    BrokenSymlink,
    /// A followed link leads back into an already visited directory.
    SymlinkCycle,
    /// A selector could not compute a fingerprint for a file.
    FingerprintFailed,
    /// Error reading file metadata.
    ReadError,
}

/// Non-fatal warning encountered during a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a broken symlink warning.
    pub fn broken_symlink(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Broken symlink: {}", path.display()),
            path,
            kind: WarningKind::BrokenSymlink,
        }
    }

    /// Create a symlink cycle warning.
    pub fn symlink_cycle(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Not descending into already visited directory: {}", path.display()),
            path,
            kind: WarningKind::SymlinkCycle,
        }
    }
}
