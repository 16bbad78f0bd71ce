//! Typed selector configuration.
//!
//! Every selector type is one variant of [`SelectorConfig`]. Values are
//! validated when they are built from a [`SelectorRecord`](crate::SelectorRecord)
//! and again by [`SelectorConfig::validate`] before a scan starts, so a bad
//! configuration never reaches the filesystem.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ConfigError;
use crate::record::SelectorRecord;

/// How a file's modification time is compared against the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TimeComparison {
    Before,
    After,
    #[default]
    Equal,
}

/// How a file's size is compared against the configured limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SizeComparison {
    Less,
    More,
    #[default]
    Equal,
}

/// What the modified selector stores per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FingerprintAlgorithm {
    /// BLAKE3 of the file contents.
    Digest,
    /// Modification time in milliseconds.
    LastModified,
}

/// Which side of a tree comparison the present selector accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PresentMode {
    /// Only files without a counterpart in the target tree.
    SrcOnly,
    /// Only files that also exist in the target tree.
    #[default]
    Both,
}

/// POSIX permission bits (`rwxrwxrwx`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PosixMode(u32);

impl PosixMode {
    const SYMBOLS: [char; 3] = ['r', 'w', 'x'];

    /// Wrap raw permission bits; anything above `0o777` is dropped.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits & 0o777)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    /// Nine-character symbolic form.
    pub fn to_symbolic(self) -> String {
        (0..9)
            .map(|i| {
                let bit = 1 << (8 - i);
                if self.0 & bit != 0 {
                    Self::SYMBOLS[i % 3]
                } else {
                    '-'
                }
            })
            .collect()
    }

    fn parse_symbolic(s: &str) -> Result<Self, ConfigError> {
        let mut bits = 0;
        for (i, c) in s.chars().enumerate() {
            let expected = Self::SYMBOLS[i % 3];
            bits <<= 1;
            if c == expected {
                bits |= 1;
            } else if c != '-' {
                return Err(ConfigError::MalformedPermissions {
                    value: s.to_string(),
                    reason: format!("invalid symbol '{c}' at position {}", i + 1),
                });
            }
        }
        Ok(Self(bits))
    }
}

impl FromStr for PosixMode {
    type Err = ConfigError;

    /// Accepts three octal digits (`750`) or nine symbols (`rwxr-x---`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| ConfigError::MalformedPermissions {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        match s.chars().count() {
            3 => {
                if !s.chars().all(|c| ('0'..='7').contains(&c)) {
                    return Err(malformed("expected three octal digits"));
                }
                u32::from_str_radix(s, 8)
                    .map(Self)
                    .map_err(|_| malformed("expected three octal digits"))
            }
            9 => Self::parse_symbolic(s),
            10 if s.starts_with(['-', 'd', 'l', 'b', 'c', 'p', 's']) => {
                Err(malformed("leading file type character is not allowed"))
            }
            _ => Err(malformed(
                "expected three octal digits or nine permission symbols",
            )),
        }
    }
}

impl fmt::Display for PosixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_symbolic())
    }
}

/// One selector, leaf or container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SelectorRecord", into = "SelectorRecord")]
pub enum SelectorConfig {
    /// Compare modification time with a reference instant.
    Date {
        reference: DateTime<Utc>,
        when: TimeComparison,
        granularity: Duration,
    },
    /// Select files whose fingerprint changed since the previous scan.
    Modified {
        cache: PathBuf,
        algorithm: FingerprintAlgorithm,
        update: bool,
    },
    /// Exact match on permission bits.
    Permissions {
        mode: PosixMode,
        follow_symlinks: bool,
    },
    Readable,
    Writable,
    Executable,
    Symlink,
    /// Select files that differ from their counterpart under `target_dir`.
    Different {
        target_dir: PathBuf,
        ignore_file_times: bool,
        ignore_contents: bool,
        granularity: Duration,
    },
    /// Select on presence of a counterpart under `target_dir`.
    Present { target_dir: PathBuf, mode: PresentMode },
    /// Compare file size with a limit in bytes.
    Size { limit: u64, when: SizeComparison },
    /// Bound the number of directories between base dir and file.
    Depth { min: Option<u32>, max: Option<u32> },
    /// Glob against the relative path.
    Filename {
        pattern: String,
        case_sensitive: bool,
        negate: bool,
    },
    /// Substring search in file contents.
    Contains {
        text: String,
        case_sensitive: bool,
        ignore_whitespace: bool,
    },
    And(Vec<SelectorConfig>),
    Or(Vec<SelectorConfig>),
    Not(Box<SelectorConfig>),
    /// Selected when no child selects.
    NoneOf(Vec<SelectorConfig>),
    /// Selected when more children select than reject.
    Majority {
        allow_ties: bool,
        selectors: Vec<SelectorConfig>,
    },
}

impl SelectorConfig {
    /// The type tag used in configuration records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Date { .. } => "date",
            Self::Modified { .. } => "modified",
            Self::Permissions { .. } => "permissions",
            Self::Readable => "readable",
            Self::Writable => "writable",
            Self::Executable => "executable",
            Self::Symlink => "symlink",
            Self::Different { .. } => "different",
            Self::Present { .. } => "present",
            Self::Size { .. } => "size",
            Self::Depth { .. } => "depth",
            Self::Filename { .. } => "filename",
            Self::Contains { .. } => "contains",
            Self::And(_) => "and",
            Self::Or(_) => "or",
            Self::Not(_) => "not",
            Self::NoneOf(_) => "none",
            Self::Majority { .. } => "majority",
        }
    }

    /// Check invariants the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Modified { cache, .. } if cache.as_os_str().is_empty() => {
                Err(ConfigError::missing(self.kind(), "cache"))
            }
            Self::Different { target_dir, .. } | Self::Present { target_dir, .. }
                if target_dir.as_os_str().is_empty() =>
            {
                Err(ConfigError::missing(self.kind(), "targetdir"))
            }
            Self::Depth {
                min: None,
                max: None,
            } => Err(ConfigError::invalid(
                "depth selector needs at least one of 'min' or 'max'",
            )),
            Self::Depth {
                min: Some(min),
                max: Some(max),
            } if min > max => Err(ConfigError::invalid_value(
                "depth",
                "max",
                max.to_string(),
                format!("must not be smaller than min ({min})"),
            )),
            Self::Filename { pattern, .. } if pattern.is_empty() => {
                Err(ConfigError::missing("filename", "name"))
            }
            Self::Contains { text, .. } if text.is_empty() => {
                Err(ConfigError::missing("contains", "text"))
            }
            Self::And(children) | Self::Or(children) | Self::NoneOf(children) => {
                children.iter().try_for_each(Self::validate)
            }
            Self::Majority { selectors, .. } => selectors.iter().try_for_each(Self::validate),
            Self::Not(child) => child.validate(),
            _ => Ok(()),
        }
    }
}
