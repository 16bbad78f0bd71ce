//! Untyped selector records: a type tag plus key/value options.
//!
//! This is the form selectors take in configuration files and on the command
//! line. Converting a record into a [`SelectorConfig`] checks every key, so
//! typos and missing attributes surface before a scan starts.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::selector::{SelectorConfig, SizeComparison, TimeComparison};

/// Default layout of the `datetime` attribute of date selectors.
pub const DEFAULT_DATETIME_PATTERN: &str = "%m/%d/%Y %I:%M %p";

/// A single option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// A selector as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorRecord {
    /// Selector type tag (`date`, `modified`, `and`, ...).
    #[serde(rename = "type")]
    pub kind: String,

    /// Children of container selectors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selectors: Vec<SelectorRecord>,

    /// Type-specific options.
    #[serde(flatten)]
    pub options: IndexMap<String, OptionValue>,
}

impl SelectorRecord {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            selectors: Vec::new(),
            options: IndexMap::new(),
        }
    }

    /// Add an option.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Add a nested selector.
    pub fn child(mut self, record: SelectorRecord) -> Self {
        self.selectors.push(record);
        self
    }
}

impl FromStr for SelectorRecord {
    type Err = ConfigError;

    /// Parse the compact `type:key=value,key=value` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = s.split_once(':').unwrap_or((s, ""));
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(ConfigError::invalid(format!("missing selector type in '{s}'")));
        }

        let mut record = Self::new(kind.to_ascii_lowercase());
        for pair in rest.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ConfigError::invalid(format!("expected key=value, found '{pair}' in '{s}'"))
            })?;
            record
                .options
                .insert(key.trim().to_string(), OptionValue::Text(value.trim().to_string()));
        }
        Ok(record)
    }
}

/// Consumes options of one record, tracking which keys were used.
struct Options {
    selector: String,
    values: IndexMap<String, OptionValue>,
}

impl Options {
    fn new(selector: &str, values: IndexMap<String, OptionValue>) -> Self {
        let values = values
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        Self {
            selector: selector.to_string(),
            values,
        }
    }

    fn take(&mut self, key: &str) -> Option<OptionValue> {
        self.values.shift_remove(key)
    }

    fn bad(&self, key: &str, value: &OptionValue, reason: impl Into<String>) -> ConfigError {
        ConfigError::invalid_value(&self.selector, key, value.to_string(), reason)
    }

    fn require<T>(&self, key: &str, value: Option<T>) -> Result<T, ConfigError> {
        value.ok_or_else(|| ConfigError::missing(&self.selector, key))
    }

    fn text(&mut self, key: &str) -> Option<String> {
        self.take(key).map(|v| v.to_string())
    }

    fn bool(&mut self, key: &str) -> Result<Option<bool>, ConfigError> {
        let Some(value) = self.take(key) else {
            return Ok(None);
        };
        match &value {
            OptionValue::Bool(b) => Ok(Some(*b)),
            OptionValue::Text(t) => match t.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" => Ok(Some(true)),
                "false" | "no" | "off" => Ok(Some(false)),
                _ => Err(self.bad(key, &value, "expected a boolean")),
            },
            _ => Err(self.bad(key, &value, "expected a boolean")),
        }
    }

    fn integer(&mut self, key: &str) -> Result<Option<i64>, ConfigError> {
        let Some(value) = self.take(key) else {
            return Ok(None);
        };
        match &value {
            OptionValue::Integer(i) => Ok(Some(*i)),
            OptionValue::Text(t) => t
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.bad(key, &value, "expected an integer")),
            _ => Err(self.bad(key, &value, "expected an integer")),
        }
    }

    fn unsigned<T: TryFrom<i64>>(&mut self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.integer(key)? {
            None => Ok(None),
            Some(i) => T::try_from(i).map(Some).map_err(|_| {
                ConfigError::invalid_value(&self.selector, key, i.to_string(), "out of range")
            }),
        }
    }

    fn parse<T: FromStr>(&mut self, key: &str) -> Result<Option<T>, ConfigError> {
        let Some(value) = self.take(key) else {
            return Ok(None);
        };
        value
            .to_string()
            .parse()
            .map(Some)
            .map_err(|_| self.bad(key, &value, "unrecognised value"))
    }

    fn seconds(&mut self, key: &str) -> Result<Option<Duration>, ConfigError> {
        Ok(self.unsigned::<u64>(key)?.map(Duration::from_secs))
    }

    fn path(&mut self, key: &str) -> Result<PathBuf, ConfigError> {
        let value = self.text(key).filter(|v| !v.is_empty());
        self.require(key, value).map(PathBuf::from)
    }

    /// Fail on any key that was not consumed.
    fn finish(self) -> Result<(), ConfigError> {
        match self.values.into_iter().next() {
            Some((key, _)) => Err(ConfigError::UnknownAttribute {
                selector: self.selector,
                key,
            }),
            None => Ok(()),
        }
    }
}

fn parse_reference(options: &mut Options) -> Result<DateTime<Utc>, ConfigError> {
    if let Some(millis) = options.integer("millis")? {
        return DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            ConfigError::invalid_value("date", "millis", millis.to_string(), "out of range")
        });
    }
    if let Some(seconds) = options.integer("seconds")? {
        return DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
            ConfigError::invalid_value("date", "seconds", seconds.to_string(), "out of range")
        });
    }

    let pattern = options
        .text("pattern")
        .unwrap_or_else(|| DEFAULT_DATETIME_PATTERN.to_string());
    let Some(text) = options.text("datetime") else {
        return Err(ConfigError::missing("date", "datetime"));
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&text) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(&text, &pattern).map_err(|e| {
        ConfigError::invalid_value("date", "datetime", &text, format!("does not match '{pattern}': {e}"))
    })?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            ConfigError::invalid_value("date", "datetime", &text, "not a valid local time")
        })
}

/// Parse a size with an optional unit suffix (`k`, `Ki`, `M`, `Mi`, ...).
fn parse_size(value: i64, units: Option<&str>) -> Result<u64, ConfigError> {
    let base = u64::try_from(value).map_err(|_| {
        ConfigError::invalid_value("size", "value", value.to_string(), "must not be negative")
    })?;
    let multiplier: u64 = match units.map(str::to_ascii_lowercase).as_deref() {
        None | Some("") => 1,
        Some("k") => 1_000,
        Some("ki") => 1 << 10,
        Some("m") => 1_000_000,
        Some("mi") => 1 << 20,
        Some("g") => 1_000_000_000,
        Some("gi") => 1 << 30,
        Some("t") => 1_000_000_000_000,
        Some("ti") => 1 << 40,
        Some(other) => {
            return Err(ConfigError::invalid_value(
                "size",
                "units",
                other,
                "expected one of k, Ki, M, Mi, G, Gi, T, Ti",
            ));
        }
    };
    base.checked_mul(multiplier)
        .ok_or_else(|| ConfigError::invalid_value("size", "value", value.to_string(), "too large"))
}

fn children(records: Vec<SelectorRecord>) -> Result<Vec<SelectorConfig>, ConfigError> {
    records.into_iter().map(SelectorConfig::try_from).collect()
}

impl TryFrom<SelectorRecord> for SelectorConfig {
    type Error = ConfigError;

    fn try_from(record: SelectorRecord) -> Result<Self, Self::Error> {
        let kind = record.kind.to_ascii_lowercase();
        let mut options = Options::new(&kind, record.options);
        let is_container = matches!(kind.as_str(), "and" | "or" | "not" | "none" | "majority");
        if !is_container && !record.selectors.is_empty() {
            return Err(ConfigError::invalid(format!(
                "selector '{kind}' does not accept nested selectors"
            )));
        }

        let config = match kind.as_str() {
            "date" => Self::Date {
                reference: parse_reference(&mut options)?,
                when: options.parse("when")?.unwrap_or_default(),
                granularity: options.seconds("granularity")?.unwrap_or_default(),
            },
            "modified" => {
                let cache = options.path("cache")?;
                let algorithm = options.parse("algorithm")?;
                Self::Modified {
                    cache,
                    algorithm: options.require("algorithm", algorithm)?,
                    update: options.bool("update")?.unwrap_or(true),
                }
            }
            "permissions" => {
                let value = options.text("permissions");
                Self::Permissions {
                    mode: options.require("permissions", value)?.parse()?,
                    follow_symlinks: options.bool("followsymlinks")?.unwrap_or(true),
                }
            }
            "readable" => Self::Readable,
            "writable" => Self::Writable,
            "executable" => Self::Executable,
            "symlink" => Self::Symlink,
            "different" => Self::Different {
                target_dir: options.path("targetdir")?,
                ignore_file_times: options.bool("ignorefiletimes")?.unwrap_or(true),
                ignore_contents: options.bool("ignorecontents")?.unwrap_or(false),
                granularity: options.seconds("granularity")?.unwrap_or_default(),
            },
            "present" => Self::Present {
                target_dir: options.path("targetdir")?,
                mode: options.parse("present")?.unwrap_or_default(),
            },
            "size" => {
                let value = options.integer("value")?;
                let value = options.require("value", value)?;
                let units = options.text("units");
                Self::Size {
                    limit: parse_size(value, units.as_deref())?,
                    when: options.parse("when")?.unwrap_or_default(),
                }
            }
            "depth" => Self::Depth {
                min: options.unsigned("min")?,
                max: options.unsigned("max")?,
            },
            "filename" => {
                let name = options.text("name");
                Self::Filename {
                    pattern: options.require("name", name)?,
                    case_sensitive: options.bool("casesensitive")?.unwrap_or(true),
                    negate: options.bool("negate")?.unwrap_or(false),
                }
            }
            "contains" => {
                let text = options.text("text");
                Self::Contains {
                    text: options.require("text", text)?,
                    case_sensitive: options.bool("casesensitive")?.unwrap_or(true),
                    ignore_whitespace: options.bool("ignorewhitespace")?.unwrap_or(false),
                }
            }
            "and" => Self::And(children(record.selectors)?),
            "or" => Self::Or(children(record.selectors)?),
            "none" => Self::NoneOf(children(record.selectors)?),
            "majority" => Self::Majority {
                allow_ties: options.bool("allowtie")?.unwrap_or(true),
                selectors: children(record.selectors)?,
            },
            "not" => {
                let mut nested = children(record.selectors)?;
                if nested.len() != 1 {
                    return Err(ConfigError::invalid(format!(
                        "not selector needs exactly one nested selector, found {}",
                        nested.len()
                    )));
                }
                Self::Not(Box::new(nested.remove(0)))
            }
            _ => return Err(ConfigError::UnknownSelector { kind: kind.clone() }),
        };

        options.finish()?;
        config.validate()?;
        Ok(config)
    }
}

fn size_units(limit: u64) -> (u64, Option<&'static str>) {
    const UNITS: [(u64, &str); 4] = [(1 << 40, "Ti"), (1 << 30, "Gi"), (1 << 20, "Mi"), (1 << 10, "Ki")];
    UNITS
        .iter()
        .find(|(factor, _)| limit >= *factor && limit % factor == 0)
        .map_or((limit, None), |(factor, unit)| (limit / factor, Some(*unit)))
}

fn seconds_value(d: Duration) -> OptionValue {
    OptionValue::Integer(i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

impl From<SelectorConfig> for SelectorRecord {
    fn from(config: SelectorConfig) -> Self {
        let record = SelectorRecord::new(config.kind());
        match config {
            SelectorConfig::Date {
                reference,
                when,
                granularity,
            } => record
                .with("millis", reference.timestamp_millis())
                .with("when", when.to_string())
                .with("granularity", seconds_value(granularity)),
            SelectorConfig::Modified {
                cache,
                algorithm,
                update,
            } => record
                .with("cache", cache.display().to_string())
                .with("algorithm", algorithm.to_string())
                .with("update", update),
            SelectorConfig::Permissions {
                mode,
                follow_symlinks,
            } => record
                .with("permissions", mode.to_string())
                .with("followsymlinks", follow_symlinks),
            SelectorConfig::Readable
            | SelectorConfig::Writable
            | SelectorConfig::Executable
            | SelectorConfig::Symlink => record,
            SelectorConfig::Different {
                target_dir,
                ignore_file_times,
                ignore_contents,
                granularity,
            } => record
                .with("targetdir", target_dir.display().to_string())
                .with("ignorefiletimes", ignore_file_times)
                .with("ignorecontents", ignore_contents)
                .with("granularity", seconds_value(granularity)),
            SelectorConfig::Present { target_dir, mode } => record
                .with("targetdir", target_dir.display().to_string())
                .with("present", mode.to_string()),
            SelectorConfig::Size { limit, when } => {
                let (value, units) = size_units(limit);
                let record = record
                    .with("value", i64::try_from(value).unwrap_or(i64::MAX))
                    .with("when", when.to_string());
                match units {
                    Some(units) => record.with("units", units),
                    None => record,
                }
            }
            SelectorConfig::Depth { min, max } => {
                let mut record = record;
                if let Some(min) = min {
                    record = record.with("min", i64::from(min));
                }
                if let Some(max) = max {
                    record = record.with("max", i64::from(max));
                }
                record
            }
            SelectorConfig::Filename {
                pattern,
                case_sensitive,
                negate,
            } => record
                .with("name", pattern)
                .with("casesensitive", case_sensitive)
                .with("negate", negate),
            SelectorConfig::Contains {
                text,
                case_sensitive,
                ignore_whitespace,
            } => record
                .with("text", text)
                .with("casesensitive", case_sensitive)
                .with("ignorewhitespace", ignore_whitespace),
            SelectorConfig::And(nested)
            | SelectorConfig::Or(nested)
            | SelectorConfig::NoneOf(nested) => nested.into_iter().fold(record, |r, c| r.child(c.into())),
            SelectorConfig::Not(nested) => record.child((*nested).into()),
            SelectorConfig::Majority {
                allow_ties,
                selectors,
            } => selectors
                .into_iter()
                .fold(record.with("allowtie", allow_ties), |r, c| r.child(c.into())),
        }
    }
}
