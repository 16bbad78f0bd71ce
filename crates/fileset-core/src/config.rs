//! Scan configuration types.

use std::path::PathBuf;
use std::sync::Arc;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::path::PathFamily;
use crate::pattern_set::PatternSet;
use crate::selector::SelectorConfig;

/// Configuration for one directory scan.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Directory to scan.
    pub base_dir: PathBuf,

    /// Include patterns. `None` means everything (`**`).
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub includes: Option<Vec<String>>,

    /// Exclude patterns. These win over includes.
    #[builder(default)]
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Selectors every included file must satisfy.
    #[builder(default)]
    #[serde(default)]
    pub selectors: Vec<SelectorConfig>,

    /// Case-sensitive pattern matching.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub case_sensitive: bool,

    /// Fail when the base directory is missing instead of returning nothing.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub error_on_missing_dir: bool,

    /// Follow symbolic links to directories and files.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Add the VCS and editor-backup excludes.
    #[builder(default = "false")]
    #[serde(default)]
    pub default_excludes: bool,
}

fn default_true() -> bool {
    true
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref base_dir) = self.base_dir {
            if base_dir.as_os_str().is_empty() {
                return Err("Base directory cannot be empty".to_string());
            }
        } else {
            return Err("Base directory is required".to_string());
        }
        if let Some(ref selectors) = self.selectors {
            for selector in selectors {
                selector.validate().map_err(|e| e.to_string())?;
            }
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Scan everything below `base_dir` with default settings.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            includes: None,
            excludes: Vec::new(),
            selectors: Vec::new(),
            case_sensitive: true,
            error_on_missing_dir: true,
            follow_symlinks: false,
            default_excludes: false,
        }
    }

    /// Check the configuration without touching the filesystem.
    ///
    /// Deserialised configs bypass the builder, so scanners call this too.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("base directory cannot be empty"));
        }
        self.selectors.iter().try_for_each(SelectorConfig::validate)
    }

    /// Compile the include and exclude patterns for `family`.
    pub fn pattern_set(&self, family: Arc<dyn PathFamily>) -> PatternSet {
        let set = PatternSet::new(
            family,
            self.includes.as_deref(),
            &self.excludes,
            self.case_sensitive,
        );
        if self.default_excludes {
            set.with_default_excludes()
        } else {
            set
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::UnixFamily;
    use crate::pattern::EntryKind;

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::builder()
            .base_dir("/home/user")
            .includes(vec!["**/*.rs".to_string()])
            .case_sensitive(false)
            .build()
            .unwrap();

        assert_eq!(config.base_dir, PathBuf::from("/home/user"));
        assert_eq!(config.includes.as_deref(), Some(&["**/*.rs".to_string()][..]));
        assert!(!config.case_sensitive);
        assert!(config.error_on_missing_dir);
    }

    #[test]
    fn test_builder_requires_base_dir() {
        assert!(ScanConfig::builder().build().is_err());
        assert!(ScanConfig::builder().base_dir("").build().is_err());
    }

    #[test]
    fn test_builder_rejects_invalid_selector() {
        let result = ScanConfig::builder()
            .base_dir("/src")
            .selectors(vec![SelectorConfig::Depth {
                min: None,
                max: None,
            }])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_simple() {
        let config = ScanConfig::new("/home/user");
        assert!(config.includes.is_none());
        assert!(config.case_sensitive);
        assert!(!config.follow_symlinks);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pattern_set_honours_default_excludes() {
        let mut config = ScanConfig::new("/src");
        let set = config.pattern_set(Arc::new(UnixFamily));
        assert!(set.keeps(&set.tokenize(".git/config"), EntryKind::File));

        config.default_excludes = true;
        let set = config.pattern_set(Arc::new(UnixFamily));
        assert!(!set.keeps(&set.tokenize(".git/config"), EntryKind::File));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ScanConfig = serde_json::from_str(r#"{"base_dir": "/data"}"#).unwrap();
        assert!(config.case_sensitive);
        assert!(config.error_on_missing_dir);
        assert!(config.includes.is_none());
    }
}
