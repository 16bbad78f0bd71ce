//! Selectors that compare a file with its counterpart in another tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use fileset_core::{PathFamily, PresentMode, ScanWarning, WarningKind};

use crate::fingerprint::{content_digest, modified_millis};
use crate::selector::FileSelector;

/// Path of `relative` below `target_dir`.
fn counterpart(family: &dyn PathFamily, target_dir: &Path, relative: &str) -> PathBuf {
    relative
        .split(|c| family.is_separator(c))
        .filter(|s| !s.is_empty())
        .fold(target_dir.to_path_buf(), |path, segment| path.join(segment))
}

/// Selects files that are missing from, or differ from, a reference tree.
#[derive(Debug)]
pub struct DifferentSelector {
    family: Arc<dyn PathFamily>,
    target_dir: PathBuf,
    ignore_file_times: bool,
    ignore_contents: bool,
    granularity_millis: u64,
    warnings: Mutex<Vec<ScanWarning>>,
}

impl DifferentSelector {
    pub fn new(
        family: Arc<dyn PathFamily>,
        target_dir: impl Into<PathBuf>,
        ignore_file_times: bool,
        ignore_contents: bool,
        granularity: std::time::Duration,
    ) -> Self {
        Self {
            family,
            target_dir: target_dir.into(),
            ignore_file_times,
            ignore_contents,
            granularity_millis: u64::try_from(granularity.as_millis()).unwrap_or(u64::MAX),
            warnings: Mutex::new(Vec::new()),
        }
    }

    fn differs(&self, file: &Path, other: &Path) -> std::io::Result<bool> {
        let Ok(theirs) = fs::metadata(other) else {
            return Ok(true);
        };
        let ours = fs::metadata(file)?;

        if ours.is_dir() != theirs.is_dir() {
            return Ok(true);
        }
        if ours.is_dir() {
            return Ok(false);
        }
        if ours.len() != theirs.len() {
            return Ok(true);
        }
        if !self.ignore_file_times {
            let delta = modified_millis(&ours)?.abs_diff(modified_millis(&theirs)?);
            if delta > self.granularity_millis {
                return Ok(true);
            }
        }
        if !self.ignore_contents {
            return Ok(content_digest(file)? != content_digest(other)?);
        }
        Ok(false)
    }
}

impl FileSelector for DifferentSelector {
    fn is_selected(&self, _base_dir: &Path, relative: &str, file: &Path) -> bool {
        let other = counterpart(self.family.as_ref(), &self.target_dir, relative);
        match self.differs(file, &other) {
            Ok(differs) => differs,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "could not compare with target");
                self.warnings
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(ScanWarning::new(
                        file,
                        format!("Could not compare with {}: {e}", other.display()),
                        WarningKind::ReadError,
                    ));
                true
            }
        }
    }

    fn take_warnings(&self) -> Vec<ScanWarning> {
        std::mem::take(&mut *self.warnings.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Selects on whether a counterpart exists in a reference tree.
#[derive(Debug)]
pub struct PresentSelector {
    family: Arc<dyn PathFamily>,
    target_dir: PathBuf,
    mode: PresentMode,
}

impl PresentSelector {
    pub fn new(family: Arc<dyn PathFamily>, target_dir: impl Into<PathBuf>, mode: PresentMode) -> Self {
        Self {
            family,
            target_dir: target_dir.into(),
            mode,
        }
    }
}

impl FileSelector for PresentSelector {
    fn is_selected(&self, _base_dir: &Path, relative: &str, _file: &Path) -> bool {
        let exists = counterpart(self.family.as_ref(), &self.target_dir, relative).exists();
        match self.mode {
            PresentMode::Both => exists,
            PresentMode::SrcOnly => !exists,
        }
    }
}
