//! Selects files whose fingerprint changed since the previous scan.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use fileset_core::{FingerprintAlgorithm, ScanError, ScanWarning, WarningKind};

use crate::cache::FingerprintCache;
use crate::fingerprint::fingerprint;
use crate::selector::FileSelector;

/// Change detector backed by a [`FingerprintCache`].
///
/// A file is selected when its fingerprint differs from the cached one
/// (including when there is no cached one). With `update` set the new
/// fingerprint is recorded and written back when the scan finishes.
#[derive(Debug)]
pub struct ModifiedSelector {
    algorithm: FingerprintAlgorithm,
    update: bool,
    cache: Mutex<FingerprintCache>,
    warnings: Mutex<Vec<ScanWarning>>,
}

impl ModifiedSelector {
    pub fn new(cache: impl Into<PathBuf>, algorithm: FingerprintAlgorithm, update: bool) -> Self {
        Self {
            algorithm,
            update,
            cache: Mutex::new(FingerprintCache::new(cache)),
            warnings: Mutex::new(Vec::new()),
        }
    }

    /// Number of cached fingerprints.
    pub fn cached_entries(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl FileSelector for ModifiedSelector {
    fn is_selected(&self, _base_dir: &Path, relative: &str, file: &Path) -> bool {
        let current = match fingerprint(file, self.algorithm) {
            Ok(value) => value,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "could not fingerprint file");
                self.warnings
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(ScanWarning::new(
                        file,
                        format!("Could not compute fingerprint: {e}"),
                        WarningKind::FingerprintFailed,
                    ));
                return true;
            }
        };

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let changed = cache.get(relative) != Some(current.as_str());
        if changed && self.update {
            cache.insert(relative, current);
        }
        changed
    }

    fn scan_started(&self, _base_dir: &Path) -> Result<(), ScanError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let path = cache.path().to_path_buf();
        *cache = FingerprintCache::load(path)?;
        Ok(())
    }

    fn scan_finished(&self) -> Result<(), ScanError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if self.update && cache.is_dirty() {
            cache.save()?;
        } else {
            debug!(path = %cache.path().display(), "fingerprint cache unchanged");
        }
        Ok(())
    }

    fn take_warnings(&self) -> Vec<ScanWarning> {
        std::mem::take(&mut *self.warnings.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
