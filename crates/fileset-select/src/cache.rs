//! Persistent relative-path to fingerprint store.
//!
//! Loaded once when a scan starts and saved once when it ends. Saving goes
//! through a temporary file in the same directory that is renamed over the
//! cache, so concurrent scans sharing a cache never interleave writes; the
//! last one to finish wins.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use fileset_core::ScanError;

/// In-memory view of a fingerprint cache file.
#[derive(Debug, Clone, Default)]
pub struct FingerprintCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl FingerprintCache {
    /// An empty cache that will be stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Read the cache at `path`. A missing file is an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ScanError> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ScanError::cache(&path, format!("corrupt cache: {e}")))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(ScanError::io(&path, e)),
        };
        debug!(path = %path.display(), entries = entries.len(), "loaded fingerprint cache");
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, fingerprint: impl Into<String>) {
        self.entries.insert(key.into(), fingerprint.into());
        self.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether entries changed since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the cache atomically.
    pub fn save(&mut self) -> Result<(), ScanError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| ScanError::io(&dir, e))?;

        let json = serde_json::to_vec_pretty(&self.entries)
            .map_err(|e| ScanError::cache(&self.path, e.to_string()))?;
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| ScanError::io(&dir, e))?;
        tmp.write_all(&json)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| ScanError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| ScanError::cache(&self.path, e.to_string()))?;

        self.dirty = false;
        debug!(path = %self.path.display(), entries = self.entries.len(), "saved fingerprint cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_cache_is_empty() {
        let temp = TempDir::new().unwrap();
        let cache = FingerprintCache::load(temp.path().join("cache.json")).unwrap();
        assert!(cache.is_empty());
        assert!(!cache.is_dirty());
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/cache.json");

        let mut cache = FingerprintCache::new(&path);
        cache.insert("a/b.txt", "123");
        assert!(cache.is_dirty());
        cache.save().unwrap();
        assert!(!cache.is_dirty());

        let reloaded = FingerprintCache::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("a/b.txt"), Some("123"));
    }

    #[test]
    fn test_corrupt_cache_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cache.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FingerprintCache::load(&path),
            Err(ScanError::Cache { .. })
        ));
    }
}
