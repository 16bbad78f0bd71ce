//! JWalk-based directory scanner.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use jwalk::{Parallelism, WalkDir};
use tokio::sync::broadcast;
use tracing::{debug, trace};

use fileset_core::{
    EntryKind, PathModel, PatternSet, ScanConfig, ScanError, ScanResult, ScanStats, ScanWarning,
};
use fileset_select::{FileSelector, SelectorChain, build_chain};

use crate::progress::{ProgressTracker, ScanProgress};
use crate::visited::VisitedDirs;

/// Files between two progress updates.
const PROGRESS_INTERVAL: u64 = 1000;

/// Lifecycle of a [`DirectoryScanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// No scan has run yet.
    #[default]
    Idle,
    /// A scan is in progress.
    Scanning,
    /// The last scan completed.
    Done,
    /// The last scan returned an error.
    Failed,
}

/// Scanner that collects the files and directories of a tree that match a
/// [`ScanConfig`].
///
/// Relative paths in the result are joined with the separator of the
/// scanner's [`PathModel`].
#[derive(Debug)]
pub struct DirectoryScanner {
    paths: PathModel,
    selectors: Vec<Arc<dyn FileSelector>>,
    state: ScanState,
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl DirectoryScanner {
    /// Create a scanner using `paths` for pattern and path syntax.
    pub fn new(paths: PathModel) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            paths,
            selectors: Vec::new(),
            state: ScanState::Idle,
            progress_tx,
        }
    }

    /// Create a scanner for the host platform.
    pub fn native() -> io::Result<Self> {
        Ok(Self::new(PathModel::native()?))
    }

    pub fn paths(&self) -> &PathModel {
        &self.paths
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Attach a selector applied in addition to the configured ones.
    pub fn add_selector(&mut self, selector: impl FileSelector + 'static) {
        self.selectors.push(Arc::new(selector));
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Scan `config.base_dir`.
    pub fn scan(&mut self, config: &ScanConfig) -> Result<ScanResult, ScanError> {
        self.state = ScanState::Scanning;
        let result = self.run(config);
        self.state = match &result {
            Ok(_) => ScanState::Done,
            Err(e) => {
                debug!(error = %e, "Scan failed");
                ScanState::Failed
            }
        };
        result
    }

    fn run(&self, config: &ScanConfig) -> Result<ScanResult, ScanError> {
        let start = Instant::now();

        config.validate()?;
        let family = Arc::clone(self.paths.family());
        let mut chain = build_chain(&config.selectors, &family)?;
        chain.extend(
            self.selectors
                .iter()
                .map(|s| Box::new(Arc::clone(s)) as Box<dyn FileSelector>),
        );
        let patterns = config.pattern_set(family);

        let metadata = match fs::metadata(&config.base_dir) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if config.error_on_missing_dir {
                    return Err(ScanError::BaseDirMissing {
                        path: config.base_dir.clone(),
                    });
                }
                debug!(base = %config.base_dir.display(), "Base directory missing, nothing to scan");
                return Ok(ScanResult::empty(&config.base_dir));
            }
            Err(e) => return Err(ScanError::io(&config.base_dir, e)),
        };
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory {
                path: config.base_dir.clone(),
            });
        }

        let root = config
            .base_dir
            .canonicalize()
            .map_err(|e| ScanError::io(&config.base_dir, e))?;

        chain.scan_started(&root)?;
        let mut result = self.walk(config, &root, &patterns, &chain)?;
        result.warnings.extend(chain.take_warnings());
        chain.scan_finished()?;

        result.base_dir = config.base_dir.clone();
        result.scanned_at = SystemTime::now();
        result.scan_duration = start.elapsed();

        debug!(
            base = %root.display(),
            files = result.included_files.len(),
            dirs = result.included_dirs.len(),
            warnings = result.warnings.len(),
            "Scan finished"
        );
        Ok(result)
    }

    fn walk(
        &self,
        config: &ScanConfig,
        root: &Path,
        patterns: &PatternSet,
        selectors: &SelectorChain,
    ) -> Result<ScanResult, ScanError> {
        let separator = self.paths.separator();
        let visited = config.follow_symlinks.then(|| Arc::new(VisitedDirs::new()));
        let pruned = Arc::new(AtomicU64::new(0));

        let walker = {
            let root = root.to_path_buf();
            let patterns = patterns.clone();
            let visited = visited.clone();
            let pruned = Arc::clone(&pruned);

            WalkDir::new(&root)
                .parallelism(Parallelism::Serial)
                .sort(true)
                .skip_hidden(false)
                .follow_links(config.follow_symlinks)
                .min_depth(0)
                .process_read_dir(move |_depth, _dir, _state, children| {
                    for child in children.iter_mut().flatten() {
                        if child.read_children_path.is_none() {
                            continue;
                        }
                        let path = child.path();
                        let relative = relative_path(&root, &path, separator);
                        let tokens = patterns.tokenize(&relative);

                        if !patterns.could_match_below(&tokens) || patterns.contents_excluded(&tokens) {
                            trace!(dir = %relative, "Pruning directory");
                            child.read_children_path = None;
                            pruned.fetch_add(1, Ordering::Relaxed);
                            continue;
                        }

                        // Only a link can lead back into its own branch.
                        if let Some(visited) = &visited {
                            if child.path_is_symlink() && visited.loops_back(&path, &root) {
                                debug!(link = %path.display(), "Link points into its own branch");
                                child.read_children_path = None;
                                visited.record_cycle(path);
                            }
                        }
                    }
                })
        };

        let mut result = ScanResult::empty(root);
        let mut stats = ScanStats::new();
        let mut tracker = ProgressTracker::new();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                    if is_broken_symlink(&path) {
                        result.warnings.push(ScanWarning::broken_symlink(&path));
                        continue;
                    }
                    if err.loop_ancestor().is_some() {
                        result.warnings.push(ScanWarning::symlink_cycle(&path));
                        continue;
                    }
                    return Err(walk_error(path, &err));
                }
            };

            if let Some(err) = &entry.read_children_error {
                return Err(walk_error(entry.path(), err));
            }

            let path = entry.path();
            let depth = entry.depth() as u32;
            let file_type = entry.file_type();

            if entry.depth() == 0 {
                stats.record_dir(0);
                tracker.record_dir();
                if patterns.root_included() {
                    result.included_dirs.push(String::new());
                }
                continue;
            }

            let relative = relative_path(root, &path, separator);
            let tokens = patterns.tokenize(&relative);

            if entry.path_is_symlink() {
                stats.record_symlink();
            }

            if file_type.is_symlink() {
                // Only reached when links are not followed.
                let target_is_dir = path.is_dir();
                if !target_is_dir && is_broken_symlink(&path) {
                    result.warnings.push(ScanWarning::broken_symlink(&path));
                }
                let kind = if target_is_dir {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                };
                let wanted = patterns.is_included(&tokens, kind)
                    || (target_is_dir
                        && patterns.could_match_below(&tokens)
                        && !patterns.contents_excluded(&tokens));
                if wanted && !patterns.is_excluded(&tokens, kind) {
                    trace!(link = %relative, "Symbolic link not followed");
                    result.not_followed_symlinks.push(relative);
                }
                continue;
            }

            if file_type.is_dir() {
                stats.record_dir(depth);
                tracker.record_dir();
                if patterns.keeps(&tokens, EntryKind::Directory) {
                    result.included_dirs.push(relative);
                }
            } else if file_type.is_file() {
                stats.record_file(depth);
                let mut included = false;
                if patterns.keeps(&tokens, EntryKind::File) {
                    if selectors.is_selected(root, &relative, &path) {
                        if let Ok(metadata) = entry.metadata() {
                            stats.included_size += metadata.len();
                        }
                        result.included_files.push(relative);
                        included = true;
                    } else {
                        trace!(file = %relative, "Deselected");
                        result.deselected_files.push(relative);
                    }
                }

                let count = tracker.record_file(included);
                if count % PROGRESS_INTERVAL == 0 {
                    tracker.set_current_path(path);
                    tracker.set_warnings(result.warnings.len());
                    let _ = self.progress_tx.send(tracker.snapshot(false));
                }
            }
        }

        if let Some(visited) = &visited {
            result
                .warnings
                .extend(visited.take_cycles().into_iter().map(ScanWarning::symlink_cycle));
        }

        stats.record_pruned(pruned.load(Ordering::Relaxed));
        result.stats = stats;

        tracker.set_warnings(result.warnings.len());
        let _ = self.progress_tx.send(tracker.snapshot(true));
        debug!(elapsed = ?tracker.elapsed(), "Walk complete");

        Ok(result)
    }
}

/// Relative path of `path` below `root`, joined with `separator`.
fn relative_path(root: &Path, path: &Path, separator: char) -> String {
    let Ok(rest) = path.strip_prefix(root) else {
        return path.to_string_lossy().into_owned();
    };
    let segments: Vec<Cow<'_, str>> = rest
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    segments.join(separator.encode_utf8(&mut [0; 4]))
}

fn is_broken_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink()) && fs::metadata(path).is_err()
}

fn walk_error(path: PathBuf, err: &jwalk::Error) -> ScanError {
    match err.io_error().map(io::Error::kind) {
        Some(io::ErrorKind::PermissionDenied) => ScanError::PermissionDenied { path },
        _ => ScanError::walk(path, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("dir1/subdir")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "test").unwrap();
        fs::write(root.join("dir2/file4.rs"), "another file here").unwrap();

        temp
    }

    #[test]
    fn test_basic_scan() {
        let temp = create_test_tree();
        let mut scanner = DirectoryScanner::new(PathModel::unix("/"));
        assert_eq!(scanner.state(), ScanState::Idle);

        let result = scanner.scan(&ScanConfig::new(temp.path())).unwrap();

        assert_eq!(scanner.state(), ScanState::Done);
        assert_eq!(
            result.included_files,
            vec![
                "dir1/file2.txt",
                "dir1/subdir/file3.txt",
                "dir2/file4.rs",
                "file1.txt"
            ]
        );
        assert_eq!(result.included_dirs, vec!["", "dir1", "dir1/subdir", "dir2"]);
        assert_eq!(result.stats.files_seen, 4);
        assert_eq!(result.stats.dirs_seen, 4);
        assert_eq!(result.stats.max_depth, 3);
        assert_eq!(result.stats.included_size, 5 + 17 + 4 + 17);
    }

    #[test]
    fn test_include_prunes_other_directories() {
        let temp = create_test_tree();
        let config = ScanConfig::builder()
            .base_dir(temp.path())
            .includes(vec!["dir1/**/*.txt".to_string()])
            .build()
            .unwrap();

        let mut scanner = DirectoryScanner::new(PathModel::unix("/"));
        let result = scanner.scan(&config).unwrap();

        assert_eq!(
            result.included_files,
            vec!["dir1/file2.txt", "dir1/subdir/file3.txt"]
        );
        assert!(result.included_dirs.is_empty());
        assert_eq!(result.stats.dirs_pruned, 1);
    }

    #[test]
    fn test_relative_path_uses_family_separator() {
        let root = Path::new("/base");
        assert_eq!(relative_path(root, Path::new("/base/a/b"), '\\'), "a\\b");
        assert_eq!(relative_path(root, Path::new("/base"), '/'), "");
    }

    #[test]
    fn test_not_a_directory() {
        let temp = create_test_tree();
        let mut scanner = DirectoryScanner::new(PathModel::unix("/"));
        let err = scanner
            .scan(&ScanConfig::new(temp.path().join("file1.txt")))
            .unwrap_err();

        assert!(matches!(err, ScanError::NotADirectory { .. }));
        assert_eq!(scanner.state(), ScanState::Failed);
    }
}
