//! Access-right and file-type selectors.

use std::fs::{self, OpenOptions};
use std::path::Path;

use fileset_core::PosixMode;

use crate::selector::FileSelector;

/// Files the current process can open for reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadableSelector;

impl FileSelector for ReadableSelector {
    fn is_selected(&self, _base_dir: &Path, _relative: &str, file: &Path) -> bool {
        fs::File::open(file).is_ok()
    }
}

/// Files the current process can open for writing.
///
/// Opened in append mode, so nothing is modified.
#[derive(Debug, Clone, Copy, Default)]
pub struct WritableSelector;

impl FileSelector for WritableSelector {
    fn is_selected(&self, _base_dir: &Path, _relative: &str, file: &Path) -> bool {
        OpenOptions::new().append(true).open(file).is_ok()
    }
}

/// Files with an execute bit set (Unix) or an executable extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutableSelector;

impl FileSelector for ExecutableSelector {
    #[cfg(unix)]
    fn is_selected(&self, _base_dir: &Path, _relative: &str, file: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;

        fs::metadata(file).is_ok_and(|m| m.permissions().mode() & 0o111 != 0)
    }

    #[cfg(not(unix))]
    fn is_selected(&self, _base_dir: &Path, _relative: &str, file: &Path) -> bool {
        const EXTENSIONS: [&str; 4] = ["exe", "com", "bat", "cmd"];
        file.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
    }
}

/// Entries that are symbolic links themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymlinkSelector;

impl FileSelector for SymlinkSelector {
    fn is_selected(&self, _base_dir: &Path, _relative: &str, file: &Path) -> bool {
        fs::symlink_metadata(file).is_ok_and(|m| m.file_type().is_symlink())
    }
}

/// Exact match on the nine permission bits.
///
/// On targets without POSIX permissions the configured mode cannot be
/// compared, so the selector rejects every file there.
#[derive(Debug, Clone, Copy)]
pub struct PermissionsSelector {
    #[cfg_attr(not(unix), allow(dead_code))]
    mode: PosixMode,
    #[cfg_attr(not(unix), allow(dead_code))]
    follow_symlinks: bool,
}

impl PermissionsSelector {
    pub fn new(mode: PosixMode, follow_symlinks: bool) -> Self {
        Self {
            mode,
            follow_symlinks,
        }
    }
}

impl FileSelector for PermissionsSelector {
    #[cfg(unix)]
    fn is_selected(&self, _base_dir: &Path, _relative: &str, file: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;

        let metadata = if self.follow_symlinks {
            fs::metadata(file)
        } else {
            fs::symlink_metadata(file)
        };
        metadata.is_ok_and(|m| PosixMode::from_bits(m.permissions().mode()) == self.mode)
    }

    #[cfg(not(unix))]
    fn is_selected(&self, _base_dir: &Path, _relative: &str, _file: &Path) -> bool {
        false
    }
}
