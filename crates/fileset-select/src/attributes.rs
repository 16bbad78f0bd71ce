//! Selectors on size, depth, name and contents.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::trace;

use fileset_core::{PathFamily, Pattern, SizeComparison, TokenizedPath};

use crate::selector::FileSelector;

/// Compares the file length with a limit.
#[derive(Debug, Clone, Copy)]
pub struct SizeSelector {
    limit: u64,
    when: SizeComparison,
}

impl SizeSelector {
    pub fn new(limit: u64, when: SizeComparison) -> Self {
        Self { limit, when }
    }
}

impl FileSelector for SizeSelector {
    fn is_selected(&self, _base_dir: &Path, _relative: &str, file: &Path) -> bool {
        let Ok(metadata) = fs::metadata(file) else {
            return false;
        };
        let size = metadata.len();
        match self.when {
            SizeComparison::Less => size < self.limit,
            SizeComparison::More => size > self.limit,
            SizeComparison::Equal => size == self.limit,
        }
    }
}

/// Bounds the number of directories between the base directory and a file.
///
/// A file directly in the base directory has depth 0.
#[derive(Debug)]
pub struct DepthSelector {
    family: Arc<dyn PathFamily>,
    min: Option<u32>,
    max: Option<u32>,
}

impl DepthSelector {
    pub fn new(family: Arc<dyn PathFamily>, min: Option<u32>, max: Option<u32>) -> Self {
        Self { family, min, max }
    }

    fn depth(&self, relative: &str) -> u32 {
        let segments = relative
            .split(|c| self.family.is_separator(c))
            .filter(|s| !s.is_empty())
            .count();
        u32::try_from(segments.saturating_sub(1)).unwrap_or(u32::MAX)
    }
}

impl FileSelector for DepthSelector {
    fn is_selected(&self, _base_dir: &Path, relative: &str, _file: &Path) -> bool {
        let depth = self.depth(relative);
        self.min.is_none_or(|min| depth >= min) && self.max.is_none_or(|max| depth <= max)
    }
}

/// Glob match against the relative path.
#[derive(Debug)]
pub struct FilenameSelector {
    family: Arc<dyn PathFamily>,
    pattern: Pattern,
    case_sensitive: bool,
    negate: bool,
}

impl FilenameSelector {
    pub fn new(family: Arc<dyn PathFamily>, pattern: &str, case_sensitive: bool, negate: bool) -> Self {
        let pattern = Pattern::parse(pattern, family.as_ref());
        Self {
            family,
            pattern,
            case_sensitive,
            negate,
        }
    }
}

impl FileSelector for FilenameSelector {
    fn is_selected(&self, _base_dir: &Path, relative: &str, _file: &Path) -> bool {
        let path = TokenizedPath::new(relative, self.family.as_ref());
        self.pattern.matches(&path, self.case_sensitive) != self.negate
    }
}

/// Substring search in the file contents.
#[derive(Debug, Clone)]
pub struct ContainsSelector {
    needle: String,
    case_sensitive: bool,
    ignore_whitespace: bool,
}

impl ContainsSelector {
    pub fn new(text: &str, case_sensitive: bool, ignore_whitespace: bool) -> Self {
        Self {
            needle: Self::prepare(text, case_sensitive, ignore_whitespace),
            case_sensitive,
            ignore_whitespace,
        }
    }

    fn prepare(text: &str, case_sensitive: bool, ignore_whitespace: bool) -> String {
        let text: String = if ignore_whitespace {
            text.chars().filter(|c| !c.is_whitespace()).collect()
        } else {
            text.to_string()
        };
        if case_sensitive { text } else { text.to_lowercase() }
    }
}

impl FileSelector for ContainsSelector {
    fn is_selected(&self, _base_dir: &Path, relative: &str, file: &Path) -> bool {
        let bytes = match fs::read(file) {
            Ok(bytes) => bytes,
            Err(e) => {
                trace!(file = relative, error = %e, "could not read contents");
                return false;
            }
        };
        let haystack = Self::prepare(
            &String::from_utf8_lossy(&bytes),
            self.case_sensitive,
            self.ignore_whitespace,
        );
        haystack.contains(&self.needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileset_core::{DosFamily, UnixFamily};
    use tempfile::TempDir;

    #[test]
    fn test_size_comparisons() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("f");
        fs::write(&file, vec![0u8; 2048]).unwrap();
        let check = |limit, when| SizeSelector::new(limit, when).is_selected(temp.path(), "f", &file);
        assert!(check(4096, SizeComparison::Less));
        assert!(!check(2048, SizeComparison::Less));
        assert!(check(2048, SizeComparison::Equal));
        assert!(check(1000, SizeComparison::More));
        assert!(!check(2048, SizeComparison::More));
    }

    #[test]
    fn test_depth_bounds() {
        let s = DepthSelector::new(Arc::new(UnixFamily), Some(1), Some(2));
        let base = Path::new("/b");
        assert!(!s.is_selected(base, "top.txt", Path::new("/b/top.txt")));
        assert!(s.is_selected(base, "a/x.txt", Path::new("/b/a/x.txt")));
        assert!(s.is_selected(base, "a/b/x.txt", Path::new("/b/a/b/x.txt")));
        assert!(!s.is_selected(base, "a/b/c/x.txt", Path::new("/b/a/b/c/x.txt")));

        let dos = DepthSelector::new(Arc::new(DosFamily), None, Some(0));
        assert!(!dos.is_selected(base, "a\\x.txt", Path::new("/b/a/x.txt")));
    }

    #[test]
    fn test_filename_negate_and_case() {
        let base = Path::new("/b");
        let file = Path::new("/b/src/Main.RS");
        let s = FilenameSelector::new(Arc::new(UnixFamily), "**/*.rs", false, false);
        assert!(s.is_selected(base, "src/Main.RS", file));
        let strict = FilenameSelector::new(Arc::new(UnixFamily), "**/*.rs", true, false);
        assert!(!strict.is_selected(base, "src/Main.RS", file));
        let negated = FilenameSelector::new(Arc::new(UnixFamily), "**/*.rs", true, true);
        assert!(negated.is_selected(base, "src/Main.RS", file));
    }

    #[test]
    fn test_contains_options() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("notes.txt");
        fs::write(&file, "Hello,\n  World").unwrap();
        let check = |text, cs, ws| ContainsSelector::new(text, cs, ws).is_selected(temp.path(), "notes.txt", &file);
        assert!(check("World", true, false));
        assert!(!check("world", true, false));
        assert!(check("world", false, false));
        assert!(!check("Hello,World", true, false));
        assert!(check("hello, world", false, true));
    }
}
