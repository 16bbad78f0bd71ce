//! Include/exclude pattern sets.

use std::sync::Arc;

use crate::path::PathFamily;
use crate::pattern::{DEEP_TREE_MATCH, EntryKind, Pattern, TokenizedPath};

/// Patterns excluded when a scan opts into default excludes.
///
/// Editor backups and version-control metadata.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    // Editor backups and lock files
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/%*%",
    "**/._*",
    // CVS
    "**/CVS",
    "**/CVS/**",
    "**/.cvsignore",
    // SCCS
    "**/SCCS",
    "**/SCCS/**",
    // Visual SourceSafe
    "**/vssver.scc",
    // Subversion
    "**/.svn",
    "**/.svn/**",
    // Git
    "**/.git",
    "**/.git/**",
    "**/.gitattributes",
    "**/.gitignore",
    "**/.gitmodules",
    // Mercurial
    "**/.hg",
    "**/.hg/**",
    "**/.hgignore",
    "**/.hgsub",
    "**/.hgsubstate",
    "**/.hgtags",
    // Bazaar
    "**/.bzr",
    "**/.bzr/**",
    "**/.bzrignore",
    // Mac
    "**/.DS_Store",
];

/// Ordered include and exclude patterns sharing one case-sensitivity flag.
///
/// Excludes always win over includes.
#[derive(Debug, Clone)]
pub struct PatternSet {
    family: Arc<dyn PathFamily>,
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
    case_sensitive: bool,
}

impl PatternSet {
    /// Build a set. Absent includes mean a single `**`.
    pub fn new<S: AsRef<str>>(
        family: Arc<dyn PathFamily>,
        includes: Option<&[S]>,
        excludes: &[S],
        case_sensitive: bool,
    ) -> Self {
        let includes = match includes {
            Some(list) => list
                .iter()
                .map(|p| Pattern::parse(p.as_ref(), family.as_ref()))
                .collect(),
            None => vec![Pattern::parse(DEEP_TREE_MATCH, family.as_ref())],
        };
        let excludes = excludes
            .iter()
            .map(|p| Pattern::parse(p.as_ref(), family.as_ref()))
            .collect();
        Self {
            family,
            includes,
            excludes,
            case_sensitive,
        }
    }

    /// Append the default excludes.
    pub fn with_default_excludes(mut self) -> Self {
        self.excludes.extend(
            DEFAULT_EXCLUDES
                .iter()
                .map(|p| Pattern::parse(p, self.family.as_ref())),
        );
        self
    }

    pub fn includes(&self) -> &[Pattern] {
        &self.includes
    }

    pub fn excludes(&self) -> &[Pattern] {
        &self.excludes
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Split a relative path with this set's family.
    pub fn tokenize(&self, relative: &str) -> TokenizedPath {
        TokenizedPath::new(relative, self.family.as_ref())
    }

    pub fn is_included(&self, path: &TokenizedPath, kind: EntryKind) -> bool {
        self.includes
            .iter()
            .any(|p| p.matches_entry(path, kind, self.case_sensitive))
    }

    pub fn is_excluded(&self, path: &TokenizedPath, kind: EntryKind) -> bool {
        self.excludes
            .iter()
            .any(|p| p.matches_entry(path, kind, self.case_sensitive))
    }

    /// Included and not excluded.
    pub fn keeps(&self, path: &TokenizedPath, kind: EntryKind) -> bool {
        self.is_included(path, kind) && !self.is_excluded(path, kind)
    }

    /// Whether any include pattern could match something below `dir`.
    pub fn could_match_below(&self, dir: &TokenizedPath) -> bool {
        self.includes
            .iter()
            .any(|p| p.matches_start(dir, self.case_sensitive))
    }

    /// Whether an exclude pattern covers everything below `dir`.
    pub fn contents_excluded(&self, dir: &TokenizedPath) -> bool {
        self.excludes
            .iter()
            .any(|p| p.matches_all_below(dir, self.case_sensitive))
    }

    /// Whether the scan root (the empty relative path) is reported.
    pub fn root_included(&self) -> bool {
        self.includes.iter().any(Pattern::matches_root)
            && !self.excludes.iter().any(Pattern::matches_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::UnixFamily;

    fn set(includes: Option<&[&str]>, excludes: &[&str]) -> PatternSet {
        PatternSet::new(Arc::new(UnixFamily), includes, excludes, true)
    }

    #[test]
    fn test_absent_includes_match_everything() {
        let s = set(None, &[]);
        assert!(s.keeps(&s.tokenize("a/b/c"), EntryKind::File));
        assert!(s.root_included());
    }

    #[test]
    fn test_exclude_wins_on_identical_patterns() {
        let s = set(Some(&["alpha/**"]), &["alpha/**"]);
        let p = s.tokenize("alpha/beta");
        assert!(s.is_included(&p, EntryKind::File));
        assert!(!s.keeps(&p, EntryKind::File));
        assert!(!s.root_included());
    }

    #[test]
    fn test_pruning_queries() {
        let s = set(Some(&["alpha/beta/**"]), &["alpha/beta/gamma/**"]);
        assert!(s.could_match_below(&s.tokenize("alpha")));
        assert!(!s.could_match_below(&s.tokenize("delta")));
        assert!(s.contents_excluded(&s.tokenize("alpha/beta/gamma")));
        assert!(!s.contents_excluded(&s.tokenize("alpha/beta")));
    }

    #[test]
    fn test_default_excludes() {
        let s = set(None, &[]).with_default_excludes();
        assert!(!s.keeps(&s.tokenize("src/.git"), EntryKind::Directory));
        assert!(!s.keeps(&s.tokenize("src/.git/HEAD"), EntryKind::File));
        assert!(!s.keeps(&s.tokenize("notes.txt~"), EntryKind::File));
        assert!(!s.keeps(&s.tokenize(".DS_Store"), EntryKind::File));
        assert!(s.keeps(&s.tokenize("src/main.rs"), EntryKind::File));
        assert!(s.contents_excluded(&s.tokenize("a/CVS")));
    }

    #[test]
    fn test_case_insensitive_set() {
        let s = PatternSet::new(
            Arc::new(UnixFamily),
            Some(&["ALPHA/**"][..]),
            &[],
            false,
        );
        assert!(s.keeps(&s.tokenize("alpha/x"), EntryKind::File));
        assert!(s.could_match_below(&s.tokenize("Alpha")));
    }
}
