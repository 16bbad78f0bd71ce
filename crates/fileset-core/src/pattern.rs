//! Recursive-wildcard glob matching over path segments.
//!
//! Patterns are split into segments at separators. Within a segment:
//! - `*` matches zero or more characters
//! - `?` matches exactly one character
//!
//! A segment consisting solely of `**` matches zero or more whole segments.
//! A trailing separator is shorthand for a trailing `**` (`alpha/` means
//! `alpha/**`).
//!
//! Both `/` and `\` are accepted as separators in patterns; they are rewritten
//! to the family's native separator before splitting.

use std::collections::HashSet;

use crate::path::PathFamily;

/// The descendant wildcard.
pub const DEEP_TREE_MATCH: &str = "**";

/// Check if a pattern contains wildcard characters.
pub fn has_wildcards(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Kind of filesystem entry a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `**`: zero or more whole segments.
    Deep,
    /// A single segment, possibly containing `?` and `*`.
    Literal(String),
}

impl Segment {
    fn parse(token: &str) -> Self {
        if token == DEEP_TREE_MATCH {
            Self::Deep
        } else {
            Self::Literal(token.to_string())
        }
    }

    pub fn is_deep(&self) -> bool {
        matches!(self, Self::Deep)
    }
}

/// A path split into segments, with the root (if any) as the first segment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenizedPath {
    tokens: Vec<String>,
}

impl TokenizedPath {
    /// Split a path using the family's syntax.
    pub fn new(path: &str, family: &dyn PathFamily) -> Self {
        let (root, rest) = family.dissect(path);
        let mut tokens = Vec::new();
        if !root.is_empty() {
            tokens.push(root);
        }
        tokens.extend(
            rest.split(|c| family.is_separator(c))
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        Self { tokens }
    }

    /// Build from segments that are already split.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// The empty path: the scan root.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Join the segments with `separator`.
    pub fn join(&self, separator: char) -> String {
        let mut out = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 && !out.ends_with(separator) {
                out.push(separator);
            }
            out.push_str(token);
        }
        out
    }
}

/// A parsed glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
    trailing_separator: bool,
}

impl Pattern {
    /// Parse a pattern using the family's separator and root syntax.
    pub fn parse(raw: &str, family: &dyn PathFamily) -> Self {
        let sep = family.separator();
        let native: String = raw
            .chars()
            .map(|c| if c == '/' || c == '\\' { sep } else { c })
            .collect();
        let trailing_separator = native.ends_with(sep);

        let mut segments: Vec<Segment> = TokenizedPath::new(&native, family)
            .tokens
            .iter()
            .map(|t| Segment::parse(t))
            .collect();
        if trailing_separator {
            segments.push(Segment::Deep);
        }

        Self {
            raw: raw.to_string(),
            segments,
            trailing_separator,
        }
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the pattern was written with a trailing separator.
    pub fn has_trailing_separator(&self) -> bool {
        self.trailing_separator
    }

    /// Whether the last segment is `**`.
    pub fn ends_with_deep(&self) -> bool {
        self.segments.last().is_some_and(Segment::is_deep)
    }

    /// Whether the pattern consists of nothing but `**` segments.
    ///
    /// Such patterns are the only ones that select the scan root.
    pub fn matches_root(&self) -> bool {
        !self.segments.is_empty() && self.segments.iter().all(Segment::is_deep)
    }

    /// Whether every segment of `path` is consumed by the pattern.
    ///
    /// The empty path never matches.
    pub fn matches(&self, path: &TokenizedPath, case_sensitive: bool) -> bool {
        if path.is_empty() {
            return false;
        }
        match_segments(&self.segments, &path.tokens, case_sensitive)
    }

    /// Match an entry, honouring the trailing-separator rule.
    ///
    /// `alpha/` selects the directory `alpha` and everything below it, but a
    /// file must be a strict descendant of `alpha`.
    pub fn matches_entry(&self, path: &TokenizedPath, kind: EntryKind, case_sensitive: bool) -> bool {
        if kind == EntryKind::File && self.trailing_separator {
            if path.is_empty() {
                return false;
            }
            let mut segments = self.segments.clone();
            segments.pop();
            segments.push(Segment::Literal("*".to_string()));
            segments.push(Segment::Deep);
            return match_segments(&segments, &path.tokens, case_sensitive);
        }
        self.matches(path, case_sensitive)
    }

    /// Whether some path below `dir` could match the pattern.
    pub fn matches_start(&self, dir: &TokenizedPath, case_sensitive: bool) -> bool {
        match_segments_start(&self.segments, &dir.tokens, case_sensitive)
    }

    /// Whether the pattern ends in `**` and its prefix matches `dir`, so that
    /// everything below `dir` matches.
    pub fn matches_all_below(&self, dir: &TokenizedPath, case_sensitive: bool) -> bool {
        if !self.ends_with_deep() || dir.is_empty() {
            return false;
        }
        let prefix = &self.segments[..self.segments.len() - 1];
        match_segments(prefix, &dir.tokens, case_sensitive)
    }
}

/// Match `path` against `pattern`, both split by the family's separator.
///
/// Every path segment must be consumed. The empty path never matches, not
/// even `**`.
pub fn match_path(family: &dyn PathFamily, pattern: &str, path: &str, case_sensitive: bool) -> bool {
    let path = TokenizedPath::new(path, family);
    Pattern::parse(pattern, family).matches(&path, case_sensitive)
}

/// Whether a subtree rooted at `path` could contain a match for `pattern`.
///
/// A pattern-start test: `true` when `path` is consumed by a prefix of the
/// pattern or when a `**` is reached.
pub fn match_pattern_start(
    family: &dyn PathFamily,
    pattern: &str,
    path: &str,
    case_sensitive: bool,
) -> bool {
    let path = TokenizedPath::new(path, family);
    Pattern::parse(pattern, family).matches_start(&path, case_sensitive)
}

fn match_segments(pattern: &[Segment], path: &[String], case_sensitive: bool) -> bool {
    let mut failed = HashSet::new();
    match_from(pattern, 0, path, 0, case_sensitive, &mut failed)
}

/// Backtracking matcher. `**` first consumes nothing, then one more segment
/// per retry. Failed `(pattern, path)` positions are memoised so chains of
/// `**` stay polynomial.
fn match_from(
    pattern: &[Segment],
    pi: usize,
    path: &[String],
    si: usize,
    case_sensitive: bool,
    failed: &mut HashSet<(usize, usize)>,
) -> bool {
    if failed.contains(&(pi, si)) {
        return false;
    }

    let matched = match pattern.get(pi) {
        None => si == path.len(),
        Some(Segment::Deep) => {
            let mut next = pi + 1;
            while pattern.get(next).is_some_and(Segment::is_deep) {
                next += 1;
            }
            if next == pattern.len() {
                true
            } else {
                (si..=path.len()).any(|skip| match_from(pattern, next, path, skip, case_sensitive, failed))
            }
        }
        Some(Segment::Literal(segment)) => match path.get(si) {
            Some(name) => {
                match_segment(segment, name, case_sensitive)
                    && match_from(pattern, pi + 1, path, si + 1, case_sensitive, failed)
            }
            None => false,
        },
    };

    if !matched {
        failed.insert((pi, si));
    }
    matched
}

fn match_segments_start(pattern: &[Segment], path: &[String], case_sensitive: bool) -> bool {
    let mut pi = 0;
    let mut si = 0;
    while pi < pattern.len() && si < path.len() {
        match &pattern[pi] {
            Segment::Deep => return true,
            Segment::Literal(segment) => {
                if !match_segment(segment, &path[si], case_sensitive) {
                    return false;
                }
            }
        }
        pi += 1;
        si += 1;
    }
    // Path exhausted: the rest of the pattern may still match below it.
    // Pattern exhausted with path left over: nothing below can match.
    si == path.len()
}

/// Match one segment against a name using `?` and `*`.
pub fn match_segment(pattern: &str, name: &str, case_sensitive: bool) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let mut pi = 0;
    let mut ni = 0;
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while ni < name.len() {
        if pi < pattern.len() && pattern[pi] == '*' {
            star = Some(pi);
            mark = ni;
            pi += 1;
        } else if pi < pattern.len()
            && (pattern[pi] == '?' || chars_equal(pattern[pi], name[ni], case_sensitive))
        {
            pi += 1;
            ni += 1;
        } else if let Some(star_at) = star {
            // Let the last `*` swallow one more character and retry.
            pi = star_at + 1;
            mark += 1;
            ni = mark;
        } else {
            return false;
        }
    }

    while pi < pattern.len() && pattern[pi] == '*' {
        pi += 1;
    }
    pi == pattern.len()
}

fn chars_equal(a: char, b: char, case_sensitive: bool) -> bool {
    if a == b {
        return true;
    }
    !case_sensitive && a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{DosFamily, UnixFamily};

    fn m(pattern: &str, path: &str) -> bool {
        match_path(&UnixFamily, pattern, path, true)
    }

    #[test]
    fn test_segment_wildcards() {
        assert!(match_segment("*.xml", "beta.xml", true));
        assert!(match_segment("b?ta.*", "beta.xml", true));
        assert!(match_segment("*", "", true));
        assert!(match_segment("a*b*c", "aXXbYYc", true));
        assert!(!match_segment("a*b*c", "aXXbYY", true));
        assert!(!match_segment("?", "", true));
        assert!(!match_segment("GAMMA.XML", "gamma.xml", true));
        assert!(match_segment("GAMMA.XML", "gamma.xml", false));
    }

    #[test]
    fn test_deep_wildcard_matches_nonempty_paths_only() {
        assert!(m("**", "a"));
        assert!(m("**", "a/b/c"));
        assert!(!m("**", ""));
    }

    #[test]
    fn test_deep_wildcard_consumes_whole_segments() {
        assert!(m("**/gamma.xml", "gamma.xml"));
        assert!(m("**/gamma.xml", "alpha/beta/gamma/gamma.xml"));
        assert!(m("alpha/**/gamma.xml", "alpha/gamma.xml"));
        assert!(m("alpha/**/gamma/*.xml", "alpha/beta/gamma/gamma.xml"));
        assert!(!m("alpha/**/gamma.xml", "alphabet/gamma.xml"));
        assert!(!m("al**", "alpha/beta"));
        assert!(m("al**", "alpha"));
    }

    #[test]
    fn test_consecutive_deep_wildcards() {
        assert!(m("**/**/x", "x"));
        assert!(m("a/**/**/**/z", "a/b/c/d/e/z"));
        assert!(!m("a/**/**/**/z", "a/b/c/d/e/y"));
    }

    #[test]
    fn test_literal_requires_every_segment() {
        assert!(m("alpha", "alpha"));
        assert!(!m("alpha", "alpha/beta"));
        assert!(!m("alpha/beta", "alpha"));
    }

    #[test]
    fn test_trailing_separator() {
        let p = Pattern::parse("alpha/", &UnixFamily);
        assert!(p.has_trailing_separator());
        let alpha = TokenizedPath::from_segments(["alpha"]);
        let child = TokenizedPath::from_segments(["alpha", "beta.xml"]);
        assert!(p.matches_entry(&alpha, EntryKind::Directory, true));
        assert!(!p.matches_entry(&alpha, EntryKind::File, true));
        assert!(p.matches_entry(&child, EntryKind::File, true));
    }

    #[test]
    fn test_pattern_start() {
        let f = &UnixFamily;
        assert!(match_pattern_start(f, "alpha/beta/*.xml", "alpha", true));
        assert!(match_pattern_start(f, "alpha/beta/*.xml", "alpha/beta", true));
        assert!(!match_pattern_start(f, "alpha/beta/*.xml", "delta", true));
        assert!(!match_pattern_start(f, "alpha/beta", "alpha/beta/gamma", true));
        assert!(match_pattern_start(f, "alpha/**", "alpha/beta/gamma", true));
        assert!(match_pattern_start(f, "**/x", "anything", true));
        assert!(match_pattern_start(f, "alpha", "", true));
    }

    #[test]
    fn test_matches_all_below() {
        let f = &UnixFamily;
        let p = Pattern::parse("alpha/**", f);
        assert!(p.matches_all_below(&TokenizedPath::from_segments(["alpha"]), true));
        assert!(!p.matches_all_below(&TokenizedPath::from_segments(["delta"]), true));
        let bare = Pattern::parse("alpha", f);
        assert!(!bare.matches_all_below(&TokenizedPath::from_segments(["alpha"]), true));
    }

    #[test]
    fn test_root_patterns() {
        let f = &UnixFamily;
        assert!(Pattern::parse("**", f).matches_root());
        assert!(Pattern::parse("**/**", f).matches_root());
        assert!(!Pattern::parse("**/x", f).matches_root());
        assert!(!Pattern::parse("", f).matches_root());
    }

    #[test]
    fn test_absolute_patterns_keep_their_root() {
        assert!(m("/tmp/**", "/tmp/a"));
        assert!(!m("/tmp/**", "tmp/a"));
        assert!(!m("tmp/**", "/tmp/a"));
    }

    #[test]
    fn test_dos_family_accepts_both_separators() {
        let f = &DosFamily;
        assert!(match_path(f, "alpha/**/*.xml", "alpha\\beta\\beta.xml", true));
        assert!(match_path(f, "alpha\\beta\\", "alpha\\beta\\x", true));
        assert!(match_path(f, "c:/src/**", "C:\\src\\main.rs", false));
        assert!(!match_path(f, "c:/src/**", "C:\\src\\main.rs", true));
    }

    #[test]
    fn test_has_wildcards() {
        assert!(has_wildcards("*.rs"));
        assert!(has_wildcards("a?c"));
        assert!(!has_wildcards("src/main.rs"));
    }
}
