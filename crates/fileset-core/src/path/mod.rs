//! Cross-platform path model.
//!
//! Path syntax differs per OS family: separators, what counts as a root, how
//! drive letters and UNC shares behave. Each family is a [`PathFamily`]
//! implementation. A [`PathModel`] pairs one family with an explicit working
//! directory, so either family can be exercised on any host.
//!
//! All operations here are pure string arithmetic; nothing touches the
//! filesystem.

mod dos;
mod unix;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::PathError;

pub use dos::DosFamily;
pub use unix::UnixFamily;

/// Path syntax rules of one OS family.
pub trait PathFamily: fmt::Debug + Send + Sync {
    /// Short family name (`unix`, `dos`).
    fn name(&self) -> &'static str;

    /// Native name separator.
    fn separator(&self) -> char;

    /// Separator used between entries of a path list.
    fn path_separator(&self) -> char;

    /// Whether `c` separates names in this family.
    fn is_separator(&self, c: char) -> bool;

    /// Whether file names compare case-sensitively by default.
    fn is_case_sensitive(&self) -> bool;

    /// Rewrite separators to the native one and drop redundant ones.
    ///
    /// Idempotent: `normalize(normalize(p)) == normalize(p)`.
    fn normalize(&self, path: &str) -> String;

    /// Length of the root/drive portion of a normalized path.
    ///
    /// `0` for relative paths; larger values depend on the family.
    fn prefix_length(&self, path: &str) -> usize;

    /// Join a normalized child onto a normalized parent.
    fn resolve(&self, parent: &str, child: &str) -> String;

    /// Make a normalized path absolute against a normalized working directory.
    fn resolve_against(&self, path: &str, user_dir: &str) -> Result<String, PathError>;

    /// Convert the path component of a `file:` URI to a native path.
    fn from_uri_path(&self, path: &str) -> String;

    /// Whether a normalized path is absolute.
    fn is_absolute(&self, path: &str) -> bool;

    /// Parent used when a path has no parent of its own.
    fn default_parent(&self) -> &'static str;

    /// Split a path into its root and the remainder.
    ///
    /// The root keeps the prefix exactly as normalized; the remainder has no
    /// leading separators.
    fn dissect(&self, path: &str) -> (String, String) {
        let normalized = self.normalize(path);
        let prefix = self.prefix_length(&normalized);
        let (root, rest) = normalized.split_at(prefix);
        let rest = rest.trim_start_matches(|c| self.is_separator(c));
        (root.to_string(), rest.to_string())
    }

    /// Collapse `.` and `..` segments.
    ///
    /// A `..` that would climb above the root of an absolute path is an
    /// error; in relative paths leading `..` segments are kept.
    fn normalize_dots(&self, path: &str) -> Result<String, PathError> {
        let (root, rest) = self.dissect(path);
        let absolute = !root.is_empty();
        let mut segments: Vec<&str> = Vec::new();

        for segment in rest.split(|c| self.is_separator(c)) {
            match segment {
                "" | "." => {}
                ".." => match segments.last() {
                    Some(&last) if last != ".." => {
                        segments.pop();
                    }
                    _ if absolute => {
                        return Err(PathError::EscapesRoot {
                            path: path.to_string(),
                        });
                    }
                    _ => segments.push(".."),
                },
                other => segments.push(other),
            }
        }

        let sep = self.separator().to_string();
        let joined = segments.join(&sep);
        Ok(format!("{root}{joined}"))
    }

    /// Whether `leading` names `path` itself or one of its ancestors.
    fn is_leading_path(&self, leading: &str, path: &str) -> bool {
        let leading = self.normalize(leading);
        let path = self.normalize(path);
        if leading == path {
            return true;
        }
        if leading.is_empty() {
            return self.prefix_length(&path) == 0;
        }
        match path.strip_prefix(leading.as_str()) {
            Some(rest) => {
                leading.ends_with(|c| self.is_separator(c))
                    || rest.starts_with(|c| self.is_separator(c))
            }
            None => false,
        }
    }

    /// Strip `leading` from `path` if it is a leading path of it.
    ///
    /// Returns `path` normalized but otherwise unchanged when `leading` is
    /// not an ancestor.
    fn remove_leading_path(&self, leading: &str, path: &str) -> String {
        let normalized_path = self.normalize(path);
        if !self.is_leading_path(leading, path) {
            return normalized_path;
        }
        let leading = self.normalize(leading);
        normalized_path[leading.len()..]
            .trim_start_matches(|c| self.is_separator(c))
            .to_string()
    }
}

/// Selects a family by name, for configuration files and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum FamilyKind {
    /// Unix-like: `/` separator, single root.
    Unix,
    /// DOS/Windows: `\` separator, drive letters, UNC shares.
    Dos,
}

impl Default for FamilyKind {
    fn default() -> Self {
        Self::native()
    }
}

impl FamilyKind {
    /// The family of the host this binary was built for.
    pub fn native() -> Self {
        if cfg!(windows) { Self::Dos } else { Self::Unix }
    }

    /// Construct the strategy value for this family.
    pub fn family(self) -> Arc<dyn PathFamily> {
        match self {
            Self::Unix => Arc::new(UnixFamily),
            Self::Dos => Arc::new(DosFamily),
        }
    }
}

/// A path family bound to a working directory.
///
/// Constructed once and handed to whatever needs path arithmetic; nothing in
/// this crate looks the family up globally.
#[derive(Debug, Clone)]
pub struct PathModel {
    family: Arc<dyn PathFamily>,
    user_dir: String,
}

impl PathModel {
    /// Create a model from a family and a working directory.
    pub fn new(family: Arc<dyn PathFamily>, user_dir: impl AsRef<str>) -> Self {
        let user_dir = family.normalize(user_dir.as_ref());
        Self { family, user_dir }
    }

    /// Unix family with the given working directory.
    pub fn unix(user_dir: impl AsRef<str>) -> Self {
        Self::new(Arc::new(UnixFamily), user_dir)
    }

    /// DOS family with the given working directory.
    pub fn dos(user_dir: impl AsRef<str>) -> Self {
        Self::new(Arc::new(DosFamily), user_dir)
    }

    /// Host family, bound to the process working directory at call time.
    pub fn native() -> std::io::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::new(FamilyKind::native().family(), cwd.to_string_lossy()))
    }

    /// The family strategy.
    pub fn family(&self) -> &Arc<dyn PathFamily> {
        &self.family
    }

    /// The working directory used by [`PathModel::resolve_file`].
    pub fn user_dir(&self) -> &str {
        &self.user_dir
    }

    pub fn separator(&self) -> char {
        self.family.separator()
    }

    pub fn normalize(&self, path: &str) -> String {
        self.family.normalize(path)
    }

    pub fn prefix_length(&self, path: &str) -> usize {
        self.family.prefix_length(&self.family.normalize(path))
    }

    pub fn resolve(&self, parent: &str, child: &str) -> String {
        self.family
            .resolve(&self.family.normalize(parent), &self.family.normalize(child))
    }

    /// Make a path absolute.
    ///
    /// Absolute paths come back unchanged, root-relative paths take the
    /// working directory's root, relative paths are joined onto the working
    /// directory.
    pub fn resolve_file(&self, path: &str) -> Result<String, PathError> {
        self.family
            .resolve_against(&self.family.normalize(path), &self.user_dir)
    }

    pub fn from_uri_path(&self, uri_path: &str) -> String {
        self.family.from_uri_path(uri_path)
    }

    pub fn is_absolute(&self, path: &str) -> bool {
        self.family.is_absolute(&self.family.normalize(path))
    }

    pub fn default_parent(&self) -> &'static str {
        self.family.default_parent()
    }

    pub fn dissect(&self, path: &str) -> (String, String) {
        self.family.dissect(path)
    }

    pub fn normalize_dots(&self, path: &str) -> Result<String, PathError> {
        self.family.normalize_dots(path)
    }

    pub fn is_leading_path(&self, leading: &str, path: &str) -> bool {
        self.family.is_leading_path(leading, path)
    }

    pub fn remove_leading_path(&self, leading: &str, path: &str) -> String {
        self.family.remove_leading_path(leading, path)
    }
}
