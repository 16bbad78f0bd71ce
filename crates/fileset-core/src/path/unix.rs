//! Unix path syntax.

use crate::error::PathError;

use super::PathFamily;

/// `/`-separated paths with a single root.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixFamily;

impl PathFamily for UnixFamily {
    fn name(&self) -> &'static str {
        "unix"
    }

    fn separator(&self) -> char {
        '/'
    }

    fn path_separator(&self) -> char {
        ':'
    }

    fn is_separator(&self, c: char) -> bool {
        c == '/'
    }

    fn is_case_sensitive(&self) -> bool {
        true
    }

    fn normalize(&self, path: &str) -> String {
        let mut out = String::with_capacity(path.len());
        let mut prev = None;
        for c in path.chars() {
            if c == '/' && prev == Some('/') {
                continue;
            }
            out.push(c);
            prev = Some(c);
        }
        if out.len() > 1 && out.ends_with('/') {
            out.pop();
        }
        out
    }

    fn prefix_length(&self, path: &str) -> usize {
        usize::from(path.starts_with('/'))
    }

    fn resolve(&self, parent: &str, child: &str) -> String {
        if parent.is_empty() {
            return child.to_string();
        }
        if child.is_empty() {
            return parent.to_string();
        }
        if child.starts_with('/') {
            if parent == "/" {
                return child.to_string();
            }
            return format!("{parent}{child}");
        }
        if parent == "/" {
            return format!("/{child}");
        }
        format!("{parent}/{child}")
    }

    fn resolve_against(&self, path: &str, user_dir: &str) -> Result<String, PathError> {
        if self.is_absolute(path) {
            return Ok(path.to_string());
        }
        Ok(self.resolve(user_dir, path))
    }

    fn from_uri_path(&self, path: &str) -> String {
        match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped.to_string(),
            _ => path.to_string(),
        }
    }

    fn is_absolute(&self, path: &str) -> bool {
        self.prefix_length(path) == 1
    }

    fn default_parent(&self) -> &'static str {
        "/"
    }
}
