//! DOS/Windows path syntax.
//!
//! Prefix lengths of normalized paths:
//!
//! | Path          | Prefix | Meaning                   |
//! |---------------|--------|---------------------------|
//! | `foo\bar`     | 0      | relative                  |
//! | `\foo`        | 1      | relative to current drive |
//! | `\\srv\share` | 2      | UNC                       |
//! | `c:foo`       | 2      | relative to drive `c:`    |
//! | `c:\foo`      | 3      | absolute                  |

use crate::error::PathError;

use super::PathFamily;

const SLASH: char = '\\';
const ALT_SLASH: char = '/';

/// Drive-letter and UNC aware paths separated by `\`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DosFamily;

fn is_slash(c: char) -> bool {
    c == SLASH || c == ALT_SLASH
}

fn is_slash_byte(b: u8) -> bool {
    b == b'\\' || b == b'/'
}

/// Prepend a separator unless the path already starts with one.
fn slashify(path: &str) -> String {
    if !path.is_empty() && !path.starts_with(is_slash) {
        format!("{SLASH}{path}")
    } else {
        path.to_string()
    }
}

impl DosFamily {
    /// Copy the drive specifier or UNC marker to `out`, returning where the
    /// remainder starts.
    fn normalize_prefix(chars: &[char], out: &mut Vec<char>) -> usize {
        let len = chars.len();
        let mut src = 0;
        while src < len && is_slash(chars[src]) {
            src += 1;
        }
        if len - src >= 2 && chars[src].is_ascii_alphabetic() && chars[src + 1] == ':' {
            // Leading slashes before a drive are dropped ("/c:/x" from URIs).
            out.push(chars[src]);
            out.push(':');
            return src + 2;
        }
        if len >= 2 && is_slash(chars[0]) && is_slash(chars[1]) {
            // UNC: keep the first slash, collapse the rest into the second.
            out.push(SLASH);
            return 1;
        }
        0
    }

    /// `c:` when the path is drive-absolute.
    fn drive<'a>(&self, path: &'a str) -> Option<&'a str> {
        (self.prefix_length(path) == 3).then(|| &path[..2])
    }
}

impl PathFamily for DosFamily {
    fn name(&self) -> &'static str {
        "dos"
    }

    fn separator(&self) -> char {
        SLASH
    }

    fn path_separator(&self) -> char {
        ';'
    }

    fn is_separator(&self, c: char) -> bool {
        is_slash(c)
    }

    fn is_case_sensitive(&self) -> bool {
        false
    }

    fn normalize(&self, path: &str) -> String {
        let chars: Vec<char> = path.chars().collect();
        let len = chars.len();
        if len == 0 {
            return String::new();
        }

        let mut out: Vec<char> = Vec::with_capacity(len);
        let mut src = Self::normalize_prefix(&chars, &mut out);

        while src < len {
            let c = chars[src];
            src += 1;
            if !is_slash(c) {
                out.push(c);
                continue;
            }
            while src < len && is_slash(chars[src]) {
                src += 1;
            }
            if src < len {
                out.push(SLASH);
                continue;
            }
            // Trailing separator: only roots keep it.
            let is_root = match out.as_slice() {
                [] => true,
                [_, ':'] => true,
                [first] => is_slash(*first),
                _ => false,
            };
            if is_root {
                out.push(SLASH);
            }
        }

        out.into_iter().collect()
    }

    fn prefix_length(&self, path: &str) -> usize {
        let bytes = path.as_bytes();
        let Some(&c0) = bytes.first() else {
            return 0;
        };
        let c1 = bytes.get(1).copied().unwrap_or(0);
        if is_slash_byte(c0) {
            return if is_slash_byte(c1) { 2 } else { 1 };
        }
        if c0.is_ascii_alphabetic() && c1 == b':' {
            return match bytes.get(2) {
                Some(&c2) if is_slash_byte(c2) => 3,
                _ => 2,
            };
        }
        0
    }

    fn resolve(&self, parent: &str, child: &str) -> String {
        if parent.is_empty() {
            return child.to_string();
        }
        if child.is_empty() {
            return parent.to_string();
        }

        let child_bytes = child.as_bytes();
        let mut child_start = 0;
        if child_bytes.len() > 1 && is_slash_byte(child_bytes[0]) {
            child_start = if is_slash_byte(child_bytes[1]) { 2 } else { 1 };
            if child_bytes.len() == child_start {
                // Child is nothing but its prefix.
                return parent
                    .strip_suffix(is_slash)
                    .unwrap_or(parent)
                    .to_string();
            }
        }

        let parent = parent.strip_suffix(is_slash).unwrap_or(parent);
        let rest = &child[child_start..];
        if rest.starts_with(is_slash) {
            format!("{parent}{rest}")
        } else {
            format!("{parent}{SLASH}{rest}")
        }
    }

    fn resolve_against(&self, path: &str, user_dir: &str) -> Result<String, PathError> {
        let prefix = self.prefix_length(path);
        let unresolvable = || PathError::Unresolvable {
            path: path.to_string(),
        };

        match prefix {
            2 if path.starts_with(is_slash) => Ok(path.to_string()),
            3 => Ok(path.to_string()),
            0 => Ok(self.normalize(&format!("{user_dir}{}", slashify(path)))),
            1 => match self.drive(user_dir) {
                Some(drive) => Ok(format!("{drive}{path}")),
                // Working directory is itself a UNC path.
                None => Ok(self.normalize(&format!("{user_dir}{path}"))),
            },
            2 => match self.drive(user_dir) {
                Some(drive) if path[..2].eq_ignore_ascii_case(drive) => Ok(
                    self.normalize(&format!("{user_dir}{}", slashify(&path[2..]))),
                ),
                _ => Err(unresolvable()),
            },
            _ => Err(unresolvable()),
        }
    }

    fn from_uri_path(&self, path: &str) -> String {
        let bytes = path.as_bytes();
        let mut p = path;
        if bytes.len() > 2 && bytes[0] == b'/' && bytes[2] == b':' {
            // "/c:/foo" -> "c:/foo", keeping "c:/" whole.
            p = &p[1..];
            if p.len() > 3 {
                p = p.strip_suffix('/').unwrap_or(p);
            }
        } else if p.len() > 1 {
            p = p.strip_suffix('/').unwrap_or(p);
        }
        self.normalize(p)
    }

    fn is_absolute(&self, path: &str) -> bool {
        match self.prefix_length(path) {
            3 => true,
            2 => path.starts_with(is_slash),
            _ => false,
        }
    }

    fn default_parent(&self) -> &'static str {
        "\\"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let fs = DosFamily;
        assert_eq!(fs.normalize(""), "");
        assert_eq!(fs.normalize("\\foo"), "\\foo");
        assert_eq!(fs.normalize("c:foo"), "c:foo");
        assert_eq!(fs.normalize("c:"), "c:");
        assert_eq!(fs.normalize("c:/"), "c:\\");
        assert_eq!(fs.normalize("c:/foo//bar/"), "c:\\foo\\bar");
        assert_eq!(fs.normalize("/"), "\\");
        assert_eq!(fs.normalize("//"), "\\\\");
        assert_eq!(fs.normalize("//server/share/"), "\\\\server\\share");
        assert_eq!(fs.normalize("/c:/windows"), "c:\\windows");
        assert_eq!(fs.normalize("a/b\\c"), "a\\b\\c");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let fs = DosFamily;
        for p in ["", "\\foo\\", "c:foo", "c:/", "//srv//share//x", "a//b", "/c:/x/"] {
            let once = fs.normalize(p);
            assert_eq!(fs.normalize(&once), once, "input {p:?}");
            assert_eq!(fs.prefix_length(&fs.normalize(&once)), fs.prefix_length(&once));
        }
    }

    #[test]
    fn test_prefix_length() {
        let fs = DosFamily;
        assert_eq!(fs.prefix_length(""), 0);
        assert_eq!(fs.prefix_length("foo\\bar"), 0);
        assert_eq!(fs.prefix_length("\\foo"), 1);
        assert_eq!(fs.prefix_length("\\\\srv\\share"), 2);
        assert_eq!(fs.prefix_length("c:foo"), 2);
        assert_eq!(fs.prefix_length("C:\\foo"), 3);
    }

    #[test]
    fn test_resolve() {
        let fs = DosFamily;
        assert_eq!(fs.resolve("", "foo"), "foo");
        assert_eq!(fs.resolve("c:\\x", ""), "c:\\x");
        assert_eq!(fs.resolve("c:\\x", "foo"), "c:\\x\\foo");
        assert_eq!(fs.resolve("c:\\", "foo"), "c:\\foo");
        assert_eq!(fs.resolve("c:\\x", "\\foo"), "c:\\x\\foo");
        assert_eq!(fs.resolve("c:\\x", "\\\\foo"), "c:\\x\\foo");
        assert_eq!(fs.resolve("c:\\x\\", "\\\\"), "c:\\x");
    }

    #[test]
    fn test_resolve_against() {
        let fs = DosFamily;
        let cwd = "d:\\work";
        assert_eq!(fs.resolve_against("c:\\abs", cwd).unwrap(), "c:\\abs");
        assert_eq!(fs.resolve_against("\\\\srv\\share", cwd).unwrap(), "\\\\srv\\share");
        assert_eq!(fs.resolve_against("rel\\x", cwd).unwrap(), "d:\\work\\rel\\x");
        assert_eq!(fs.resolve_against("\\top", cwd).unwrap(), "d:\\top");
        assert_eq!(fs.resolve_against("d:sub", cwd).unwrap(), "d:\\work\\sub");
        assert!(matches!(
            fs.resolve_against("e:sub", cwd),
            Err(PathError::Unresolvable { .. })
        ));
        assert_eq!(fs.resolve_against("x", "c:\\").unwrap(), "c:\\x");
    }

    #[test]
    fn test_from_uri_path() {
        let fs = DosFamily;
        assert_eq!(fs.from_uri_path("/c:/"), "c:\\");
        assert_eq!(fs.from_uri_path("/c:/foo/"), "c:\\foo");
        assert_eq!(fs.from_uri_path("/foo/bar/"), "\\foo\\bar");
    }

    #[test]
    fn test_is_absolute() {
        let fs = DosFamily;
        assert!(fs.is_absolute("c:\\foo"));
        assert!(fs.is_absolute("\\\\srv\\share"));
        assert!(!fs.is_absolute("\\foo"));
        assert!(!fs.is_absolute("c:foo"));
        assert!(!fs.is_absolute("foo"));
    }
}
