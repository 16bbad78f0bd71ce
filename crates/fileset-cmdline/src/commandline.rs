//! A command line assembled from an executable and arguments.

use std::fmt::{self, Write};
use std::str::FromStr;

use itertools::Itertools;

use crate::error::ParseError;
use crate::tokenize::{quote_argument, translate_commandline};

/// Position in a [`Commandline`]'s argument list captured by
/// [`Commandline::create_marker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    index: usize,
}

impl Marker {
    /// Number of arguments that preceded the marker when it was created.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// An executable plus its arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commandline {
    executable: Option<String>,
    arguments: Vec<String>,
}

impl Commandline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a command line for `executable` with no arguments.
    pub fn with_executable(executable: impl Into<String>) -> Self {
        Self {
            executable: Some(executable.into()),
            arguments: Vec::new(),
        }
    }

    /// Tokenize `line`; the first token becomes the executable.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut tokens = translate_commandline(line)?.into_iter();
        Ok(Self {
            executable: tokens.next(),
            arguments: tokens.collect(),
        })
    }

    pub fn executable(&self) -> Option<&str> {
        self.executable.as_deref()
    }

    pub fn set_executable(&mut self, executable: impl Into<String>) {
        self.executable = Some(executable.into());
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Append one argument verbatim.
    pub fn add_argument(&mut self, argument: impl Into<String>) {
        self.arguments.push(argument.into());
    }

    /// Append several arguments verbatim.
    pub fn add_arguments<I, S>(&mut self, arguments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(arguments.into_iter().map(Into::into));
    }

    /// Tokenize `line` and append its tokens as arguments.
    pub fn add_line(&mut self, line: &str) -> Result<(), ParseError> {
        self.arguments.extend(translate_commandline(line)?);
        Ok(())
    }

    /// Remember the current end of the argument list.
    pub fn create_marker(&self) -> Marker {
        Marker {
            index: self.arguments.len(),
        }
    }

    /// Insert `arguments` where `marker` was created.
    ///
    /// The new arguments land directly at the marker, in front of anything
    /// inserted there before. Markers past the end append.
    pub fn insert_at<I, S>(&mut self, marker: &Marker, arguments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index = marker.index.min(self.arguments.len());
        let tail = self.arguments.split_off(index);
        self.arguments
            .extend(arguments.into_iter().map(Into::into).chain(tail));
    }

    /// Index of `marker` in [`Self::to_vec`], counting the executable.
    pub fn marker_position(&self, marker: &Marker) -> usize {
        marker.index.min(self.arguments.len()) + usize::from(self.executable.is_some())
    }

    /// Executable (if any) followed by the arguments.
    pub fn to_vec(&self) -> Vec<String> {
        self.executable
            .iter()
            .chain(&self.arguments)
            .cloned()
            .collect()
    }

    /// Number of entries in [`Self::to_vec`].
    pub fn len(&self) -> usize {
        self.arguments.len() + usize::from(self.executable.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.executable.is_none() && self.arguments.is_empty()
    }

    pub fn clear_arguments(&mut self) {
        self.arguments.clear();
    }

    /// Render the whole command line, quoting where needed.
    pub fn to_command_string(&self) -> Result<String, ParseError> {
        crate::tokenize::join_quoted(&self.to_vec())
    }

    /// Human-readable description for logs.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        if let Some(executable) = &self.executable {
            let _ = write!(out, "Executing '{executable}'");
            if !self.arguments.is_empty() {
                out.push_str(" with ");
            }
        }
        out.push_str(&describe_arguments(&self.arguments));
        out
    }
}

impl FromStr for Commandline {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Renders the quoted command line. An argument that holds both quote
/// characters is written as is.
impl fmt::Display for Commandline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .executable
            .iter()
            .chain(&self.arguments)
            .map(|a| quote_argument(a).unwrap_or_else(|_| a.as_str().into()))
            .join(" ");
        f.write_str(&rendered)
    }
}

/// List `arguments` one per line in single quotes.
///
/// Returns an empty string for no arguments.
pub fn describe_arguments<S: AsRef<str>>(arguments: &[S]) -> String {
    if arguments.is_empty() {
        return String::new();
    }
    let noun = if arguments.len() == 1 {
        "argument"
    } else {
        "arguments"
    };
    let mut out = format!("{noun}:\n");
    for argument in arguments {
        let _ = writeln!(out, "'{}'", argument.as_ref());
    }
    out.push_str(
        "\nThe ' characters around the executable and arguments are\nnot part of the command.\n",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_executable() {
        let cmd = Commandline::parse("ls -l \"my dir\"").unwrap();
        assert_eq!(cmd.executable(), Some("ls"));
        assert_eq!(cmd.arguments(), ["-l", "my dir"]);
        assert_eq!(cmd.len(), 3);
    }

    #[test]
    fn test_parse_empty() {
        let cmd = Commandline::parse("").unwrap();
        assert!(cmd.is_empty());
        assert!(cmd.to_vec().is_empty());
    }

    #[test]
    fn test_markers() {
        let mut cmd = Commandline::with_executable("javac");
        cmd.add_argument("-g");
        let marker = cmd.create_marker();
        cmd.add_argument("Main.java");

        assert_eq!(marker.index(), 1);
        assert_eq!(cmd.marker_position(&marker), 2);

        cmd.insert_at(&marker, ["-d", "out"]);
        assert_eq!(cmd.to_vec(), ["javac", "-g", "-d", "out", "Main.java"]);
    }

    #[test]
    fn test_marker_without_executable() {
        let mut cmd = Commandline::new();
        let marker = cmd.create_marker();
        cmd.add_line("a b").unwrap();
        assert_eq!(cmd.marker_position(&marker), 0);
        cmd.insert_at(&marker, ["first"]);
        assert_eq!(cmd.to_vec(), ["first", "a", "b"]);
    }

    #[test]
    fn test_display_quotes() {
        let mut cmd = Commandline::with_executable("echo");
        cmd.add_arguments(["a b", "c"]);
        assert_eq!(cmd.to_string(), "echo \"a b\" c");
        assert_eq!(cmd.to_command_string().unwrap(), "echo \"a b\" c");
    }

    #[test]
    fn test_unquotable_argument() {
        let mut cmd = Commandline::with_executable("echo");
        cmd.add_argument("'\"");
        assert!(cmd.to_command_string().is_err());
        assert_eq!(cmd.to_string(), "echo '\"");
    }

    #[test]
    fn test_describe() {
        let mut cmd = Commandline::with_executable("cvs");
        cmd.add_argument("update");
        let text = cmd.describe();
        assert!(text.starts_with("Executing 'cvs' with argument:\n'update'\n"));
        assert_eq!(describe_arguments::<&str>(&[]), "");
    }
}
