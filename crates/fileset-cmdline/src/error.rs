//! Error types for command-line handling.

use thiserror::Error;

/// Errors raised while splitting or quoting command lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A quote was opened but never closed.
    #[error("unbalanced quotes in {input}")]
    UnbalancedQuotes { input: String },

    /// An argument holds both quote characters and cannot be quoted.
    #[error("Can't handle single and double quotes in same argument: {argument}")]
    ConflictingQuotes { argument: String },
}
