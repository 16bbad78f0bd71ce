//! Quote-aware command-line handling for fileset.
//!
//! [`translate_commandline`] splits one string into argument tokens the way a
//! POSIX-like shell would for plain quoting, without variable expansion or
//! escapes. [`Commandline`] builds an invocation from tokens and supports
//! markers for splicing arguments in later.
//!
//! ```rust
//! use fileset_cmdline::{Commandline, translate_commandline};
//!
//! let tokens = translate_commandline("cp -r 'my files' backup").unwrap();
//! assert_eq!(tokens, ["cp", "-r", "my files", "backup"]);
//!
//! let mut cmd = Commandline::parse("cc main.c").unwrap();
//! let marker = cmd.create_marker();
//! cmd.add_argument("-o");
//! cmd.insert_at(&marker, ["-O2"]);
//! assert_eq!(cmd.to_string(), "cc main.c -O2 -o");
//! ```

mod commandline;
mod error;
mod tokenize;

pub use commandline::{Commandline, Marker, describe_arguments};
pub use error::ParseError;
pub use tokenize::{join_quoted, quote_argument, translate_commandline};
