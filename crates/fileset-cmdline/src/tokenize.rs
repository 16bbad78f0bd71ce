//! Splitting and quoting of single command-line strings.

use std::borrow::Cow;

use itertools::Itertools;
use tracing::trace;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InSingle,
    InDouble,
}

/// Split `input` into argument tokens.
///
/// Whitespace separates tokens outside quotes. Single and double quotes
/// delimit literal spans and are dropped; the other quote character inside a
/// span is kept. Adjacent quoted and unquoted fragments form one token, and a
/// quoted empty string yields an empty token.
///
/// # Errors
///
/// [`ParseError::UnbalancedQuotes`] if a quote is left open.
pub fn translate_commandline(input: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut state = State::Normal;
    // A closed quote makes the current token real even when empty.
    let mut quoted = false;

    for c in input.chars() {
        match state {
            State::InSingle => {
                if c == '\'' {
                    quoted = true;
                    state = State::Normal;
                } else {
                    current.push(c);
                }
            }
            State::InDouble => {
                if c == '"' {
                    quoted = true;
                    state = State::Normal;
                } else {
                    current.push(c);
                }
            }
            State::Normal => match c {
                '\'' => state = State::InSingle,
                '"' => state = State::InDouble,
                c if c.is_whitespace() => {
                    if quoted || !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                    quoted = false;
                }
                c => current.push(c),
            },
        }
    }

    if state != State::Normal {
        return Err(ParseError::UnbalancedQuotes {
            input: input.to_string(),
        });
    }
    if quoted || !current.is_empty() {
        tokens.push(current);
    }

    trace!(count = tokens.len(), "Tokenized command line");
    Ok(tokens)
}

/// Quote `argument` so [`translate_commandline`] gives it back unchanged.
///
/// Arguments with a double quote are wrapped in single quotes; arguments with
/// whitespace or a single quote are wrapped in double quotes. An empty
/// argument becomes `""`.
///
/// # Errors
///
/// [`ParseError::ConflictingQuotes`] if both quote characters occur.
pub fn quote_argument(argument: &str) -> Result<Cow<'_, str>, ParseError> {
    if argument.contains('"') {
        if argument.contains('\'') {
            return Err(ParseError::ConflictingQuotes {
                argument: argument.to_string(),
            });
        }
        Ok(Cow::Owned(format!("'{argument}'")))
    } else if argument.is_empty()
        || argument.contains('\'')
        || argument.chars().any(char::is_whitespace)
    {
        Ok(Cow::Owned(format!("\"{argument}\"")))
    } else {
        Ok(Cow::Borrowed(argument))
    }
}

/// Quote every argument and join them with single spaces.
pub fn join_quoted<S: AsRef<str>>(arguments: &[S]) -> Result<String, ParseError> {
    let quoted = arguments
        .iter()
        .map(|a| quote_argument(a.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(quoted.iter().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(
            translate_commandline("1 2 3").unwrap(),
            vec!["1", "2", "3"]
        );
        assert_eq!(translate_commandline("  a\t b  ").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(translate_commandline("").unwrap().is_empty());
        assert!(translate_commandline("   ").unwrap().is_empty());
    }

    #[test]
    fn test_quoted_empty_tokens() {
        assert_eq!(translate_commandline("\"\"").unwrap(), vec![""]);
        assert_eq!(translate_commandline("a '' b").unwrap(), vec!["a", "", "b"]);
    }

    #[test]
    fn test_nested_quotes_are_literal() {
        assert_eq!(
            translate_commandline("1 \"2'3\" 4").unwrap(),
            vec!["1", "2'3", "4"]
        );
        assert_eq!(
            translate_commandline("1 '2\"3' 4").unwrap(),
            vec!["1", "2\"3", "4"]
        );
    }

    #[test]
    fn test_adjacent_fragments_concatenate() {
        assert_eq!(
            translate_commandline("a\"b c\"'d'e").unwrap(),
            vec!["ab cde"]
        );
        assert_eq!(
            translate_commandline("-Dx=\"a b\" y").unwrap(),
            vec!["-Dx=a b", "y"]
        );
    }

    #[test]
    fn test_unbalanced() {
        let err = translate_commandline("a \"b").unwrap_err();
        assert!(err.to_string().contains("unbalanced quotes"));
        assert!(translate_commandline("'").is_err());
    }

    #[test]
    fn test_quote_argument() {
        assert_eq!(quote_argument("plain").unwrap(), "plain");
        assert_eq!(quote_argument("a b").unwrap(), "\"a b\"");
        assert_eq!(quote_argument("it's").unwrap(), "\"it's\"");
        assert_eq!(quote_argument("say \"hi\"").unwrap(), "'say \"hi\"'");
        assert_eq!(quote_argument("").unwrap(), "\"\"");
        assert!(matches!(
            quote_argument("'\""),
            Err(ParseError::ConflictingQuotes { .. })
        ));
    }

    #[test]
    fn test_join_quoted_reparses() {
        let args = ["echo", "a b", "", "it's", "\"x\""];
        let line = join_quoted(&args).unwrap();
        assert_eq!(translate_commandline(&line).unwrap(), args);
    }
}
