//! Chat command parsing
//!
//! Commands arrive as a single line (`regex_add "a b" c`) and are split on
//! whitespace. A word that starts with `"` or `'` runs to the matching quote.
//! Backslashes are never escapes, so patterns like `\d+` pass through as
//! typed. A leading `/` is accepted.

use std::fmt;

use crate::rules::Action;

/// A parsed chat command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `regex_add [--replace|--delete|--append|--prepend] <pattern> [replacement]`
    Add {
        pattern: String,
        replacement: String,
        action: Option<Action>,
    },

    /// `regex_list`
    List,

    /// `regex_remove <index>`
    Remove { index: usize },

    /// `regex_test <text...>`
    Test { text: String },

    /// `regex_listen_all`
    ToggleListenAll,

    /// `regex_toggle`
    Toggle,
}

/// Why a command line could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unbalanced quotes
    Quoting,

    /// Nothing to parse
    Empty,

    /// Not one of ours
    Unknown(String),

    /// Wrong arguments, with usage text
    Usage(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Quoting => f.write_str("Unbalanced quotes in command"),
            ParseError::Empty => f.write_str("Empty command"),
            ParseError::Unknown(name) => write!(f, "Unknown command: {}", name),
            ParseError::Usage(usage) => write!(f, "Usage: {}", usage),
        }
    }
}

impl std::error::Error for ParseError {}

const ADD_USAGE: &str = "regex_add [--replace|--delete|--append|--prepend] <pattern> [replacement]\n\
    - without replacement: delete matches, e.g. regex_add foo\n\
    - with replacement: replace matches, e.g. regex_add foo bar";
const REMOVE_USAGE: &str = "regex_remove <index>";
const TEST_USAGE: &str = "regex_test <text>";

impl Command {
    /// Parse a full command line
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(name, rest)| (name, rest.trim_start()));
        if name.is_empty() {
            return Err(ParseError::Empty);
        }

        // test text is taken literally, quotes and spacing included
        if name.trim_start_matches('/') == "regex_test" {
            return Self::from_args(&[name, rest]);
        }

        let mut args = vec![name.to_string()];
        args.extend(split_words(rest)?);
        Self::from_args(&args)
    }

    /// Parse already-split arguments; the first is the command name
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, ParseError> {
        let (name, rest) = args.split_first().ok_or(ParseError::Empty)?;
        let rest: Vec<&str> = rest.iter().map(|s| s.as_ref()).collect();

        match name.as_ref().trim_start_matches('/') {
            "regex_add" => parse_add(&rest),
            "regex_list" => Ok(Command::List),
            "regex_remove" => match rest.as_slice() {
                [index] => index
                    .parse()
                    .map(|index| Command::Remove { index })
                    .map_err(|_| ParseError::Usage(REMOVE_USAGE)),
                _ => Err(ParseError::Usage(REMOVE_USAGE)),
            },
            "regex_test" => {
                if rest.iter().all(|s| s.is_empty()) {
                    Err(ParseError::Usage(TEST_USAGE))
                } else {
                    Ok(Command::Test {
                        text: rest.join(" "),
                    })
                }
            }
            "regex_listen_all" => Ok(Command::ToggleListenAll),
            "regex_toggle" => Ok(Command::Toggle),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

/// Split on whitespace; a word opening with a quote ends at the same quote
fn split_words(mut input: &str) -> Result<Vec<String>, ParseError> {
    let mut words = Vec::new();
    loop {
        input = input.trim_start();
        let Some(first) = input.chars().next() else {
            return Ok(words);
        };

        if first == '"' || first == '\'' {
            let body = &input[1..];
            let end = body.find(first).ok_or(ParseError::Quoting)?;
            words.push(body[..end].to_string());
            input = &body[end + 1..];
        } else {
            let end = input.find(char::is_whitespace).unwrap_or(input.len());
            words.push(input[..end].to_string());
            input = &input[end..];
        }
    }
}

fn parse_add(args: &[&str]) -> Result<Command, ParseError> {
    let mut action = None;
    let mut positional = Vec::new();

    for arg in args {
        match arg.strip_prefix("--").and_then(Action::from_str) {
            Some(a) if positional.is_empty() => action = Some(a),
            _ => positional.push(*arg),
        }
    }

    match positional.as_slice() {
        [pattern] if !pattern.is_empty() => Ok(Command::Add {
            pattern: pattern.to_string(),
            replacement: String::new(),
            action,
        }),
        [pattern, replacement] if !pattern.is_empty() => Ok(Command::Add {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            action,
        }),
        _ => Err(ParseError::Usage(ADD_USAGE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_delete() {
        assert_eq!(
            Command::parse("regex_add foo").unwrap(),
            Command::Add {
                pattern: "foo".to_string(),
                replacement: String::new(),
                action: None,
            }
        );
    }

    #[test]
    fn test_parse_add_quoted() {
        assert_eq!(
            Command::parse(r#"/regex_add "a\s+b" 'x y'"#).unwrap(),
            Command::Add {
                pattern: r"a\s+b".to_string(),
                replacement: "x y".to_string(),
                action: None,
            }
        );
    }

    #[test]
    fn test_parse_add_explicit_action() {
        assert_eq!(
            Command::parse("regex_add --append end ~").unwrap(),
            Command::Add {
                pattern: "end".to_string(),
                replacement: "~".to_string(),
                action: Some(Action::Append),
            }
        );
    }

    #[test]
    fn test_parse_add_usage() {
        assert!(matches!(Command::parse("regex_add"), Err(ParseError::Usage(_))));
        assert!(matches!(Command::parse("regex_add a b c"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn test_parse_remove() {
        assert_eq!(Command::parse("regex_remove 3").unwrap(), Command::Remove { index: 3 });
        assert!(matches!(Command::parse("regex_remove x"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn test_parse_add_keeps_backslashes() {
        assert_eq!(
            Command::parse(r"regex_add \d+ N").unwrap(),
            Command::Add {
                pattern: r"\d+".to_string(),
                replacement: "N".to_string(),
                action: None,
            }
        );
        assert_eq!(
            Command::parse(r"regex_add a\s+b").unwrap(),
            Command::Add {
                pattern: r"a\s+b".to_string(),
                replacement: String::new(),
                action: None,
            }
        );
    }

    #[test]
    fn test_parse_add_apostrophe_inside_word() {
        assert_eq!(
            Command::parse("regex_add don't do").unwrap(),
            Command::Add {
                pattern: "don't".to_string(),
                replacement: "do".to_string(),
                action: None,
            }
        );
    }

    #[test]
    fn test_parse_test_text_is_literal() {
        assert_eq!(
            Command::parse("regex_test hello   world, don't \\d").unwrap(),
            Command::Test {
                text: "hello   world, don't \\d".to_string()
            }
        );
        assert_eq!(
            Command::parse("/regex_test   \"quoted\"").unwrap(),
            Command::Test {
                text: "\"quoted\"".to_string()
            }
        );
        assert!(matches!(Command::parse("regex_test   "), Err(ParseError::Usage(_))));
    }

    #[test]
    fn test_parse_toggles() {
        assert_eq!(Command::parse("regex_toggle").unwrap(), Command::Toggle);
        assert_eq!(Command::parse("regex_listen_all").unwrap(), Command::ToggleListenAll);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Command::parse("   "), Err(ParseError::Empty));
        assert_eq!(Command::parse("regex_add \"open"), Err(ParseError::Quoting));
        assert_eq!(
            Command::parse("ban user"),
            Err(ParseError::Unknown("ban".to_string()))
        );
    }
}
