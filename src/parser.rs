//! Turns a token stream into a [`Command`], enforcing the redirect and
//! background-marker rules.

use crate::command::Command;
use crate::lexer::Token;
use std::path::PathBuf;
use thiserror::Error;

/// Hard cap on the number of argv entries per command.
pub const MAX_ARGS: usize = 128;

/// Errors that can occur while assembling a [`Command`] from tokens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// More than one `<` redirect on the same command line.
    #[error("multiple input redirects are not supported")]
    DuplicateInputRedirect,
    /// More than one `>` redirect on the same command line.
    #[error("multiple output redirects are not supported")]
    DuplicateOutputRedirect,
    /// A redirect operator with no filename after it.
    #[error("missing filename after `{0}`")]
    MissingRedirectTarget(char),
    /// The command has more than [`MAX_ARGS`] argv entries.
    #[error("too many arguments (limit is {MAX_ARGS})")]
    TooManyArguments,
    /// Redirects or `&` with no program word at all, e.g. `"> f"`.
    #[error("no command given")]
    EmptyCommand,
}

/// Assembles a [`Command`] from the lexer's token stream.
///
/// A lone `&` anywhere marks the command as background and never lands in
/// argv. Each redirect operator consumes the following word as its target;
/// a second operator of the same kind, or an operator with no word after
/// it, aborts the line.
pub fn parse(tokens: Vec<Token>) -> Result<Command, ParseError> {
    let mut command = Command::default();
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        match token {
            Token::Word(word) => {
                if command.argv.len() == MAX_ARGS {
                    return Err(ParseError::TooManyArguments);
                }
                command.argv.push(word);
            }
            Token::Background => command.background = true,
            Token::RedirectIn => {
                if command.stdin_redirect.is_some() {
                    return Err(ParseError::DuplicateInputRedirect);
                }
                command.stdin_redirect = Some(redirect_target(&mut tokens, '<')?);
            }
            Token::RedirectOut => {
                if command.stdout_redirect.is_some() {
                    return Err(ParseError::DuplicateOutputRedirect);
                }
                command.stdout_redirect = Some(redirect_target(&mut tokens, '>')?);
            }
        }
    }

    if command.argv.is_empty() {
        return Err(ParseError::EmptyCommand);
    }
    Ok(command)
}

/// The word following a redirect operator. Anything else, another operator
/// included, means the filename is missing.
fn redirect_target(
    tokens: &mut impl Iterator<Item = Token>,
    operator: char,
) -> Result<PathBuf, ParseError> {
    match tokens.next() {
        Some(Token::Word(target)) => Ok(PathBuf::from(target)),
        _ => Err(ParseError::MissingRedirectTarget(operator)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::scan;

    fn parse_line(line: &str) -> Result<Command, ParseError> {
        parse(scan(line).unwrap())
    }

    fn argv(command: &Command) -> Vec<&str> {
        command.argv.iter().map(String::as_str).collect()
    }

    #[test]
    fn plain_command() {
        let command = parse_line("ls -la /tmp").unwrap();
        assert_eq!(argv(&command), ["ls", "-la", "/tmp"]);
        assert_eq!(command.stdin_redirect, None);
        assert_eq!(command.stdout_redirect, None);
        assert!(!command.background);
    }

    #[test]
    fn parsing_is_whitespace_insensitive() {
        assert_eq!(parse_line("  ls   -la ").unwrap(), parse_line("ls -la").unwrap());
    }

    #[test]
    fn both_redirects() {
        let command = parse_line("sort < in.txt > out.txt").unwrap();
        assert_eq!(argv(&command), ["sort"]);
        assert_eq!(command.stdin_redirect.as_deref(), Some("in.txt".as_ref()));
        assert_eq!(command.stdout_redirect.as_deref(), Some("out.txt".as_ref()));
    }

    #[test]
    fn redirect_may_precede_arguments() {
        let command = parse_line("grep > hits.txt foo bar").unwrap();
        assert_eq!(argv(&command), ["grep", "foo", "bar"]);
        assert_eq!(command.stdout_redirect.as_deref(), Some("hits.txt".as_ref()));
    }

    #[test]
    fn background_marker_anywhere() {
        for line in ["sleep 5 &", "sleep & 5", "& sleep 5"] {
            let command = parse_line(line).unwrap();
            assert!(command.background, "{line:?} should be background");
            assert_eq!(argv(&command), ["sleep", "5"], "{line:?}");
        }
    }

    #[test]
    fn duplicate_redirects_are_rejected() {
        assert_eq!(
            parse_line("cmd > a > b"),
            Err(ParseError::DuplicateOutputRedirect)
        );
        assert_eq!(
            parse_line("cmd < a < b"),
            Err(ParseError::DuplicateInputRedirect)
        );
    }

    #[test]
    fn missing_redirect_target_is_rejected() {
        assert_eq!(parse_line("cmd >"), Err(ParseError::MissingRedirectTarget('>')));
        assert_eq!(parse_line("cmd <"), Err(ParseError::MissingRedirectTarget('<')));
        // An operator is not a filename either.
        assert_eq!(
            parse_line("cmd > < in"),
            Err(ParseError::MissingRedirectTarget('>'))
        );
        assert_eq!(
            parse_line("cmd > &"),
            Err(ParseError::MissingRedirectTarget('>'))
        );
    }

    #[test]
    fn command_word_is_required() {
        assert_eq!(parse_line("> out.txt"), Err(ParseError::EmptyCommand));
        assert_eq!(parse_line("&"), Err(ParseError::EmptyCommand));
    }

    #[test]
    fn argv_capacity_is_enforced() {
        let ok = "x ".repeat(MAX_ARGS);
        assert_eq!(parse_line(&ok).unwrap().argv.len(), MAX_ARGS);
        let too_many = "x ".repeat(MAX_ARGS + 1);
        assert_eq!(parse_line(&too_many), Err(ParseError::TooManyArguments));
    }

    #[test]
    fn glued_operator_round_trip() {
        let command = parse_line("echo hi>out.txt").unwrap();
        assert_eq!(argv(&command), ["echo", "hi"]);
        assert_eq!(command.stdout_redirect.as_deref(), Some("out.txt".as_ref()));
    }

    // Arbitrary printable input must either parse or produce a ParseError,
    // never panic.
    #[test]
    fn arbitrary_printable_input_never_panics() {
        let pieces = ["ls", "<", ">", "&", "a&b", ">>", "<<", "&&", "x<y>z", ""];
        for a in pieces {
            for b in pieces {
                for c in pieces {
                    let line = format!("{a} {b} {c}");
                    let _ = scan(&line).map(parse);
                }
            }
        }
    }
}
