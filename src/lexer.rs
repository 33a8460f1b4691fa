//! A module implementing lexical analysis (tokenization) for the shell's
//! command-line language.

use thiserror::Error;

/// Represents a token resulting from lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A plain word: the program name, an argument, or a redirect target.
    Word(String),
    /// Input redirection symbol, `<`.
    RedirectIn,
    /// Output redirection symbol, `>`.
    RedirectOut,
    /// The background marker, `&`.
    Background,
}

/// Errors that can occur during the lexical analysis process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    /// The input contained a NUL byte before its logical end.
    #[error("embedded NUL byte in input")]
    EmbeddedNul,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
}

struct LexingFsm {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
}

impl LexingFsm {
    fn new(line: &str) -> Self {
        LexingFsm {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
        }
    }

    /// Performs lexical analysis on the input and returns a vector of tokens.
    ///
    /// Whitespace runs separate words. The operator characters `<`, `>` and
    /// `&` always end the current word, so `cmd>file` lexes the same as
    /// `cmd > file`.
    fn make_tokens(&mut self) -> Result<Vec<Token>, LexError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            if ch == '\0' {
                return Err(LexError::EmbeddedNul);
            }
            match self.state {
                LexingState::Start => self.handle_start(ch, &mut out),
                LexingState::ReadingWord => self.handle_word(ch, &mut out),
            }
        }

        // Whatever remains in the buffer is the final word.
        if !self.buffer.is_empty() {
            out.push(Token::Word(std::mem::take(&mut self.buffer)));
        }

        Ok(out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn handle_start(&mut self, ch: char, out: &mut Vec<Token>) {
        match ch {
            c if c.is_whitespace() => {}
            '<' => out.push(Token::RedirectIn),
            '>' => out.push(Token::RedirectOut),
            '&' => out.push(Token::Background),
            c => {
                self.buffer.push(c);
                self.state = LexingState::ReadingWord;
            }
        }
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<Token>) {
        match ch {
            c if c.is_whitespace() => {
                out.push(Token::Word(std::mem::take(&mut self.buffer)));
                self.state = LexingState::Start;
            }
            '<' | '>' | '&' => {
                out.push(Token::Word(std::mem::take(&mut self.buffer)));
                out.push(match ch {
                    '<' => Token::RedirectIn,
                    '>' => Token::RedirectOut,
                    '&' => Token::Background,
                    _ => unreachable!(),
                });
                self.state = LexingState::Start;
            }
            c => self.buffer.push(c),
        }
    }
}

/// The main entry point function to perform lexical analysis.
///
/// # Arguments
/// * `line` - The raw input line to be tokenized.
pub fn scan(line: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = LexingFsm::new(line);
    lexer.make_tokens()
}
