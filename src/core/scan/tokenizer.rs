//! Statement tokenizer for annotated lines
//!
//! Recognizes the two exportable shapes:
//!
//! ```text
//! module Name(params) ...      definition, any body or none
//! a(x) b(y) Name(args);        call, optionally behind transform calls
//! ```
//!
//! Only the name of a definition matters, so whatever follows its parameter
//! list is left unchecked; the body may start on a later line.
//!
//! Argument lists are matched by nesting depth, skipping string literals,
//! so `foo(bar(1), ")")` yields the args `bar(1), ")"`.

use crate::domain::ids::is_name_char;
use thiserror::Error;

const MODULE_KEYWORD: &str = "module";

/// Modifier characters that may prefix an instantiation (`#foo();`)
const MODIFIERS: [char; 4] = ['!', '#', '%', '*'];

/// A classified statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement<'a> {
    /// `module Name(...)`
    Definition { name: &'a str },
    /// `Name(args);`, the last call of a chain
    Call { name: &'a str, args: &'a str },
}

/// Why a statement could not be classified
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("no statement before the marker comment")]
    Empty,

    #[error("expected a module name, found {}", describe(.0))]
    ExpectedIdentifier(Option<char>),

    #[error("expected '(' after '{0}'")]
    ExpectedArguments(String),

    #[error("unbalanced parentheses in argument list")]
    UnbalancedParentheses,

    #[error("unterminated string literal in argument list")]
    UnterminatedString,

    #[error("expected ';' or '{{' after the argument list, found {}", describe(.0))]
    ExpectedDelimiter(Option<char>),
}

fn describe(c: &Option<char>) -> String {
    match c {
        Some(c) => format!("'{c}'"),
        None => "end of line".to_string(),
    }
}

/// Classifies the code portion of an annotated line
pub fn parse_statement(code: &str) -> Result<Statement<'_>, TokenizeError> {
    let mut cursor = Cursor::new(code);
    cursor.skip_whitespace();
    if cursor.at_end() {
        return Err(TokenizeError::Empty);
    }

    if cursor.eat_keyword(MODULE_KEYWORD) {
        cursor.skip_whitespace();
        let name = cursor.identifier()?;
        cursor.skip_whitespace();
        cursor.arguments(name)?;
        return Ok(Statement::Definition { name });
    }

    loop {
        cursor.skip_modifiers();
        let name = cursor.identifier()?;
        cursor.skip_whitespace();
        let args = cursor.arguments(name)?;
        cursor.skip_whitespace();
        match cursor.peek() {
            Some(c) if is_name_char(c) || MODIFIERS.contains(&c) => continue,
            _ => {
                cursor.delimiter()?;
                return Ok(Statement::Call {
                    name,
                    args: args.trim(),
                });
            }
        }
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn skip_modifiers(&mut self) {
        while self
            .peek()
            .is_some_and(|c| c.is_whitespace() || MODIFIERS.contains(&c))
        {
            self.bump();
        }
    }

    /// Consumes `keyword` only when it is followed by whitespace and a name
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let Some(after) = self.rest().strip_prefix(keyword) else {
            return false;
        };
        let trimmed = after.trim_start();
        let separated = trimmed.len() < after.len();
        if separated && trimmed.chars().next().is_some_and(is_name_char) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> Result<&'a str, TokenizeError> {
        let start = self.pos;
        while self.peek().is_some_and(is_name_char) {
            self.bump();
        }
        if self.pos == start {
            return Err(TokenizeError::ExpectedIdentifier(self.peek()));
        }
        Ok(&self.src[start..self.pos])
    }

    /// Consumes a parenthesised list and returns the text between the parens
    fn arguments(&mut self, owner: &str) -> Result<&'a str, TokenizeError> {
        if self.peek() != Some('(') {
            return Err(TokenizeError::ExpectedArguments(owner.to_string()));
        }
        self.bump();
        let start = self.pos;
        let mut depth = 1usize;

        while let Some(c) = self.bump() {
            match c {
                '"' => self.string_literal()?,
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(&self.src[start..self.pos - 1]);
                    }
                }
                _ => {}
            }
        }
        Err(TokenizeError::UnbalancedParentheses)
    }

    /// Skips the remainder of a string literal whose opening quote was consumed
    fn string_literal(&mut self) -> Result<(), TokenizeError> {
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '"' => return Ok(()),
                _ => {}
            }
        }
        Err(TokenizeError::UnterminatedString)
    }

    fn delimiter(&mut self) -> Result<(), TokenizeError> {
        self.skip_whitespace();
        match self.peek() {
            Some(';') | Some('{') => {
                self.bump();
                Ok(())
            }
            other => Err(TokenizeError::ExpectedDelimiter(other)),
        }
    }
}
