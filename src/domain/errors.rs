//! Domain error types
//!
//! This module defines the error hierarchy for scadex. Fatal, run-level
//! failures are [`ScadexError`] values; per-line scanning problems are
//! [`ParseDiagnostic`] values that are reported and skipped.

use std::fmt;
use thiserror::Error;

/// Main scadex error type
///
/// Only conditions that stop the whole run are represented here. A renderer
/// exiting non-zero is not an error: it is recorded in that task's
/// [`RunResult`](crate::domain::RunResult) and never affects sibling tasks.
#[derive(Debug, Error)]
pub enum ScadexError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No annotated modules were discovered and no override list was given
    #[error("{}", no_modules_message(.skipped))]
    NoModules {
        /// Marker lines that were skipped because they could not be parsed
        skipped: usize,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The renderer could not be located or launched
    #[error("Spawn error: {0}")]
    Spawn(String),

    /// A shutdown signal arrived before any renderer was started
    #[error("Interrupted before any renderer was started")]
    Interrupted,

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl ScadexError {
    /// Returns true for errors caused by how the tool was invoked or configured
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScadexError::Configuration(_) | ScadexError::NoModules { .. }
        )
    }
}

fn no_modules_message(skipped: &usize) -> String {
    let mut msg = String::from(
        "No modules found. Add '// make me' to a module definition or call, or pass --modules",
    );
    if *skipped > 0 {
        msg.push_str(&format!(" ({skipped} marker line(s) could not be parsed)"));
    }
    msg
}

/// A marker-commented line that could not be classified
///
/// The scanner skips such lines and keeps going; the diagnostic carries
/// enough context for the operator to fix the annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// 1-based line number in the source file
    pub line_number: usize,

    /// The offending line, without its line terminator
    pub line: String,

    /// Why the line was rejected
    pub reason: String,
}

impl ParseDiagnostic {
    /// Creates a new diagnostic
    pub fn new(line_number: usize, line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            line_number,
            line: line.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {}: {}",
            self.line_number,
            self.reason,
            self.line.trim()
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ScadexError {
    fn from(err: std::io::Error) -> Self {
        ScadexError::Io(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ScadexError {
    fn from(err: toml::de::Error) -> Self {
        ScadexError::Configuration(format!("TOML parse error: {err}"))
    }
}
