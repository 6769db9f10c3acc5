//! Assertion helpers for test code.
//!
//! Each helper returns `Err(AssertionError)` instead of panicking so callers
//! can compose them or inspect the message.

use std::fmt::Display;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct AssertionError {
    message: String,
}

impl AssertionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// How the message of an expected error is checked.
pub enum Checker<'a> {
    /// Exact match.
    Message(&'a str),
    /// The message must contain a match.
    Pattern(Regex),
    /// Custom check over the message.
    Inspect(Box<dyn FnOnce(&str) -> Result<(), AssertionError> + 'a>),
}

impl<'a> Checker<'a> {
    pub fn inspect<F>(f: F) -> Self
    where
        F: FnOnce(&str) -> Result<(), AssertionError> + 'a,
    {
        Checker::Inspect(Box::new(f))
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Passes only when exactly one of `a` and `b` is true.
pub fn xor(a: bool, b: bool) -> Result<(), AssertionError> {
    if a != b {
        return Ok(());
    }
    Err(AssertionError::new(format!("{a} === {b}")))
}

/// `f` must fail, and its error message must satisfy `checker`.
pub fn throws<T, E, F>(f: F, checker: Checker<'_>) -> Result<(), AssertionError>
where
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    let message = match f() {
        Ok(_) => return Err(AssertionError::new("Was supposed to throw but didn't")),
        Err(err) => err.to_string(),
    };

    match checker {
        Checker::Message(expected) if message != expected => Err(AssertionError::new(format!(
            "{message} !== {expected}"
        ))),
        Checker::Pattern(re) if !re.is_match(&message) => Err(AssertionError::new(format!(
            "'{message}'.match(/{}/) === null",
            re.as_str()
        ))),
        Checker::Inspect(inspect) => inspect(&message),
        _ => Ok(()),
    }
}

/// Compares `message` to `expected` after collapsing every whitespace run to
/// a single space and trimming both ends, so expectations can be laid out
/// freely in test files.
pub fn trim_err(message: &str, expected: &str) -> Result<(), AssertionError> {
    let value = collapse_whitespace(message);
    let expected = collapse_whitespace(expected);

    if value == expected {
        return Ok(());
    }
    Err(AssertionError::new(format!("'{value}' !== '{expected}'")))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
