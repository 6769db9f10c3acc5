use thiserror::Error;

use super::normalize::SchemaKind;
use super::path::Path;
use super::shape::ShapeError;
use crate::value::CallError;

/// First mismatch found by a check. The message carries the path; there is no
/// aggregation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeepCheckError {
    #[error("data at {path} {}", mismatch_phrase(.expected))]
    TypeMismatch { path: Path, expected: SchemaKind },

    #[error("data '{actual}' did not equal '{expected}' at {path}")]
    ValueMismatch {
        actual: String,
        expected: String,
        path: Path,
    },

    #[error("data '{actual}' did not contain '{pattern}' at {path}")]
    PatternMismatch {
        actual: String,
        pattern: String,
        path: Path,
    },

    #[error("date data '{actual}' did not equal '{expected}' at {path}")]
    DateMismatch {
        actual: String,
        expected: String,
        path: Path,
    },

    #[error("data at {path} was not the correct function reference")]
    FunctionMismatch { path: Path },

    #[error("data at {path} was length {actual}, should have been length {expected}")]
    LengthMismatch {
        path: Path,
        actual: usize,
        expected: usize,
    },

    #[error("extra key '{key}' at {path}")]
    ExtraKey { key: String, path: Path },

    #[error("data at {path} was not instanceof the proper class")]
    ClassMismatch { path: Path },

    #[error(
        "data '{returned}' did not match '{expected}' returned by the function at {path} on call index {index}"
    )]
    CallResultMismatch {
        returned: String,
        expected: String,
        path: Path,
        index: usize,
    },

    /// The function under verification failed on its own.
    #[error(transparent)]
    Call(#[from] CallError),

    #[error(transparent)]
    SchemaShape(#[from] ShapeError),
}

impl DeepCheckError {
    /// Where the mismatch was found. `None` for errors not tied to a position.
    pub fn path(&self) -> Option<&Path> {
        match self {
            DeepCheckError::TypeMismatch { path, .. }
            | DeepCheckError::ValueMismatch { path, .. }
            | DeepCheckError::PatternMismatch { path, .. }
            | DeepCheckError::DateMismatch { path, .. }
            | DeepCheckError::FunctionMismatch { path }
            | DeepCheckError::LengthMismatch { path, .. }
            | DeepCheckError::ExtraKey { path, .. }
            | DeepCheckError::ClassMismatch { path }
            | DeepCheckError::CallResultMismatch { path, .. } => Some(path),
            DeepCheckError::Call(_) | DeepCheckError::SchemaShape(_) => None,
        }
    }
}

fn mismatch_phrase(kind: &SchemaKind) -> String {
    match kind {
        SchemaKind::Object => "was not an object, but it should be".to_string(),
        SchemaKind::Array => "was not an array, but it should be".to_string(),
        SchemaKind::Null => "was not null, but it should be".to_string(),
        SchemaKind::Date | SchemaKind::Function => format!("was not of type {kind}"),
        SchemaKind::Boolean | SchemaKind::Number | SchemaKind::Undefined | SchemaKind::String => {
            format!("was not a {kind}, but it should be")
        }
    }
}
