use std::slice;

use super::calls;
use super::error::DeepCheckError;
use super::normalize::{ALLOW_EXTRA_KEYS_MARKER, SchemaItem, SchemaKind};
use super::path::Path;
use super::shape::ShapeError;
use super::{Options, check_node};
use crate::value::{Value, iso_string};

/// One recursion step: the actual value, where it sits, and the object that
/// holds it (the `this` for call verification).
#[derive(Clone, Copy)]
pub(super) struct Frame<'a> {
    pub data: &'a Value,
    pub path: &'a Path,
    pub parent: &'a Value,
    pub options: &'a Options,
}

impl<'a> Frame<'a> {
    fn child(&self, data: &'a Value, schema: &Value, path: &Path) -> Result<(), DeepCheckError> {
        check_node(data, schema, path, self.data, self.options)
    }

    fn type_mismatch(&self, expected: SchemaKind) -> DeepCheckError {
        DeepCheckError::TypeMismatch {
            path: self.path.clone(),
            expected,
        }
    }
}

pub(super) fn compare(
    frame: &Frame<'_>,
    item: &SchemaItem<'_>,
    allow_extra_keys: bool,
) -> Result<(), DeepCheckError> {
    match item.kind {
        SchemaKind::Boolean | SchemaKind::Number | SchemaKind::Undefined => {
            compare_simple(frame, item)
        }
        SchemaKind::String => compare_string(frame, item),
        SchemaKind::Object => compare_object(frame, item, allow_extra_keys),
        SchemaKind::Array => compare_array(frame, item),
        SchemaKind::Date => compare_date(frame, item),
        SchemaKind::Function => compare_function(frame, item),
        SchemaKind::Null => match frame.data {
            Value::Null => Ok(()),
            _ => Err(frame.type_mismatch(SchemaKind::Null)),
        },
    }
}

fn simple_kind(value: &Value) -> Option<SchemaKind> {
    match value {
        Value::Bool(_) => Some(SchemaKind::Boolean),
        Value::Number(_) => Some(SchemaKind::Number),
        Value::Undefined => Some(SchemaKind::Undefined),
        _ => None,
    }
}

fn compare_simple(frame: &Frame<'_>, item: &SchemaItem<'_>) -> Result<(), DeepCheckError> {
    if simple_kind(frame.data) != Some(item.kind) {
        return Err(frame.type_mismatch(item.kind));
    }

    match item.data {
        Some(expected) if !frame.data.strict_eq(expected) => Err(DeepCheckError::ValueMismatch {
            actual: frame.data.to_string(),
            expected: expected.to_string(),
            path: frame.path.clone(),
        }),
        _ => Ok(()),
    }
}

fn compare_string(frame: &Frame<'_>, item: &SchemaItem<'_>) -> Result<(), DeepCheckError> {
    let Value::String(actual) = frame.data else {
        return Err(frame.type_mismatch(SchemaKind::String));
    };

    let Some(checks) = item.data else {
        return Ok(());
    };

    check_string(actual, checks).map_err(|failure| match failure {
        StringCheckFailure::Pattern { actual, pattern } => DeepCheckError::PatternMismatch {
            actual,
            pattern,
            path: frame.path.clone(),
        },
        StringCheckFailure::Literal { actual, expected } => DeepCheckError::ValueMismatch {
            actual,
            expected,
            path: frame.path.clone(),
        },
    })
}

/// A string failing one literal or pattern check.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StringCheckFailure {
    #[error("'{actual}' did not contain '{pattern}'")]
    Pattern { actual: String, pattern: String },

    #[error("'{actual}' !== '{expected}'")]
    Literal { actual: String, expected: String },
}

/// Runs one check or an array of checks against `actual`, in order.
///
/// A regex check must match somewhere in `actual`; any other value must be the
/// identical string. The first failing check is reported.
pub fn check_string(actual: &str, checks: &Value) -> Result<(), StringCheckFailure> {
    let checks = match checks {
        Value::Array(items) => items.as_slice(),
        single => slice::from_ref(single),
    };

    for check in checks {
        match check {
            Value::Regex(re) if !re.is_match(actual) => {
                return Err(StringCheckFailure::Pattern {
                    actual: actual.to_string(),
                    pattern: check.to_string(),
                });
            }
            Value::Regex(_) => {}
            literal if literal.as_str() != Some(actual) => {
                return Err(StringCheckFailure::Literal {
                    actual: actual.to_string(),
                    expected: literal.to_string(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

fn compare_object(
    frame: &Frame<'_>,
    item: &SchemaItem<'_>,
    allow_extra_keys: bool,
) -> Result<(), DeepCheckError> {
    // null is object-kind but has no keys and no class
    if !frame.data.is_object_like() && *frame.data != Value::Null {
        return Err(frame.type_mismatch(SchemaKind::Object));
    }

    if let Some(class) = item.class {
        if !class.is_instance(frame.data) {
            return Err(DeepCheckError::ClassMismatch {
                path: frame.path.clone(),
            });
        }
    }

    let expected_keys = item.data.map(Value::keys).unwrap_or_default();

    if !allow_extra_keys {
        // only actual -> schema; missing keys surface through recursion
        if let Some(key) = frame
            .data
            .keys()
            .into_iter()
            .find(|key| !expected_keys.contains(key))
        {
            return Err(DeepCheckError::ExtraKey {
                key,
                path: frame.path.clone(),
            });
        }
    }

    let Some(expected) = item.data else {
        return Ok(());
    };

    for key in expected_keys
        .iter()
        .filter(|key| key.as_str() != ALLOW_EXTRA_KEYS_MARKER)
    {
        frame.child(frame.data.get(key), expected.get(key), &frame.path.key(key.as_str()))?;
    }
    Ok(())
}

fn compare_array(frame: &Frame<'_>, item: &SchemaItem<'_>) -> Result<(), DeepCheckError> {
    let Value::Array(actual) = frame.data else {
        return Err(frame.type_mismatch(SchemaKind::Array));
    };

    let Some(expected) = item.data else {
        return Ok(());
    };
    let Value::Array(expected) = expected else {
        return Err(ShapeError::new("Field 'data' must be an array when 'type' is 'array'").into());
    };

    if actual.len() != expected.len() {
        return Err(DeepCheckError::LengthMismatch {
            path: frame.path.clone(),
            actual: actual.len(),
            expected: expected.len(),
        });
    }

    for (index, (value, schema)) in actual.iter().zip(expected).enumerate() {
        frame.child(value, schema, &frame.path.index(index))?;
    }
    Ok(())
}

fn compare_date(frame: &Frame<'_>, item: &SchemaItem<'_>) -> Result<(), DeepCheckError> {
    let Value::Date(actual) = frame.data else {
        return Err(frame.type_mismatch(SchemaKind::Date));
    };

    let Some(expected) = item.data else {
        return Ok(());
    };

    let actual = iso_string(actual);
    // Date renders as its ISO string
    let expected_iso = expected.to_string();
    let equal = matches!(expected, Value::Date(_) | Value::String(_)) && actual == expected_iso;
    if equal {
        return Ok(());
    }

    Err(DeepCheckError::DateMismatch {
        actual,
        expected: expected_iso,
        path: frame.path.clone(),
    })
}

fn compare_function(frame: &Frame<'_>, item: &SchemaItem<'_>) -> Result<(), DeepCheckError> {
    if !frame.data.is_callable() {
        return Err(frame.type_mismatch(SchemaKind::Function));
    }

    if let Some(expected) = item.data {
        if !frame.data.strict_eq(expected) {
            return Err(DeepCheckError::FunctionMismatch {
                path: frame.path.clone(),
            });
        }
    }

    match &item.calls {
        Some(calls) => calls::verify(frame, calls),
        None => Ok(()),
    }
}
