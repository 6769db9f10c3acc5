//! Schema shape validation.
//!
//! Explicit schema items are authored by the caller, so before any comparison
//! the item itself is checked against a fixed JSON Schema: `type` is one of the
//! nine kinds, no field outside the reserved five, `calls` entries carry only
//! `args` and `result`. The dynamic item is projected onto JSON first; rich
//! values (dates, callables, classes) become `{"$kind": ...}` markers so their
//! presence can be type-checked without serializing them.

use std::sync::LazyLock;

use serde_json::{Map, Number, Value as JsonValue, json};

use super::normalize::{Call, Canonical, SchemaItem, SchemaKind};
use crate::value::{Object, UNDEFINED, Value};

static SHAPE_VALIDATOR: LazyLock<Result<jsonschema::Validator, String>> = LazyLock::new(|| {
    jsonschema::validator_for(&shape_schema())
        .map_err(|err| format!("failed to create validator: {}", err))
});

/// Malformed schema item. Aborts the whole check.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Validation Error\r\n\t{detail}")]
pub struct ShapeError {
    detail: String,
}

impl ShapeError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

fn shape_schema() -> JsonValue {
    let kinds: Vec<&str> = SchemaKind::ALL.iter().map(|kind| kind.as_str()).collect();
    json!({
        "type": "object",
        "required": ["type"],
        "additionalProperties": false,
        "properties": {
            "type": { "type": "string", "enum": kinds },
            "data": {},
            "class": {
                "type": "object",
                "properties": { "$kind": { "const": "class" } },
                "required": ["$kind"]
            },
            "calls": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "args": { "type": "array" },
                        "result": {}
                    }
                }
            },
            "allowExtraKeys": { "type": "boolean" }
        },
        "if": {
            "properties": { "type": { "const": "array" } },
            "required": ["type"]
        },
        "then": {
            "properties": { "data": { "type": "array" } }
        }
    })
}

/// Checks the canonical item and returns its typed view.
pub fn validate<'a>(canonical: &Canonical<'a>) -> Result<SchemaItem<'a>, ShapeError> {
    let obj = match *canonical {
        // shorthand items are well-formed by construction
        Canonical::Shorthand { kind, data } => {
            return Ok(SchemaItem {
                kind,
                data: defined(data),
                class: None,
                calls: None,
                allow_extra_keys: None,
            });
        }
        Canonical::Explicit(obj) => obj,
    };

    let validator = SHAPE_VALIDATOR.as_ref().map_err(ShapeError::new)?;
    let projected = project_item(obj);
    if let Some(err) = validator.iter_errors(&projected).next() {
        return Err(ShapeError::new(err.to_string()));
    }

    extract(obj)
}

fn extract(obj: &Object) -> Result<SchemaItem<'_>, ShapeError> {
    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .and_then(SchemaKind::parse)
        .ok_or_else(|| ShapeError::new("Field 'type' is required"))?;

    let class = match obj.get("class").and_then(defined) {
        None => None,
        Some(Value::Class(class)) => Some(class),
        Some(other) => {
            return Err(ShapeError::new(format!(
                "Field 'class' must be a class, got {}",
                other.type_name()
            )));
        }
    };

    let calls = match obj.get("calls").and_then(defined) {
        None => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| extract_call(index, item))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(_) => return Err(ShapeError::new("Field 'calls' must be an array")),
    };

    let allow_extra_keys = match obj.get("allowExtraKeys").and_then(defined) {
        None => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => return Err(ShapeError::new("Field 'allowExtraKeys' must be a boolean")),
    };

    Ok(SchemaItem {
        kind,
        data: obj.get("data").and_then(defined),
        class,
        calls,
        allow_extra_keys,
    })
}

fn extract_call(index: usize, item: &Value) -> Result<Call<'_>, ShapeError> {
    let Value::Object(call) = item else {
        return Err(ShapeError::new(format!("'calls.{index}' must be an object")));
    };

    let args = match call.get("args").and_then(defined) {
        None => &[][..],
        Some(Value::Array(args)) => args.as_slice(),
        Some(_) => {
            return Err(ShapeError::new(format!(
                "'calls.{index}.args' must be an array"
            )));
        }
    };

    Ok(Call {
        args,
        result: call.get("result").unwrap_or(&UNDEFINED),
    })
}

fn defined(value: &Value) -> Option<&Value> {
    (!value.is_undefined()).then_some(value)
}

// =============================================================================
// Projection
// =============================================================================

fn project_item(obj: &Object) -> JsonValue {
    let mut map = Map::new();
    for (key, value) in obj.iter().filter(|(_, v)| !v.is_undefined()) {
        let projected = match (key, value) {
            ("calls", Value::Array(calls)) => {
                JsonValue::Array(calls.iter().map(project_call).collect())
            }
            _ => project_shallow(value),
        };
        map.insert(key.to_string(), projected);
    }
    JsonValue::Object(map)
}

fn project_call(call: &Value) -> JsonValue {
    match call {
        Value::Object(obj) => JsonValue::Object(
            obj.iter()
                .filter(|(_, v)| !v.is_undefined())
                .map(|(key, value)| (key.to_string(), project_shallow(value)))
                .collect(),
        ),
        other => project_shallow(other),
    }
}

/// One level deep: containers become empty, rich values become kind markers.
fn project_shallow(value: &Value) -> JsonValue {
    match value {
        Value::Undefined | Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => Number::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Array(_) => JsonValue::Array(Vec::new()),
        Value::Object(_) => JsonValue::Object(Map::new()),
        Value::Date(_) => kind_marker("date"),
        Value::Regex(_) => kind_marker("regex"),
        Value::Function(_) => kind_marker("function"),
        Value::Class(_) => kind_marker("class"),
    }
}

fn kind_marker(kind: &str) -> JsonValue {
    json!({ "$kind": kind })
}
