//! # JSON Bridge
//!
//! Conversions between [`Value`] and `serde_json::Value`.
//!
//! - `From<serde_json::Value>` is purely structural.
//! - [`Value::from_extended_json`] additionally understands the MongoDB
//!   Extended JSON wrappers for dates and regular expressions, so documents
//!   read from disk can carry the richer kinds the checker compares:
//!
//! ```json
//! { "created": { "$date": "2011-02-01T00:00:00.000Z" },
//!   "legacy":  { "$date": { "$numberLong": "1296518400000" } },
//!   "name":    { "$regularExpression": { "pattern": "^foo", "options": "i" } } }
//! ```
//!
//! - [`Value::to_json`] is the best-effort serializer behind the diagnostic
//!   dump; callables cannot be represented and fail the conversion.

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::{Map, Number, Value as JsonValue};

use super::{Object, Value, iso_string};

const DATE_KEY: &str = "$date";
const NUMBER_LONG_KEY: &str = "$numberLong";
const REGEX_KEY: &str = "$regularExpression";

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Float value cannot be represented in JSON
    #[error("Invalid float value: {0} cannot be represented in JSON")]
    InvalidFloat(f64),

    /// Type cannot be converted
    #[error("Unsupported type for conversion: {type_name}")]
    UnsupportedType { type_name: String },

    #[error("Invalid $date value: {0}")]
    InvalidDate(String),

    #[error("Invalid $regularExpression value: {0}")]
    InvalidRegex(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Value {
    /// Converts a JSON document, decoding `$date` and `$regularExpression`
    /// wrappers into dates and regexes.
    pub fn from_extended_json(json: JsonValue) -> Result<Self, ConvertError> {
        Ok(match json {
            JsonValue::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(Value::from_extended_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            JsonValue::Object(map) => decode_object(map)?,
            other => Value::from(other),
        })
    }

    /// Best-effort JSON rendering. `undefined` fields are skipped and
    /// `undefined` array slots become `null`.
    pub fn to_json(&self) -> Result<JsonValue, ConvertError> {
        Ok(match self {
            Value::Undefined | Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(n) => number_to_json(*n)?,
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Date(d) => JsonValue::String(iso_string(d)),
            // JSON.stringify(/re/) === "{}"
            Value::Regex(_) => JsonValue::Object(Map::new()),
            Value::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Object(obj) => {
                let mut map = Map::new();
                for (key, value) in obj.iter().filter(|(_, v)| !v.is_undefined()) {
                    map.insert(key.to_string(), value.to_json()?);
                }
                JsonValue::Object(map)
            }
            Value::Function(_) | Value::Class(_) => {
                return Err(ConvertError::UnsupportedType {
                    type_name: self.type_name().to_string(),
                });
            }
        })
    }
}

fn number_to_json(n: f64) -> Result<JsonValue, ConvertError> {
    // integral values render without a trailing `.0`
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Ok(JsonValue::Number(Number::from(n as i64)));
    }
    Number::from_f64(n)
        .map(JsonValue::Number)
        .ok_or(ConvertError::InvalidFloat(n))
}

fn decode_object(map: Map<String, JsonValue>) -> Result<Value, ConvertError> {
    if map.len() == 1 {
        if let Some(date) = map.get(DATE_KEY) {
            return decode_date(date).map(Value::Date);
        }
        if let Some(regex) = map.get(REGEX_KEY) {
            return decode_regex(regex).map(Value::Regex);
        }
    }

    let mut obj = Object::new();
    for (key, value) in map {
        obj.insert(key, Value::from_extended_json(value)?);
    }
    Ok(Value::Object(obj))
}

fn decode_date(date: &JsonValue) -> Result<DateTime<Utc>, ConvertError> {
    match date {
        JsonValue::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|err| ConvertError::InvalidDate(format!("{s}: {err}"))),
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .ok_or_else(|| ConvertError::InvalidDate(n.to_string())),
        JsonValue::Object(inner) => {
            let millis = inner
                .get(NUMBER_LONG_KEY)
                .and_then(JsonValue::as_str)
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| ConvertError::InvalidDate(date.to_string()))?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .ok_or_else(|| ConvertError::InvalidDate(date.to_string()))
        }
        other => Err(ConvertError::InvalidDate(other.to_string())),
    }
}

fn decode_regex(regex: &JsonValue) -> Result<Regex, ConvertError> {
    let pattern = regex
        .get("pattern")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| ConvertError::InvalidRegex(format!("missing pattern: {regex}")))?;
    let options = regex.get("options").and_then(JsonValue::as_str).unwrap_or("");

    let mut flags = String::new();
    for option in options.chars() {
        match option {
            'i' | 'm' | 's' | 'x' => flags.push(option),
            // unicode is always on
            'u' => {}
            other => {
                return Err(ConvertError::InvalidRegex(format!(
                    "unsupported option '{other}'"
                )));
            }
        }
    }

    let source = if flags.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{flags}){pattern}")
    };
    Regex::new(&source).map_err(|err| ConvertError::InvalidRegex(err.to_string()))
}
