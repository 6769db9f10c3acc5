//! Conversion between [`Value`] and Rhai's `Dynamic`.
//!
//! Going in, dates become ISO strings and regexes their pattern source; both
//! `undefined` and `null` become unit. Coming back, unit becomes `null`.
//! Callables have no Rhai counterpart.

use rhai::{Array, Dynamic, INT, Map};

use crate::value::{ConvertError, Object, Value, iso_string};

// integers beyond this lose precision as f64
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub fn to_dynamic(value: &Value) -> Result<Dynamic, ConvertError> {
    convert(value, Callables::Reject)
}

/// Converts a call receiver. Unlike [`to_dynamic`], callable fields are left
/// out of maps and become unit inside arrays, since the receiver usually holds
/// the very function being called.
pub fn receiver_to_dynamic(value: &Value) -> Result<Dynamic, ConvertError> {
    convert(value, Callables::Skip)
}

#[derive(Clone, Copy, PartialEq)]
enum Callables {
    Reject,
    Skip,
}

fn convert(value: &Value, callables: Callables) -> Result<Dynamic, ConvertError> {
    Ok(match value {
        Value::Undefined | Value::Null => Dynamic::UNIT,
        Value::Bool(b) => Dynamic::from(*b),
        Value::Number(n) => {
            if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                Dynamic::from(*n as INT)
            } else {
                Dynamic::from(*n)
            }
        }
        Value::String(s) => Dynamic::from(s.clone()),
        Value::Date(d) => Dynamic::from(iso_string(d)),
        Value::Regex(re) => Dynamic::from(re.as_str().to_string()),
        Value::Array(items) => {
            let mut rhai_arr = Array::with_capacity(items.len());
            for item in items {
                rhai_arr.push(convert(item, callables)?);
            }
            Dynamic::from(rhai_arr)
        }
        Value::Object(obj) => {
            let mut rhai_map = Map::new();
            for (key, value) in obj.iter() {
                if callables == Callables::Skip && value.is_callable() {
                    continue;
                }
                rhai_map.insert(key.into(), convert(value, callables)?);
            }
            Dynamic::from(rhai_map)
        }
        Value::Function(_) | Value::Class(_) if callables == Callables::Skip => Dynamic::UNIT,
        Value::Function(_) | Value::Class(_) => {
            return Err(ConvertError::UnsupportedType {
                type_name: value.type_name().to_string(),
            });
        }
    })
}

pub fn from_dynamic(dynamic: Dynamic) -> Result<Value, ConvertError> {
    let value = if dynamic.is_unit() {
        Value::Null
    } else if let Ok(b) = dynamic.as_bool() {
        Value::Bool(b)
    } else if let Ok(i) = dynamic.as_int() {
        Value::Number(i as f64)
    } else if let Ok(f) = dynamic.as_float() {
        Value::Number(f)
    } else if let Ok(c) = dynamic.as_char() {
        Value::String(c.to_string())
    } else if let Ok(s) = dynamic.clone().into_immutable_string() {
        Value::String(s.to_string())
    } else if let Some(arr) = dynamic.clone().try_cast::<Array>() {
        Value::Array(
            arr.into_iter()
                .map(from_dynamic)
                .collect::<Result<Vec<_>, _>>()?,
        )
    } else if let Some(map) = dynamic.clone().try_cast::<Map>() {
        let mut obj = Object::new();
        for (key, value) in map {
            obj.insert(key.as_str(), from_dynamic(value)?);
        }
        Value::Object(obj)
    } else {
        return Err(ConvertError::UnsupportedType {
            type_name: dynamic.type_name().to_string(),
        });
    };

    Ok(value)
}
