#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value as JsonValue;

use deepcheck::{Class, Function, Object, Value};

/// Shared values whose identity matters across data and schema.
pub struct Fixtures {
    pub test_class: Class,
    pub test_fn: Function,
}

impl Fixtures {
    pub fn new() -> Self {
        Self {
            test_class: Class::new("TestClass"),
            // joins its arguments with "_", missing ones count as empty
            test_fn: Function::named("testFn", |_, args| {
                let first = args.first().map(Value::to_string).unwrap_or_default();
                let second = match args.get(1) {
                    None | Some(Value::Undefined) => String::new(),
                    Some(value) => value.to_string(),
                };
                Ok(Value::from(format!("{first}_{second}")))
            }),
        }
    }

    /// An instance of `TestClass` carrying `fields`.
    pub fn instance(&self, fields: JsonValue) -> Value {
        let mut obj = Object::instance_of(&self.test_class);
        if let Value::Object(plain) = Value::from(fields) {
            for (key, value) in plain.iter() {
                obj.insert(key, value.clone());
            }
        }
        Value::Object(obj)
    }

    pub fn func(&self) -> Value {
        Value::from(self.test_fn.clone())
    }
}

/// A function that is never the same reference as any other.
pub fn anonymous_fn() -> Value {
    Value::from(Function::new(|_, _| Ok(Value::Undefined)))
}

pub fn json(value: JsonValue) -> Value {
    Value::from(value)
}

pub fn re(pattern: &str) -> Value {
    Value::regex(pattern).unwrap()
}

/// UTC date, month is 1-based.
pub fn date(year: i32, month: u32, day: u32, hour: u32) -> Value {
    Value::Date(utc(year, month, day, hour))
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

/// Builds an object from pairs of already-built values.
pub fn obj<const N: usize>(fields: [(&str, Value); N]) -> Value {
    Value::object(fields)
}

pub fn arr<const N: usize>(items: [Value; N]) -> Value {
    Value::array(items)
}

pub struct Case {
    pub it: &'static str,
    pub data: Value,
    pub schema: Value,
    pub message: Option<&'static str>,
}

impl Case {
    pub fn valid(it: &'static str, data: Value, schema: Value) -> Self {
        Self {
            it,
            data,
            schema,
            message: None,
        }
    }

    pub fn invalid(it: &'static str, data: Value, schema: Value, message: &'static str) -> Self {
        Self {
            it,
            data,
            schema,
            message: Some(message),
        }
    }
}
