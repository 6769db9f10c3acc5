//! Shorthand-to-canonical schema resolution.
//!
//! Any schema value is either an explicit item built only from the reserved
//! fields (and carrying `type`), or shorthand whose kind is implied by its own
//! shape. [`normalize`] makes that decision once; nothing downstream inspects
//! the raw schema shape again.

use std::fmt;

use crate::value::{Class, Object, Value};

pub const RESERVED_FIELDS: [&str; 5] = ["type", "data", "class", "calls", "allowExtraKeys"];

/// Key inside shorthand object data that sets the extra-key policy for that
/// object. Never compared as data.
pub const ALLOW_EXTRA_KEYS_MARKER: &str = "_deepCheck_allowExtraKeys";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Boolean,
    String,
    Array,
    Number,
    Undefined,
    Function,
    Object,
    Date,
    Null,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 9] = [
        SchemaKind::Boolean,
        SchemaKind::String,
        SchemaKind::Array,
        SchemaKind::Number,
        SchemaKind::Undefined,
        SchemaKind::Function,
        SchemaKind::Object,
        SchemaKind::Date,
        SchemaKind::Null,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaKind::Boolean => "boolean",
            SchemaKind::String => "string",
            SchemaKind::Array => "array",
            SchemaKind::Number => "number",
            SchemaKind::Undefined => "undefined",
            SchemaKind::Function => "function",
            SchemaKind::Object => "object",
            SchemaKind::Date => "date",
            SchemaKind::Null => "null",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema value after classification.
#[derive(Clone, Copy, Debug)]
pub enum Canonical<'a> {
    /// The value is its own expected data; the kind comes from its shape.
    Shorthand { kind: SchemaKind, data: &'a Value },
    /// `{type, data?, class?, calls?, allowExtraKeys?}` written out by the caller.
    Explicit(&'a Object),
}

impl<'a> Canonical<'a> {
    pub fn is_shorthand(&self) -> bool {
        matches!(self, Canonical::Shorthand { .. })
    }

    /// The extra-key marker embedded in shorthand object data, if any.
    pub fn marker(&self) -> Option<&'a Value> {
        let Canonical::Shorthand {
            kind: SchemaKind::Object,
            data,
        } = *self
        else {
            return None;
        };
        data.as_object()?
            .get(ALLOW_EXTRA_KEYS_MARKER)
            .filter(|marker| !marker.is_undefined())
    }

    /// The canonical item written out as a schema value. Normalizing it again
    /// yields an equal item.
    pub fn to_value(&self) -> Value {
        match self {
            Canonical::Shorthand { kind, data } => Value::Object(
                Object::new()
                    .with("type", kind.as_str())
                    .with("data", (*data).clone()),
            ),
            Canonical::Explicit(obj) => Value::Object((*obj).clone()),
        }
    }
}

/// Classifies a raw schema value.
pub fn normalize(schema: &Value) -> Canonical<'_> {
    let kind = match schema {
        Value::Undefined => SchemaKind::Undefined,
        Value::Null => SchemaKind::Null,
        Value::Bool(_) => SchemaKind::Boolean,
        Value::Number(_) => SchemaKind::Number,
        Value::String(_) => SchemaKind::String,
        Value::Date(_) => SchemaKind::Date,
        Value::Array(_) => SchemaKind::Array,
        Value::Function(_) | Value::Class(_) => SchemaKind::Function,
        Value::Object(obj) if is_explicit(obj) => return Canonical::Explicit(obj),
        Value::Object(_) | Value::Regex(_) => SchemaKind::Object,
    };
    Canonical::Shorthand { kind, data: schema }
}

/// Only reserved fields, and a defined `type`. The value of `type` is not
/// inspected here: `{type: "foo", bar: 1}` is shorthand because of `bar`,
/// while `{type: "foo"}` is explicit and fails shape validation.
fn is_explicit(obj: &Object) -> bool {
    obj.keys().all(|key| RESERVED_FIELDS.contains(&key))
        && obj.get("type").is_some_and(|t| !t.is_undefined())
}

/// Typed view of a canonical item, produced by shape validation.
#[derive(Clone, Debug)]
pub struct SchemaItem<'a> {
    pub kind: SchemaKind,
    pub data: Option<&'a Value>,
    pub class: Option<&'a Class>,
    pub calls: Option<Vec<Call<'a>>>,
    pub allow_extra_keys: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct Call<'a> {
    pub args: &'a [Value],
    pub result: &'a Value,
}
