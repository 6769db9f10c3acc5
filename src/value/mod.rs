//! Dynamic value model shared by data and schema trees.
//!
//! A [`Value`] is what a loosely typed caller hands to the checker: primitives,
//! dates, patterns, ordered objects tagged with the class that built them, and
//! callables. Schemas are expressed with the same type, which is what makes the
//! shorthand forms possible.
//!
//! # Structure
//!
//! - [`Object`]: insertion-ordered fields plus an optional [`Class`] tag
//! - [`Class`]: identity-compared constructor tag with an optional parent
//! - [`Function`]: shared callable invoked with a `this` context
//! - `json`: conversions to and from `serde_json::Value`

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;

pub mod json;

pub use json::ConvertError;

/// Shared `undefined`, handed out for missing keys and out-of-range indices.
pub static UNDEFINED: Value = Value::Undefined;

#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    Regex(Regex),
    Array(Vec<Value>),
    Object(Object),
    Function(Function),
    Class(Class),
}

impl Value {
    /// Builds an untagged object from `(key, value)` pairs, keeping their order.
    pub fn object<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Object(fields.into_iter().collect())
    }

    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Compiles `pattern` into a regex value.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Value::Regex(Regex::new(pattern)?))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// True for every value a `typeof x === "object"` check accepts, except `null`.
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Value::Object(_) | Value::Array(_) | Value::Date(_) | Value::Regex(_)
        )
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Class(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Property lookup. Arrays are indexed by their decimal index; anything
    /// missing resolves to `undefined`.
    pub fn get(&self, key: &str) -> &Value {
        match self {
            Value::Object(obj) => obj.get(key).unwrap_or(&UNDEFINED),
            Value::Array(items) => key
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .unwrap_or(&UNDEFINED),
            _ => &UNDEFINED,
        }
    }

    /// Own enumerable keys: object fields in insertion order, array indices.
    pub fn keys(&self) -> Vec<String> {
        match self {
            Value::Object(obj) => obj.keys().map(str::to_string).collect(),
            Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    /// `===` semantics: primitives compare by value, callables by identity,
    /// containers never compare equal.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Class(a), Value::Class(b)) => a.same(b),
            _ => false,
        }
    }

    /// Runtime type name, used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Regex(_) => "regex",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Class(_) => "class",
        }
    }
}

/// Structural equality. Dates compare by instant, regexes by source, callables
/// by identity and objects by class tag plus ordered fields.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Regex(a), Value::Regex(b)) => a.as_str() == b.as_str(),
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => self.strict_eq(other),
        }
    }
}

/// String coercion as a JavaScript host would print the value in a message.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => f.write_str(&iso_string(d)),
            Value::Regex(re) => write!(f, "/{}/", re.as_str()),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if !matches!(item, Value::Undefined | Value::Null) {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Function(func) => match func.name() {
                Some(name) => write!(f, "[Function: {name}]"),
                None => f.write_str("[Function (anonymous)]"),
            },
            Value::Class(class) => write!(f, "[class {}]", class.name()),
        }
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn iso_string(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_number(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // covers -0
        return "0".to_string();
    }
    let magnitude = n.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        // `{:e}` keeps the shortest digits but omits the `+` on positive exponents
        let exp = format!("{n:e}");
        return match exp.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => exp,
        };
    }
    n.to_string()
}

// =============================================================================
// Object
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Object {
    class: Option<Class>,
    fields: Vec<(String, Value)>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty instance of `class`.
    pub fn instance_of(class: &Class) -> Self {
        Self {
            class: Some(class.clone()),
            fields: Vec::new(),
        }
    }

    pub fn class(&self) -> Option<&Class> {
        self.class.as_ref()
    }

    /// Inserts or replaces `key`, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Object
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut obj = Object::new();
        for (key, value) in iter {
            obj.insert(key, value);
        }
        obj
    }
}

// =============================================================================
// Class
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Builtin {
    Object,
    Array,
    Date,
    RegExp,
}

#[derive(Debug)]
struct ClassDef {
    name: String,
    parent: Option<Class>,
    builtin: Option<Builtin>,
}

/// Constructor tag. Two handles are the same class only if one was cloned from
/// the other; built-ins are recognised by kind instead.
#[derive(Clone, Debug)]
pub struct Class(Arc<ClassDef>);

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self::define(name.into(), None, None)
    }

    /// A subclass: instances of it are also instances of `parent`.
    pub fn extends(name: impl Into<String>, parent: &Class) -> Self {
        Self::define(name.into(), Some(parent.clone()), None)
    }

    pub fn object() -> Self {
        Self::define("Object".to_string(), None, Some(Builtin::Object))
    }

    pub fn array() -> Self {
        Self::define("Array".to_string(), None, Some(Builtin::Array))
    }

    pub fn date() -> Self {
        Self::define("Date".to_string(), None, Some(Builtin::Date))
    }

    pub fn regexp() -> Self {
        Self::define("RegExp".to_string(), None, Some(Builtin::RegExp))
    }

    fn define(name: String, parent: Option<Class>, builtin: Option<Builtin>) -> Self {
        Self(Arc::new(ClassDef {
            name,
            parent,
            builtin,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&Class> {
        self.0.parent.as_ref()
    }

    pub fn same(&self, other: &Class) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.builtin.is_some() && self.0.builtin == other.0.builtin)
    }

    /// `value instanceof self`.
    pub fn is_instance(&self, value: &Value) -> bool {
        match self.0.builtin {
            Some(Builtin::Object) => value.is_object_like(),
            Some(Builtin::Array) => matches!(value, Value::Array(_)),
            Some(Builtin::Date) => matches!(value, Value::Date(_)),
            Some(Builtin::RegExp) => matches!(value, Value::Regex(_)),
            None => match value {
                Value::Object(obj) => obj.class().is_some_and(|class| class.inherits(self)),
                _ => false,
            },
        }
    }

    fn inherits(&self, ancestor: &Class) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class.same(ancestor) {
                return true;
            }
            current = class.parent();
        }
        false
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

// =============================================================================
// Function
// =============================================================================

/// Error raised by a callable itself. It propagates unchanged out of a check.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct CallError {
    message: String,
}

impl CallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

type Callable = dyn Fn(&Value, &[Value]) -> Result<Value, CallError> + Send + Sync;

/// Shared callable. Clones are the same function; separately built functions
/// never are, even with identical bodies.
#[derive(Clone)]
pub struct Function {
    name: Option<Arc<str>>,
    call: Arc<Callable>,
}

impl Function {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self {
            name: None,
            call: Arc::new(f),
        }
    }

    pub fn named<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self {
            name: Some(Arc::from(name.into())),
            call: Arc::new(f),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invokes the function with `this` bound to `this`.
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, CallError> {
        (self.call)(this, args)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.call, &other.call)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<Regex> for Value {
    fn from(re: Regex) -> Self {
        Value::Regex(re)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<Function> for Value {
    fn from(func: Function) -> Self {
        Value::Function(func)
    }
}

impl From<Class> for Value {
    fn from(class: Class) -> Self {
        Value::Class(class)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Undefined, Into::into)
    }
}
