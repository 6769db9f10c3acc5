//! Schema-driven deep comparison of dynamic values.
//!
//! ```
//! use deepcheck::{Options, Value, deep_check};
//! use serde_json::json;
//!
//! let data = Value::from(json!({"name": "foo", "tags": ["a", "b"]}));
//! let schema = Value::from(json!({"name": "foo", "tags": {"type": "array"}}));
//! assert!(deep_check(&data, &schema, &Options::default()).is_ok());
//!
//! let err = deep_check(&data, &Value::from(json!({"name": "bar"})), &Options::default())
//!     .unwrap_err();
//! assert_eq!(err.to_string(), "data 'foo' did not equal 'bar' at root.name");
//! ```

pub mod check;
pub mod cli;
pub mod config;
pub mod logs;
pub mod script;
pub mod testing;
pub mod value;

pub use check::{DeepCheckError, Options, StringCheckFailure, check_string, deep_check};
pub use config::Config;
pub use value::{CallError, Class, Function, Object, Value};
