//! # Deep Check
//!
//! Schema-driven structural comparison. [`deep_check`] walks the actual value
//! and the schema in lock-step and stops at the first mismatch, reporting it
//! with the dotted path where it was found.
//!
//! Every schema node goes through the same pipeline:
//!
//! 1. `normalize`: shorthand or explicit item
//! 2. `shape`: explicit items are validated and typed
//! 3. `policy`: the extra-key policy for this node is resolved
//! 4. `compare`: one comparator per kind, recursing into children
//!
//! Function items with `calls` re-enter [`deep_check`] on each return value.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::value::{UNDEFINED, Value};

mod calls;
mod compare;
pub mod error;
pub mod normalize;
pub mod path;
pub mod policy;
pub mod shape;

pub use compare::{StringCheckFailure, check_string};
pub use error::DeepCheckError;
pub use path::Path;
pub use shape::ShapeError;

use compare::Frame;

/// Caller-level settings applied to every node of a check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Fallback extra-key policy for nodes that do not set their own.
    #[serde(
        default,
        alias = "allowExtraKeys",
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_extra_keys: Option<bool>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allow_extra_keys(mut self, allow: bool) -> Self {
        self.allow_extra_keys = Some(allow);
        self
    }
}

/// Checks `data` against `schema`.
///
/// On failure the original `data` is dumped to the log as JSON, if it can be
/// serialized, and the mismatch is returned unchanged.
pub fn deep_check(data: &Value, schema: &Value, options: &Options) -> Result<(), DeepCheckError> {
    check_node(data, schema, &Path::root(), &UNDEFINED, options)
        .inspect_err(|_| dump_diagnostics(data))
}

fn dump_diagnostics(data: &Value) {
    match data.to_json().and_then(|json| Ok(serde_json::to_string(&json)?)) {
        Ok(json) => warn!("deepCheck data: {}", json),
        Err(err) => debug!("unable to serialize deepCheck data: {}", err),
    }
}

fn check_node(
    data: &Value,
    schema: &Value,
    path: &Path,
    parent: &Value,
    options: &Options,
) -> Result<(), DeepCheckError> {
    let canonical = normalize::normalize(schema);
    let item = shape::validate(&canonical)?;
    let allow_extra_keys =
        policy::allows_extra_keys(canonical.marker(), item.allow_extra_keys, options);

    let frame = Frame {
        data,
        path,
        parent,
        options,
    };
    compare::compare(&frame, &item, allow_extra_keys)
}
