use tracing::debug;

use super::compare::Frame;
use super::{Options, deep_check};
use super::error::DeepCheckError;
use super::normalize::Call;
use crate::value::{CallError, Value};

/// Invokes the actual function once per declared call, in order, with `this`
/// bound to the object holding it, and checks each return value against the
/// call's `result` schema.
///
/// Results are checked with default options, whatever the caller passed. A
/// failed result check is reported as a call-level mismatch; the inner
/// message is dropped. An error raised by the function itself propagates as is.
pub(super) fn verify(frame: &Frame<'_>, calls: &[Call<'_>]) -> Result<(), DeepCheckError> {
    for (index, call) in calls.iter().enumerate() {
        debug!(
            path = %frame.path,
            index,
            args = call.args.len(),
            "verifying function call"
        );

        let returned = invoke(frame.data, frame.parent, call.args)?;
        if deep_check(&returned, call.result, &Options::default()).is_err() {
            return Err(DeepCheckError::CallResultMismatch {
                returned: returned.to_string(),
                expected: call.result.to_string(),
                path: frame.path.clone(),
                index,
            });
        }
    }
    Ok(())
}

fn invoke(target: &Value, this: &Value, args: &[Value]) -> Result<Value, CallError> {
    match target {
        Value::Function(func) => func.call(this, args),
        Value::Class(class) => Err(CallError::new(format!(
            "Class constructor {} cannot be invoked without 'new'",
            class.name()
        ))),
        other => Err(CallError::new(format!("{other} is not a function"))),
    }
}
