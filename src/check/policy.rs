use crate::value::Value;

use super::Options;

/// Resolves whether keys absent from the schema are tolerated on the current
/// object.
///
/// Precedence, highest first: the `_deepCheck_allowExtraKeys` marker in
/// shorthand data, the item's own `allowExtraKeys`, the caller's options, and
/// finally permissive. Only a marker of exactly `false` makes the object
/// strict.
pub fn allows_extra_keys(marker: Option<&Value>, item: Option<bool>, options: &Options) -> bool {
    if let Some(marker) = marker {
        return !matches!(marker, Value::Bool(false));
    }
    item.or(options.allow_extra_keys).unwrap_or(true)
}
