//! Testing helpers built around the checker.
//!
//! # Structure
//!
//! - `assertions`: small assertion primitives (`xor`, `throws`, `trim_err`)

pub mod assertions;

// Re-export commonly used items
pub use assertions::{AssertionError, Checker, throws, trim_err, xor};
