//! # Rhai-backed Functions
//!
//! Lets function schemas and data be written as Rhai scripts instead of Rust
//! closures, e.g. when documents come from disk through the CLI or when a test
//! wants a method that reads its receiver:
//!
//! ```rhai
//! fn join(suffix) {
//!     this.prefix + "_" + suffix
//! }
//! ```
//!
//! Scripts run in a sandboxed engine: no `eval`, no module imports, no file
//! I/O, and bounded operations, call depth, and collection sizes.
//!
//! During call verification `this` is bound to the object holding the function,
//! converted to a Rhai map without its callable fields. Changes the script
//! makes to `this` are discarded.

use std::sync::Arc;

use rhai::{AST, CallFnOptions, Dynamic, Engine, Scope};

use crate::value::{CallError, Function, Value};

pub mod convert;

pub use convert::{from_dynamic, receiver_to_dynamic, to_dynamic};

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Script compilation failed due to syntax errors
    #[error("Failed to compile Rhai script: {source}")]
    CompileError {
        #[source]
        source: rhai::ParseError,
    },

    #[error("Script does not define a function named '{name}'")]
    MissingFunction { name: String },
}

/// A compiled script function, cheap to clone.
#[derive(Clone)]
pub struct ScriptFunction {
    name: String,
    engine: Arc<Engine>,
    ast: Arc<AST>,
}

impl ScriptFunction {
    /// Compiles `source` and selects the function called `name`.
    pub fn compile(source: &str, name: &str) -> Result<Self, ScriptError> {
        let engine = sandboxed_engine();
        let ast = engine
            .compile(source)
            .map_err(|e| ScriptError::CompileError { source: e })?;

        if !ast.iter_functions().any(|func| func.name == name) {
            return Err(ScriptError::MissingFunction {
                name: name.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            engine: Arc::new(engine),
            ast: Arc::new(ast),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the function with `this` bound to `this`.
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, CallError> {
        let mut this = receiver_to_dynamic(this).map_err(|err| CallError::new(err.to_string()))?;
        let args = args
            .iter()
            .map(to_dynamic)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| CallError::new(err.to_string()))?;

        let options = CallFnOptions::new()
            .eval_ast(false)
            .bind_this_ptr(&mut this);

        let result = self
            .engine
            .call_fn_with_options::<Dynamic>(
                options,
                &mut Scope::new(),
                &self.ast,
                &self.name,
                args,
            )
            .map_err(|err| CallError::new(err.to_string()))?;

        from_dynamic(result).map_err(|err| CallError::new(err.to_string()))
    }

    /// Wraps the script as a [`Function`]. Every call to `into_function` yields
    /// a distinct function reference.
    pub fn into_function(self) -> Function {
        let name = self.name.clone();
        Function::named(name, move |this, args| self.call(this, args))
    }
}

impl std::fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Creates a sandboxed Rhai engine with security restrictions
fn sandboxed_engine() -> Engine {
    let mut engine = Engine::new();

    // Disable dangerous operations
    engine.disable_symbol("eval");
    engine.disable_symbol("load_file");
    engine.disable_symbol("load_script");
    engine.disable_symbol("import");

    // Disable file I/O
    engine.disable_symbol("open");
    engine.disable_symbol("close");
    engine.disable_symbol("read_line");
    engine.disable_symbol("write");
    engine.disable_symbol("flush");

    engine.set_max_operations(10_000);
    engine.set_max_call_levels(10);
    engine.set_max_expr_depths(32, 32);
    engine.set_max_string_size(4_096_000); // 4MB
    engine.set_max_array_size(10_000);
    engine.set_max_map_size(10_000);

    engine
}
