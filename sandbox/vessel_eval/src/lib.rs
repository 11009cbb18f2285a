//! Vessel - a restricted, embeddable script evaluator.
//!
//! Evaluates a small JS-like language over syntax trees from
//! `vessel_ir`, inside a sandbox the embedder controls:
//!
//! - **Scope chain**: reference-counted frames with lexical capture;
//!   closures keep their defining frame alive past the call that
//!   created it.
//! - **Security guard**: every property read and write goes through the
//!   realm, which owns the only prototypes guest code can see. Denied
//!   writes are silent no-ops.
//! - **Loop guard**: each loop activation counts iterations against a
//!   configured ceiling; exhaustion aborts the evaluation and cannot be
//!   caught by guest `try`.
//! - **Control signals**: `return` / `break` / `continue` propagate as
//!   completion values, not host exceptions.
//!
//! # Example
//!
//! ```
//! use vessel_ir::SharedScript;
//! use vessel_eval::{SandboxBuilder, Value};
//!
//! let sandbox = SandboxBuilder::new()
//!     .global("limit", Value::number(10.0))
//!     .build();
//!
//! // Scripts normally come from the parser collaborator; tests build
//! // them by hand through the arena.
//! # let script = {
//! #     let mut arena = vessel_ir::ScriptArena::new();
//! #     let name = sandbox.intern("limit");
//! #     let ident = arena.ident(name);
//! #     let stmt = arena.expr_stmt(ident);
//! #     let body = arena.push_stmt_list(&[stmt]);
//! #     SharedScript::new(vessel_ir::Script::new(arena, body))
//! # };
//! let result = sandbox.eval(&script).unwrap();
//! assert_eq!(result, Value::number(10.0));
//! ```

mod budget;
mod builder;
mod errors;
mod guard;
mod interp;
mod parse;
mod scope;
mod stack;
mod value;

pub use budget::{EvalLimits, DEFAULT_ARRAY_LENGTH, DEFAULT_LOOP_ITERATIONS};
pub use builder::{Sandbox, SandboxBuilder};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use guard::{KeyNames, Realm};
pub use parse::{ParseError, ScriptParser};
pub use scope::{AssignOutcome, Scope, ScopeRef};
pub use value::{
    number_to_display, ArrayData, ArrayRef, ClosureData, ClosureRef, FunctionCtorData,
    FunctionCtorRef, NativeFn, NativeFunction, ObjectData, ObjectRef, Property, Shared, Value,
};
