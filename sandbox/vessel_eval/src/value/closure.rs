//! Callable values: closures, native capabilities, and the constrained
//! guest-visible `Function` constructor.

use std::fmt;
use std::rc::Rc;

use vessel_ir::{Name, SharedInterner, SharedScript, StmtRange};

use crate::errors::EvalResult;
use crate::parse::ScriptParser;
use crate::scope::ScopeRef;

use super::object::ObjectRef;
use super::Value;

/// A guest closure: parameter names, a body inside its defining script,
/// and the captured lexical scope frame.
///
/// Invocation creates a fresh child frame parented to `scope` (never to
/// the caller's frame) — see the interpreter's call machinery. The body
/// always evaluates against `script`'s own arena, which may differ from
/// the caller's when the closure was synthesized dynamically.
pub struct ClosureData {
    /// `Name::EMPTY` for anonymous functions.
    pub name: Name,
    pub params: Vec<Name>,
    pub body: StmtRange,
    pub script: SharedScript,
    pub scope: ScopeRef,
    /// The object `new` instances delegate to.
    pub prototype: ObjectRef,
}

/// Shared handle to a closure.
pub type ClosureRef = Rc<ClosureData>;

impl fmt::Debug for ClosureData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureData")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// Signature of an embedder-provided capability.
///
/// Receives the bound `this` and the evaluated argument sequence.
pub type NativeFn = dyn Fn(&Value, &[Value]) -> EvalResult;

/// An embedder-exposed host function (a restricted console/math
/// surface, array built-ins, and similar).
///
/// These are the only host code paths guest code can reach, and only
/// through values the embedder chose to expose.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    func: Rc<NativeFn>,
}

impl NativeFunction {
    /// Wrap a host function as a sandbox value.
    pub fn new(name: &'static str, func: impl Fn(&Value, &[Value]) -> EvalResult + 'static) -> Self {
        Self {
            name,
            func: Rc::new(func),
        }
    }

    /// Invoke the capability.
    #[inline]
    pub fn call(&self, this: &Value, args: &[Value]) -> EvalResult {
        (self.func)(this, args)
    }

    /// Identity comparison.
    pub fn ptr_eq(a: &NativeFunction, b: &NativeFunction) -> bool {
        Rc::ptr_eq(&a.func, &b.func)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// The guest-visible `Function` constructor.
///
/// Closed over a snapshot of the sandbox root scope: closures it
/// synthesizes capture that snapshot, never the calling guest frame.
/// Dynamic bodies arrive as source text, so synthesis requires the
/// embedder's parser collaborator; without one the attempt raises a
/// catchable error.
pub struct FunctionCtorData {
    /// Root-scope snapshot new closures capture.
    pub scope: ScopeRef,
    pub parser: Option<Rc<dyn ScriptParser>>,
    pub interner: SharedInterner,
}

/// Shared handle to the `Function` constructor.
pub type FunctionCtorRef = Rc<FunctionCtorData>;

impl fmt::Debug for FunctionCtorData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionCtorData")
            .field("has_parser", &self.parser.is_some())
            .finish_non_exhaustive()
    }
}
