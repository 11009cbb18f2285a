//! Sandbox construction and the embedder-facing evaluation entry
//! points.

use std::rc::Rc;

use vessel_ir::{Name, Script, ScriptArena, SharedInterner, SharedScript, StmtRange};

use crate::budget::EvalLimits;
use crate::errors::{parse_failed, parser_unavailable, EvalError, EvalResult};
use crate::guard::Realm;
use crate::interp::Interpreter;
use crate::parse::ScriptParser;
use crate::scope::{Scope, ScopeRef};
use crate::value::{ArrayRef, FunctionCtorData, ObjectRef, Value};

/// Builder for a [`Sandbox`].
///
/// ```
/// use vessel_eval::{SandboxBuilder, Value};
///
/// let sandbox = SandboxBuilder::new()
///     .global("answer", Value::number(42.0))
///     .build();
/// ```
#[derive(Default)]
pub struct SandboxBuilder {
    interner: SharedInterner,
    globals: Vec<(String, Value, bool)>,
    limits: EvalLimits,
    parser: Option<Rc<dyn ScriptParser>>,
}

impl SandboxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an interner with the parser collaborator. The parser and
    /// the sandbox must agree on name identities, so embedders that
    /// parse externally pass the same handle to both.
    #[must_use]
    pub fn interner(mut self, interner: SharedInterner) -> Self {
        self.interner = interner;
        self
    }

    /// Seed a guest-writable global binding.
    #[must_use]
    pub fn global(mut self, name: impl Into<String>, value: Value) -> Self {
        self.globals.push((name.into(), value, false));
        self
    }

    /// Seed a protected global binding; guest assignment to it is
    /// silently discarded.
    #[must_use]
    pub fn protected_global(mut self, name: impl Into<String>, value: Value) -> Self {
        self.globals.push((name.into(), value, true));
        self
    }

    /// Override the evaluation limits.
    #[must_use]
    pub fn limits(mut self, limits: EvalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Attach the parser collaborator, enabling [`Sandbox::eval_source`]
    /// and the guest `Function` constructor.
    #[must_use]
    pub fn parser(mut self, parser: impl ScriptParser + 'static) -> Self {
        self.parser = Some(Rc::new(parser));
        self
    }

    /// Build the sandbox: realm prototypes, the root scope with its
    /// seeded globals, and the guest-visible `Function` constructor.
    pub fn build(self) -> Sandbox {
        let realm = Rc::new(Realm::new(self.interner.clone(), self.limits));
        let root = Scope::new_root(Value::Null);

        {
            let mut frame = root.borrow_mut();
            for literal in ["undefined", "NaN", "Infinity"] {
                let value = match literal {
                    "NaN" => Value::number(f64::NAN),
                    "Infinity" => Value::number(f64::INFINITY),
                    _ => Value::Undefined,
                };
                frame.define_builtin(self.interner.intern(literal), value);
            }
            for (name, value, protected) in self.globals {
                let name = self.interner.intern(&name);
                if protected {
                    frame.define_builtin(name, value);
                } else {
                    frame.define(name, value);
                }
            }
        }

        // The constructor closes over the root frame: dynamically
        // synthesized closures capture the sandbox globals, never the
        // guest frame that invoked the constructor.
        let function_ctor = Value::FunctionCtor(Rc::new(FunctionCtorData {
            scope: root.clone(),
            parser: self.parser.clone(),
            interner: self.interner.clone(),
        }));
        root.borrow_mut()
            .define_builtin(self.interner.intern("Function"), function_ctor.clone());
        realm.install_constructor(function_ctor);

        Sandbox {
            interner: self.interner,
            realm,
            root,
            limits: self.limits,
            parser: self.parser,
        }
    }
}

/// An isolated evaluation environment.
///
/// Holds the realm (prototypes and member guard), the root scope with
/// the embedder's globals, and the configured limits. Single-threaded;
/// evaluations on the same sandbox share globals and realm state.
pub struct Sandbox {
    interner: SharedInterner,
    realm: Rc<Realm>,
    root: ScopeRef,
    limits: EvalLimits,
    parser: Option<Rc<dyn ScriptParser>>,
}

impl Sandbox {
    /// Evaluate a script to its final value.
    ///
    /// Each call runs in a fresh frame parented to the sandbox root,
    /// with `this` bound to null. The script result is the value of its
    /// last expression statement (or of a top-level `return`).
    pub fn eval(&self, script: &SharedScript) -> EvalResult {
        let frame = Scope::with_parent(self.root.clone(), Value::Null);
        let interp = Interpreter::new(
            script.clone(),
            self.interner.clone(),
            self.realm.clone(),
            self.limits,
            frame,
        );
        interp.run()
    }

    /// Parse and evaluate source text using the parser collaborator.
    pub fn eval_source(&self, source: &str) -> EvalResult {
        let Some(parser) = &self.parser else {
            return Err(parser_unavailable());
        };
        let script = parser.parse(source).map_err(|e| parse_failed(&e.message))?;
        self.eval(&SharedScript::new(script))
    }

    /// Host-facing closure constructor: build a guest function from
    /// parameter names and body source, capturing the sandbox root.
    ///
    /// The result is callable from later scripts once seeded as a
    /// global, or invocable by the embedder through a call expression.
    pub fn function_from_source(&self, params: &[&str], body: &str) -> EvalResult {
        let mut args: Vec<Value> = params.iter().map(|p| Value::string(*p)).collect();
        args.push(Value::string(body));

        let ctor = Rc::new(FunctionCtorData {
            scope: self.root.clone(),
            parser: self.parser.clone(),
            interner: self.interner.clone(),
        });
        let interp = self.root_interpreter();
        interp.construct(&Value::FunctionCtor(ctor), &args)
    }

    /// Invoke a callable value from the host, with `this` bound to null.
    pub fn call(&self, function: &Value, args: &[Value]) -> EvalResult {
        self.root_interpreter()
            .call_value(function, &Value::Null, args)
    }

    /// Define a guest-writable global after construction.
    pub fn define_global(&self, name: &str, value: Value) {
        let name = self.interner.intern(name);
        self.root.borrow_mut().define(name, value);
    }

    /// Define a protected global after construction.
    pub fn define_protected_global(&self, name: &str, value: Value) {
        let name = self.interner.intern(name);
        self.root.borrow_mut().define_builtin(name, value);
    }

    /// Read a root binding back out (host inspection after a run).
    pub fn global(&self, name: &str) -> Option<Value> {
        let name = self.interner.intern(name);
        crate::scope::lookup(&self.root, name)
    }

    /// Create an empty object in this sandbox's realm, for seeding
    /// structured globals.
    pub fn new_object(&self) -> ObjectRef {
        self.realm.new_object()
    }

    /// Create an array in this sandbox's realm.
    pub fn new_array(&self, elements: Vec<Value>) -> ArrayRef {
        self.realm.new_array(elements)
    }

    /// Set a property on a realm container from the host. Host writes
    /// go through the same gate as guest writes.
    pub fn set_property(&self, target: &Value, key: &str, value: Value) -> Result<(), EvalError> {
        let key = self.interner.intern(key);
        self.realm.set_member(target, key, value)
    }

    /// The interner shared with the parser collaborator.
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Intern a name (for building scripts by hand).
    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    fn root_interpreter(&self) -> Interpreter {
        // Entry-point calls need a script for the interpreter shell
        // even though only the callee's script is ever read; an empty
        // one serves.
        let empty = SharedScript::new(Script::new(ScriptArena::new(), StmtRange::EMPTY));
        let frame = Scope::with_parent(self.root.clone(), Value::Null);
        Interpreter::new(
            empty,
            self.interner.clone(),
            self.realm.clone(),
            self.limits,
            frame,
        )
    }
}

impl std::fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sandbox")
            .field("limits", &self.limits)
            .field("has_parser", &self.parser.is_some())
            .finish_non_exhaustive()
    }
}
