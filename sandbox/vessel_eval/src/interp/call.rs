//! Call and construction machinery.
//!
//! A closure call builds a fresh frame parented to the closure's
//! captured scope, binds `arguments` and the declared parameters, and
//! runs the body under a child interpreter over the closure's own
//! script. `this` is the member-access receiver when there is one and
//! null otherwise.

use std::rc::Rc;

use vessel_ir::{ExprId, ExprKind, ExprRange, Span, SharedScript};

use crate::errors::{
    not_callable, not_constructible, parse_failed, parser_unavailable, EvalError, EvalResult,
};
use crate::value::{ClosureData, ClosureRef, FunctionCtorRef, Value};

use super::{Completion, Interpreter};

impl Interpreter {
    pub(crate) fn eval_call(&self, callee: ExprId, args: ExprRange, span: Span) -> EvalResult {
        // A member-expression callee evaluates its receiver once and
        // binds it as `this`.
        let (function, this) = match self.script.arena.expr(callee).kind {
            ExprKind::Field { object, property } => {
                let receiver = self.eval_expr(object)?;
                let function = self
                    .realm
                    .get_member(&receiver, property)
                    .map_err(|e| e.with_span(span))?;
                (function, receiver)
            }
            ExprKind::Index { object, index } => {
                let receiver = self.eval_expr(object)?;
                let key = self.eval_expr(index)?;
                let name = self.realm.key_name(&key);
                let function = self
                    .realm
                    .get_member(&receiver, name)
                    .map_err(|e| e.with_span(span))?;
                (function, receiver)
            }
            _ => (self.eval_expr(callee)?, Value::Null),
        };

        let arg_values = self.eval_args(args)?;
        self.call_value(&function, &this, &arg_values)
            .map_err(|e| e.with_span(span))
    }

    pub(crate) fn eval_args(&self, args: ExprRange) -> Result<Vec<Value>, EvalError> {
        let ids = self.script.arena.expr_list(args);
        let mut values = Vec::with_capacity(ids.len());
        for &arg in ids {
            values.push(self.eval_expr(arg)?);
        }
        Ok(values)
    }

    /// Invoke any callable value.
    pub(crate) fn call_value(&self, function: &Value, this: &Value, args: &[Value]) -> EvalResult {
        match function {
            Value::Closure(closure) => self.call_closure(closure, this, args),
            Value::Native(native) => native.call(this, args),
            // `Function(...)` behaves like `new Function(...)`.
            Value::FunctionCtor(ctor) => self.synthesize_function(ctor, args),
            other => Err(not_callable(other.type_name())),
        }
    }

    /// Invoke a guest closure.
    pub(crate) fn call_closure(
        &self,
        closure: &ClosureRef,
        this: &Value,
        args: &[Value],
    ) -> EvalResult {
        let frame = Self::callee_frame(&closure.scope, this.clone());
        {
            let mut frame = frame.borrow_mut();
            frame.define(
                self.realm.names().arguments,
                Value::Array(self.realm.new_array(args.to_vec())),
            );
            // Missing trailing arguments bind undefined.
            for (i, &param) in closure.params.iter().enumerate() {
                frame.define(param, args.get(i).cloned().unwrap_or(Value::Undefined));
            }
        }

        let callee = self.for_frame(closure.script.clone(), frame);
        match callee.exec_stmts(closure.body)? {
            Completion::Return(value) => Ok(value),
            // Falling off the end of a function yields undefined, not
            // the last expression value.
            Completion::Normal(_) | Completion::Break | Completion::Continue => {
                Ok(Value::Undefined)
            }
        }
    }

    /// `new callee(args)`.
    pub(crate) fn construct(&self, callee: &Value, args: &[Value]) -> EvalResult {
        match callee {
            Value::Closure(closure) => {
                let instance = self.realm.new_instance(closure.prototype.clone());
                let result = self.call_closure(closure, &Value::Object(instance.clone()), args)?;
                // A constructor returning a container overrides the
                // fresh instance; any other return value is discarded.
                match result {
                    Value::Object(_) | Value::Array(_) => Ok(result),
                    _ => Ok(Value::Object(instance)),
                }
            }
            Value::FunctionCtor(ctor) => self.synthesize_function(ctor, args),
            other => Err(not_constructible(other.type_name())),
        }
    }

    /// The guest `Function` constructor: parameters as leading string
    /// arguments, body as the last. The synthesized closure captures
    /// the sandbox root snapshot held by the constructor, never the
    /// calling frame.
    fn synthesize_function(&self, ctor: &FunctionCtorRef, args: &[Value]) -> EvalResult {
        let Some(parser) = &ctor.parser else {
            return Err(parser_unavailable());
        };

        let (param_args, body_arg) = match args {
            [] => (&[] as &[Value], None),
            [params @ .., body] => (params, Some(body)),
        };
        let body_source = body_arg.map(ToString::to_string).unwrap_or_default();

        let params: Vec<_> = param_args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| ctor.interner.intern(p))
            .collect();

        let script = parser
            .parse(&body_source)
            .map_err(|e| parse_failed(&e.message))?;
        let body = script.body;
        Ok(Value::Closure(Rc::new(ClosureData {
            name: ctor.interner.intern("anonymous"),
            params,
            body,
            script: SharedScript::new(script),
            scope: ctor.scope.clone(),
            prototype: self.realm.new_object(),
        })))
    }
}
