//! Expression evaluation.

use std::rc::Rc;

use vessel_ir::{
    AssignOp, BinaryOp, ExprId, ExprKind, LogicalOp, Name, NameRange, Span, StmtRange, UnaryOp,
    UpdateOp,
};

use crate::errors::{undefined_variable, unsupported_construct, EvalError, EvalResult};
use crate::scope;
use crate::stack::ensure_sufficient_stack;
use crate::value::{ClosureData, Value};

use super::{operators, Interpreter};

/// An assignment target with its receiver already evaluated.
enum Place {
    /// A scope-chain binding.
    Binding(Name),
    /// A property of an evaluated container.
    Member { target: Value, key: Name },
}

impl Interpreter {
    pub(crate) fn eval_expr(&self, id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expr_inner(id))
    }

    fn eval_expr_inner(&self, id: ExprId) -> EvalResult {
        let node = *self.script.arena.expr(id);
        let span = node.span;
        match node.kind {
            ExprKind::Number(bits) => Ok(Value::number(f64::from_bits(bits))),
            ExprKind::Str(name) => Ok(Value::string(self.interner.lookup(name))),
            ExprKind::Bool(b) => Ok(Value::boolean(b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Undefined => Ok(Value::Undefined),

            ExprKind::Ident(name) => scope::lookup(&self.scope, name)
                .ok_or_else(|| undefined_variable(self.interner.lookup(name)).with_span(span)),

            ExprKind::This => Ok(self.scope.borrow().this_value()),

            ExprKind::Array(elements) => {
                let ids = self.script.arena.expr_list(elements);
                let mut values = Vec::with_capacity(ids.len());
                for &element in ids {
                    values.push(self.eval_expr(element)?);
                }
                Ok(Value::Array(self.realm.new_array(values)))
            }

            ExprKind::Object(props) => {
                let object = self.realm.new_object();
                for init in self.script.arena.prop_list(props) {
                    let value = self.eval_expr(init.value)?;
                    object.borrow_mut().insert(init.key, value);
                }
                Ok(Value::Object(object))
            }

            ExprKind::Function { name, params, body } => {
                Ok(self.make_closure(name, params, body))
            }

            ExprKind::Unary { op, operand } => {
                // `typeof` of an unbound name reports "undefined"
                // instead of failing the lookup.
                if op == UnaryOp::TypeOf {
                    if let ExprKind::Ident(name) = self.script.arena.expr(operand).kind {
                        if scope::lookup(&self.scope, name).is_none() {
                            return Ok(Value::string("undefined"));
                        }
                    }
                }
                let value = self.eval_expr(operand)?;
                Ok(operators::evaluate_unary(op, &value))
            }

            ExprKind::Binary { op, left, right } => {
                let lhs = self.eval_expr(left)?;
                let rhs = self.eval_expr(right)?;
                operators::evaluate_binary(op, &lhs, &rhs, &self.realm)
                    .map_err(|e| e.with_span(span))
            }

            ExprKind::Logical { op, left, right } => {
                let lhs = self.eval_expr(left)?;
                match op {
                    LogicalOp::And if !lhs.is_truthy() => Ok(lhs),
                    LogicalOp::Or if lhs.is_truthy() => Ok(lhs),
                    _ => self.eval_expr(right),
                }
            }

            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                if self.eval_expr(cond)?.is_truthy() {
                    self.eval_expr(then_expr)
                } else {
                    self.eval_expr(else_expr)
                }
            }

            ExprKind::Field { object, property } => {
                let target = self.eval_expr(object)?;
                self.realm
                    .get_member(&target, property)
                    .map_err(|e| e.with_span(span))
            }

            ExprKind::Index { object, index } => {
                let target = self.eval_expr(object)?;
                let key = self.eval_expr(index)?;
                let name = self.realm.key_name(&key);
                self.realm
                    .get_member(&target, name)
                    .map_err(|e| e.with_span(span))
            }

            ExprKind::Call { callee, args } => self.eval_call(callee, args, span),

            ExprKind::New { callee, args } => {
                let target = self.eval_expr(callee)?;
                let arg_values = self.eval_args(args)?;
                self.construct(&target, &arg_values)
                    .map_err(|e| e.with_span(span))
            }

            ExprKind::Assign { op, target, value } => self.eval_assign(op, target, value, span),

            ExprKind::Update { op, target } => {
                let delta = match op {
                    UpdateOp::Increment => 1.0,
                    UpdateOp::Decrement => -1.0,
                };
                let place = self.resolve_place(target)?;
                let current = self.read_place(&place, span)?;
                let updated = Value::number(current.to_number() + delta);
                self.write_place(&place, updated.clone())
                    .map_err(|e| e.with_span(span))?;
                Ok(updated)
            }
        }
    }

    fn eval_assign(
        &self,
        op: AssignOp,
        target: ExprId,
        value: ExprId,
        span: Span,
    ) -> EvalResult {
        // Resolve the target once: a compound write like `f().x += 1`
        // must evaluate its receiver a single time.
        let place = self.resolve_place(target)?;
        let rhs = self.eval_expr(value)?;
        let result = match op {
            AssignOp::Assign => rhs,
            AssignOp::AddAssign => {
                let current = self.read_place(&place, span)?;
                operators::evaluate_binary(BinaryOp::Add, &current, &rhs, &self.realm)?
            }
            AssignOp::SubAssign => {
                let current = self.read_place(&place, span)?;
                operators::evaluate_binary(BinaryOp::Sub, &current, &rhs, &self.realm)?
            }
        };
        self.write_place(&place, result.clone())
            .map_err(|e| e.with_span(span))?;
        Ok(result)
    }

    /// A resolved assignment target: the receiver (when there is one)
    /// has already been evaluated.
    fn resolve_place(&self, target: ExprId) -> Result<Place, EvalError> {
        let node = *self.script.arena.expr(target);
        match node.kind {
            ExprKind::Ident(name) => Ok(Place::Binding(name)),
            ExprKind::Field { object, property } => {
                let target = self.eval_expr(object)?;
                Ok(Place::Member {
                    target,
                    key: property,
                })
            }
            ExprKind::Index { object, index } => {
                let target = self.eval_expr(object)?;
                let key = self.eval_expr(index)?;
                Ok(Place::Member {
                    target,
                    key: self.realm.key_name(&key),
                })
            }
            _ => Err(unsupported_construct("assignment target").with_span(node.span)),
        }
    }

    fn read_place(&self, place: &Place, span: Span) -> EvalResult {
        match place {
            Place::Binding(name) => scope::lookup(&self.scope, *name)
                .ok_or_else(|| undefined_variable(self.interner.lookup(*name)).with_span(span)),
            Place::Member { target, key } => self
                .realm
                .get_member(target, *key)
                .map_err(|e| e.with_span(span)),
        }
    }

    fn write_place(&self, place: &Place, value: Value) -> Result<(), EvalError> {
        match place {
            Place::Binding(name) => {
                self.assign_name(*name, value);
                Ok(())
            }
            Place::Member { target, key } => self.realm.set_member(target, *key, value),
        }
    }

    /// Closure factory: captures the current frame and the defining
    /// script, and allocates a fresh prototype object for `new`.
    pub(crate) fn make_closure(&self, name: Name, params: NameRange, body: StmtRange) -> Value {
        let params = self.script.arena.name_list(params).to_vec();
        Value::Closure(Rc::new(ClosureData {
            name,
            params,
            body,
            script: self.script.clone(),
            scope: self.scope.clone(),
            prototype: self.realm.new_object(),
        }))
    }
}
