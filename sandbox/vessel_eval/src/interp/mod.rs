//! The tree-walking evaluator.
//!
//! Statements complete with a [`Completion`] signal rather than an
//! exception: `return`, `break`, and `continue` are ordinary values
//! that propagate outward through block execution until the construct
//! responsible for them (the loop, or the call frame) absorbs them.
//! Errors travel separately as `Result`, and only non-fatal ones are
//! visible to guest `try`.

mod call;
mod expr;
mod operators;


use std::rc::Rc;

use vessel_ir::{ExprId, Name, SharedInterner, SharedScript, StmtId, StmtKind, StmtRange};

use crate::budget::{EvalLimits, LoopBudget};
use crate::errors::EvalError;
use crate::guard::Realm;
use crate::scope::{self, AssignOutcome, Scope, ScopeRef};
use crate::stack::ensure_sufficient_stack;
use crate::value::Value;

/// How a statement finished.
#[derive(Clone, Debug)]
pub(crate) enum Completion {
    /// Sequential execution continues; carries the statement's value
    /// (the last one threaded through a list becomes the script
    /// result).
    Normal(Value),
    /// A `return` is travelling outward to the nearest call frame.
    Return(Value),
    /// A `break` is travelling outward to the innermost loop.
    Break,
    /// A `continue` is travelling outward to the innermost loop.
    Continue,
}

/// One evaluation over one script, bound to a scope frame.
///
/// Calls create a fresh `Interpreter` for the callee because a closure
/// carries its own defining script; everything else (realm, interner,
/// limits) is shared.
pub(crate) struct Interpreter {
    pub(crate) script: SharedScript,
    pub(crate) interner: SharedInterner,
    pub(crate) realm: Rc<Realm>,
    pub(crate) limits: EvalLimits,
    pub(crate) scope: ScopeRef,
}

impl Interpreter {
    pub(crate) fn new(
        script: SharedScript,
        interner: SharedInterner,
        realm: Rc<Realm>,
        limits: EvalLimits,
        scope: ScopeRef,
    ) -> Self {
        Self {
            script,
            interner,
            realm,
            limits,
            scope,
        }
    }

    /// Run the script's top-level statements to a final value.
    ///
    /// Declaration visibility is assumed already hoisted by the
    /// external pass (see `crate::parse`); the evaluator performs no
    /// hoisting of its own. A top-level `return` yields its value; a
    /// stray `break` or `continue` that escaped every loop yields
    /// undefined.
    pub(crate) fn run(&self) -> Result<Value, EvalError> {
        match self.exec_stmts(self.script.body)? {
            Completion::Normal(value) | Completion::Return(value) => Ok(value),
            Completion::Break | Completion::Continue => Ok(Value::Undefined),
        }
    }

    /// Execute a statement list, threading the last evaluated value.
    ///
    /// Empty statements are skipped; every other statement's value
    /// becomes the candidate result, so the list yields its last
    /// evaluated value.
    pub(crate) fn exec_stmts(&self, range: StmtRange) -> Result<Completion, EvalError> {
        let mut last = Value::Undefined;
        for &id in self.script.arena.stmt_list(range) {
            match self.exec_stmt(id)? {
                Completion::Normal(value) => {
                    if !matches!(self.script.arena.stmt(id).kind, StmtKind::Empty) {
                        last = value;
                    }
                }
                other => return Ok(other),
            }
        }
        Ok(Completion::Normal(last))
    }

    fn exec_stmt(&self, id: StmtId) -> Result<Completion, EvalError> {
        ensure_sufficient_stack(|| self.exec_stmt_inner(id))
    }

    fn exec_stmt_inner(&self, id: StmtId) -> Result<Completion, EvalError> {
        let kind = self.script.arena.stmt(id).kind;
        match kind {
            StmtKind::Expr(expr) => Ok(Completion::Normal(self.eval_expr(expr)?)),

            StmtKind::Empty => Ok(Completion::Normal(Value::Undefined)),

            // A function declaration binds its closure into the current
            // frame and also yields it.
            StmtKind::FunctionDecl { name, params, body } => {
                let closure = self.make_closure(name, params, body);
                self.scope.borrow_mut().define(name, closure.clone());
                Ok(Completion::Normal(closure))
            }

            StmtKind::Block(stmts) => self.exec_stmts(stmts),

            StmtKind::VarDecl(decls) => {
                for decl in self.script.arena.decl_list(decls) {
                    let value = if decl.init.is_valid() {
                        self.eval_expr(decl.init)?
                    } else {
                        // An uninitialized declaration binds an
                        // explicit undefined.
                        Value::Undefined
                    };
                    self.scope.borrow_mut().define(decl.name, value);
                }
                Ok(Completion::Normal(Value::Undefined))
            }

            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(cond)?.is_truthy() {
                    self.exec_stmt(then_branch)
                } else if else_branch.is_valid() {
                    self.exec_stmt(else_branch)
                } else {
                    Ok(Completion::Normal(Value::Undefined))
                }
            }

            // The guard charges each completed body run; arriving at a
            // failing test costs nothing, so a loop that performs
            // exactly the ceiling's worth of iterations still finishes.
            StmtKind::While { test, body } => {
                let mut budget = LoopBudget::new(&self.limits);
                loop {
                    if !self.eval_expr(test)?.is_truthy() {
                        break;
                    }
                    let outcome = self.exec_stmt(body)?;
                    budget.tick()?;
                    match outcome {
                        Completion::Normal(_) | Completion::Continue => {}
                        Completion::Break => break,
                        ret @ Completion::Return(_) => return Ok(ret),
                    }
                }
                Ok(Completion::Normal(Value::Undefined))
            }

            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                if init.is_valid() {
                    match self.exec_stmt(init)? {
                        Completion::Normal(_) => {}
                        other => return Ok(other),
                    }
                }
                let mut budget = LoopBudget::new(&self.limits);
                loop {
                    if test.is_valid() && !self.eval_expr(test)?.is_truthy() {
                        break;
                    }
                    let outcome = self.exec_stmt(body)?;
                    budget.tick()?;
                    match outcome {
                        Completion::Normal(_) | Completion::Continue => {}
                        Completion::Break => break,
                        ret @ Completion::Return(_) => return Ok(ret),
                    }
                    if update.is_valid() {
                        self.eval_expr(update)?;
                    }
                }
                Ok(Completion::Normal(Value::Undefined))
            }

            StmtKind::ForIn {
                binding,
                declare,
                object,
                body,
            } => self.exec_for_in(binding, declare, object, body),

            StmtKind::Return(expr) => {
                let value = if expr.is_valid() {
                    self.eval_expr(expr)?
                } else {
                    Value::Undefined
                };
                Ok(Completion::Return(value))
            }

            StmtKind::Break => Ok(Completion::Break),
            StmtKind::Continue => Ok(Completion::Continue),

            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                let mut outcome = self.exec_stmts(block);

                if let Err(err) = &outcome {
                    if !err.is_fatal() && handler.is_valid() {
                        // The raised value surfaces to the guest as its
                        // message string, in a fresh binding scoped to
                        // the handler: an outer binding of the same
                        // name stays untouched.
                        let caught = *self.script.arena.handler(handler);
                        let this = self.scope.borrow().this_value();
                        let frame = Scope::with_parent(self.scope.clone(), this);
                        frame
                            .borrow_mut()
                            .define(caught.param, Value::string(err.message.clone()));
                        outcome = self
                            .for_frame(self.script.clone(), frame)
                            .exec_stmts(caught.body);
                    }
                }

                // Fatal errors abort the whole call; the finalizer does
                // not run for them.
                if let Err(err) = &outcome {
                    if err.is_fatal() {
                        return outcome;
                    }
                }

                if !finalizer.is_empty() {
                    match self.exec_stmts(finalizer)? {
                        Completion::Normal(_) => {}
                        // An abrupt finalizer completion supersedes the
                        // block's outcome.
                        other => return Ok(other),
                    }
                }
                outcome
            }
        }
    }

    fn exec_for_in(
        &self,
        binding: Name,
        declare: bool,
        object: ExprId,
        body: StmtId,
    ) -> Result<Completion, EvalError> {
        let target = self.eval_expr(object)?;
        let keys: Vec<Value> = match &target {
            Value::Object(obj) => obj
                .borrow()
                .enumerable_keys()
                .into_iter()
                .map(|name| Value::string(self.interner.lookup(name)))
                .collect(),
            Value::Array(arr) => (0..arr.borrow().len())
                .map(|i| Value::string(i.to_string()))
                .collect(),
            Value::Str(s) => (0..s.chars().count())
                .map(|i| Value::string(i.to_string()))
                .collect(),
            // Nil and primitive targets enumerate nothing.
            _ => Vec::new(),
        };

        if declare && !self.scope.borrow().has_own(binding) {
            self.scope.borrow_mut().define(binding, Value::Undefined);
        }

        let mut budget = LoopBudget::new(&self.limits);
        for key in keys {
            self.assign_name(binding, key);
            let outcome = self.exec_stmt(body)?;
            budget.tick()?;
            match outcome {
                Completion::Normal(_) | Completion::Continue => {}
                Completion::Break => break,
                ret @ Completion::Return(_) => return Ok(ret),
            }
        }
        Ok(Completion::Normal(Value::Undefined))
    }

    /// Assign through the scope chain; an unbound name is created in
    /// the current frame, and a protected owner swallows the write.
    pub(crate) fn assign_name(&self, name: Name, value: Value) {
        match scope::assign(&self.scope, name, value.clone()) {
            AssignOutcome::Assigned => {}
            AssignOutcome::Denied => {
                tracing::debug!(name = self.interner.lookup(name), "denied binding write");
            }
            AssignOutcome::NotFound => {
                self.scope.borrow_mut().define(name, value);
            }
        }
    }

    /// A child interpreter for a callee frame, over the callee's own
    /// script.
    pub(crate) fn for_frame(&self, script: SharedScript, scope: ScopeRef) -> Interpreter {
        Interpreter {
            script,
            interner: self.interner.clone(),
            realm: self.realm.clone(),
            limits: self.limits,
            scope,
        }
    }

    /// Fresh frame for a callee, parented to the closure's captured
    /// scope.
    pub(crate) fn callee_frame(captured: &ScopeRef, this: Value) -> ScopeRef {
        Scope::with_parent(captured.clone(), this)
    }
}
