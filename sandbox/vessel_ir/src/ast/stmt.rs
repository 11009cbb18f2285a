//! Statement nodes.

use std::fmt;

use crate::{DeclRange, ExprId, HandlerId, Name, NameRange, Span, StmtId, StmtRange};

/// Statement node.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

impl fmt::Debug for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// A single declarator in a `var` statement.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Declarator {
    pub name: Name,
    /// `ExprId::INVALID` = no initializer (binds explicit undefined).
    pub init: ExprId,
}

/// The single catch clause of a `try` statement.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CatchHandler {
    /// Name the raised value is bound to inside the handler.
    pub param: Name,
    pub body: StmtRange,
}

/// Statement variants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    /// Expression statement.
    Expr(ExprId),

    /// Empty statement: `;`
    Empty,

    /// Nested block: `{ stmts }`
    Block(StmtRange),

    /// Variable declaration: `var a = 1, b;`
    ///
    /// Hoisting of the declared names is the external pass's job; the
    /// evaluator only performs the initializing writes in order.
    VarDecl(DeclRange),

    /// Function declaration: `function name(params) { body }`
    FunctionDecl {
        name: Name,
        params: NameRange,
        body: StmtRange,
    },

    /// Conditional: `if (cond) then_branch else else_branch`
    ///
    /// `StmtId::INVALID` = no else branch.
    If {
        cond: ExprId,
        then_branch: StmtId,
        else_branch: StmtId,
    },

    /// While loop: `while (test) body`
    While { test: ExprId, body: StmtId },

    /// For loop: `for (init; test; update) body`
    ///
    /// All three header slots are optional (`INVALID`).
    For {
        init: StmtId,
        test: ExprId,
        update: ExprId,
        body: StmtId,
    },

    /// For-in loop: `for (x in object) body` / `for (var x in object) body`
    ForIn {
        binding: Name,
        /// Whether the target is a fresh declaration (`var x in ...`).
        declare: bool,
        object: ExprId,
        body: StmtId,
    },

    /// Return: `return expr?`
    ///
    /// `ExprId::INVALID` = returns undefined.
    Return(ExprId),

    /// Break out of the innermost enclosing loop.
    Break,

    /// Continue the innermost enclosing loop.
    Continue,

    /// Exception handling: `try { block } catch (e) { ... } finally { ... }`
    ///
    /// `HandlerId::INVALID` = no catch clause; an empty finalizer range
    /// means no (or an empty) finally block, which behave identically.
    Try {
        block: StmtRange,
        handler: HandlerId,
        finalizer: StmtRange,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_slots_default_invalid() {
        let stmt = Stmt::new(
            StmtKind::If {
                cond: ExprId::new(0),
                then_branch: StmtId::new(1),
                else_branch: StmtId::INVALID,
            },
            Span::DUMMY,
        );
        if let StmtKind::If { else_branch, .. } = stmt.kind {
            assert!(!else_branch.is_valid());
        } else {
            panic!("expected if");
        }
    }
}
