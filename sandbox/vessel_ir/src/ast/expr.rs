//! Expression nodes.
//!
//! All children are arena indices, not boxes: `ExprId` for single
//! children, ranges into side tables for lists.

use std::fmt;

use super::operators::{AssignOp, BinaryOp, LogicalOp, UnaryOp, UpdateOp};
use crate::{ExprId, ExprRange, Name, NameRange, PropRange, Span, StmtRange};

/// Expression node.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// A single `key: value` initializer in an object literal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct PropInit {
    pub key: Name,
    pub value: ExprId,
}

/// Expression variants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// Numeric literal (f64 stored as bits for `Eq` + `Hash`).
    Number(u64),

    /// String literal (interned).
    Str(Name),

    /// Boolean literal.
    Bool(bool),

    /// `null`
    Null,

    /// `undefined`
    Undefined,

    /// Variable reference.
    Ident(Name),

    /// `this` reference.
    This,

    /// Array literal: `[a, b, c]`
    Array(ExprRange),

    /// Object literal: `{a: 1, b: 2}`
    Object(PropRange),

    /// Function expression: `function name?(params) { body }`
    ///
    /// `Name::EMPTY` = anonymous.
    Function {
        name: Name,
        params: NameRange,
        body: StmtRange,
    },

    /// Unary operation: `op operand`
    Unary { op: UnaryOp, operand: ExprId },

    /// Binary operation: `left op right`
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },

    /// Short-circuit logical operation: `left && right`, `left || right`
    Logical {
        op: LogicalOp,
        left: ExprId,
        right: ExprId,
    },

    /// Ternary conditional: `cond ? then_expr : else_expr`
    Conditional {
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },

    /// Dot-style member access: `object.property`
    Field { object: ExprId, property: Name },

    /// Bracket-style member access: `object[index]`
    Index { object: ExprId, index: ExprId },

    /// Call: `callee(args...)`
    Call { callee: ExprId, args: ExprRange },

    /// Construction: `new callee(args...)`
    New { callee: ExprId, args: ExprRange },

    /// Assignment: `target op value`
    Assign {
        op: AssignOp,
        target: ExprId,
        value: ExprId,
    },

    /// Update: `++target` / `--target`
    Update { op: UpdateOp, target: ExprId },
}
