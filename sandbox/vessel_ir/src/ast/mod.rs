//! Syntax-tree node types.
//!
//! Nodes are immutable once built and externally produced: a parser
//! collaborator (or a test) pushes them into a [`ScriptArena`] and the
//! evaluator only ever reads them.
//!
//! [`ScriptArena`]: crate::ScriptArena

mod expr;
mod operators;
mod stmt;

pub use expr::{Expr, ExprKind, PropInit};
pub use operators::{AssignOp, BinaryOp, LogicalOp, UnaryOp, UpdateOp};
pub use stmt::{CatchHandler, Declarator, Stmt, StmtKind};
