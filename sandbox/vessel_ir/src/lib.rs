//! Vessel IR - syntax-tree types for the Vessel sandbox evaluator.
//!
//! This crate defines the node shapes the evaluator consumes and the
//! flat arena they live in. It performs no parsing and no hoisting:
//! a parser collaborator produces the tree (already hoisted) and the
//! evaluator in `vessel_eval` walks it read-only.
//!
//! # Design
//!
//! - No `Box` nodes: children are `u32` ids into contiguous arrays,
//!   lists are `(start, len)` ranges into side tables.
//! - Identifier and property names are interned `Name`s; the
//!   `SharedInterner` is shared between the embedder, the parser, and
//!   the evaluator.
//! - A completed tree is a `Script`; closures carry their defining
//!   tree as a `SharedScript`.

mod arena;
mod ast;
mod ids;
mod interner;
mod name;
mod span;

pub use arena::{Script, ScriptArena, SharedScript};
pub use ast::{
    AssignOp, BinaryOp, CatchHandler, Declarator, Expr, ExprKind, LogicalOp, PropInit, Stmt,
    StmtKind, UnaryOp, UpdateOp,
};
pub use ids::{DeclRange, ExprId, ExprRange, HandlerId, NameRange, PropRange, StmtId, StmtRange};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;
