//! Flat arena storage for syntax trees.
//!
//! A [`ScriptArena`] owns every node of one script in contiguous
//! vectors; nodes reference each other through ids and ranges. A
//! completed tree is wrapped in a [`Script`] together with its
//! top-level statement list, and shared as a [`SharedScript`] so
//! closures can carry their defining tree past the evaluation call
//! that created them.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::{
    CatchHandler, DeclRange, Declarator, Expr, ExprId, ExprKind, ExprRange, HandlerId, Name,
    NameRange, PropInit, PropRange, Span, Stmt, StmtId, StmtKind, StmtRange,
};

fn range_len(len: usize) -> u16 {
    u16::try_from(len).unwrap_or_else(|_| panic!("node list too long: {len} elements"))
}

fn table_start(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("arena table exceeded capacity: {len}"))
}

/// Flat arena for one script's syntax nodes.
#[derive(Clone, Debug, Default)]
pub struct ScriptArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    expr_lists: Vec<ExprId>,
    stmt_lists: Vec<StmtId>,
    names: Vec<Name>,
    props: Vec<PropInit>,
    decls: Vec<Declarator>,
    handlers: Vec<CatchHandler>,
}

impl ScriptArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    // Construction (parser collaborator / tests)

    /// Push an expression node.
    pub fn push_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId::new(table_start(self.exprs.len()));
        self.exprs.push(Expr::new(kind, span));
        id
    }

    /// Push a statement node.
    pub fn push_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        let id = StmtId::new(table_start(self.stmts.len()));
        self.stmts.push(Stmt::new(kind, span));
        id
    }

    /// Record a list of expression ids, returning its range.
    pub fn push_expr_list(&mut self, items: &[ExprId]) -> ExprRange {
        let start = table_start(self.expr_lists.len());
        self.expr_lists.extend_from_slice(items);
        ExprRange::new(start, range_len(items.len()))
    }

    /// Record a list of statement ids, returning its range.
    pub fn push_stmt_list(&mut self, items: &[StmtId]) -> StmtRange {
        let start = table_start(self.stmt_lists.len());
        self.stmt_lists.extend_from_slice(items);
        StmtRange::new(start, range_len(items.len()))
    }

    /// Record a parameter-name list, returning its range.
    pub fn push_names(&mut self, items: &[Name]) -> NameRange {
        let start = table_start(self.names.len());
        self.names.extend_from_slice(items);
        NameRange::new(start, range_len(items.len()))
    }

    /// Record object-literal property initializers, returning their range.
    pub fn push_props(&mut self, items: &[PropInit]) -> PropRange {
        let start = table_start(self.props.len());
        self.props.extend_from_slice(items);
        PropRange::new(start, range_len(items.len()))
    }

    /// Record variable declarators, returning their range.
    pub fn push_decls(&mut self, items: &[Declarator]) -> DeclRange {
        let start = table_start(self.decls.len());
        self.decls.extend_from_slice(items);
        DeclRange::new(start, range_len(items.len()))
    }

    /// Record a catch handler, returning its id.
    pub fn push_handler(&mut self, handler: CatchHandler) -> HandlerId {
        let id = HandlerId::new(table_start(self.handlers.len()));
        self.handlers.push(handler);
        id
    }

    // Access (evaluator)

    /// Get an expression node.
    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Get a statement node.
    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    /// Resolve an expression-list range.
    #[inline]
    pub fn expr_list(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.start()..range.start() + range.len()]
    }

    /// Resolve a statement-list range.
    #[inline]
    pub fn stmt_list(&self, range: StmtRange) -> &[StmtId] {
        &self.stmt_lists[range.start()..range.start() + range.len()]
    }

    /// Resolve a parameter-name range.
    #[inline]
    pub fn name_list(&self, range: NameRange) -> &[Name] {
        &self.names[range.start()..range.start() + range.len()]
    }

    /// Resolve an object-literal property range.
    #[inline]
    pub fn prop_list(&self, range: PropRange) -> &[PropInit] {
        &self.props[range.start()..range.start() + range.len()]
    }

    /// Resolve a declarator range.
    #[inline]
    pub fn decl_list(&self, range: DeclRange) -> &[Declarator] {
        &self.decls[range.start()..range.start() + range.len()]
    }

    /// Resolve a catch handler.
    #[inline]
    pub fn handler(&self, id: HandlerId) -> &CatchHandler {
        &self.handlers[id.index()]
    }

    /// Number of expression nodes in the arena.
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Number of statement nodes in the arena.
    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    // Convenience constructors for synthesized trees.
    //
    // These carry dummy spans; a real parser pushes nodes with
    // `push_expr`/`push_stmt` and source spans.

    /// Numeric literal with a dummy span.
    pub fn number(&mut self, value: f64) -> ExprId {
        self.push_expr(ExprKind::Number(value.to_bits()), Span::DUMMY)
    }

    /// String literal with a dummy span.
    pub fn string(&mut self, value: Name) -> ExprId {
        self.push_expr(ExprKind::Str(value), Span::DUMMY)
    }

    /// Boolean literal with a dummy span.
    pub fn boolean(&mut self, value: bool) -> ExprId {
        self.push_expr(ExprKind::Bool(value), Span::DUMMY)
    }

    /// Identifier reference with a dummy span.
    pub fn ident(&mut self, name: Name) -> ExprId {
        self.push_expr(ExprKind::Ident(name), Span::DUMMY)
    }

    /// Expression statement with a dummy span.
    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.push_stmt(StmtKind::Expr(expr), Span::DUMMY)
    }
}

/// A complete, immutable script: arena plus top-level statement list.
#[derive(Clone, Debug)]
pub struct Script {
    pub arena: ScriptArena,
    pub body: StmtRange,
}

impl Script {
    pub fn new(arena: ScriptArena, body: StmtRange) -> Self {
        Script { arena, body }
    }
}

/// Reference-counted handle to a [`Script`].
///
/// Closures capture the script they were defined in; a dynamically
/// synthesized function (guest `Function` constructor) carries its own
/// freshly parsed script. `Rc`, not `Arc`: evaluation is
/// single-threaded by design.
pub struct SharedScript(Rc<Script>);

impl SharedScript {
    /// Wrap a completed script for sharing.
    pub fn new(script: Script) -> Self {
        SharedScript(Rc::new(script))
    }
}

impl Clone for SharedScript {
    #[inline]
    fn clone(&self) -> Self {
        SharedScript(Rc::clone(&self.0))
    }
}

impl Deref for SharedScript {
    type Target = Script;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for SharedScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedScript").field(&self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn push_and_get_exprs() {
        let mut arena = ScriptArena::new();
        let a = arena.number(1.0);
        let b = arena.number(2.0);
        assert_ne!(a, b);
        assert_eq!(arena.expr_count(), 2);
        if let ExprKind::Number(bits) = arena.expr(a).kind {
            assert!((f64::from_bits(bits) - 1.0).abs() < f64::EPSILON);
        } else {
            panic!("expected number");
        }
    }

    #[test]
    fn expr_list_round_trip() {
        let mut arena = ScriptArena::new();
        let a = arena.number(1.0);
        let b = arena.number(2.0);
        let range = arena.push_expr_list(&[a, b]);
        assert_eq!(arena.expr_list(range), &[a, b]);
    }

    #[test]
    fn script_body_resolves() {
        let mut arena = ScriptArena::new();
        let lit = arena.number(42.0);
        let stmt = arena.expr_stmt(lit);
        let body = arena.push_stmt_list(&[stmt]);
        let script = Script::new(arena, body);
        assert_eq!(script.arena.stmt_list(script.body), &[stmt]);
    }

    #[test]
    fn shared_script_clones_cheaply() {
        let mut arena = ScriptArena::new();
        let lit = arena.number(1.0);
        let stmt = arena.expr_stmt(lit);
        let body = arena.push_stmt_list(&[stmt]);
        let shared = SharedScript::new(Script::new(arena, body));
        let clone = shared.clone();
        assert_eq!(clone.arena.stmt_count(), shared.arena.stmt_count());
    }
}
