//! Parser collaborator interface.
//!
//! The evaluator never parses text itself: the embedder supplies an
//! implementation of [`ScriptParser`] that turns source into a
//! [`Script`] arena. The parser is also responsible for hoisting —
//! scripts arrive with function declarations ready to pre-bind and
//! `var` declarations visible at frame granularity, so evaluation makes
//! a single pass with no reordering.

use std::fmt;

use vessel_ir::Script;

/// Failure produced by a parser collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Embedder-provided source-to-tree collaborator.
///
/// Required for [`Sandbox::eval_source`](crate::Sandbox::eval_source)
/// and for the guest-visible `Function` constructor; a sandbox built
/// without one still evaluates pre-built scripts.
pub trait ScriptParser {
    /// Parse `source` into a script whose arena is self-contained.
    fn parse(&self, source: &str) -> Result<Script, ParseError>;
}
