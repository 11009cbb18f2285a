//! Error types for sandbox evaluation.
//!
//! `EvalErrorKind` provides typed error categories; `#[cold]` factory
//! functions are the public construction API and populate both `kind`
//! and `message`.
//!
//! Two classes of failure exist and guest `try` statements may only
//! observe one of them:
//!
//! - *fatal* errors enforce environment policy (`UnsupportedConstruct`,
//!   `LoopBudgetExceeded`) and always abort the whole evaluation call;
//! - *host-runtime* errors arise naturally from evaluating guest
//!   expressions (calling a non-callable, member access on null) and
//!   are catchable by a guest handler.

use std::fmt;

use vessel_ir::Span;

use crate::Value;

/// Result of evaluating an expression or an entry-point call.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Environment policy (fatal, never guest-catchable)
    /// Node kind or operator the sandbox deliberately does not implement.
    UnsupportedConstruct { construct: String },
    /// A loop exceeded the configured iteration ceiling.
    LoopBudgetExceeded { ceiling: usize },

    // Host-runtime failures (guest-catchable)
    /// Identifier not bound in any scope frame.
    UndefinedVariable { name: String },
    /// Member access on null or undefined.
    NilAccess { property: String },
    /// Call of a value that is not callable.
    NotCallable { type_name: String },
    /// `new` on a value that is not constructible.
    NotConstructible { type_name: String },
    /// Guest `Function` constructor used without a configured parser.
    ParserUnavailable,
    /// The parser collaborator rejected dynamically supplied source.
    Parse { message: String },
    /// Catch-all for failures without a structured kind.
    Custom { message: String },
}

impl EvalErrorKind {
    /// Whether this error enforces environment policy and must never be
    /// observable by guest exception handling.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EvalErrorKind::UnsupportedConstruct { .. } | EvalErrorKind::LoopBudgetExceeded { .. }
        )
    }
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedConstruct { construct } => {
                write!(f, "unsupported construct: {construct}")
            }
            Self::LoopBudgetExceeded { ceiling } => {
                write!(f, "loop exceeded iteration ceiling ({ceiling})")
            }
            Self::UndefinedVariable { name } => write!(f, "{name} is not defined"),
            Self::NilAccess { property } => {
                write!(f, "cannot access property '{property}' of null or undefined")
            }
            Self::NotCallable { type_name } => write!(f, "{type_name} is not a function"),
            Self::NotConstructible { type_name } => {
                write!(f, "{type_name} is not a constructor")
            }
            Self::ParserUnavailable => {
                write!(f, "dynamic function bodies require a configured parser")
            }
            Self::Parse { message } => write!(f, "parse error: {message}"),
            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for
    /// factory-created errors.
    pub message: String,
    /// Source location where the error occurred, when known.
    pub span: Option<Span>,
}

impl EvalError {
    /// Create an error with just a message (`Custom` kind).
    ///
    /// Prefer the specific factory functions when a structured kind
    /// exists.
    pub fn new(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: msg.clone(),
            },
            message: msg,
            span: None,
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            span: None,
        }
    }

    /// Attach a source span to this error.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Whether this error must never be observable by guest `try`.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(span) = self.span {
            write!(f, " at {span}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

// Factory functions

/// Node kind or operator the sandbox deliberately does not implement.
#[cold]
pub fn unsupported_construct(construct: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedConstruct {
        construct: construct.to_string(),
    })
}

/// Loop iteration ceiling exceeded.
#[cold]
pub fn loop_budget_exceeded(ceiling: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::LoopBudgetExceeded { ceiling })
}

/// Identifier not bound in any scope frame.
#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

/// Member access on null or undefined.
#[cold]
pub fn nil_access(property: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NilAccess {
        property: property.to_string(),
    })
}

/// Call of a value that is not callable.
#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

/// `new` on a value that is not constructible.
#[cold]
pub fn not_constructible(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotConstructible {
        type_name: type_name.to_string(),
    })
}

/// Guest `Function` constructor used without a configured parser.
#[cold]
pub fn parser_unavailable() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ParserUnavailable)
}

/// The parser collaborator rejected dynamically supplied source.
#[cold]
pub fn parse_failed(message: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Parse {
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_partition() {
        assert!(unsupported_construct("with statement").is_fatal());
        assert!(loop_budget_exceeded(100).is_fatal());
        assert!(!undefined_variable("x").is_fatal());
        assert!(!nil_access("a").is_fatal());
        assert!(!not_callable("number").is_fatal());
        assert!(!parser_unavailable().is_fatal());
        assert!(!EvalError::new("boom").is_fatal());
    }

    #[test]
    fn message_matches_kind() {
        let err = undefined_variable("counter");
        assert_eq!(err.message, "counter is not defined");
        assert_eq!(err.kind.to_string(), err.message);
    }

    #[test]
    fn span_attaches() {
        let err = nil_access("a").with_span(Span::new(3, 5));
        assert_eq!(err.span, Some(Span::new(3, 5)));
        assert!(err.to_string().contains("3..5"));
    }
}
