//! Runtime values for the sandbox evaluator.
//!
//! Guest values are a closed tagged variant — never the host object
//! model. Containers (objects, arrays) are allocated only through the
//! realm's constructors so their prototype links and enumerability
//! flags stay under sandbox control; the `pub(crate)` constructors in
//! `object.rs` enforce that.

mod closure;
mod object;
mod shared;

use std::fmt;
use std::rc::Rc;

pub use closure::{
    ClosureData, ClosureRef, FunctionCtorData, FunctionCtorRef, NativeFn, NativeFunction,
};
pub use object::{ArrayData, ArrayRef, ObjectData, ObjectRef, Property};
pub use shared::Shared;

/// Runtime value in the sandbox.
#[derive(Clone, Debug)]
pub enum Value {
    /// Absent value.
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Numeric value (f64, the only numeric type).
    Number(f64),
    /// Immutable string.
    Str(Rc<str>),
    /// Sandbox object.
    Object(ObjectRef),
    /// Sandbox array.
    Array(ArrayRef),
    /// Guest closure.
    Closure(ClosureRef),
    /// Embedder-exposed capability.
    Native(NativeFunction),
    /// The constrained guest-visible `Function` constructor.
    FunctionCtor(FunctionCtorRef),
}

// Factory methods

impl Value {
    /// Create a numeric value.
    #[inline]
    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Create a boolean value.
    #[inline]
    pub fn boolean(b: bool) -> Self {
        Value::Bool(b)
    }
}

// Classification and coercion

impl Value {
    /// Whether this value is a non-container primitive
    /// (numeric, textual, boolean, null, undefined).
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Undefined | Value::Null | Value::Bool(_) | Value::Number(_) | Value::Str(_)
        )
    }

    /// Whether this value is null or undefined.
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Whether this value is callable.
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Closure(_) | Value::Native(_) | Value::FunctionCtor(_)
        )
    }

    /// Check if this value is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Get the type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::Closure(_) | Value::Native(_) | Value::FunctionCtor(_) => "function",
        }
    }

    /// Classification the guest `typeof` operator reports.
    ///
    /// Differs from [`type_name`](Self::type_name): `null` and arrays
    /// both report `"object"`.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Object(_) | Value::Array(_) => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Closure(_) | Value::Native(_) | Value::FunctionCtor(_) => "function",
        }
    }

    /// Numeric coercion.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::Str(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            _ => f64::NAN,
        }
    }

    /// Strict (`===`) equality: same type, same value; containers and
    /// callables compare by identity.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Shared::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Shared::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => NativeFunction::ptr_eq(a, b),
            (Value::FunctionCtor(a), Value::FunctionCtor(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Loose (`==`) equality: `null == undefined`, numeric coercion
    /// between numbers, strings, and booleans; containers only ever
    /// loosely equal by identity.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Number(n), Value::Str(_)) => *n == other.to_number(),
            (Value::Str(_), Value::Number(n)) => self.to_number() == *n,
            (Value::Bool(_), _) => Value::Number(self.to_number()).loose_eq(other),
            (_, Value::Bool(_)) => self.loose_eq(&Value::Number(other.to_number())),
            _ => self.strict_eq(other),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_eq(other)
    }
}

/// Display form of a number: integral values print without a fraction
/// (`3`, not `3.0`), everything else in the shortest f64 form.
pub fn number_to_display(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == n.trunc() && n.abs() < 1e21 {
        // -0 displays as 0.
        format!("{:.0}", n)
    } else {
        format!("{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", number_to_display(*n)),
            Value::Str(s) => write!(f, "{s}"),
            Value::Array(arr) => {
                // Nil elements join as empty segments.
                let rendered: Vec<String> = arr
                    .borrow()
                    .elements()
                    .iter()
                    .map(|v| {
                        if v.is_nil() {
                            String::new()
                        } else {
                            v.to_string()
                        }
                    })
                    .collect();
                write!(f, "{}", rendered.join(","))
            }
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Closure(c) => write!(f, "function ({} params)", c.params.len()),
            Value::Native(n) => write!(f, "function {}() [native]", n.name),
            Value::FunctionCtor(_) => write!(f, "function Function() [sandboxed]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::number(0.0).is_truthy());
        assert!(!Value::number(f64::NAN).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(Value::number(-1.0).is_truthy());
        assert!(Value::string("0").is_truthy());
        assert!(Value::Bool(true).is_truthy());
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(Value::Null.to_number(), 0.0);
        assert!(Value::Undefined.to_number().is_nan());
        assert_eq!(Value::Bool(true).to_number(), 1.0);
        assert_eq!(Value::string(" 12 ").to_number(), 12.0);
        assert_eq!(Value::string("").to_number(), 0.0);
        assert!(Value::string("twelve").to_number().is_nan());
    }

    #[test]
    fn loose_vs_strict_equality() {
        assert!(Value::Null.loose_eq(&Value::Undefined));
        assert!(!Value::Null.strict_eq(&Value::Undefined));
        assert!(Value::number(1.0).loose_eq(&Value::string("1")));
        assert!(!Value::number(1.0).strict_eq(&Value::string("1")));
        assert!(Value::Bool(true).loose_eq(&Value::number(1.0)));
        assert!(!Value::Bool(true).loose_eq(&Value::number(2.0)));
    }

    #[test]
    fn number_display_trims_integral() {
        assert_eq!(number_to_display(3.0), "3");
        assert_eq!(number_to_display(3.5), "3.5");
        assert_eq!(number_to_display(-0.0), "0");
        assert_eq!(number_to_display(f64::NAN), "NaN");
        assert_eq!(number_to_display(f64::INFINITY), "Infinity");
    }

    #[test]
    fn typeof_classification() {
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::Undefined.type_of(), "undefined");
        assert_eq!(Value::number(1.0).type_of(), "number");
        assert_eq!(Value::string("x").type_of(), "string");
    }
}
