//! Operator semantics over evaluated values.
//!
//! Almost every operator here is total: coercion rules make all
//! operand combinations produce a value (NaN, typically) rather than
//! an error. `instanceof` is the one exception; it consults the realm
//! and rejects a non-callable right-hand side.

use vessel_ir::{BinaryOp, UnaryOp};

use crate::errors::EvalResult;
use crate::guard::Realm;
use crate::value::Value;

/// Wrap-around 32-bit integer coercion for the bitwise operators.
fn to_int32(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    let wrapped = n.trunc().rem_euclid(4_294_967_296.0);
    wrapped as u32 as i32
}

pub(crate) fn evaluate_unary(op: UnaryOp, value: &Value) -> Value {
    match op {
        UnaryOp::Plus => Value::number(value.to_number()),
        UnaryOp::Neg => Value::number(-value.to_number()),
        UnaryOp::BitNot => Value::number(f64::from(!to_int32(value.to_number()))),
        UnaryOp::Not => Value::boolean(!value.is_truthy()),
        UnaryOp::TypeOf => Value::string(value.type_of()),
    }
}

pub(crate) fn evaluate_binary(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    realm: &Realm,
) -> EvalResult {
    let result = match op {
        BinaryOp::Eq => Value::boolean(left.loose_eq(right)),
        BinaryOp::NotEq => Value::boolean(!left.loose_eq(right)),
        BinaryOp::StrictEq => Value::boolean(left.strict_eq(right)),
        BinaryOp::StrictNotEq => Value::boolean(!left.strict_eq(right)),

        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => compare(op, left, right),

        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => Value::number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::number(left.to_number() / right.to_number()),
        BinaryOp::Mod => Value::number(left.to_number() % right.to_number()),

        BinaryOp::BitAnd => {
            Value::number(f64::from(to_int32(left.to_number()) & to_int32(right.to_number())))
        }
        BinaryOp::BitOr => {
            Value::number(f64::from(to_int32(left.to_number()) | to_int32(right.to_number())))
        }
        BinaryOp::BitXor => {
            Value::number(f64::from(to_int32(left.to_number()) ^ to_int32(right.to_number())))
        }

        BinaryOp::InstanceOf => Value::boolean(realm.instance_of(left, right)?),
    };
    Ok(result)
}

/// `+` concatenates when either side is a string, adds otherwise.
fn add(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Str(_), _) | (_, Value::Str(_)) => Value::string(format!("{left}{right}")),
        _ => Value::number(left.to_number() + right.to_number()),
    }
}

/// Relational comparison: lexicographic when both sides are strings,
/// numeric otherwise (NaN compares false).
fn compare(op: BinaryOp, left: &Value, right: &Value) -> Value {
    let result = match (left, right) {
        (Value::Str(a), Value::Str(b)) => match op {
            BinaryOp::Lt => a < b,
            BinaryOp::LtEq => a <= b,
            BinaryOp::Gt => a > b,
            BinaryOp::GtEq => a >= b,
            _ => false,
        },
        _ => {
            let (a, b) = (left.to_number(), right.to_number());
            match op {
                BinaryOp::Lt => a < b,
                BinaryOp::LtEq => a <= b,
                BinaryOp::Gt => a > b,
                BinaryOp::GtEq => a >= b,
                _ => false,
            }
        }
    };
    Value::boolean(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::EvalLimits;
    use pretty_assertions::assert_eq;
    use vessel_ir::SharedInterner;

    fn binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
        let realm = Realm::new(SharedInterner::new(), EvalLimits::default());
        match evaluate_binary(op, left, right, &realm) {
            Ok(value) => value,
            Err(e) => panic!("unexpected operator error: {e}"),
        }
    }

    #[test]
    fn add_concatenates_with_strings() {
        let sum = binary(BinaryOp::Add, &Value::number(1.0), &Value::number(2.0));
        assert_eq!(sum, Value::number(3.0));
        let concat = binary(BinaryOp::Add, &Value::string("n="), &Value::number(3.0));
        assert_eq!(concat, Value::string("n=3"));
    }

    #[test]
    fn division_by_zero_is_infinite() {
        let q = binary(BinaryOp::Div, &Value::number(1.0), &Value::number(0.0));
        assert_eq!(q, Value::number(f64::INFINITY));
    }

    #[test]
    fn string_comparison_is_lexicographic() {
        let lt = binary(BinaryOp::Lt, &Value::string("apple"), &Value::string("pear"));
        assert_eq!(lt, Value::boolean(true));
        // Mixed operands fall back to numeric comparison.
        let mixed = binary(BinaryOp::Lt, &Value::string("10"), &Value::number(9.0));
        assert_eq!(mixed, Value::boolean(false));
    }

    #[test]
    fn nan_comparisons_are_false() {
        let nan = Value::number(f64::NAN);
        for op in [BinaryOp::Lt, BinaryOp::LtEq, BinaryOp::Gt, BinaryOp::GtEq] {
            assert_eq!(binary(op, &nan, &Value::number(1.0)), Value::boolean(false));
        }
    }

    #[test]
    fn int32_wrap_for_bitwise() {
        assert_eq!(to_int32(0.0), 0);
        assert_eq!(to_int32(-1.0), -1);
        assert_eq!(to_int32(4_294_967_296.0), 0);
        assert_eq!(to_int32(2_147_483_648.0), i32::MIN);
        assert_eq!(to_int32(f64::NAN), 0);
        let and = binary(BinaryOp::BitAnd, &Value::number(6.0), &Value::number(3.0));
        assert_eq!(and, Value::number(2.0));
    }

    #[test]
    fn instanceof_of_a_non_callable_is_an_error() {
        let realm = Realm::new(SharedInterner::new(), EvalLimits::default());
        let obj = Value::Object(realm.new_object());
        let result = evaluate_binary(BinaryOp::InstanceOf, &obj, &Value::number(1.0), &realm);
        assert!(result.is_err());
    }

    #[test]
    fn unary_semantics() {
        assert_eq!(evaluate_unary(UnaryOp::Neg, &Value::string("5")), Value::number(-5.0));
        assert_eq!(evaluate_unary(UnaryOp::Not, &Value::number(0.0)), Value::boolean(true));
        assert_eq!(evaluate_unary(UnaryOp::BitNot, &Value::number(0.0)), Value::number(-1.0));
        assert_eq!(evaluate_unary(UnaryOp::TypeOf, &Value::Null), Value::string("object"));
    }
}
