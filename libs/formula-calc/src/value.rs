//! Numeric values and checked arithmetic
//!
//! Arithmetic stays in `i64` while both operands are integers and
//! promotes to IEEE-754 double otherwise. Every operation is checked:
//! integer overflow, a zero divisor, and non-finite float results all
//! surface as domain errors instead of wrapping or producing infinities.

use crate::error::{EvalError, Result};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A numeric evaluation result: integer or IEEE-754 double
///
/// Serialized untagged, so JSON callers receive a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }

    pub(crate) fn checked_add(self, rhs: Number) -> Result<Number> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map(Number::Int)
                .ok_or_else(|| overflow("addition")),
            _ => finite(self.as_f64() + rhs.as_f64(), "addition"),
        }
    }

    pub(crate) fn checked_sub(self, rhs: Number) -> Result<Number> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_sub(b)
                .map(Number::Int)
                .ok_or_else(|| overflow("subtraction")),
            _ => finite(self.as_f64() - rhs.as_f64(), "subtraction"),
        }
    }

    pub(crate) fn checked_mul(self, rhs: Number) -> Result<Number> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(b)
                .map(Number::Int)
                .ok_or_else(|| overflow("multiplication")),
            _ => finite(self.as_f64() * rhs.as_f64(), "multiplication"),
        }
    }

    /// True division; the result is always a float
    pub(crate) fn checked_div(self, rhs: Number) -> Result<Number> {
        if rhs.is_zero() {
            return Err(EvalError::domain("division by zero"));
        }
        finite(self.as_f64() / rhs.as_f64(), "division")
    }

    /// Euclidean remainder; the result is non-negative for a nonzero modulus
    pub(crate) fn checked_rem(self, rhs: Number) -> Result<Number> {
        if rhs.is_zero() {
            return Err(EvalError::domain("modulo by zero"));
        }
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_rem_euclid(b)
                .map(Number::Int)
                .ok_or_else(|| overflow("modulo")),
            _ => finite(self.as_f64().rem_euclid(rhs.as_f64()), "modulo"),
        }
    }

    /// Exponentiation; integer base and non-negative integer exponent stay
    /// integer, everything else goes through `powf`
    pub(crate) fn checked_pow(self, rhs: Number) -> Result<Number> {
        match (self, rhs) {
            (Number::Int(base), Number::Int(exp)) if exp >= 0 => {
                let exp = u32::try_from(exp)
                    .map_err(|_| EvalError::domain(format!("exponent {} is too large", exp)))?;
                base.checked_pow(exp)
                    .map(Number::Int)
                    .ok_or_else(|| overflow("exponentiation"))
            }
            _ => {
                let base = self.as_f64();
                let exp = rhs.as_f64();
                if base < 0.0 && exp.fract() != 0.0 {
                    return Err(EvalError::domain(format!(
                        "negative base {} with fractional exponent {}",
                        base, exp
                    )));
                }
                finite(base.powf(exp), "exponentiation")
            }
        }
    }

    pub(crate) fn checked_neg(self) -> Result<Number> {
        match self {
            Number::Int(i) => i
                .checked_neg()
                .map(Number::Int)
                .ok_or_else(|| overflow("negation")),
            Number::Float(f) => Ok(Number::Float(-f)),
        }
    }

    /// Total order over finite numbers; integers compare exactly
    pub(crate) fn compare(self, rhs: Number) -> Result<Ordering> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => Ok(a.cmp(&b)),
            _ => self
                .as_f64()
                .partial_cmp(&rhs.as_f64())
                .ok_or_else(|| EvalError::domain("comparison of non-finite values")),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Reject non-finite float results (overflow, 0 to a negative power, ...)
pub(crate) fn finite(value: f64, operation: &str) -> Result<Number> {
    if value.is_finite() {
        Ok(Number::Float(value))
    } else {
        Err(EvalError::domain(format!(
            "numeric overflow in {}",
            operation
        )))
    }
}

fn overflow(operation: &str) -> EvalError {
    EvalError::domain(format!("integer overflow in {}", operation))
}

/// Intermediate value during tree evaluation
///
/// Booleans exist only between a comparison and the logical operator or
/// result boundary that consumes them; they never enter an environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Value {
    Num(Number),
    Bool(bool),
}

impl Value {
    /// Coerce to the caller-facing result: booleans become 1 or 0
    pub(crate) fn into_number(self) -> Number {
        match self {
            Value::Num(n) => n,
            Value::Bool(b) => Number::Int(i64::from(b)),
        }
    }

    pub(crate) fn as_number(self, what: &str) -> Result<Number> {
        match self {
            Value::Num(n) => Ok(n),
            Value::Bool(_) => Err(EvalError::type_mismatch(format!(
                "{} must be a number, not a boolean",
                what
            ))),
        }
    }

    pub(crate) fn as_bool(self, what: &str) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(b),
            Value::Num(_) => Err(EvalError::type_mismatch(format!(
                "{} must be a boolean comparison, not a number",
                what
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_arithmetic_stays_int() {
        assert_eq!(
            Number::Int(2).checked_add(Number::Int(3)).unwrap(),
            Number::Int(5)
        );
        assert_eq!(
            Number::Int(2).checked_mul(Number::Int(3)).unwrap(),
            Number::Int(6)
        );
    }

    #[test]
    fn test_mixed_arithmetic_promotes() {
        assert_eq!(
            Number::Int(2).checked_add(Number::Float(0.5)).unwrap(),
            Number::Float(2.5)
        );
    }

    #[test]
    fn test_division_is_always_float() {
        assert_eq!(
            Number::Int(4).checked_div(Number::Int(2)).unwrap(),
            Number::Float(2.0)
        );
        assert_eq!(
            Number::Int(3).checked_div(Number::Int(2)).unwrap(),
            Number::Float(1.5)
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            Number::Int(10).checked_div(Number::Int(0)),
            Err(EvalError::Domain(_))
        ));
        assert!(matches!(
            Number::Float(10.0).checked_div(Number::Float(0.0)),
            Err(EvalError::Domain(_))
        ));
    }

    #[test]
    fn test_euclidean_remainder() {
        assert_eq!(
            Number::Int(9).checked_rem(Number::Int(4)).unwrap(),
            Number::Int(1)
        );
        assert_eq!(
            Number::Int(-7).checked_rem(Number::Int(3)).unwrap(),
            Number::Int(2)
        );
    }

    #[test]
    fn test_integer_overflow_is_domain_error() {
        assert!(matches!(
            Number::Int(i64::MAX).checked_add(Number::Int(1)),
            Err(EvalError::Domain(_))
        ));
        assert!(matches!(
            Number::Int(i64::MIN).checked_neg(),
            Err(EvalError::Domain(_))
        ));
    }

    #[test]
    fn test_integer_power() {
        assert_eq!(
            Number::Int(2).checked_pow(Number::Int(10)).unwrap(),
            Number::Int(1024)
        );
    }

    #[test]
    fn test_negative_exponent_goes_float() {
        assert_eq!(
            Number::Int(2).checked_pow(Number::Int(-1)).unwrap(),
            Number::Float(0.5)
        );
    }

    #[test]
    fn test_negative_base_fractional_exponent() {
        let result = Number::Int(-8).checked_pow(Number::Float(1.0 / 3.0));
        assert!(matches!(result, Err(EvalError::Domain(_))));
    }

    #[test]
    fn test_zero_to_negative_power_overflows() {
        assert!(matches!(
            Number::Int(0).checked_pow(Number::Int(-1)),
            Err(EvalError::Domain(_))
        ));
    }

    #[test]
    fn test_json_serialization() {
        assert_eq!(
            serde_json::to_value(Number::Int(14)).unwrap(),
            serde_json::json!(14)
        );
        assert_eq!(
            serde_json::to_value(Number::Float(2.5)).unwrap(),
            serde_json::json!(2.5)
        );
    }

    #[test]
    fn test_bool_result_coercion() {
        assert_eq!(Value::Bool(true).into_number(), Number::Int(1));
        assert_eq!(Value::Bool(false).into_number(), Number::Int(0));
    }
}
