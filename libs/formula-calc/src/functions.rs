//! Built-in math functions
//!
//! The whitelist is fixed: a call to any name not registered here is a
//! disallowed operation, not a lookup failure. All functions are pure;
//! arguments are validated before dispatch, so each implementation may
//! assume its arity bounds hold.

use crate::error::{EvalError, Result};
use crate::value::{finite, Number};
use std::collections::HashMap;

/// Argument count bounds for a builtin
#[derive(Debug, Clone, Copy)]
struct Arity {
    min: usize,
    max: Option<usize>,
}

impl Arity {
    const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    const fn range(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    fn check(&self, name: &str, got: usize) -> Result<()> {
        let ok = got >= self.min && self.max.map_or(true, |max| got <= max);
        if ok {
            return Ok(());
        }
        let expected = match (self.min, self.max) {
            (min, Some(max)) if min == max => format!("{} argument(s)", min),
            (min, Some(max)) => format!("{} to {} arguments", min, max),
            (min, None) => format!("at least {} arguments", min),
        };
        Err(EvalError::syntax(format!(
            "function '{}' expects {}, got {}",
            name, expected, got
        )))
    }
}

#[derive(Clone, Copy)]
struct Builtin {
    name: &'static str,
    arity: Arity,
    apply: fn(&[Number]) -> Result<Number>,
}

const BUILTINS: &[Builtin] = &[
    Builtin { name: "sqrt", arity: Arity::exactly(1), apply: sqrt },
    Builtin { name: "sin", arity: Arity::exactly(1), apply: sin },
    Builtin { name: "cos", arity: Arity::exactly(1), apply: cos },
    Builtin { name: "tan", arity: Arity::exactly(1), apply: tan },
    Builtin { name: "asin", arity: Arity::exactly(1), apply: asin },
    Builtin { name: "acos", arity: Arity::exactly(1), apply: acos },
    Builtin { name: "atan", arity: Arity::exactly(1), apply: atan },
    Builtin { name: "abs", arity: Arity::exactly(1), apply: abs },
    Builtin { name: "exp", arity: Arity::exactly(1), apply: exp },
    Builtin { name: "log", arity: Arity::exactly(1), apply: log },
    Builtin { name: "log10", arity: Arity::exactly(1), apply: log10 },
    Builtin { name: "log2", arity: Arity::exactly(1), apply: log2 },
    Builtin { name: "floor", arity: Arity::exactly(1), apply: floor },
    Builtin { name: "ceil", arity: Arity::exactly(1), apply: ceil },
    Builtin { name: "sign", arity: Arity::exactly(1), apply: sign },
    Builtin { name: "round", arity: Arity::range(1, 2), apply: round },
    Builtin { name: "pow", arity: Arity::exactly(2), apply: pow },
    Builtin { name: "clamp", arity: Arity::exactly(3), apply: clamp },
    Builtin { name: "min", arity: Arity::at_least(2), apply: min },
    Builtin { name: "max", arity: Arity::at_least(2), apply: max },
];

/// Immutable whitelist of callable functions, built once per engine
pub(crate) struct FunctionRegistry {
    functions: HashMap<&'static str, Builtin>,
}

impl FunctionRegistry {
    pub(crate) fn new() -> Self {
        let mut functions = HashMap::with_capacity(BUILTINS.len());
        for builtin in BUILTINS {
            functions.insert(builtin.name, *builtin);
        }
        Self { functions }
    }

    pub(crate) fn call(&self, name: &str, args: &[Number]) -> Result<Number> {
        let builtin = self.functions.get(name).ok_or_else(|| {
            EvalError::disallowed(format!("function '{}' is not in the allowed set", name))
        })?;
        builtin.arity.check(name, args.len())?;
        (builtin.apply)(args)
    }
}

fn sqrt(args: &[Number]) -> Result<Number> {
    let x = args[0].as_f64();
    if x < 0.0 {
        return Err(EvalError::domain(format!("sqrt of negative number {}", x)));
    }
    Ok(Number::Float(x.sqrt()))
}

fn sin(args: &[Number]) -> Result<Number> {
    Ok(Number::Float(args[0].as_f64().sin()))
}

fn cos(args: &[Number]) -> Result<Number> {
    Ok(Number::Float(args[0].as_f64().cos()))
}

fn tan(args: &[Number]) -> Result<Number> {
    finite(args[0].as_f64().tan(), "tan")
}

fn asin(args: &[Number]) -> Result<Number> {
    let x = args[0].as_f64();
    if !(-1.0..=1.0).contains(&x) {
        return Err(EvalError::domain(format!("asin of {} is undefined", x)));
    }
    Ok(Number::Float(x.asin()))
}

fn acos(args: &[Number]) -> Result<Number> {
    let x = args[0].as_f64();
    if !(-1.0..=1.0).contains(&x) {
        return Err(EvalError::domain(format!("acos of {} is undefined", x)));
    }
    Ok(Number::Float(x.acos()))
}

fn atan(args: &[Number]) -> Result<Number> {
    Ok(Number::Float(args[0].as_f64().atan()))
}

fn abs(args: &[Number]) -> Result<Number> {
    match args[0] {
        Number::Int(i) => i
            .checked_abs()
            .map(Number::Int)
            .ok_or_else(|| EvalError::domain("integer overflow in abs")),
        Number::Float(f) => Ok(Number::Float(f.abs())),
    }
}

fn exp(args: &[Number]) -> Result<Number> {
    finite(args[0].as_f64().exp(), "exp")
}

/// Natural logarithm
fn log(args: &[Number]) -> Result<Number> {
    let x = args[0].as_f64();
    if x <= 0.0 {
        return Err(EvalError::domain(format!("log of non-positive number {}", x)));
    }
    Ok(Number::Float(x.ln()))
}

fn log10(args: &[Number]) -> Result<Number> {
    let x = args[0].as_f64();
    if x <= 0.0 {
        return Err(EvalError::domain(format!(
            "log10 of non-positive number {}",
            x
        )));
    }
    Ok(Number::Float(x.log10()))
}

fn log2(args: &[Number]) -> Result<Number> {
    let x = args[0].as_f64();
    if x <= 0.0 {
        return Err(EvalError::domain(format!(
            "log2 of non-positive number {}",
            x
        )));
    }
    Ok(Number::Float(x.log2()))
}

fn floor(args: &[Number]) -> Result<Number> {
    match args[0] {
        Number::Int(i) => Ok(Number::Int(i)),
        Number::Float(f) => Ok(to_int_if_representable(f.floor())),
    }
}

fn ceil(args: &[Number]) -> Result<Number> {
    match args[0] {
        Number::Int(i) => Ok(Number::Int(i)),
        Number::Float(f) => Ok(to_int_if_representable(f.ceil())),
    }
}

/// Sign of the argument as -1, 0, or 1, in the argument's representation
fn sign(args: &[Number]) -> Result<Number> {
    match args[0] {
        Number::Int(i) => Ok(Number::Int(i.signum())),
        Number::Float(f) => {
            let s = if f > 0.0 {
                1.0
            } else if f < 0.0 {
                -1.0
            } else {
                0.0
            };
            Ok(Number::Float(s))
        }
    }
}

/// `round(value)` rounds to an integer (half away from zero);
/// `round(value, decimals)` rounds to the given decimal places
fn round(args: &[Number]) -> Result<Number> {
    let value = args[0];
    if args.len() == 1 {
        return match value {
            Number::Int(i) => Ok(Number::Int(i)),
            Number::Float(f) => Ok(to_int_if_representable(f.round())),
        };
    }
    let decimals = match args[1] {
        Number::Int(i) => i32::try_from(i)
            .map_err(|_| EvalError::domain(format!("round precision {} is out of range", i)))?,
        Number::Float(f) => {
            return Err(EvalError::type_mismatch(format!(
                "round precision must be an integer, got {}",
                f
            )))
        }
    };
    let factor = 10_f64.powi(decimals);
    finite((value.as_f64() * factor).round() / factor, "round")
}

/// Same semantics as the `**` operator
fn pow(args: &[Number]) -> Result<Number> {
    args[0].checked_pow(args[1])
}

fn clamp(args: &[Number]) -> Result<Number> {
    let (value, lo, hi) = (args[0], args[1], args[2]);
    if lo.as_f64() > hi.as_f64() {
        return Err(EvalError::domain(format!(
            "clamp requires min <= max, got {} > {}",
            lo, hi
        )));
    }
    if value.as_f64() < lo.as_f64() {
        Ok(lo)
    } else if value.as_f64() > hi.as_f64() {
        Ok(hi)
    } else {
        Ok(value)
    }
}

/// Minimum of two or more arguments, preserving integer representation
fn min(args: &[Number]) -> Result<Number> {
    let mut best = args[0];
    for &arg in &args[1..] {
        if arg.as_f64() < best.as_f64() {
            best = arg;
        }
    }
    Ok(best)
}

/// Maximum of two or more arguments, preserving integer representation
fn max(args: &[Number]) -> Result<Number> {
    let mut best = args[0];
    for &arg in &args[1..] {
        if arg.as_f64() > best.as_f64() {
            best = arg;
        }
    }
    Ok(best)
}

/// Floats with an exact integral value collapse to `Int` when they fit
fn to_int_if_representable(f: f64) -> Number {
    // i64::MAX is not exactly representable as f64; the strict bound
    // avoids a lossy round-trip at the edge
    if f >= -(2_f64.powi(63)) && f < 2_f64.powi(63) {
        Number::Int(f as i64)
    } else {
        Number::Float(f)
    }
}
