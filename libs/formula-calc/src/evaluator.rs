//! FormulaEngine - expression evaluation over a whitelist grammar
//!
//! Supports:
//! - Arithmetic: +, -, *, /, %, ** (also spelled ^)
//! - Comparison: <, >, <=, >=, ==, !=
//! - Logic: &&, ||, ! (short-circuiting)
//! - Built-in functions: sqrt, trig, log family, abs, min, max, round,
//!   clamp, sign, pow
//!
//! Only constructs the grammar can express are evaluable; there is no
//! statement form, no attribute access, and no call target outside the
//! fixed whitelist.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::env::VariableEnv;
use crate::error::Result;
use crate::functions::FunctionRegistry;
use crate::parser::Parser;
use crate::value::{Number, Value};
use tracing::trace;

/// Formula evaluation engine
///
/// The engine owns only the immutable function whitelist, so it is
/// reentrant: a fresh [`VariableEnv`] is supplied per call and nothing
/// is shared between evaluations.
///
/// # Example
/// ```
/// use formula_calc::{FormulaEngine, Number, VariableEnv};
///
/// let engine = FormulaEngine::new();
/// let mut env = VariableEnv::new();
/// env.insert("x", 4).unwrap();
///
/// assert_eq!(engine.evaluate("2 + x * 3", &env).unwrap(), Number::Int(14));
/// ```
pub struct FormulaEngine {
    functions: FunctionRegistry,
}

impl FormulaEngine {
    pub fn new() -> Self {
        Self {
            functions: FunctionRegistry::new(),
        }
    }

    /// Evaluate a formula against the given variable bindings
    ///
    /// Comparisons may appear as the final result; they come back as
    /// 1 or 0.
    pub fn evaluate(&self, formula: &str, env: &VariableEnv) -> Result<Number> {
        let expr = Parser::parse(formula)?;
        let value = self.eval_expr(&expr, env)?;
        let result = value.into_number();
        trace!(formula, %result, "formula evaluated");
        Ok(result)
    }

    fn eval_expr(&self, expr: &Expr, env: &VariableEnv) -> Result<Value> {
        match expr {
            Expr::Number(n) => Ok(Value::Num(*n)),
            Expr::Variable(name) => env.lookup(name).map(Value::Num),
            Expr::Unary { op, operand } => {
                let value = self.eval_expr(operand, env)?;
                match op {
                    UnaryOp::Neg => {
                        let n = value.as_number("operand of unary '-'")?;
                        n.checked_neg().map(Value::Num)
                    }
                    UnaryOp::Not => {
                        let b = value.as_bool("operand of '!'")?;
                        Ok(Value::Bool(!b))
                    }
                }
            }
            Expr::Binary { op, lhs, rhs } => self.eval_binary(*op, lhs, rhs, env),
            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    let value = self.eval_expr(arg, env)?;
                    values.push(value.as_number(&format!("argument of '{}'", name))?);
                }
                self.functions.call(name, &values).map(Value::Num)
            }
        }
    }

    fn eval_binary(&self, op: BinaryOp, lhs: &Expr, rhs: &Expr, env: &VariableEnv) -> Result<Value> {
        // Logic short-circuits, so its right side is evaluated lazily
        match op {
            BinaryOp::And => {
                let l = self.eval_expr(lhs, env)?.as_bool("left operand of '&&'")?;
                if !l {
                    return Ok(Value::Bool(false));
                }
                let r = self.eval_expr(rhs, env)?.as_bool("right operand of '&&'")?;
                return Ok(Value::Bool(r));
            }
            BinaryOp::Or => {
                let l = self.eval_expr(lhs, env)?.as_bool("left operand of '||'")?;
                if l {
                    return Ok(Value::Bool(true));
                }
                let r = self.eval_expr(rhs, env)?.as_bool("right operand of '||'")?;
                return Ok(Value::Bool(r));
            }
            _ => {}
        }

        let operand = |side: &str| format!("{} operand of '{}'", side, op);
        let l = self.eval_expr(lhs, env)?.as_number(&operand("left"))?;
        let r = self.eval_expr(rhs, env)?.as_number(&operand("right"))?;

        match op {
            BinaryOp::Add => l.checked_add(r).map(Value::Num),
            BinaryOp::Sub => l.checked_sub(r).map(Value::Num),
            BinaryOp::Mul => l.checked_mul(r).map(Value::Num),
            BinaryOp::Div => l.checked_div(r).map(Value::Num),
            BinaryOp::Rem => l.checked_rem(r).map(Value::Num),
            BinaryOp::Pow => l.checked_pow(r).map(Value::Num),
            BinaryOp::Eq => Ok(Value::Bool(l.compare(r)?.is_eq())),
            BinaryOp::Ne => Ok(Value::Bool(!l.compare(r)?.is_eq())),
            BinaryOp::Lt => Ok(Value::Bool(l.compare(r)?.is_lt())),
            BinaryOp::Gt => Ok(Value::Bool(l.compare(r)?.is_gt())),
            BinaryOp::Le => Ok(Value::Bool(l.compare(r)?.is_le())),
            BinaryOp::Ge => Ok(Value::Bool(l.compare(r)?.is_ge())),
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }
}

impl Default for FormulaEngine {
    fn default() -> Self {
        Self::new()
    }
}
