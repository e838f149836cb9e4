//! Recursive-descent parser for the formula grammar
//!
//! One function per precedence level, lowest first:
//!
//! ```text
//! or > and > equality > comparison > additive > multiplicative
//!    > unary > power > primary
//! ```
//!
//! Power is right-associative and binds tighter than unary minus on its
//! left, so `-2 ** 2` is `-(2 ** 2)` and `2 ** -3` parses naturally.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{EvalError, Result};
use crate::lexer::{tokenize, Token};

/// Nesting bound for pathological input; evaluation depth is bounded by
/// parse depth, so this is the only guard needed
const MAX_DEPTH: usize = 64;

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub(crate) fn parse(input: &str) -> Result<Expr> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(EvalError::syntax("empty formula"));
        }

        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_expr()?;
        if let Some(token) = parser.peek() {
            return Err(EvalError::syntax(format!(
                "unexpected {} after expression",
                token.describe()
            )));
        }
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_equality()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_equality()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::Ne) => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_comparison()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    // Every nested construct (parentheses, call arguments, chained unary
    // operators, power exponents) recurses through here, so the depth
    // guard lives here alone.
    fn parse_unary(&mut self) -> Result<Expr> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::syntax("formula is nested too deeply"));
        }
        self.depth += 1;
        let expr = self.parse_unary_inner();
        self.depth -= 1;
        expr
    }

    fn parse_unary_inner(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                })
            }
            Some(Token::Plus) => {
                // Unary plus is the identity on numbers
                self.advance();
                self.parse_unary()
            }
            Some(Token::Not) => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                })
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr> {
        let base = self.parse_primary()?;
        if self.eat(&Token::Pow) {
            // Right-associative: the exponent may itself be unary or
            // another power
            let exp = self.parse_unary()?;
            return Ok(binary(BinaryOp::Pow, base, exp));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.peek().cloned() {
            Some(Token::Number(n)) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Some(Token::Ident(name)) => {
                self.advance();
                if self.eat(&Token::LParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Some(Token::LParen) => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Some(token) => Err(EvalError::syntax(format!(
                "expected a number, identifier, or '(', found {}",
                token.describe()
            ))),
            None => Err(EvalError::syntax("unexpected end of formula")),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RParen)?;
            return Ok(args);
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            let found = match self.peek() {
                Some(t) => t.describe(),
                None => "end of formula".to_string(),
            };
            Err(EvalError::syntax(format!(
                "expected {}, found {}",
                token.describe(),
                found
            )))
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    #[test]
    fn test_precedence_mul_over_add() {
        // 2 + 3 * 4 parses as 2 + (3 * 4)
        let expr = Parser::parse("2 + 3 * 4").unwrap();
        match expr {
            Expr::Binary {
                op: BinaryOp::Add,
                rhs,
                ..
            } => assert!(matches!(
                *rhs,
                Expr::Binary {
                    op: BinaryOp::Mul,
                    ..
                }
            )),
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_power_binds_tighter_than_unary_minus() {
        // -2 ** 2 parses as -(2 ** 2)
        let expr = Parser::parse("-2 ** 2").unwrap();
        match expr {
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => assert!(matches!(
                *operand,
                Expr::Binary {
                    op: BinaryOp::Pow,
                    ..
                }
            )),
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_call_with_arguments() {
        let expr = Parser::parse("min(1, x)").unwrap();
        match expr {
            Expr::Call { name, args } => {
                assert_eq!(name, "min");
                assert_eq!(args.len(), 2);
                assert_eq!(args[0], Expr::Number(Number::Int(1)));
                assert_eq!(args[1], Expr::Variable("x".to_string()));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_empty_formula() {
        assert!(matches!(Parser::parse(""), Err(EvalError::Syntax(_))));
        assert!(matches!(Parser::parse("   "), Err(EvalError::Syntax(_))));
    }

    #[test]
    fn test_trailing_tokens() {
        assert!(matches!(Parser::parse("1 2"), Err(EvalError::Syntax(_))));
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        assert!(matches!(Parser::parse("(1 + 2"), Err(EvalError::Syntax(_))));
    }

    #[test]
    fn test_dangling_operator() {
        assert!(matches!(Parser::parse("1 +"), Err(EvalError::Syntax(_))));
    }

    #[test]
    fn test_nesting_depth_limit() {
        let formula = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert!(matches!(
            Parser::parse(&formula),
            Err(EvalError::Syntax(_))
        ));

        let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert!(Parser::parse(&shallow).is_ok());
    }
}
