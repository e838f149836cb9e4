//! Tokenizer for the formula grammar
//!
//! Only the whitelisted token set is representable. Punctuation that
//! belongs to a well-known foreign construct (assignment, attribute
//! access, string literals, indexing) is reported as a disallowed
//! operation by name; any other unrecognized character is a syntax error.

use crate::error::{EvalError, Result};
use crate::value::Number;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(Number),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Not,
    LParen,
    RParen,
    Comma,
}

impl Token {
    /// Human-readable token description for parser error messages
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::Pow => "'**'".to_string(),
            Token::Eq => "'=='".to_string(),
            Token::Ne => "'!='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::Le => "'<='".to_string(),
            Token::Ge => "'>='".to_string(),
            Token::And => "'&&'".to_string(),
            Token::Or => "'||'".to_string(),
            Token::Not => "'!'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
        }
    }
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            ' ' | '\t' | '\r' | '\n' => {
                chars.next();
            }
            '0'..='9' => tokens.push(lex_number(input, &mut chars)?),
            'a'..='z' | 'A'..='Z' | '_' => {
                let start = pos;
                let mut end = pos;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(input[start..end].to_string()));
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '*'))) {
                    chars.next();
                    tokens.push(Token::Pow);
                } else {
                    tokens.push(Token::Star);
                }
            }
            '^' => {
                chars.next();
                tokens.push(Token::Pow);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '=' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    tokens.push(Token::Eq);
                } else {
                    return Err(EvalError::disallowed(format!(
                        "assignment is not supported (position {})",
                        pos
                    )));
                }
            }
            '!' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    tokens.push(Token::Ne);
                } else {
                    tokens.push(Token::Not);
                }
            }
            '<' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '&' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '&'))) {
                    chars.next();
                    tokens.push(Token::And);
                } else {
                    return Err(EvalError::syntax(format!(
                        "unexpected character '&' at position {}",
                        pos
                    )));
                }
            }
            '|' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '|'))) {
                    chars.next();
                    tokens.push(Token::Or);
                } else {
                    return Err(EvalError::syntax(format!(
                        "unexpected character '|' at position {}",
                        pos
                    )));
                }
            }
            '\'' | '"' => {
                return Err(EvalError::disallowed(format!(
                    "string literals are not supported (position {})",
                    pos
                )));
            }
            '.' => {
                // A leading '.' starts a number only when a digit follows
                let mut lookahead = chars.clone();
                lookahead.next();
                if matches!(lookahead.peek(), Some(&(_, '0'..='9'))) {
                    tokens.push(lex_number(input, &mut chars)?);
                } else {
                    return Err(EvalError::disallowed(format!(
                        "attribute access is not supported (position {})",
                        pos
                    )));
                }
            }
            '[' | ']' => {
                return Err(EvalError::disallowed(format!(
                    "indexing is not supported (position {})",
                    pos
                )));
            }
            '{' | '}' => {
                return Err(EvalError::disallowed(format!(
                    "collection literals are not supported (position {})",
                    pos
                )));
            }
            ';' => {
                return Err(EvalError::disallowed(format!(
                    "statements are not supported (position {})",
                    pos
                )));
            }
            _ => {
                return Err(EvalError::syntax(format!(
                    "unexpected character '{}' at position {}",
                    c, pos
                )));
            }
        }
    }

    Ok(tokens)
}

/// Lex a numeric literal: digits, optional fraction, optional exponent
///
/// An integer literal that fits `i64` stays an integer; otherwise the
/// literal is read as a float. Floats that overflow to infinity are
/// rejected rather than carried into evaluation.
fn lex_number(
    input: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<Token> {
    let start = match chars.peek() {
        Some(&(i, _)) => i,
        None => return Err(EvalError::syntax("expected a number")),
    };
    let mut end = start;
    let mut is_float = false;

    while let Some(&(i, c)) = chars.peek() {
        match c {
            '0'..='9' => {
                end = i + 1;
                chars.next();
            }
            '.' => {
                if is_float {
                    break;
                }
                is_float = true;
                end = i + 1;
                chars.next();
            }
            'e' | 'E' => {
                // Exponent only counts when followed by a digit or a
                // signed digit; otherwise it starts an identifier
                let mut lookahead = chars.clone();
                lookahead.next();
                let next = lookahead.peek().map(|&(_, c)| c);
                let signed = matches!(next, Some('+') | Some('-'));
                let digit = match next {
                    Some(c) if c.is_ascii_digit() => true,
                    Some('+') | Some('-') => {
                        lookahead.next();
                        matches!(lookahead.peek(), Some(&(_, d)) if d.is_ascii_digit())
                    }
                    _ => false,
                };
                if !digit {
                    break;
                }
                is_float = true;
                chars.next();
                if signed {
                    chars.next();
                }
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() {
                        end = i + 1;
                        chars.next();
                    } else {
                        break;
                    }
                }
                break;
            }
            _ => break,
        }
    }

    let text = &input[start..end];
    if !is_float {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Token::Number(Number::Int(i)));
        }
    }
    let f: f64 = text
        .parse()
        .map_err(|_| EvalError::syntax(format!("invalid number literal '{}'", text)))?;
    if !f.is_finite() {
        return Err(EvalError::domain(format!(
            "number literal '{}' is out of range",
            text
        )));
    }
    Ok(Token::Number(Number::Float(f)))
}
