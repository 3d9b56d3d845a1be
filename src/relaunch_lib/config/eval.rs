//! A restricted evaluator for the expressions in a configuration block.
//!
//! The right-hand side of a config assignment is an integer expression over
//! literals and previously bound config fields, with `+ - * /` (truncating),
//! parentheses, unary minus, and `ceil_div(a, b)` for ceiling division.
//! Nothing else parses; in particular this is not a general-purpose code
//! evaluator, so a config block can never execute arbitrary content.

use std::collections::BTreeMap;

use anyhow::Context;
use anyhow::Result;

use crate::bailc;
use crate::config::extract::Assignment;
use crate::config::CONFIG_FIELDS;
use crate::error::ctx;

/// Evaluate the extracted assignments in file order.
///
/// Only the recognized [CONFIG_FIELDS] are bindable; assignments to other
/// names are ignored. A later field may reference any earlier one.
pub fn bind(assignments: &[Assignment]) -> Result<BTreeMap<String, i64>> {
    let mut bound = BTreeMap::new();

    for assignment in assignments {
        if !CONFIG_FIELDS.contains(&assignment.name.as_str()) {
            continue;
        }

        let name = &assignment.name;
        let rhs = &assignment.expr;

        let value = evaluate(rhs, &bound).with_context(ctx!(
          "Could not evaluate `{name}={rhs}`", ;
          "Config expressions support integers, earlier fields, + - * /, \
           parentheses, and ceil_div(a, b)",
        ))?;

        bound.insert(assignment.name.clone(), value);
    }

    Ok(bound)
}

/// Evaluate one expression against the fields bound so far.
pub fn evaluate(expr: &str, bound: &BTreeMap<String, i64>) -> Result<i64> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        bound,
    };

    let value = parser.expression()?;

    if parser.pos != parser.tokens.len() {
        bailc!(
            "Trailing content in expression", ;
            "The expression `{expr}` did not end where expected", ;
            "",
        );
    }

    Ok(value)
}

/// The tokens of the expression language.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Int(i64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Comma,
    Open,
    Close,
}

/// Split an expression into tokens, rejecting anything outside the language.
fn tokenize(expr: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
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
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '0'..='9' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal.parse().with_context(ctx!(
                  "`{literal}` is not a valid integer", ; "",
                ))?;
                tokens.push(Token::Int(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                bailc!(
                    "Unsupported character in expression", ;
                    "`{other}` is not part of the config expression language", ;
                    "",
                );
            }
        }
    }

    Ok(tokens)
}

/// A hand-rolled recursive-descent parser that evaluates as it goes.
struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    bound: &'a BTreeMap<String, i64>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, wanted: Token) -> Result<()> {
        match self.next() {
            Some(token) if token == wanted => Ok(()),
            other => {
                bailc!(
                    "Malformed expression", ;
                    "Expected {wanted:?}, found {other:?}", ;
                    "",
                );
            }
        }
    }

    /// expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<i64> {
        let mut value = self.term()?;

        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.next();
                    value = checked(value.checked_add(self.term()?))?;
                }
                Some(Token::Minus) => {
                    self.next();
                    value = checked(value.checked_sub(self.term()?))?;
                }
                _ => return Ok(value),
            }
        }
    }

    /// term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<i64> {
        let mut value = self.factor()?;

        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.next();
                    value = checked(value.checked_mul(self.factor()?))?;
                }
                Some(Token::Slash) => {
                    self.next();
                    let divisor = self.factor()?;
                    value = checked_div(value, divisor)?;
                }
                _ => return Ok(value),
            }
        }
    }

    /// factor := INT | FIELD | '-' factor | '(' expression ')'
    ///         | 'ceil_div' '(' expression ',' expression ')'
    fn factor(&mut self) -> Result<i64> {
        match self.next() {
            Some(Token::Int(value)) => Ok(value),
            Some(Token::Minus) => checked(self.factor()?.checked_neg()),
            Some(Token::Open) => {
                let value = self.expression()?;
                self.expect(Token::Close)?;
                Ok(value)
            }
            Some(Token::Ident(ident)) if ident == "ceil_div" => {
                self.expect(Token::Open)?;
                let dividend = self.expression()?;
                self.expect(Token::Comma)?;
                let divisor = self.expression()?;
                self.expect(Token::Close)?;
                ceil_div(dividend, divisor)
            }
            Some(Token::Ident(ident)) => self.lookup(&ident),
            other => {
                bailc!(
                    "Malformed expression", ;
                    "Expected a value, found {other:?}", ;
                    "",
                );
            }
        }
    }

    /// Resolve a name to a previously bound config field.
    fn lookup(&self, ident: &str) -> Result<i64> {
        if !CONFIG_FIELDS.contains(&ident) {
            bailc!(
                "Unknown name in expression", ;
                "`{ident}` is not a config field", ;
                "Only the launch config fields can be referenced",
            );
        }

        match self.bound.get(ident) {
            Some(value) => Ok(*value),
            None => {
                bailc!(
                    "Field referenced before assignment", ;
                    "`{ident}` is used before it is assigned in the config block", ;
                    "Reorder the config block so that {ident} is assigned first",
                );
            }
        }
    }
}

/// Surface an overflowed arithmetic step as an evaluation error.
fn checked(value: Option<i64>) -> Result<i64> {
    match value {
        Some(value) => Ok(value),
        None => {
            bailc!(
                "Arithmetic overflow", ;
                "An intermediate value does not fit in a 64-bit integer", ;
                "",
            );
        }
    }
}

/// Truncating division with an explicit zero check.
fn checked_div(dividend: i64, divisor: i64) -> Result<i64> {
    if divisor == 0 {
        bailc!(
            "Division by zero", ;
            "The expression divides {dividend} by zero", ;
            "",
        );
    }
    Ok(dividend / divisor)
}

/// Ceiling division, the conventional way to derive `NUM_RUNS`.
fn ceil_div(dividend: i64, divisor: i64) -> Result<i64> {
    if divisor == 0 {
        bailc!(
            "Division by zero", ;
            "ceil_div({dividend}, 0) is undefined", ;
            "",
        );
    }

    let quotient = dividend / divisor;
    if dividend % divisor != 0 && (dividend > 0) == (divisor > 0) {
        Ok(quotient + 1)
    } else {
        Ok(quotient)
    }
}

#[cfg(test)]
#[path = "tests/eval.rs"]
mod tests;
