//! Calculator tool: evaluates arithmetic expressions.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! sum     = product (('+' | '-') product)*
//! product = power (('*' | '/' | '%') power)*
//! power   = unary ('^' power)?
//! unary   = '-' unary | atom
//! atom    = NUMBER | '(' sum ')'
//! ```

use async_trait::async_trait;
use ponder_core::error::ToolError;
use ponder_core::tool::{Tool, ToolArguments, ToolParameter, required_str};
use std::iter::Peekable;
use std::str::Chars;

/// Deepest nesting of parentheses, unary minus and exponents accepted.
const MAX_DEPTH: usize = 256;

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression. Supports +, -, *, /, %, ^, parentheses, and decimal numbers."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::required(
            "expression",
            "str",
            "The expression to evaluate, e.g. '(2 + 3) * 4'",
        )]
    }

    async fn execute(&self, arguments: ToolArguments) -> Result<serde_json::Value, ToolError> {
        let expression = required_str(&arguments, "expression")?;
        let value = evaluate(expression).map_err(ToolError::ExecutionFailed)?;
        Ok(serde_json::Value::String(format_number(value)))
    }
}

/// Render integers without a trailing `.0`.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expr: &str) -> Result<f64, String> {
    let tokens = lex(expr)?;
    let mut cursor = Cursor {
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let value = cursor.sum()?;
    match cursor.peek() {
        None => Ok(value),
        Some(tok) => Err(format!("Unexpected {tok:?} after end of expression")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tok {
    Num(f64),
    Op(char),
    Open,
    Close,
}

fn lex(input: &str) -> Result<Vec<Tok>, String> {
    let mut chars: Peekable<Chars<'_>> = input.chars().peekable();
    let mut out = Vec::new();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                out.push(Tok::Op(c));
                chars.next();
            }
            '(' => {
                out.push(Tok::Open);
                chars.next();
            }
            ')' => {
                out.push(Tok::Close);
                chars.next();
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if !(d.is_ascii_digit() || d == '.') {
                        break;
                    }
                    literal.push(d);
                    chars.next();
                }
                let n = literal
                    .parse()
                    .map_err(|_| format!("Invalid number: {literal}"))?;
                out.push(Tok::Num(n));
            }
            other => return Err(format!("Unexpected character: '{other}'")),
        }
    }

    if out.is_empty() {
        return Err("Empty expression".into());
    }
    Ok(out)
}

struct Cursor<'a> {
    tokens: &'a [Tok],
    pos: usize,
    depth: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<Tok> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Run `f` one nesting level deeper.
    fn nested(&mut self, f: impl FnOnce(&mut Self) -> Result<f64, String>) -> Result<f64, String> {
        if self.depth >= MAX_DEPTH {
            return Err("Expression nested too deeply".into());
        }
        self.depth += 1;
        let value = f(self);
        self.depth -= 1;
        value
    }

    fn sum(&mut self) -> Result<f64, String> {
        let mut acc = self.product()?;
        while let Some(Tok::Op(op @ ('+' | '-'))) = self.peek() {
            self.bump();
            let rhs = self.product()?;
            acc = if op == '+' { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    fn product(&mut self) -> Result<f64, String> {
        let mut acc = self.power()?;
        while let Some(Tok::Op(op @ ('*' | '/' | '%'))) = self.peek() {
            self.bump();
            let rhs = self.power()?;
            acc = match op {
                '*' => acc * rhs,
                _ if rhs == 0.0 => return Err("Division by zero".into()),
                '/' => acc / rhs,
                _ => acc % rhs,
            };
        }
        Ok(acc)
    }

    // Right-associative: 2^3^2 == 2^9
    fn power(&mut self) -> Result<f64, String> {
        let base = self.unary()?;
        if let Some(Tok::Op('^')) = self.peek() {
            self.bump();
            let exp = self.nested(Self::power)?;
            return Ok(base.powf(exp));
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<f64, String> {
        if let Some(Tok::Op('-')) = self.peek() {
            self.bump();
            return Ok(-self.nested(Self::unary)?);
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<f64, String> {
        match self.bump() {
            Some(Tok::Num(n)) => Ok(n),
            Some(Tok::Open) => {
                let inner = self.nested(Self::sum)?;
                match self.bump() {
                    Some(Tok::Close) => Ok(inner),
                    _ => Err("Expected closing parenthesis".into()),
                }
            }
            Some(tok) => Err(format!("Unexpected {tok:?}")),
            None => Err("Unexpected end of expression".into()),
        }
    }
}
