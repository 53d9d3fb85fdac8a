//! Calculator tool
//!
//! Evaluates arithmetic over a fixed grammar instead of handing the string to
//! a general-purpose evaluator:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := factor (('*' | '/') factor)*
//! factor  := ('+' | '-') factor | primary
//! primary := NUMBER | '(' expr ')'
//! ```
//!
//! Identifiers, calls, and any other operator are rejected.

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::core::{Result, ToolpilotError};
use crate::tools::tool::{required_str, Tool};

/// Deepest allowed nesting of parentheses and unary signs
const MAX_DEPTH: usize = 64;

/// Why an expression could not be evaluated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected '{token}' at position {pos}")]
    UnexpectedToken { token: String, pos: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("expression nested too deeply")]
    TooDeep,

    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{}", n),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn tokenize(input: &str) -> std::result::Result<Vec<(Token, usize)>, ExprError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let token = match ch {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Exponent: e, optional sign, at least one digit
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ExprError::InvalidNumber(text.clone()))?;
                tokens.push((Token::Num(value), start));
                continue;
            }
            other => return Err(ExprError::UnexpectedChar { ch: other, pos: i }),
        };
        tokens.push((token, i));
        i += 1;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn descend(&mut self) -> std::result::Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        Ok(())
    }

    fn expr(&mut self) -> std::result::Result<f64, ExprError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> std::result::Result<f64, ExprError> {
        let mut value = self.factor()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = if op == Token::Star {
                value * rhs
            } else if rhs == 0.0 {
                return Err(ExprError::DivisionByZero);
            } else {
                value / rhs
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> std::result::Result<f64, ExprError> {
        match self.peek() {
            Some(Token::Plus) | Some(Token::Minus) => {
                let negate = self.next() == Some(Token::Minus);
                self.descend()?;
                let value = self.factor()?;
                self.depth -= 1;
                Ok(if negate { -value } else { value })
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> std::result::Result<f64, ExprError> {
        let pos = self.tokens.get(self.pos).map(|(_, p)| *p).unwrap_or_default();
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                self.descend()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(self.unexpected(other)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(other) => Err(ExprError::UnexpectedToken {
                token: other.to_string(),
                pos,
            }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    /// Error for the token just consumed
    fn unexpected(&self, token: Token) -> ExprError {
        let pos = self
            .tokens
            .get(self.pos.saturating_sub(1))
            .map(|(_, p)| *p)
            .unwrap_or_default();
        ExprError::UnexpectedToken {
            token: token.to_string(),
            pos,
        }
    }
}

/// Evaluate an arithmetic expression
pub fn evaluate(input: &str) -> std::result::Result<f64, ExprError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    if let Some(trailing) = parser.next() {
        return Err(parser.unexpected(trailing));
    }

    if !value.is_finite() {
        return Err(ExprError::NonFinite);
    }
    Ok(value)
}

/// Render a result: integral values without a fractional part, others in
/// shortest round-trip form
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Tool for evaluating arithmetic expressions
#[derive(Debug, Clone, Default)]
pub struct CalculatorTool;

impl CalculatorTool {
    /// Create a new calculator tool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression. Supports numbers, + - * / and parentheses."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The expression to evaluate, e.g. '123 + 456' or '10 * 5'"
                }
            },
            "required": ["expression"]
        })
    }

    async fn invoke(&self, args: &Value) -> Result<String> {
        let expression = required_str(args, "expression")?;
        let value = evaluate(expression)
            .map_err(|e| ToolpilotError::tool(format!("calculation error: {}", e)))?;

        tracing::debug!(expression, result = value, "calculated expression");
        Ok(format_number(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc(input: &str) -> String {
        format_number(evaluate(input).unwrap())
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(calc("123 + 456"), "579");
        assert_eq!(calc("10 * 5"), "50");
        assert_eq!(calc("10 / 4"), "2.5");
        assert_eq!(calc("7 - 10"), "-3");
    }

    #[test]
    fn test_precedence_and_parentheses() {
        assert_eq!(calc("2 + 3 * 4"), "14");
        assert_eq!(calc("(2 + 3) * 4"), "20");
        assert_eq!(calc("(10 + 5) * 2 / (1 + 2)"), "10");
        assert_eq!(calc("8 / 4 / 2"), "1");
        assert_eq!(calc("10 - 4 - 3"), "3");
    }

    #[test]
    fn test_unary_signs() {
        assert_eq!(calc("-3 + 5"), "2");
        assert_eq!(calc("2 * -3"), "-6");
        assert_eq!(calc("--4"), "4");
        assert_eq!(calc("+(1 + 1)"), "2");
        assert_eq!(calc("-0"), "0");
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(calc("1e3 + .5"), "1000.5");
        assert_eq!(calc("2.50 * 2"), "5");
        assert_eq!(calc("0.1 + 0.2"), "0.30000000000000004");
    }

    #[test]
    fn test_rejects_non_arithmetic_input() {
        assert_eq!(
            evaluate("__import__('os')"),
            Err(ExprError::UnexpectedChar { ch: '_', pos: 0 })
        );
        assert!(matches!(evaluate("2 ** 3"), Err(ExprError::UnexpectedToken { .. })));
        assert!(matches!(evaluate("abs(1)"), Err(ExprError::UnexpectedChar { .. })));
        assert!(matches!(evaluate("1.2.3"), Err(ExprError::InvalidNumber(_))));
    }

    #[test]
    fn test_malformed_expressions() {
        assert_eq!(evaluate(""), Err(ExprError::Empty));
        assert_eq!(evaluate("   "), Err(ExprError::Empty));
        assert_eq!(evaluate("2 +"), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("(1 + 2"), Err(ExprError::UnexpectedEnd));
        assert_eq!(
            evaluate("1 2"),
            Err(ExprError::UnexpectedToken {
                token: "2".to_string(),
                pos: 2
            })
        );
        assert!(matches!(evaluate("1 + 2)"), Err(ExprError::UnexpectedToken { .. })));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(evaluate("1 / 0"), Err(ExprError::DivisionByZero));
        assert_eq!(evaluate("1 / (2 - 2)"), Err(ExprError::DivisionByZero));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(evaluate(&deep), Err(ExprError::TooDeep));

        let ok = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(evaluate(&ok), Ok(1.0));

        assert_eq!(evaluate(&"-".repeat(MAX_DEPTH + 1)), Err(ExprError::TooDeep));
    }

    #[test]
    fn test_overflow_is_rejected() {
        assert_eq!(evaluate("1e308 * 10"), Err(ExprError::NonFinite));
    }

    #[tokio::test]
    async fn test_calculator_tool() {
        let tool = CalculatorTool::new();
        assert_eq!(tool.name(), "calculator");

        let result = tool.invoke(&json!({"expression": "123 + 456"})).await.unwrap();
        assert_eq!(result, "579");

        let err = tool.invoke(&json!({"expression": "1 / 0"})).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Tool execution error: calculation error: division by zero"
        );
    }
}
