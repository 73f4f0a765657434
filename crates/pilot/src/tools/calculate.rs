use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use thiserror::Error;

use super::Tool;

lazy_static! {
    static ref ALLOWED: Regex = Regex::new(r"^[0-9+\-*/%.()]+$").unwrap();
    static ref NUMBER: Regex = Regex::new(r"[0-9.]+").unwrap();
}

#[derive(Error, Debug, PartialEq)]
enum CalculationError {
    #[error("Invalid expression. Only numbers and basic operators (+, -, *, /, %, **, (, )) are allowed.")]
    InvalidExpression,

    #[error("Error calculating expression: invalid number '{0}'")]
    InvalidNumber(String),

    #[error("Error calculating expression: Division by zero")]
    DivisionByZero,

    #[error("Error calculating expression: {0}")]
    Evaluation(String),
}

pub struct CalculateTool;

impl CalculateTool {
    pub fn new() -> Self {
        Self
    }

    fn evaluate(&self, expression: &str) -> Result<f64, CalculationError> {
        let cleaned: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
        if !ALLOWED.is_match(&cleaned) || !balanced_parentheses(&cleaned) {
            return Err(CalculationError::InvalidExpression);
        }

        let prepared = prepare(&cleaned)?;
        let value = evalexpr::eval(&prepared)
            .and_then(|value| value.as_number())
            .map_err(|e| CalculationError::Evaluation(e.to_string()))?;

        if value.is_finite() {
            Ok(value)
        } else if prepared.contains('/') || prepared.contains('%') {
            Err(CalculationError::DivisionByZero)
        } else {
            Err(CalculationError::Evaluation(
                "result is not a finite number".to_string(),
            ))
        }
    }
}

impl Default for CalculateTool {
    fn default() -> Self {
        Self::new()
    }
}

fn balanced_parentheses(expression: &str) -> bool {
    let mut depth: i32 = 0;
    for c in expression.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Rewrite into evalexpr syntax: `**` becomes `^` and every literal is a float,
/// so `7/2` is 3.5 rather than integer division.
fn prepare(expression: &str) -> Result<String, CalculationError> {
    let mut invalid = None;
    let floats = NUMBER.replace_all(expression, |caps: &Captures| {
        let literal = &caps[0];
        match literal.matches('.').count() {
            0 => format!("{}.0", literal),
            1 if literal == "." => {
                invalid.get_or_insert_with(|| literal.to_string());
                literal.to_string()
            }
            1 => {
                let leading = if literal.starts_with('.') { "0" } else { "" };
                let trailing = if literal.ends_with('.') { "0" } else { "" };
                format!("{}{}{}", leading, literal, trailing)
            }
            _ => {
                invalid.get_or_insert_with(|| literal.to_string());
                literal.to_string()
            }
        }
    });

    if let Some(literal) = invalid {
        return Err(CalculationError::InvalidNumber(literal));
    }
    Ok(floats.replace("**", "^"))
}

#[async_trait]
impl Tool for CalculateTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Evaluates mathematical expressions with support for basic operators (+, -, *, /, %, **) and parentheses."
    }

    async fn call(&self, input: &str) -> String {
        match self.evaluate(input) {
            Ok(value) => value.to_string(),
            Err(e) => e.to_string(),
        }
    }
}
