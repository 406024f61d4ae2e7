//! Sandboxed evaluation of binding expressions against an [`Args`] context.
//!
//! Only the context is reachable: there are no function calls, assignments or
//! host access. Missing paths resolve to `null`.

use crate::args::Args;
use crate::ast::{BinaryOp, Expression, UnaryOp};
use crate::error::{ExpressionError, ExpressionResult};
use crate::parser::parse;
use crate::value::{loose_eq, number, ValueExt};
use serde_json::Value;
use tracing::warn;

/// Evaluate `source` and return `null` on any failure.
pub fn evaluate(source: &str, args: &Args) -> Value {
    match try_evaluate(source, args) {
        Ok(value) => value,
        Err(err) => {
            warn!(expression = source, error = %err, "Binding expression failed; using empty value");
            Value::Null
        }
    }
}

/// Evaluate `source`, reporting parse and operator errors.
///
/// A single surrounding `{{ }}` is accepted and stripped.
pub fn try_evaluate(source: &str, args: &Args) -> ExpressionResult<Value> {
    let expr = parse(binding_expression(source))?;
    expr.evaluate(args)
}

/// Strip one surrounding `{{ ... }}` pair if the whole string is a single binding
pub fn binding_expression(source: &str) -> &str {
    let trimmed = source.trim();
    if let Some(inner) = trimmed
        .strip_prefix("{{")
        .and_then(|rest| rest.strip_suffix("}}"))
    {
        if !inner.contains("{{") && !inner.contains("}}") {
            return inner.trim();
        }
    }
    trimmed
}

/// Replace every `{{ expr }}` in `template` with the display string of its value.
///
/// Failed or missing bindings render as empty text. An unclosed `{{` is kept verbatim.
pub fn interpolate(template: &str, args: &Args) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        match after_open.find("}}") {
            Some(end) => {
                let value = evaluate(&after_open[..end], args);
                output.push_str(&value.to_display_string());
                rest = &after_open[end + 2..];
            }
            None => {
                output.push_str(&rest[start..]);
                return output;
            }
        }
    }

    output.push_str(rest);
    output
}

/// Whether `template` contains at least one `{{ }}` binding
pub fn has_bindings(template: &str) -> bool {
    template
        .find("{{")
        .map(|start| template[start..].contains("}}"))
        .unwrap_or(false)
}

impl Expression {
    pub fn evaluate(&self, args: &Args) -> ExpressionResult<Value> {
        match self {
            Expression::Literal(value) => Ok(value.clone()),

            Expression::Variable(name) => Ok(args.get(name).cloned().unwrap_or(Value::Null)),

            Expression::Member { object, property } => {
                let object = object.evaluate(args)?;
                Ok(member(&object, property))
            }

            Expression::Index { object, index } => {
                let object = object.evaluate(args)?;
                let index = index.evaluate(args)?;
                Ok(match &index {
                    Value::String(key) => member(&object, key),
                    Value::Number(n) => match (n.as_u64(), &object) {
                        (Some(i), Value::Array(items)) => {
                            items.get(i as usize).cloned().unwrap_or(Value::Null)
                        }
                        _ => Value::Null,
                    },
                    _ => Value::Null,
                })
            }

            Expression::Unary { operator, operand } => {
                let value = operand.evaluate(args)?;
                match operator {
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnaryOp::Negate => match value.as_f64() {
                        Some(n) => Ok(number(-n)),
                        None => Err(ExpressionError::InvalidOperands {
                            operator: "-".to_string(),
                            details: format!("Expected number, got {}", value),
                        }),
                    },
                }
            }

            Expression::Binary {
                left,
                operator,
                right,
            } => {
                let left_val = left.evaluate(args)?;

                // Short-circuit with JavaScript-style operand results so `name || 'Guest'` works
                match operator {
                    BinaryOp::And if !left_val.is_truthy() => return Ok(left_val),
                    BinaryOp::Or if left_val.is_truthy() => return Ok(left_val),
                    BinaryOp::And | BinaryOp::Or => return right.evaluate(args),
                    _ => {}
                }

                let right_val = right.evaluate(args)?;
                binary(*operator, &left_val, &right_val)
            }
        }
    }
}

fn member(object: &Value, property: &str) -> Value {
    match object {
        Value::Object(map) => map.get(property).cloned().unwrap_or(Value::Null),
        Value::Array(items) if property == "length" => Value::from(items.len()),
        Value::String(s) if property == "length" => Value::from(s.chars().count()),
        _ => Value::Null,
    }
}

fn binary(operator: BinaryOp, left: &Value, right: &Value) -> ExpressionResult<Value> {
    let invalid = |expected: &str| ExpressionError::InvalidOperands {
        operator: operator.symbol().to_string(),
        details: format!(
            "Expected {}, got {} {} {}",
            expected,
            left,
            operator.symbol(),
            right
        ),
    };

    match operator {
        BinaryOp::Equals => Ok(Value::Bool(loose_eq(left, right))),
        BinaryOp::NotEquals => Ok(Value::Bool(!loose_eq(left, right))),

        BinaryOp::Add => match (left, right) {
            (Value::Number(_), Value::Number(_)) => {
                let (a, b) = numbers(left, right).ok_or_else(|| invalid("numbers"))?;
                Ok(number(a + b))
            }
            (Value::String(_), _) | (_, Value::String(_)) => Ok(Value::String(format!(
                "{}{}",
                left.to_display_string(),
                right.to_display_string()
            ))),
            _ => Err(invalid("number + number or string + value")),
        },

        BinaryOp::Subtract => {
            let (a, b) = numbers(left, right).ok_or_else(|| invalid("number - number"))?;
            Ok(number(a - b))
        }
        BinaryOp::Multiply => {
            let (a, b) = numbers(left, right).ok_or_else(|| invalid("number * number"))?;
            Ok(number(a * b))
        }
        BinaryOp::Divide => {
            let (a, b) = numbers(left, right).ok_or_else(|| invalid("number / number"))?;
            if b == 0.0 {
                return Err(ExpressionError::DivisionByZero);
            }
            Ok(number(a / b))
        }
        BinaryOp::Modulo => {
            let (a, b) = numbers(left, right).ok_or_else(|| invalid("number % number"))?;
            if b == 0.0 {
                return Err(ExpressionError::DivisionByZero);
            }
            Ok(number(a % b))
        }

        BinaryOp::LessThan
        | BinaryOp::LessThanOrEqual
        | BinaryOp::GreaterThan
        | BinaryOp::GreaterThanOrEqual => {
            let ordering = match (left, right) {
                (Value::String(a), Value::String(b)) => a.partial_cmp(b),
                _ => {
                    let (a, b) = numbers(left, right)
                        .ok_or_else(|| invalid("two numbers or two strings"))?;
                    a.partial_cmp(&b)
                }
            };
            let Some(ordering) = ordering else {
                return Ok(Value::Bool(false));
            };
            Ok(Value::Bool(match operator {
                BinaryOp::LessThan => ordering.is_lt(),
                BinaryOp::LessThanOrEqual => ordering.is_le(),
                BinaryOp::GreaterThan => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }

        BinaryOp::And => Ok(if left.is_truthy() { right.clone() } else { left.clone() }),
        BinaryOp::Or => Ok(if left.is_truthy() { left.clone() } else { right.clone() }),
    }
}

fn numbers(left: &Value, right: &Value) -> Option<(f64, f64)> {
    Some((left.as_f64()?, right.as_f64()?))
}
