//! Expression evaluation.

use crate::parser::ast::{ExpressionType, LiteralType};
use crate::runner::ds::error::LoaderError;
use crate::runner::ds::value::Value;

use super::types::{EvalContext, ValueResult, ENV_BINDING};

/// Evaluate an expression and return its value.
pub fn evaluate_expression(expr: &ExpressionType, ctx: &EvalContext) -> ValueResult {
    match expr {
        ExpressionType::Literal(lit) => Ok(evaluate_literal(lit)),
        ExpressionType::Identifier(name) => resolve_identifier(name, ctx),
        ExpressionType::MemberExpression { object, property } => {
            if object == ENV_BINDING && ctx.lookup(ENV_BINDING).is_none() {
                return Ok(ctx.info.global(property));
            }
            let base = resolve_identifier(object, ctx)?;
            if base.is_nullish() {
                return Err(LoaderError::thrown(format!(
                    "TypeError: cannot read property '{}' of {}",
                    property, base
                )));
            }
            Ok(base.get(property))
        }
    }
}

fn evaluate_literal(lit: &LiteralType) -> Value {
    match lit {
        LiteralType::String(s) => Value::String(s.clone()),
        LiteralType::Number(n) => Value::Number(*n),
        LiteralType::Boolean(b) => Value::Boolean(*b),
        LiteralType::Null => Value::Null,
        LiteralType::Undefined => Value::Undefined,
    }
}

/// Scope first, then the loader globals object.
fn resolve_identifier(name: &str, ctx: &EvalContext) -> ValueResult {
    if let Some(value) = ctx.lookup(name) {
        return Ok(value);
    }
    if name == ENV_BINDING {
        return Ok(Value::object_from(ctx.info.globals()));
    }
    Err(LoaderError::thrown(format!(
        "ReferenceError: {} is not defined",
        name
    )))
}
