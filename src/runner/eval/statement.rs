//! Statement execution for execute blocks.

use log::info;

use crate::parser::ast::StatementType;
use crate::runner::ds::error::LoaderError;
use crate::runner::ds::value::Value;

use super::expression::evaluate_expression;
use super::types::EvalContext;

/// Execute statements in order, stopping at the first error.
pub fn execute_statements(statements: &[StatementType], ctx: &EvalContext) -> Result<(), LoaderError> {
    for stmt in statements {
        execute_statement(stmt, ctx)?;
    }
    Ok(())
}

pub fn execute_statement(stmt: &StatementType, ctx: &EvalContext) -> Result<(), LoaderError> {
    match stmt {
        StatementType::Export { name, value } => {
            let value = evaluate_expression(value, ctx)?;
            ctx.bind(name, value.clone());
            ctx.export.export(name, value);
        }

        StatementType::Log(expr) => {
            let value = evaluate_expression(expr, ctx)?;
            info!("[{}] {}", ctx.info.url(), value);
        }

        StatementType::DynamicImport { specifier, binding } => {
            let exports = ctx.info.import(specifier)?;
            if let Some(binding) = binding {
                ctx.bind(binding, Value::Object(exports));
            }
        }

        StatementType::Throw(expr) => {
            let value = evaluate_expression(expr, ctx)?;
            return Err(LoaderError::thrown(value.to_string()));
        }
    }
    Ok(())
}
