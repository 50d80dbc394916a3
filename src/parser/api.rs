use std::collections::HashSet;
use std::time::Instant;

use log::debug;
use pest::error::{Error, ErrorVariant};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::ast::*;

#[derive(Parser)]
#[grammar = "parser/module_grammar.pest"] // relative to src
pub struct ModuleParser;

const TAB_WIDTH: usize = 2;

impl ModuleParser {
    pub fn parse_to_ast_from_str(source: &str) -> Result<ModuleData, Error<Rule>> {
        parse_to_ast(source)
    }
}

pub fn parse_to_token_tree(source: &str) -> Result<String, String> {
    let mut tree = vec![];
    let start = Instant::now();
    let result = ModuleParser::parse(Rule::module, source);
    let total_time = Instant::now().saturating_duration_since(start);
    debug!("Actual parse time is {}ms", total_time.as_millis());

    match result {
        Ok(pairs) => {
            for pair in pairs {
                tree.push(pair_to_string(pair, 0).join("\n"));
            }
        }
        Err(rule) => {
            return Err(format!("Parse error due to {:?}", rule));
        }
    }
    Ok(tree.join("\n"))
}

fn pair_to_string(pair: Pair<Rule>, level: usize) -> Vec<String> {
    let mut tree = vec![];
    let span = pair.as_span();
    let rule_name = format!(
        "{:?} => ({},{}) #{:?}",
        pair.as_rule(),
        span.start(),
        span.end(),
        span.as_str()
    );
    let string_pads = " ".repeat(level * TAB_WIDTH);
    tree.push(format!("{}{}", string_pads, rule_name));
    for child_pair in pair.into_inner() {
        tree.append(pair_to_string(child_pair, level + 1).as_mut());
    }
    tree
}

pub fn parse_to_ast(source: &str) -> Result<ModuleData, Error<Rule>> {
    let mut pairs = ModuleParser::parse(Rule::module, source)?;
    let module_pair = pairs.next().unwrap();
    for pair in module_pair.into_inner() {
        match pair.as_rule() {
            Rule::register_call => return build_ast_from_register_call(pair),
            Rule::EOI => { /* Do nothing */ }
            _ => return Err(get_unexpected_error(1, &pair)),
        }
    }
    unreachable!("the grammar requires a register call")
}

fn get_meta(pair: &Pair<Rule>) -> Meta {
    let span = pair.as_span();
    Meta {
        start_index: span.start(),
        end_index: span.end(),
    }
}

fn get_unexpected_error(id: i32, pair: &Pair<Rule>) -> Error<Rule> {
    let message = format!("Unexpected state reached [{:?}] - {}", pair.as_rule(), id);
    Error::new_from_span(ErrorVariant::CustomError { message }, pair.as_span())
}

fn get_custom_error(pair: &Pair<Rule>, message: String) -> Error<Rule> {
    Error::new_from_span(ErrorVariant::CustomError { message }, pair.as_span())
}

fn build_ast_from_register_call(pair: Pair<Rule>) -> Result<ModuleData, Error<Rule>> {
    let meta = get_meta(&pair);
    let mut inner = pair.into_inner();
    let dependency_list = inner.next().unwrap();
    let body = inner.next().unwrap();

    let mut dependencies = vec![];
    for dep in dependency_list.into_inner() {
        dependencies.push(build_string_from_literal(dep)?);
    }

    let mut items = vec![];
    let mut bindings: HashSet<String> = HashSet::new();
    for item_pair in body.into_inner() {
        let item = match item_pair.as_rule() {
            Rule::import_declaration => {
                let err_pair = item_pair.clone();
                let mut inner = item_pair.into_inner();
                let specifier = build_string_from_literal(inner.next().unwrap())?;
                let binding = inner.next().unwrap().as_str().to_string();
                if !dependencies.contains(&specifier) {
                    return Err(get_custom_error(
                        &err_pair,
                        format!("\"{}\" is not in the dependency list", specifier),
                    ));
                }
                if !bindings.insert(binding.clone()) {
                    return Err(get_custom_error(
                        &err_pair,
                        format!("duplicate import binding {}", binding),
                    ));
                }
                ModuleItemType::Import { specifier, binding }
            }
            Rule::reexport_declaration => {
                let err_pair = item_pair.clone();
                let binding = item_pair.into_inner().next().unwrap().as_str().to_string();
                if !bindings.contains(&binding) {
                    return Err(get_custom_error(
                        &err_pair,
                        format!("{} is not an import binding", binding),
                    ));
                }
                ModuleItemType::ReExport { binding }
            }
            Rule::export_declaration => {
                let (name, value) = build_export_declaration(item_pair)?;
                ModuleItemType::Export { name, value }
            }
            Rule::execute_block => {
                let mut statements = vec![];
                for statement in item_pair.into_inner() {
                    statements.push(build_ast_from_statement(statement)?);
                }
                ModuleItemType::Execute(statements)
            }
            _ => return Err(get_unexpected_error(2, &item_pair)),
        };
        items.push(item);
    }

    Ok(ModuleData {
        dependencies,
        items,
        meta,
    })
}

fn build_ast_from_statement(pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
    Ok(match pair.as_rule() {
        Rule::export_declaration => {
            let (name, value) = build_export_declaration(pair)?;
            StatementType::Export { name, value }
        }
        Rule::log_statement => {
            StatementType::Log(build_ast_from_expression(pair.into_inner().next().unwrap())?)
        }
        Rule::throw_statement => {
            StatementType::Throw(build_ast_from_expression(pair.into_inner().next().unwrap())?)
        }
        Rule::dynamic_import_statement => {
            let mut inner = pair.into_inner();
            let specifier = build_string_from_literal(inner.next().unwrap())?;
            let binding = inner.next().map(|p| p.as_str().to_string());
            StatementType::DynamicImport { specifier, binding }
        }
        _ => return Err(get_unexpected_error(3, &pair)),
    })
}

fn build_export_declaration(pair: Pair<Rule>) -> Result<(String, ExpressionType), Error<Rule>> {
    let mut inner = pair.into_inner();
    let name = inner.next().unwrap().as_str().to_string();
    let value = build_ast_from_expression(inner.next().unwrap())?;
    Ok((name, value))
}

fn build_ast_from_expression(pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
    let inner_pair = pair.into_inner().next().unwrap();
    Ok(match inner_pair.as_rule() {
        Rule::identifier => ExpressionType::Identifier(inner_pair.as_str().to_string()),
        Rule::member_expression => {
            let mut inner = inner_pair.into_inner();
            let object = inner.next().unwrap().as_str().to_string();
            let property = inner.next().unwrap().as_str().to_string();
            ExpressionType::MemberExpression { object, property }
        }
        Rule::string_literal => {
            ExpressionType::Literal(LiteralType::String(build_string_from_literal(inner_pair)?))
        }
        Rule::number_literal => {
            let n = inner_pair
                .as_str()
                .parse::<f64>()
                .map_err(|e| get_custom_error(&inner_pair, e.to_string()))?;
            ExpressionType::Literal(LiteralType::Number(n))
        }
        Rule::boolean_literal => {
            ExpressionType::Literal(LiteralType::Boolean(inner_pair.as_str() == "true"))
        }
        Rule::null_literal => ExpressionType::Literal(LiteralType::Null),
        Rule::undefined_literal => ExpressionType::Literal(LiteralType::Undefined),
        _ => return Err(get_unexpected_error(4, &inner_pair)),
    })
}

fn build_string_from_literal(pair: Pair<Rule>) -> Result<String, Error<Rule>> {
    let content = pair.clone().into_inner().next().unwrap();
    let mut value = String::with_capacity(content.as_str().len());
    let mut chars = content.as_str().chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some(c @ '"') | Some(c @ '\\') | Some(c @ '/') => value.push(c),
            Some(other) => {
                return Err(get_custom_error(
                    &pair,
                    format!("unknown escape sequence \\{}", other),
                ))
            }
            None => return Err(get_custom_error(&pair, "dangling escape".to_string())),
        }
    }
    Ok(value)
}
