//! Evaluation of register-format script modules.
//!
//! [`ScriptEvaluator`] parses module text with [`ModuleParser`] and turns
//! it into a single [`System::register`] call:
//!
//! - every `import "spec" as name;` becomes the setter for that dependency,
//!   binding the dependency's snapshot to `name` each time it changes
//! - `export * from name;` makes that setter re-export the dependency's
//!   named exports (never `default`)
//! - top-level `export x = ...;` runs during registration
//! - `execute { ... }` blocks become the deferred execute callback
//!
//! Values exported at the top level are evaluated before any dependency is
//! linked, so they can only use literals and `env`.

pub mod expression;
pub mod statement;
pub mod types;

use std::rc::Rc;

use log::trace;

use crate::parser::ast::ModuleData;
use crate::parser::ModuleParser;
use crate::runner::ds::error::LoaderError;
use crate::runner::ds::record::Setter;
use crate::runner::ds::value::Value;
use crate::runner::loader::evaluator::Evaluator;
use crate::runner::loader::interop::DEFAULT_EXPORT;
use crate::runner::loader::register::{noop_setter, Declaration, ExportFn};
use crate::runner::loader::system::System;

pub use expression::evaluate_expression;
pub use statement::{execute_statement, execute_statements};
pub use types::{EvalContext, Scope, ValueResult, ENV_BINDING};

#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptEvaluator;

impl ScriptEvaluator {
    pub fn new() -> Self {
        ScriptEvaluator
    }
}

impl Evaluator for ScriptEvaluator {
    fn evaluate(&self, path: &str, source: &str, system: &System) -> Result<(), LoaderError> {
        let module = ModuleParser::parse_to_ast_from_str(source)
            .map_err(|e| LoaderError::thrown(format!("SyntaxError: {}", e)))?;
        trace!(
            "{} parsed: {} dependencies, {} items",
            path,
            module.dependencies.len(),
            module.items.len()
        );

        let dependencies: Vec<&str> = module.dependencies.iter().map(String::as_str).collect();
        system.register(&dependencies, |export, info| {
            let ctx = EvalContext::new(export, info);

            for (name, value) in module.hoisted_exports() {
                let value = evaluate_expression(value, &ctx)?;
                ctx.bind(name, value.clone());
                ctx.export.export(name, value);
            }

            let setters = (0..module.dependencies.len())
                .map(|index| build_setter(&module, index, &ctx))
                .collect();
            let mut declaration = Declaration::new(setters);

            if module.has_execute() {
                let statements = module.execute_statements();
                declaration =
                    declaration.with_execute(move || execute_statements(&statements, &ctx));
            }
            Ok(declaration)
        })
    }

    fn name(&self) -> &str {
        "ScriptEvaluator"
    }
}

fn build_setter(module: &ModuleData, index: usize, ctx: &EvalContext) -> Setter {
    let bindings = module.bindings_for(index);
    if bindings.is_empty() {
        return noop_setter();
    }
    let reexport = bindings.iter().any(|b| module.is_reexported(b));
    let ctx = ctx.clone();
    Rc::new(move |snapshot: &Value| {
        for binding in &bindings {
            ctx.bind(binding, snapshot.clone());
        }
        if reexport {
            reexport_changed(&ctx.export, snapshot);
        }
    })
}

/// Re-export the named entries of `snapshot` that differ from what this
/// module currently exports. Skipping unchanged entries is what stops two
/// modules re-exporting each other from notifying forever.
fn reexport_changed(export: &ExportFn, snapshot: &Value) {
    let changed: Vec<(String, Value)> = match snapshot.as_object() {
        Some(obj) => obj
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != DEFAULT_EXPORT)
            .filter(|(k, v)| export.current(k).as_ref() != Some(*v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        None => return,
    };
    if !changed.is_empty() {
        export.export_entries(changed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::loader::fetch::MemoryFetcher;

    fn system_with(sources: &[(&str, &str)]) -> System {
        let mut fetcher = MemoryFetcher::new();
        for (path, source) in sources {
            fetcher.insert(*path, *source);
        }
        System::builder(fetcher, ScriptEvaluator::new())
            .global("NODE_ENV", Value::from("test"))
            .build()
    }

    #[test]
    fn test_hoisted_exports_are_visible_before_execute() {
        let system = system_with(&[(
            "/a.js",
            r#"register [] { export version = "1.0"; export mode = env.NODE_ENV; }"#,
        )]);
        let exports = system.import("/a.js").unwrap();
        assert_eq!(exports.borrow().get("version"), Some(&Value::from("1.0")));
        assert_eq!(exports.borrow().get("mode"), Some(&Value::from("test")));
    }

    #[test]
    fn test_import_binding_reads_dependency() {
        let system = system_with(&[
            ("/b.js", r#"register [] { export name = "bee"; }"#),
            (
                "/a.js",
                r#"register ["./b.js"] {
                    import "./b.js" as b;
                    execute { export copy = b.name; }
                }"#,
            ),
        ]);
        let exports = system.import("/a.js").unwrap();
        assert_eq!(exports.borrow().get("copy"), Some(&Value::from("bee")));
    }

    #[test]
    fn test_unknown_identifier_is_a_reference_error() {
        let system = system_with(&[(
            "/a.js",
            r#"register [] { execute { export x = missing; } }"#,
        )]);
        match system.import("/a.js") {
            Err(LoaderError::Execute { path, message }) => {
                assert_eq!(path, "/a.js");
                assert_eq!(message, "ReferenceError: missing is not defined");
            }
            other => panic!("Expected execute error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_reading_property_of_null_is_a_type_error() {
        let system = system_with(&[(
            "/a.js",
            r#"register [] { export x = null; execute { export y = x.z; } }"#,
        )]);
        let err = system.import("/a.js").err().unwrap();
        assert_eq!(
            err.to_string(),
            "error executing module /a.js: TypeError: cannot read property 'z' of null"
        );
    }

    #[test]
    fn test_env_object() {
        let system = system_with(&[(
            "/a.js",
            r#"register [] { execute { export all = env; } }"#,
        )]);
        let exports = system.import("/a.js").unwrap();
        let all = exports.borrow().get("all").cloned().unwrap();
        assert_eq!(all.get("NODE_ENV"), Value::from("test"));
    }

    #[test]
    fn test_syntax_error_is_an_evaluation_error() {
        let system = system_with(&[("/a.js", "register [ {")]);
        match system.import("/a.js") {
            Err(LoaderError::Evaluation { path, message }) => {
                assert_eq!(path, "/a.js");
                assert!(message.starts_with("SyntaxError"));
            }
            other => panic!("Expected evaluation error, got {:?}", other.map(|_| ())),
        }
        assert!(!system.has("/a.js"));
    }
}
