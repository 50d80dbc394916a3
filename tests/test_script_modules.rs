//! Integration tests for script modules.
//!
//! These tests feed register-format module text through the loader with
//! the script evaluator, from memory and from disk.

extern crate modlink;

use std::fs;
use std::path::Path;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use modlink::runner::ds::error::LoaderError;
use modlink::runner::ds::record::ModuleState;
use modlink::runner::ds::value::{ObjectRef, Value};
use modlink::runner::eval::ScriptEvaluator;
use modlink::runner::loader::{DirectoryFetcher, LoaderConfig, MemoryFetcher, System};

/// Helper to build a loader over in-memory sources.
fn system_with(sources: &[(&str, &str)]) -> (System, Rc<MemoryFetcher>) {
    let mut fetcher = MemoryFetcher::new();
    for (path, source) in sources {
        fetcher.insert(*path, *source);
    }
    let fetcher = Rc::new(fetcher);
    let system = System::builder(fetcher.clone(), ScriptEvaluator::new()).build();
    (system, fetcher)
}

fn get(exports: &ObjectRef, name: &str) -> Value {
    exports.borrow().get(name).cloned().unwrap_or(Value::Undefined)
}

fn write_file(root: &Path, path: &str, content: &str) {
    let location = root.join(path.trim_start_matches('/'));
    fs::create_dir_all(location.parent().unwrap()).unwrap();
    fs::write(location, content).unwrap();
}

// ============================================================================
// Linking
// ============================================================================

#[test]
fn test_chain_of_script_modules() {
    let (system, fetcher) = system_with(&[
        (
            "/app/main.js",
            r#"register ["./greeting.js", "../lib/name.js"] {
                import "./greeting.js" as greeting;
                import "../lib/name.js" as lib;
                execute {
                    export message = greeting.text;
                    export who = lib.name;
                    log message;
                }
            }"#,
        ),
        (
            "/app/greeting.js",
            r#"register ["../lib/name.js"] {
                import "../lib/name.js" as lib;
                execute { export text = lib.name; }
            }"#,
        ),
        ("/lib/name.js", r#"register [] { export name = "world"; }"#),
    ]);

    let main = system.import("/app/main.js").unwrap();

    assert_eq!(get(&main, "message"), Value::from("world"));
    assert_eq!(get(&main, "who"), Value::from("world"));
    assert_eq!(fetcher.fetch_count("/lib/name.js"), 1);
    assert_eq!(
        system.paths(),
        vec![
            "/app/main.js".to_string(),
            "/app/greeting.js".to_string(),
            "/lib/name.js".to_string(),
        ]
    );
}

#[test]
fn test_reexport_forwards_later_exports() {
    let (system, _) = system_with(&[
        (
            "/index.js",
            r#"register ["./impl.js"] {
                import "./impl.js" as impl;
                export * from impl;
            }"#,
        ),
        (
            "/impl.js",
            r#"register [] {
                export default = "ignored";
                export early = 1;
                execute { export late = 2; }
            }"#,
        ),
    ]);

    let index = system.import("/index.js").unwrap();

    assert_eq!(get(&index, "early"), Value::Number(1.0));
    assert_eq!(get(&index, "late"), Value::Number(2.0));
    assert_eq!(get(&index, "default"), Value::Undefined);
}

#[test]
fn test_circular_script_modules() {
    let (system, _) = system_with(&[
        (
            "/a.js",
            r#"register ["./b.js"] {
                import "./b.js" as b;
                export name = "a";
                execute { export peer = b.name; }
            }"#,
        ),
        (
            "/b.js",
            r#"register ["./a.js"] {
                import "./a.js" as a;
                export name = "b";
                execute { export peer = a.name; }
            }"#,
        ),
    ]);

    let a = system.import("/a.js").unwrap();
    let b = system.exports("/b.js").unwrap();

    assert_eq!(get(&a, "peer"), Value::from("b"));
    assert_eq!(get(&b, "peer"), Value::from("a"));
}

#[test]
fn test_circular_script_modules_entered_from_b() {
    let (system, _) = system_with(&[
        (
            "/a.js",
            r#"register ["./b.js"] {
                import "./b.js" as b;
                export name = "a";
                execute { export peer = b.name; }
            }"#,
        ),
        (
            "/b.js",
            r#"register ["./a.js"] {
                import "./a.js" as a;
                export name = "b";
                execute { export peer = a.name; }
            }"#,
        ),
    ]);

    let b = system.import("/b.js").unwrap();
    let a = system.exports("/a.js").unwrap();

    assert_eq!(get(&b, "peer"), Value::from("a"));
    assert_eq!(get(&a, "peer"), Value::from("b"));
}

#[test]
fn test_mutual_reexport_terminates() {
    let (system, _) = system_with(&[
        (
            "/a.js",
            r#"register ["./b.js"] {
                import "./b.js" as b;
                export * from b;
                execute { export fromA = 1; }
            }"#,
        ),
        (
            "/b.js",
            r#"register ["./a.js"] {
                import "./a.js" as a;
                export * from a;
                execute { export fromB = 2; }
            }"#,
        ),
    ]);

    let a = system.import("/a.js").unwrap();
    let b = system.exports("/b.js").unwrap();

    assert_eq!(get(&a, "fromB"), Value::Number(2.0));
    assert_eq!(get(&b, "fromA"), Value::Number(1.0));
}

#[test]
fn test_side_effect_dependency_and_dynamic_import() {
    let (system, _) = system_with(&[
        (
            "/main.js",
            r#"register ["./polyfill.js"] {
                execute {
                    import("./lazy.js") as lazy;
                    export value = lazy.value;
                }
            }"#,
        ),
        ("/polyfill.js", r#"register [] { execute { log "installed"; } }"#),
        ("/lazy.js", r#"register [] { export value = "lazy"; }"#),
    ]);

    let main = system.import("/main.js").unwrap();

    assert_eq!(get(&main, "value"), Value::from("lazy"));
    assert_eq!(system.state("/polyfill.js"), Some(ModuleState::Executed));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_throw_in_execute_block() {
    let (system, _) = system_with(&[(
        "/a.js",
        r#"register [] { execute { throw "kaboom"; } }"#,
    )]);

    match system.import("/a.js") {
        Err(LoaderError::Execute { path, message }) => {
            assert_eq!(path, "/a.js");
            assert_eq!(message, "kaboom");
        }
        other => panic!("Expected execute error, got {:?}", other.map(|_| ())),
    }
    assert_eq!(system.state("/a.js"), Some(ModuleState::Registered));
}

#[test]
fn test_syntax_error_in_dependency() {
    let (system, _) = system_with(&[
        ("/a.js", r#"register ["./b.js"] { import "./b.js" as b; }"#),
        ("/b.js", r#"register ["./c.js"] { import "./d.js" as d; }"#),
    ]);

    match system.import("/a.js") {
        Err(LoaderError::Evaluation { path, message }) => {
            assert_eq!(path, "/b.js");
            assert!(message.contains("not in the dependency list"));
        }
        other => panic!("Expected evaluation error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_script_module() {
    let (system, _) = system_with(&[("/a.js", r#"register ["./nope.js"] {}"#)]);

    let err = system.import("/a.js").err().unwrap();
    assert_eq!(
        err.to_string(),
        "failed to fetch module /nope.js: no such asset"
    );
}

// ============================================================================
// Config and Disk
// ============================================================================

#[test]
fn test_loader_globals_in_scripts() {
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert(
        "/a.js",
        r#"register [] {
            export mode = env.NODE_ENV;
            export dev = env.__DEV__;
            export unset = env.MISSING;
        }"#,
    );
    let system = System::builder(fetcher, ScriptEvaluator::new())
        .global("NODE_ENV", Value::from("development"))
        .global("__DEV__", Value::Boolean(true))
        .build();

    let a = system.import("/a.js").unwrap();

    assert_eq!(get(&a, "mode"), Value::from("development"));
    assert_eq!(get(&a, "dev"), Value::Boolean(true));
    assert_eq!(get(&a, "unset"), Value::Undefined);
}

#[test]
fn test_directory_loader_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write_file(
        root,
        "/dist/index.module.js",
        r#"register ["react", "./util.js"] {
            import "react" as React;
            import "./util.js" as util;
            execute {
                export element = React.createElement;
                export selfDefault = React.default;
                export helper = util.helper;
                export mode = env.NODE_ENV;
            }
        }"#,
    );
    write_file(
        root,
        "/dist/modules/react.js",
        r#"register ["./react-impl.js"] {
            import "./react-impl.js" as impl;
            execute { export default = impl; }
        }"#,
    );
    write_file(
        root,
        "/dist/modules/react-impl.js",
        r#"register [] { export createElement = "h"; }"#,
    );
    write_file(root, "/dist/util.js", r#"register [] { export helper = "help"; }"#);

    let config = LoaderConfig::parse(
        r#"
[loader]
entry = "/dist/index.module.js"
bare_module_dir = "/dist/modules"

[interop]
flatten_default = ["/dist/modules/react.js"]

[globals]
NODE_ENV = "production"
"#,
    )
    .unwrap();

    let system = System::builder(DirectoryFetcher::new(root), ScriptEvaluator::new())
        .config(&config)
        .build();
    let entry = config.entry.clone().unwrap();
    let index = system.import(&entry).unwrap();

    assert_eq!(get(&index, "element"), Value::from("h"));
    assert_eq!(get(&index, "helper"), Value::from("help"));
    assert_eq!(get(&index, "mode"), Value::from("production"));
    match get(&index, "selfDefault") {
        Value::Object(obj) => {
            assert_eq!(obj.borrow().get("createElement"), Some(&Value::from("h")));
        }
        other => panic!("Expected flattened default object, got {}", other),
    }
}
