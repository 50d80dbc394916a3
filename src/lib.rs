//! # modlink - Register-format module loader in Rust
//!
//! A runtime module linker for bundles whose modules register themselves
//! with a dependency list and a factory, featuring:
//! - Path resolution with optional bare-specifier mapping
//! - Single-instance module registry
//! - Live bindings through setter callbacks, including circular imports
//! - Deferred execution in dependency order
//! - Pluggable fetchers and evaluators, with a PEG-parsed script format
//!
//! ## Quick Start
//!
//! ### Parsing a Script Module
//!
//! ```
//! use modlink::parser::ModuleParser;
//!
//! let code = r#"register ["./dep.js"] { import "./dep.js" as dep; export * from dep; }"#;
//! let module = ModuleParser::parse_to_ast_from_str(code).unwrap();
//! println!("Module has {} dependencies", module.dependencies.len());
//! ```
//!
//! ### Importing Script Modules
//!
//! ```
//! use modlink::runner::ds::value::Value;
//! use modlink::runner::eval::ScriptEvaluator;
//! use modlink::runner::loader::{MemoryFetcher, System};
//!
//! let fetcher = MemoryFetcher::new()
//!     .with_source("/lib/name.js", r#"register [] { export name = "world"; }"#)
//!     .with_source(
//!         "/main.js",
//!         r#"register ["./lib/name.js"] {
//!             import "./lib/name.js" as lib;
//!             execute { export greeting = lib.name; }
//!         }"#,
//!     );
//!
//! let system = System::builder(fetcher, ScriptEvaluator::new()).build();
//! let main = system.import("/main.js").unwrap();
//! assert_eq!(main.borrow().get("greeting"), Some(&Value::from("world")));
//! ```
//!
//! ### Loading from Disk with a Config File
//!
//! ```no_run
//! use std::path::Path;
//! use modlink::runner::eval::ScriptEvaluator;
//! use modlink::runner::loader::{DirectoryFetcher, LoaderConfig, System};
//!
//! let config = LoaderConfig::load(Path::new("modlink.toml")).unwrap();
//! let root = config.asset_root.clone().unwrap_or_else(|| ".".to_string());
//! let system = System::builder(DirectoryFetcher::new(root), ScriptEvaluator::new())
//!     .config(&config)
//!     .build();
//! let exports = system.import("/dist/contentScripts/index.module.js").unwrap();
//! ```
//!
//! ## Live Bindings
//!
//! A dependent never copies a dependency's exports once. Each declared
//! dependency gets a setter, and the loader:
//!
//! 1. **Calls it at link time** with whatever the dependency has exported
//!    so far (possibly nothing, when the two modules import each other).
//!
//! 2. **Keeps it** on the dependency's record.
//!
//! 3. **Calls it again** every time the dependency exports, so later values
//!    reach every importer before its own body runs.
//!
//! ## Architecture
//!
//! - **[`parser`]** - PEG parser and AST for the script module format
//! - **[`runner`]** - The loader and its evaluators
//!   - **[`runner::loader`]** - Resolver, registry, registration, scheduler
//!   - **[`runner::ds`]** - Data structures (values, module records, errors)
//!   - **[`runner::eval`]** - Script module evaluator

pub mod parser;
pub mod runner;
