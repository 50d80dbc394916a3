//! Register-format module loader.
//!
//! This module implements the runtime linker: modules are fetched as text,
//! evaluated once, and announce themselves by calling
//! [`System::register`](system::System::register) with their dependency
//! list and a factory. The loader links exports between modules through
//! setter callbacks, which is what makes circular dependencies work.
//!
//! ## Key Components
//!
//! - **[`PathResolver`]**: Normalizes specifiers against the requesting module
//! - **[`ModuleRegistry`]**: Canonical path → module record
//! - **[`System`]**: Registration handler, fetch-evaluate loader, top-level import
//! - **[`ExportFn`] / [`RuntimeInfo`]**: What a module's factory receives
//! - **[`ExecutionQueue`]**: Deferred execute callbacks, drained in discovery order
//! - **[`InteropPolicy`]**: Which modules hand out a flattened default export
//! - **[`SourceFetcher`] / [`Evaluator`]**: Where text comes from and how it runs
//!
//! ## Linking Flow
//!
//! When module `/a.js` declares `["./b.js"]`:
//!
//! 1. **Resolve**: `./b.js` against `/a.js` gives `/b.js`
//! 2. **Load**: if `/b.js` is not in the registry, fetch and evaluate it now
//! 3. **Link**: call `/a.js`'s setter with `/b.js`'s current snapshot
//! 4. **Subscribe**: keep the setter; every later export from `/b.js` calls it again
//!
//! Step 2 is skipped when `/b.js` is already registering further up the
//! stack. The setter then sees an incomplete snapshot first and the rest
//! once `/b.js` exports.
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use modlink::runner::ds::record::Setter;
//! use modlink::runner::ds::value::Value;
//! use modlink::runner::loader::{Declaration, NativeBundle, System};
//!
//! let bundle = Rc::new(NativeBundle::new());
//! bundle.define("/lib/greeting.js", |system: &System| {
//!     system.register(&[], |export, _info| {
//!         export.export("text", Value::from("hello"));
//!         Ok(Declaration::new(vec![]))
//!     })
//! });
//! bundle.define("/app.js", |system: &System| {
//!     system.register(&["./lib/greeting.js"], |export, _info| {
//!         let greeting = Rc::new(RefCell::new(Value::Undefined));
//!         let slot = greeting.clone();
//!         let setter: Setter = Rc::new(move |ns: &Value| {
//!             *slot.borrow_mut() = ns.get("text");
//!         });
//!         Ok(Declaration::new(vec![setter]).with_execute(move || {
//!             export.export("shout", Value::from(format!("{}!", greeting.borrow())));
//!             Ok(())
//!         }))
//!     })
//! });
//!
//! let system = System::builder(bundle.clone(), bundle.clone()).build();
//! let app = system.import("/app.js").unwrap();
//! assert_eq!(app.borrow().get("shout"), Some(&Value::from("hello!")));
//! ```

pub mod config;
pub mod evaluator;
pub mod fetch;
pub mod interop;
pub mod native;
pub mod path;
pub mod register;
pub mod registry;
pub mod scheduler;
pub mod system;

pub use config::LoaderConfig;
pub use evaluator::Evaluator;
pub use fetch::{DirectoryFetcher, MemoryFetcher, SourceFetcher};
pub use interop::{InteropMode, InteropPolicy, InteropRule};
pub use native::NativeBundle;
pub use path::{BareModules, PathResolver};
pub use register::{noop_setter, Declaration, ExportFn, RuntimeInfo};
pub use registry::ModuleRegistry;
pub use scheduler::{Execute, ExecutionQueue};
pub use system::{System, SystemBuilder};
