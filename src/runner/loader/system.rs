//! The loader itself: registration, fetch-evaluate and top-level import.
//!
//! ## Import flow
//!
//! ```text
//! import("/app.js")
//!      ↓
//! 1. Registered already?  → return its exports, nothing runs
//! 2. Fetch source, push loader context, evaluate
//!      ↓  (module calls register(deps, factory))
//! 3. Create record, run factory → setters + execute
//! 4. For each dependency: load if absent (depth-first, back to 2),
//!    call the setter with the current snapshot, link it for updates
//! 5. Queue execute, pop loader context
//!      ↓
//! 6. Drain the queue in order
//! 7. Return the exports object of /app.js
//! ```
//!
//! Dependencies finish registering before the module that asked for them,
//! so for `/a → /b → /c` the bodies run as `/c`, `/b`, `/a`. A dependency
//! already in the registry (including one still registering, as in a cycle)
//! is linked immediately and receives its remaining exports later through
//! the setter.
//!
//! ## Threading
//!
//! `System` is a cheap `Rc` handle and deliberately `!Send`. Fetching and
//! evaluation are synchronous, so an import runs to completion on the
//! calling thread and the loader context stack is never shared between two
//! evaluations in flight.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use log::{debug, warn};

use crate::runner::ds::error::LoaderError;
use crate::runner::ds::record::{ModuleRecord, ModuleState};
use crate::runner::ds::value::{ObjectRef, Value};
use crate::runner::loader::config::LoaderConfig;
use crate::runner::loader::evaluator::Evaluator;
use crate::runner::loader::fetch::SourceFetcher;
use crate::runner::loader::interop::InteropPolicy;
use crate::runner::loader::path::PathResolver;
use crate::runner::loader::register::{Declaration, ExportFn, RuntimeInfo};
use crate::runner::loader::registry::ModuleRegistry;
use crate::runner::loader::scheduler::{ExecutionQueue, PendingExecute};

const ROOT: &str = "/";

pub struct SystemInner {
    registry: RefCell<ModuleRegistry>,
    /// Loader context: the path whose source is being evaluated is on top.
    context: RefCell<Vec<String>>,
    queue: RefCell<ExecutionQueue>,
    fetcher: Box<dyn SourceFetcher>,
    evaluator: Box<dyn Evaluator>,
    resolver: PathResolver,
    interop: InteropPolicy,
    globals: BTreeMap<String, Value>,
}

#[derive(Clone)]
pub struct System {
    inner: Rc<SystemInner>,
}

pub struct SystemBuilder {
    fetcher: Box<dyn SourceFetcher>,
    evaluator: Box<dyn Evaluator>,
    resolver: PathResolver,
    interop: InteropPolicy,
    globals: BTreeMap<String, Value>,
}

impl SystemBuilder {
    pub fn resolver(mut self, resolver: PathResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn interop(mut self, interop: InteropPolicy) -> Self {
        self.interop = interop;
        self
    }

    pub fn global(mut self, name: impl Into<String>, value: Value) -> Self {
        self.globals.insert(name.into(), value);
        self
    }

    /// Apply resolver, interop and globals from a config file.
    pub fn config(mut self, config: &LoaderConfig) -> Self {
        self.resolver = config.path_resolver();
        self.interop = config.interop_policy();
        for (name, value) in &config.globals {
            self.globals.insert(name.clone(), value.clone());
        }
        self
    }

    pub fn build(self) -> System {
        System {
            inner: Rc::new(SystemInner {
                registry: RefCell::new(ModuleRegistry::new()),
                context: RefCell::new(Vec::new()),
                queue: RefCell::new(ExecutionQueue::new()),
                fetcher: self.fetcher,
                evaluator: self.evaluator,
                resolver: self.resolver,
                interop: self.interop,
                globals: self.globals,
            }),
        }
    }
}

impl System {
    pub fn builder<F, E>(fetcher: F, evaluator: E) -> SystemBuilder
    where
        F: SourceFetcher + 'static,
        E: Evaluator + 'static,
    {
        SystemBuilder {
            fetcher: Box::new(fetcher),
            evaluator: Box::new(evaluator),
            resolver: PathResolver::new(),
            interop: InteropPolicy::new(),
            globals: BTreeMap::new(),
        }
    }

    pub(crate) fn from_inner(inner: Rc<SystemInner>) -> Self {
        System { inner }
    }

    // ── Public loader surface ─────────────────────────────────────────

    /// Register the module whose source is currently being evaluated.
    ///
    /// Called by module bodies (through an [`Evaluator`]) with the
    /// dependency specifiers and a factory. See the module docs for the
    /// linking order.
    pub fn register<F>(&self, dependencies: &[&str], factory: F) -> Result<(), LoaderError>
    where
        F: FnOnce(ExportFn, RuntimeInfo) -> Result<Declaration, LoaderError>,
    {
        let path = self.current_context().ok_or(LoaderError::NoContext)?;
        debug!("registering {} with dependencies {:?}", path, dependencies);

        let mode = self.inner.interop.mode_for(&path);
        let record = self.inner.registry.borrow_mut().create(&path, mode)?;

        let export = ExportFn::new(record.clone());
        let info = RuntimeInfo::new(&path, Rc::downgrade(&self.inner));
        let declaration = factory(export, info)?;

        if declaration.setters.len() != dependencies.len() {
            return Err(LoaderError::SetterCount {
                path,
                dependencies: dependencies.len(),
                setters: declaration.setters.len(),
            });
        }

        for (specifier, setter) in dependencies.iter().zip(declaration.setters) {
            let dep_path = self.resolve(&path, specifier);
            self.load_if_absent(&dep_path)?;
            let dep = self.record(&dep_path).ok_or_else(|| {
                LoaderError::MissingRegistration(dep_path.clone())
            })?;
            debug!("linking {} -> {}", path, dep_path);
            setter(&dep.snapshot());
            dep.link(setter);
        }

        record.set_state(ModuleState::Registered);
        self.inner.queue.borrow_mut().push(path, declaration.execute);
        Ok(())
    }

    /// Top-level import of `path`.
    ///
    /// Already registered paths are looked up, never re-run. Otherwise the
    /// whole unregistered graph below `path` is registered and every queued
    /// execute callback runs, in order, before the exports come back.
    pub fn import(&self, path: &str) -> Result<ObjectRef, LoaderError> {
        let path = self.resolve(ROOT, path);
        if let Some(record) = self.record(&path) {
            return Ok(record.exports());
        }

        debug!("importing {}", path);
        let result = self.load_if_absent(&path).and_then(|_| self.drain());
        if let Err(e) = result {
            warn!("import of {} failed: {}", path, e);
            return Err(e);
        }

        self.record(&path)
            .map(|record| record.exports())
            .ok_or(LoaderError::MissingRegistration(path))
    }

    // ── Fetch-evaluate ────────────────────────────────────────────────

    fn load_if_absent(&self, path: &str) -> Result<(), LoaderError> {
        if self.has(path) {
            return Ok(());
        }

        debug!(
            "loading {} via {} ({})",
            path,
            self.inner.fetcher.name(),
            self.inner.evaluator.name()
        );
        let source = self.inner.fetcher.fetch(path)?;

        self.inner.context.borrow_mut().push(path.to_string());
        let result = self.inner.evaluator.evaluate(path, &source, self);
        self.inner.context.borrow_mut().pop();
        result.map_err(|e| e.during_evaluation(path))?;

        if !self.has(path) {
            return Err(LoaderError::MissingRegistration(path.to_string()));
        }
        Ok(())
    }

    fn drain(&self) -> Result<(), LoaderError> {
        loop {
            // the borrow ends here; callbacks may queue more work
            let next = self.inner.queue.borrow_mut().next();
            let PendingExecute { path, execute } = match next {
                Some(pending) => pending,
                None => return Ok(()),
            };

            debug!("executing {}", path);
            if let Some(execute) = execute {
                execute().map_err(|e| e.during_execution(&path))?;
            }
            if let Some(record) = self.record(&path) {
                record.set_state(ModuleState::Executed);
            }
        }
    }

    // ── Inspection ────────────────────────────────────────────────────

    /// Resolve `specifier` against the canonical path `parent`.
    pub fn resolve(&self, parent: &str, specifier: &str) -> String {
        self.inner.resolver.resolve(parent, specifier)
    }

    pub fn has(&self, path: &str) -> bool {
        self.inner.registry.borrow().has(path)
    }

    pub fn state(&self, path: &str) -> Option<ModuleState> {
        self.record(path).map(|record| record.state())
    }

    /// The exports object of a registered path, without importing it.
    pub fn exports(&self, path: &str) -> Option<ObjectRef> {
        self.record(path).map(|record| record.exports())
    }

    pub fn record(&self, path: &str) -> Option<Rc<ModuleRecord>> {
        self.inner.registry.borrow().get(path)
    }

    /// Registered paths in registration order.
    pub fn paths(&self) -> Vec<String> {
        self.inner.registry.borrow().paths().to_vec()
    }

    pub fn pending_executions(&self) -> Vec<String> {
        self.inner.queue.borrow().pending_paths()
    }

    pub fn current_context(&self) -> Option<String> {
        self.inner.context.borrow().last().cloned()
    }

    pub fn global(&self, name: &str) -> Value {
        self.inner
            .globals
            .get(name)
            .cloned()
            .unwrap_or(Value::Undefined)
    }

    pub fn globals(&self) -> &BTreeMap<String, Value> {
        &self.inner.globals
    }
}
