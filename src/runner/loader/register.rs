//! Plumbing handed to a module's factory during registration.
//!
//! A module body registers with a dependency list and a factory. The factory
//! receives an [`ExportFn`] bound to the module's record and a
//! [`RuntimeInfo`], and answers with a [`Declaration`]: one setter per
//! dependency plus the deferred execute callback.

use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use log::debug;

use crate::runner::ds::error::LoaderError;
use crate::runner::ds::record::{ModuleRecord, Setter};
use crate::runner::ds::value::{ObjectRef, Value};
use crate::runner::loader::scheduler::Execute;
use crate::runner::loader::system::{System, SystemInner};

/// What a factory returns.
pub struct Declaration {
    /// One per declared dependency, in declaration order.
    pub setters: Vec<Setter>,
    pub execute: Option<Execute>,
}

impl Declaration {
    pub fn new(setters: Vec<Setter>) -> Self {
        Declaration {
            setters,
            execute: None,
        }
    }

    pub fn with_execute<F>(mut self, execute: F) -> Self
    where
        F: FnOnce() -> Result<(), LoaderError> + 'static,
    {
        self.execute = Some(Box::new(execute));
        self
    }
}

/// A setter that ignores its snapshot, for dependencies imported only for
/// their side effects.
pub fn noop_setter() -> Setter {
    Rc::new(|_: &Value| {})
}

/// The module's export function.
///
/// Every call merges into the record's exports and pushes the new snapshot
/// to all linked setters, then hands the argument back so it can be used
/// inline.
#[derive(Clone)]
pub struct ExportFn {
    record: Rc<ModuleRecord>,
}

impl ExportFn {
    pub(crate) fn new(record: Rc<ModuleRecord>) -> Self {
        ExportFn { record }
    }

    pub fn path(&self) -> &str {
        self.record.path()
    }

    pub fn export(&self, name: &str, value: Value) -> Value {
        self.record
            .merge(std::iter::once((name.to_string(), value.clone())));
        self.record.notify();
        value
    }

    pub fn export_all(&self, values: ObjectRef) -> ObjectRef {
        // copy out first: `values` may be this module's own exports object
        let entries: Vec<(String, Value)> = values
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.record.merge(entries);
        self.record.notify();
        values
    }

    pub fn export_entries<I, K>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.record
            .merge(entries.into_iter().map(|(k, v)| (k.into(), v)));
        self.record.notify();
    }

    /// The value currently exported under `name`.
    pub fn current(&self, name: &str) -> Option<Value> {
        self.record.export_value(name)
    }
}

/// Per-module runtime information (`meta` plus the relative import hook).
#[derive(Clone)]
pub struct RuntimeInfo {
    url: String,
    system: Weak<SystemInner>,
}

impl RuntimeInfo {
    pub(crate) fn new(url: &str, system: Weak<SystemInner>) -> Self {
        RuntimeInfo {
            url: url.to_string(),
            system,
        }
    }

    /// The module's own canonical path.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn system(&self) -> Result<System, LoaderError> {
        self.system
            .upgrade()
            .map(System::from_inner)
            .ok_or(LoaderError::Detached)
    }

    /// Resolve `specifier` relative to this module.
    pub fn resolve(&self, specifier: &str) -> Result<String, LoaderError> {
        Ok(self.system()?.resolve(&self.url, specifier))
    }

    /// Top-level import relative to this module. Meant for dynamic imports
    /// from module code; declared dependencies are linked by the loader.
    pub fn import(&self, specifier: &str) -> Result<ObjectRef, LoaderError> {
        let system = self.system()?;
        let path = system.resolve(&self.url, specifier);
        debug!("{} dynamically imports {}", self.url, path);
        system.import(&path)
    }

    /// A loader global, `Undefined` when unset.
    pub fn global(&self, name: &str) -> Value {
        match self.system() {
            Ok(system) => system.global(name),
            Err(_) => Value::Undefined,
        }
    }

    /// Every loader global.
    pub fn globals(&self) -> BTreeMap<String, Value> {
        match self.system() {
            Ok(system) => system.globals().clone(),
            Err(_) => BTreeMap::new(),
        }
    }
}
