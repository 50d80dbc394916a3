//! Interop policy: which shape a module's export snapshot takes.
//!
//! Most modules hand their raw exports object to dependents. Some bundled
//! third-party modules are consumed by code that expects the module value
//! itself to be the default export (`React.createElement` rather than
//! `React.default.createElement`). Those paths are matched by an
//! [`InteropPolicy`] and their snapshots are flattened.

use std::fmt;
use std::rc::Rc;

use crate::runner::ds::value::{new_object_ref, ObjectRef, Value};

pub const DEFAULT_EXPORT: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteropMode {
    /// Dependents receive the exports object as is.
    Namespace,
    /// Dependents receive the `default` export, which also carries a
    /// `default` key pointing at itself.
    ///
    /// The key is written into the default object in place. When that
    /// object is another module's exports object, that module's exports
    /// gain a `default` entry as well.
    FlattenDefault,
}

impl InteropMode {
    pub fn snapshot(self, exports: &ObjectRef) -> Value {
        match self {
            InteropMode::Namespace => Value::Object(exports.clone()),
            InteropMode::FlattenDefault => {
                let default = exports
                    .borrow()
                    .get(DEFAULT_EXPORT)
                    .cloned()
                    .unwrap_or(Value::Undefined);
                match default {
                    Value::Object(obj) => {
                        obj.borrow_mut()
                            .insert(DEFAULT_EXPORT.to_string(), Value::Object(obj.clone()));
                        Value::Object(obj)
                    }
                    nullish @ Value::Undefined | nullish @ Value::Null => {
                        let obj = new_object_ref();
                        obj.borrow_mut().insert(DEFAULT_EXPORT.to_string(), nullish);
                        Value::Object(obj)
                    }
                    // primitives and functions cannot carry a `default` key
                    other => other,
                }
            }
        }
    }
}

#[derive(Clone)]
pub enum InteropRule {
    Exact(String),
    Prefix(String),
    Predicate(Rc<dyn Fn(&str) -> bool>),
}

impl InteropRule {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            InteropRule::Exact(p) => p == path,
            InteropRule::Prefix(prefix) => path.starts_with(prefix.as_str()),
            InteropRule::Predicate(f) => f(path),
        }
    }
}

impl fmt::Debug for InteropRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteropRule::Exact(p) => write!(f, "Exact({:?})", p),
            InteropRule::Prefix(p) => write!(f, "Prefix({:?})", p),
            InteropRule::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

/// Ordered rule table. A path matching any rule is flattened.
#[derive(Debug, Clone, Default)]
pub struct InteropPolicy {
    rules: Vec<InteropRule>,
}

impl InteropPolicy {
    pub fn new() -> Self {
        InteropPolicy { rules: Vec::new() }
    }

    pub fn with_exact(mut self, path: impl Into<String>) -> Self {
        self.rules.push(InteropRule::Exact(path.into()));
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.rules.push(InteropRule::Prefix(prefix.into()));
        self
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        self.rules.push(InteropRule::Predicate(Rc::new(predicate)));
        self
    }

    pub fn mode_for(&self, path: &str) -> InteropMode {
        if self.rules.iter().any(|rule| rule.matches(path)) {
            InteropMode::FlattenDefault
        } else {
            InteropMode::Namespace
        }
    }
}
