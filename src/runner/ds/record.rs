//! Per-module state kept by the registry.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::trace;

use crate::runner::ds::value::{new_object_ref, ObjectRef, Value};
use crate::runner::loader::interop::InteropMode;

/// Callback a dependent hands over for one of its dependencies. It receives
/// the dependency's export snapshot at link time and again after every
/// export update, so it must tolerate redundant calls.
pub type Setter = Rc<dyn Fn(&Value)>;

/// Lifecycle of a registered module. A path missing from the registry is
/// unregistered; there is no way back to that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// Record exists, the registration call has not finished.
    Registering,
    /// Registration finished, execute callback still pending.
    Registered,
    /// Execute callback has run.
    Executed,
}

pub struct ModuleRecord {
    path: String,
    exports: ObjectRef,
    linked_setters: RefCell<Vec<Setter>>,
    interop: InteropMode,
    state: Cell<ModuleState>,
}

impl ModuleRecord {
    pub fn new(path: impl Into<String>, interop: InteropMode) -> Self {
        ModuleRecord {
            path: path.into(),
            exports: new_object_ref(),
            linked_setters: RefCell::new(Vec::new()),
            interop,
            state: Cell::new(ModuleState::Registering),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The live exports object. Always the same instance for a record.
    pub fn exports(&self) -> ObjectRef {
        self.exports.clone()
    }

    pub fn state(&self) -> ModuleState {
        self.state.get()
    }

    pub fn set_state(&self, state: ModuleState) {
        self.state.set(state);
    }

    pub fn linked_setter_count(&self) -> usize {
        self.linked_setters.borrow().len()
    }

    /// Current export value for `name`, if any.
    pub fn export_value(&self, name: &str) -> Option<Value> {
        self.exports.borrow().get(name).cloned()
    }

    /// The value delivered to setters, shaped by the record's interop mode.
    pub fn snapshot(&self) -> Value {
        self.interop.snapshot(&self.exports)
    }

    /// Merge entries into the exports object without notifying anyone.
    pub fn merge<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut exports = self.exports.borrow_mut();
        for (key, value) in entries {
            exports.insert(key, value);
        }
    }

    pub fn link(&self, setter: Setter) {
        self.linked_setters.borrow_mut().push(setter);
    }

    /// Push the current snapshot to every linked setter.
    ///
    /// The setter list is copied first: a setter may re-export into another
    /// record, or link further setters onto this one.
    pub fn notify(&self) {
        let snapshot = self.snapshot();
        let setters: Vec<Setter> = self.linked_setters.borrow().clone();
        trace!("notifying {} setters of {}", setters.len(), self.path);
        for setter in setters.iter() {
            setter(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_registering_and_empty() {
        let record = ModuleRecord::new("/a.js", InteropMode::Namespace);
        assert_eq!(record.state(), ModuleState::Registering);
        assert!(record.exports().borrow().is_empty());
        assert_eq!(record.linked_setter_count(), 0);
    }

    #[test]
    fn test_notify_delivers_cumulative_exports() {
        let record = ModuleRecord::new("/a.js", InteropMode::Namespace);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        record.link(Rc::new(move |v: &Value| {
            let keys: Vec<String> = v.as_object().unwrap().borrow().keys().cloned().collect();
            sink.borrow_mut().push(keys);
        }));

        record.merge(vec![("a".to_string(), Value::from(1))]);
        record.notify();
        record.merge(vec![("b".to_string(), Value::from(2))]);
        record.notify();

        assert_eq!(
            *seen.borrow(),
            vec![vec!["a".to_string()], vec!["a".to_string(), "b".to_string()]]
        );
    }
}
