//! Core types for the script evaluator.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::runner::ds::error::LoaderError;
use crate::runner::ds::value::Value;
use crate::runner::loader::register::{ExportFn, RuntimeInfo};

/// Name under which loader globals are visible to scripts.
pub const ENV_BINDING: &str = "env";

pub type ValueResult = Result<Value, LoaderError>;

/// Module scope: import bindings, dynamic import bindings and locally
/// exported names. Shared between the setters and the execute callback.
pub type Scope = Rc<RefCell<HashMap<String, Value>>>;

/// Everything a statement needs while a module body runs.
#[derive(Clone)]
pub struct EvalContext {
    pub scope: Scope,
    pub export: ExportFn,
    pub info: RuntimeInfo,
}

impl EvalContext {
    pub fn new(export: ExportFn, info: RuntimeInfo) -> Self {
        EvalContext {
            scope: Rc::new(RefCell::new(HashMap::new())),
            export,
            info,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.scope.borrow().get(name).cloned()
    }

    pub fn bind(&self, name: &str, value: Value) {
        self.scope.borrow_mut().insert(name.to_string(), value);
    }
}
