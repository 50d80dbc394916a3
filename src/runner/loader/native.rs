//! In-process module definitions.
//!
//! A [`NativeBundle`] is both a fetcher and an evaluator: fetching a defined
//! path yields the path itself as the "source", and evaluating that source
//! runs the Rust definition registered for it. Host code uses it to provide
//! modules implemented in Rust.
//!
//! ```
//! use std::rc::Rc;
//! use modlink::runner::loader::native::NativeBundle;
//! use modlink::runner::loader::register::Declaration;
//! use modlink::runner::loader::system::System;
//! use modlink::runner::ds::value::Value;
//!
//! let bundle = Rc::new(NativeBundle::new());
//! bundle.define("/answer.js", |system: &System| {
//!     system.register(&[], |export, _info| {
//!         export.export("answer", Value::from(42));
//!         Ok(Declaration::new(vec![]))
//!     })
//! });
//!
//! let system = System::builder(bundle.clone(), bundle.clone()).build();
//! let exports = system.import("/answer.js").unwrap();
//! assert_eq!(exports.borrow().get("answer"), Some(&Value::from(42)));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::runner::ds::error::LoaderError;
use crate::runner::loader::evaluator::Evaluator;
use crate::runner::loader::fetch::SourceFetcher;
use crate::runner::loader::system::System;

/// Body of a native module. Must call [`System::register`] once.
pub type Definition = Rc<dyn Fn(&System) -> Result<(), LoaderError>>;

pub struct NativeBundle {
    definitions: RefCell<HashMap<String, Definition>>,
    fetches: RefCell<HashMap<String, usize>>,
}

impl NativeBundle {
    pub fn new() -> Self {
        NativeBundle {
            definitions: RefCell::new(HashMap::new()),
            fetches: RefCell::new(HashMap::new()),
        }
    }

    /// Define (or replace) the module at canonical `path`.
    pub fn define<F>(&self, path: &str, definition: F)
    where
        F: Fn(&System) -> Result<(), LoaderError> + 'static,
    {
        self.definitions
            .borrow_mut()
            .insert(path.to_string(), Rc::new(definition));
    }

    pub fn is_defined(&self, path: &str) -> bool {
        self.definitions.borrow().contains_key(path)
    }

    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches.borrow().get(path).copied().unwrap_or(0)
    }
}

impl Default for NativeBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFetcher for NativeBundle {
    fn fetch(&self, path: &str) -> Result<String, LoaderError> {
        *self
            .fetches
            .borrow_mut()
            .entry(path.to_string())
            .or_insert(0) += 1;
        if self.is_defined(path) {
            Ok(path.to_string())
        } else {
            Err(LoaderError::Fetch {
                path: path.to_string(),
                reason: "not defined in native bundle".to_string(),
            })
        }
    }

    fn name(&self) -> &str {
        "native"
    }
}

impl Evaluator for NativeBundle {
    fn evaluate(&self, _path: &str, source: &str, system: &System) -> Result<(), LoaderError> {
        // released before running: the definition may load further modules
        let definition = self.definitions.borrow().get(source.trim()).cloned();
        match definition {
            Some(definition) => definition(system),
            None => Err(LoaderError::thrown(format!(
                "no native definition named {}",
                source.trim()
            ))),
        }
    }

    fn name(&self) -> &str {
        "native"
    }
}
