//! Module registry: the single source of truth for which paths are loaded
//! or loading.

use std::collections::HashMap;
use std::rc::Rc;

use crate::runner::ds::error::LoaderError;
use crate::runner::ds::record::ModuleRecord;
use crate::runner::loader::interop::InteropMode;

pub struct ModuleRegistry {
    /// All records, keyed by canonical path.
    modules: HashMap<String, Rc<ModuleRecord>>,

    /// Paths in creation order.
    order: Vec<String>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        ModuleRegistry {
            modules: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn has(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<Rc<ModuleRecord>> {
        self.modules.get(path).cloned()
    }

    /// Create the record for `path`. The path is visible to every later
    /// lookup as soon as this returns, which is what lets a cycle link
    /// against a module that is still registering.
    pub fn create(
        &mut self,
        path: &str,
        interop: InteropMode,
    ) -> Result<Rc<ModuleRecord>, LoaderError> {
        if self.modules.contains_key(path) {
            return Err(LoaderError::AlreadyRegistered(path.to_string()));
        }
        let record = Rc::new(ModuleRecord::new(path, interop));
        self.modules.insert(path.to_string(), record.clone());
        self.order.push(path.to_string());
        Ok(record)
    }

    pub fn paths(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_makes_path_visible() {
        let mut registry = ModuleRegistry::new();
        assert!(!registry.has("/a.js"));
        let record = registry.create("/a.js", InteropMode::Namespace).unwrap();
        assert!(registry.has("/a.js"));
        assert!(Rc::ptr_eq(&record, &registry.get("/a.js").unwrap()));
    }

    #[test]
    fn test_create_twice_is_an_error() {
        let mut registry = ModuleRegistry::new();
        registry.create("/a.js", InteropMode::Namespace).unwrap();
        let err = registry.create("/a.js", InteropMode::Namespace).err().unwrap();
        assert!(matches!(err, LoaderError::AlreadyRegistered(ref p) if p == "/a.js"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_paths_keep_creation_order() {
        let mut registry = ModuleRegistry::new();
        for path in &["/c.js", "/a.js", "/b.js"] {
            registry.create(path, InteropMode::Namespace).unwrap();
        }
        assert_eq!(registry.paths(), &["/c.js", "/a.js", "/b.js"]);
    }
}
