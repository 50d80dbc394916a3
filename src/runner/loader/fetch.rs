//! Source fetchers: where module text comes from.
//!
//! A fetcher turns a canonical path into module source text. The loader
//! calls it at most once per path; failures are not retried.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use log::debug;

use crate::runner::ds::error::LoaderError;

pub trait SourceFetcher {
    /// Fetch the source text for a canonical module path.
    fn fetch(&self, path: &str) -> Result<String, LoaderError>;

    /// Human-readable name for this fetcher (for debugging/logging).
    fn name(&self) -> &str;
}

impl<T: SourceFetcher + ?Sized> SourceFetcher for Rc<T> {
    fn fetch(&self, path: &str) -> Result<String, LoaderError> {
        (**self).fetch(path)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// In-memory asset table. Counts fetches per path.
pub struct MemoryFetcher {
    sources: HashMap<String, String>,
    fetches: RefCell<HashMap<String, usize>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        MemoryFetcher {
            sources: HashMap::new(),
            fetches: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_source(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(path.into(), source.into());
    }

    /// How many times `path` was requested, including failed requests.
    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches.borrow().get(path).copied().unwrap_or(0)
    }
}

impl Default for MemoryFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFetcher for MemoryFetcher {
    fn fetch(&self, path: &str) -> Result<String, LoaderError> {
        *self
            .fetches
            .borrow_mut()
            .entry(path.to_string())
            .or_insert(0) += 1;
        self.sources
            .get(path)
            .cloned()
            .ok_or_else(|| LoaderError::Fetch {
                path: path.to_string(),
                reason: "no such asset".to_string(),
            })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Reads modules from an asset root directory: the canonical path
/// `/dist/a.js` maps to `<root>/dist/a.js`.
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryFetcher { root: root.into() }
    }

    pub fn location(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl SourceFetcher for DirectoryFetcher {
    fn fetch(&self, path: &str) -> Result<String, LoaderError> {
        let location = self.location(path);
        debug!("fetching {} from {}", path, location.display());
        fs::read_to_string(&location).map_err(|e| LoaderError::Fetch {
            path: path.to_string(),
            reason: format!("{}: {}", location.display(), e),
        })
    }

    fn name(&self) -> &str {
        "directory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_fetcher_counts_requests() {
        let fetcher = MemoryFetcher::new().with_source("/a.js", "text");
        assert_eq!(fetcher.fetch("/a.js").unwrap(), "text");
        assert!(fetcher.fetch("/b.js").is_err());
        assert_eq!(fetcher.fetch_count("/a.js"), 1);
        assert_eq!(fetcher.fetch_count("/b.js"), 1);
        assert_eq!(fetcher.fetch_count("/c.js"), 0);
    }

    #[test]
    fn test_directory_fetcher_maps_path_under_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("dist")).unwrap();
        fs::write(dir.path().join("dist/a.js"), "register [] {}").unwrap();

        let fetcher = DirectoryFetcher::new(dir.path());
        assert_eq!(fetcher.fetch("/dist/a.js").unwrap(), "register [] {}");

        match fetcher.fetch("/dist/missing.js") {
            Err(LoaderError::Fetch { path, .. }) => assert_eq!(path, "/dist/missing.js"),
            other => panic!("Expected fetch error, got {:?}", other),
        }
    }
}
