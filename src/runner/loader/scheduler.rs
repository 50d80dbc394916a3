//! Pending execute callbacks.
//!
//! Registration only declares a module; its body runs later. Each finished
//! registration pushes its execute callback here, and the top-level import
//! that started discovery drains the queue front to back once the whole
//! graph is registered.

use std::collections::VecDeque;

use crate::runner::ds::error::LoaderError;

/// A module body's deferred top-level code.
pub type Execute = Box<dyn FnOnce() -> Result<(), LoaderError>>;

pub struct PendingExecute {
    pub path: String,
    pub execute: Option<Execute>,
}

pub struct ExecutionQueue {
    entries: VecDeque<PendingExecute>,
}

impl ExecutionQueue {
    pub fn new() -> Self {
        ExecutionQueue {
            entries: VecDeque::new(),
        }
    }

    pub fn push(&mut self, path: impl Into<String>, execute: Option<Execute>) {
        self.entries.push_back(PendingExecute {
            path: path.into(),
            execute,
        });
    }

    /// Take the next entry. It leaves the queue before it runs, so a drain
    /// started from inside a callback can never run it a second time.
    pub fn next(&mut self) -> Option<PendingExecute> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_paths(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }
}

impl Default for ExecutionQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_come_out_in_push_order() {
        let mut queue = ExecutionQueue::new();
        queue.push("/c.js", None);
        queue.push("/b.js", Some(Box::new(|| Ok(()))));
        queue.push("/a.js", None);
        assert_eq!(queue.pending_paths(), vec!["/c.js", "/b.js", "/a.js"]);

        let order: Vec<String> = std::iter::from_fn(|| queue.next()).map(|e| e.path).collect();
        assert_eq!(order, vec!["/c.js", "/b.js", "/a.js"]);
        assert!(queue.is_empty());
    }
}
