//! Path admission for the file queue.
//!
//! [`PathRegistry`] owns the set of paths currently queued. It is the only
//! place that creates [`WorkItem`]s, which keeps the one-item-per-path
//! invariant in a single spot.

use std::collections::HashSet;

use super::WorkItem;

#[derive(Debug, Default)]
pub struct PathRegistry {
    known: HashSet<String>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pending item for `raw` unless the exact path is already queued.
    pub fn admit(&mut self, raw: &str) -> Option<WorkItem> {
        if !self.known.insert(raw.to_string()) {
            return None;
        }
        Some(WorkItem::new(raw))
    }

    /// Forget a path so it can be queued again with a fresh identity.
    pub fn release(&mut self, path: &str) {
        self.known.remove(path);
    }

    pub fn clear(&mut self) {
        self.known.clear();
    }
}
