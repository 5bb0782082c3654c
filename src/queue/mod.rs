//! In-memory queue of files awaiting or undergoing conversion.
//!
//! Items keep submission order. Derived views (`pending_count`, `has_items`,
//! `is_busy`) are computed on demand from item states and never cached, so
//! they cannot drift from the items themselves.

mod registry;
mod types;

pub use registry::PathRegistry;
pub use types::*;

use ncm_convert_common::{ItemId, ItemStatus};

/// Ordered work items plus the registry that keeps their paths unique.
#[derive(Debug, Default)]
pub struct FileQueue {
    items: Vec<WorkItem>,
    registry: PathRegistry,
}

impl FileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every path not already present and return the new items.
    ///
    /// Duplicates, whether already queued or repeated within `raw_paths`, are
    /// ignored.
    pub fn add_paths<I, S>(&mut self, raw_paths: I) -> Vec<WorkItem>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = Vec::new();
        for raw in raw_paths {
            if let Some(item) = self.registry.admit(raw.as_ref()) {
                added.push(item.clone());
                self.items.push(item);
            }
        }
        added
    }

    /// Remove an item by id. Returns the removed item, `None` if absent.
    pub fn remove(&mut self, id: ItemId) -> Option<WorkItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        let item = self.items.remove(index);
        self.registry.release(&item.path);
        Some(item)
    }

    /// Drop every item, including ones the engine is still working on.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        self.registry.clear();
        removed
    }

    /// Drop `done` and `error` items and return their ids.
    pub fn clear_completed(&mut self) -> Vec<ItemId> {
        let mut removed = Vec::new();
        let registry = &mut self.registry;
        self.items.retain(|item| {
            if item.status.is_terminal() {
                registry.release(&item.path);
                removed.push(item.id);
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn pending_count(&self) -> usize {
        self.count_with(ItemStatus::Pending)
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// True while the engine has confirmed work on at least one item.
    pub fn is_busy(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.status == ItemStatus::Converting)
    }

    /// True when every item reached `done` or `error`.
    pub fn all_terminal(&self) -> bool {
        self.items.iter().all(|item| item.status.is_terminal())
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&WorkItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn find_by_path(&self, path: &str) -> Option<&WorkItem> {
        self.items.iter().find(|item| item.path == path)
    }

    pub fn find_by_path_mut(&mut self, path: &str) -> Option<&mut WorkItem> {
        self.items.iter_mut().find(|item| item.path == path)
    }

    /// Paths of all `pending` items, in queue order.
    pub fn pending_paths(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| item.status == ItemStatus::Pending)
            .map(|item| item.path.clone())
            .collect()
    }

    pub fn summary(&self) -> QueueSummary {
        let mut summary = QueueSummary::default();
        for item in &self.items {
            summary.record(item);
        }
        summary
    }

    fn count_with(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|item| item.status == status).count()
    }
}
