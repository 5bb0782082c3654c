//! Process-wide owner of the file queue and configuration.
//!
//! All queue mutations go through [`AppState`], which serializes them behind a
//! single write lock and announces each change as a [`QueueEvent`] so a UI can
//! re-render. Locks are never held across an `.await`.

use std::sync::Arc;

use ncm_convert_common::ItemId;
use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::config::ConfigView;
use crate::queue::{FileQueue, QueueSummary, WorkItem};

const QUEUE_EVENT_CAPACITY: usize = 256;

/// Change notification for queue observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A path was accepted into the queue.
    ItemAdded { item: WorkItem },
    /// An item changed state in response to engine progress.
    ItemUpdated { item: WorkItem },
    /// An item was removed by the user.
    ItemRemoved { id: ItemId },
    /// Several items were removed at once.
    QueueCleared { removed: Vec<ItemId> },
}

/// Single owner of the queue and config, announcing every queue change.
pub struct AppState {
    queue: RwLock<FileQueue>,
    config: ConfigView,
    event_tx: broadcast::Sender<QueueEvent>,
}

impl AppState {
    pub fn new(config: ConfigView) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(QUEUE_EVENT_CAPACITY);
        Arc::new(Self {
            queue: RwLock::new(FileQueue::new()),
            config,
            event_tx,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.event_tx.subscribe()
    }

    pub fn config(&self) -> &ConfigView {
        &self.config
    }

    /// Read access for derived views. Do not hold the guard across `.await`.
    pub fn queue(&self) -> RwLockReadGuard<'_, FileQueue> {
        self.queue.read()
    }

    /// Snapshot of every item in queue order.
    pub fn items(&self) -> Vec<WorkItem> {
        self.queue.read().items().to_vec()
    }

    pub fn summary(&self) -> QueueSummary {
        self.queue.read().summary()
    }

    /// Queue new paths; duplicates are ignored. Returns the items created.
    pub fn add_paths<I, S>(&self, raw_paths: I) -> Vec<WorkItem>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let added = self.queue.write().add_paths(raw_paths);
        for item in &added {
            self.broadcast(QueueEvent::ItemAdded { item: item.clone() });
        }
        added
    }

    /// Remove an item. Returns false if no item had that id.
    pub fn remove(&self, id: ItemId) -> bool {
        let removed = self.queue.write().remove(id);
        match removed {
            Some(_) => {
                self.broadcast(QueueEvent::ItemRemoved { id });
                true
            }
            None => false,
        }
    }

    /// Empty the queue, including items the engine is still converting.
    pub fn clear_all(&self) {
        let removed: Vec<ItemId> = {
            let mut queue = self.queue.write();
            let ids = queue.items().iter().map(|item| item.id).collect();
            queue.clear_all();
            ids
        };
        if !removed.is_empty() {
            self.broadcast(QueueEvent::QueueCleared { removed });
        }
    }

    /// Remove finished items. Returns how many were removed.
    pub fn clear_completed(&self) -> usize {
        let removed = self.queue.write().clear_completed();
        let count = removed.len();
        if count > 0 {
            self.broadcast(QueueEvent::QueueCleared { removed });
        }
        count
    }

    /// Mutate the item queued under `path`, if any, and return its new state.
    pub fn update_by_path<F>(&self, path: &str, update: F) -> Option<WorkItem>
    where
        F: FnOnce(&mut WorkItem),
    {
        let updated = {
            let mut queue = self.queue.write();
            let item = queue.find_by_path_mut(path)?;
            update(item);
            item.clone()
        };
        self.broadcast(QueueEvent::ItemUpdated {
            item: updated.clone(),
        });
        Some(updated)
    }

    fn broadcast(&self, event: QueueEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("No subscribers for queue event");
        }
    }
}
