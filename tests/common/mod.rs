//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires an [`AppState`] and a
//! [`ConversionCoordinator`] to a [`RecordingEngine`] (captures dispatched
//! batches, lets tests emit progress) and a [`MemoryStore`] (in-memory config
//! storage with switchable failures).

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use ncm_convert::config::{Config, ConfigStore, ConfigView};
use ncm_convert::conversion::{
    ConversionCoordinator, ConversionEngine, ConversionRequest, ProgressBus, ProgressEvent,
};
use ncm_convert::state::{AppState, QueueEvent};
use ncm_convert_common::{Error, Result};

/// Engine double that records requests instead of converting anything.
#[derive(Default)]
pub struct RecordingEngine {
    requests: Mutex<Vec<ConversionRequest>>,
    bus: ProgressBus,
}

impl RecordingEngine {
    /// Engine whose progress channel buffers at most `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            requests: Mutex::default(),
            bus: ProgressBus::new(capacity),
        }
    }

    pub fn requests(&self) -> Vec<ConversionRequest> {
        self.requests.lock().clone()
    }

    pub fn emit(&self, event: ProgressEvent) {
        self.bus.emit(event);
    }
}

impl ConversionEngine for RecordingEngine {
    fn convert(&self, request: ConversionRequest) {
        self.requests.lock().push(request);
    }

    fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.bus.subscribe()
    }
}

/// In-memory config storage with switchable failures.
#[derive(Default)]
pub struct MemoryStore {
    config: Mutex<Config>,
    fail_fetch: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn with_config(config: Config) -> Self {
        Self {
            config: Mutex::new(config),
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Config {
        self.config.lock().clone()
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn write(&self, update: impl FnOnce(&mut Config)) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::config("store is read-only"));
        }
        update(&mut *self.config.lock());
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn fetch(&self) -> Result<Config> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(Error::config("store unavailable"));
        }
        Ok(self.stored())
    }

    async fn persist_output_dir(&self, dir: &str) -> Result<()> {
        self.write(|c| c.output_dir = dir.to_string())
    }

    async fn persist_filename_pattern(&self, pattern: &str) -> Result<()> {
        self.write(|c| c.filename_pattern = pattern.to_string())
    }

    async fn persist_copy_auxiliary_lyrics(&self, enabled: bool) -> Result<()> {
        self.write(|c| c.copy_auxiliary_lyrics = enabled)
    }
}

/// Queue, config and coordinator wired to test doubles.
pub struct TestHarness {
    pub state: Arc<AppState>,
    pub coordinator: Arc<ConversionCoordinator>,
    pub engine: Arc<RecordingEngine>,
    pub store: Arc<MemoryStore>,
}

impl TestHarness {
    /// Create a harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a harness whose store (and in-memory view) hold `config`.
    pub fn with_config(config: Config) -> Self {
        Self::with_engine(config, RecordingEngine::default())
    }

    /// Create a harness around a specific recording engine.
    pub fn with_engine(config: Config, engine: RecordingEngine) -> Self {
        let store = Arc::new(MemoryStore::with_config(config.clone()));
        let view = ConfigView::with_initial(store.clone(), config);
        let state = AppState::new(view);
        let engine = Arc::new(engine);
        let coordinator = ConversionCoordinator::new(state.clone(), engine.clone());

        Self {
            state,
            coordinator,
            engine,
            store,
        }
    }

    /// Wait until the queue announces an update for `path`.
    pub async fn wait_for_update(&self, rx: &mut broadcast::Receiver<QueueEvent>, path: &str) {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("timed out waiting for queue update")
                .expect("queue event channel closed");
            if let QueueEvent::ItemUpdated { item } = event {
                if item.path == path {
                    return;
                }
            }
        }
    }
}
