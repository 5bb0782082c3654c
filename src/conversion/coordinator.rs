//! Batch dispatch and progress reconciliation.
//!
//! The coordinator never marks items `converting` itself. An item leaves
//! `pending` only when the engine says it started, so the queue's busy state
//! reflects real engine activity rather than dispatch intent.

use std::sync::Arc;

use ncm_convert_common::BatchId;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::engine::{ConversionEngine, ConversionRequest, ProgressEvent, ProgressStatus};
use crate::queue::WorkItem;
use crate::state::AppState;

/// Dispatches pending items to the engine and folds its progress back into the queue.
pub struct ConversionCoordinator {
    state: Arc<AppState>,
    engine: Arc<dyn ConversionEngine>,
}

impl ConversionCoordinator {
    pub fn new(state: Arc<AppState>, engine: Arc<dyn ConversionEngine>) -> Arc<Self> {
        Arc::new(Self { state, engine })
    }

    /// Dispatch every pending item as one batch.
    ///
    /// Does nothing and returns `None` when nothing is pending or the engine
    /// is still working on an earlier batch. The engine call is fire and
    /// forget; results arrive through [`on_progress`](Self::on_progress).
    pub fn start_conversion(&self) -> Option<BatchId> {
        let paths = {
            let queue = self.state.queue();
            if queue.is_busy() {
                tracing::debug!("Conversion already in progress, not starting another batch");
                return None;
            }
            queue.pending_paths()
        };

        if paths.is_empty() {
            tracing::debug!("No pending files to convert");
            return None;
        }

        let config = self.state.config().snapshot();
        let request = ConversionRequest {
            batch_id: BatchId::new(),
            paths,
            output_dir: config.output_dir.clone(),
            pattern: config.effective_pattern().to_string(),
            copy_auxiliary_lyrics: config.copy_auxiliary_lyrics,
        };
        let batch_id = request.batch_id;

        tracing::info!(
            batch_id = %batch_id,
            files = request.paths.len(),
            output_dir = %request.output_dir,
            pattern = %request.pattern,
            "Dispatching conversion batch"
        );
        self.engine.convert(request);

        Some(batch_id)
    }

    /// Apply one engine event to the matching queue item.
    ///
    /// Events for paths no longer queued are dropped. Returns the updated item.
    pub fn on_progress(&self, event: &ProgressEvent) -> Option<WorkItem> {
        let updated = self
            .state
            .update_by_path(&event.path, |item| match event.status {
                ProgressStatus::Converting => item.start(),
                ProgressStatus::Done => item.complete(event.size, event.output_path.as_deref()),
                ProgressStatus::Error => item.fail(event.error.as_deref()),
            });

        match &updated {
            Some(item) => tracing::debug!(
                id = %item.id,
                path = %item.path,
                status = %item.status,
                "Applied progress event"
            ),
            None => tracing::debug!(path = %event.path, "Discarding progress for unknown path"),
        }
        updated
    }

    /// Start routing engine progress into the queue.
    ///
    /// Events keep flowing until the returned handle is unsubscribed or dropped.
    pub fn subscribe(self: &Arc<Self>) -> ProgressSubscription {
        let rx = self.engine.subscribe();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Arc::clone(self).run_progress_loop(rx, cancel.clone()));

        tracing::info!("Subscribed to conversion progress");
        ProgressSubscription {
            cancel,
            handle: Some(handle),
        }
    }

    async fn run_progress_loop(
        self: Arc<Self>,
        mut rx: broadcast::Receiver<ProgressEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                result = rx.recv() => match result {
                    Ok(event) => {
                        self.on_progress(&event);
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!("Progress subscriber lagged, {} events lost", n);
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Progress channel closed");
                        break;
                    }
                },
            }
        }

        tracing::info!("Unsubscribed from conversion progress");
    }
}

/// Live subscription to engine progress. Dropping it stops event delivery.
pub struct ProgressSubscription {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ProgressSubscription {
    /// Stop processing events and wait for the listener task to exit.
    pub async fn unsubscribe(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
            && self
                .handle
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ProgressSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
