//! Boundary to the external conversion engine.
//!
//! The engine is driven through [`ConversionEngine::convert`], which returns
//! immediately, and reports back only through [`ProgressEvent`]s on a single
//! broadcast channel. Events are correlated with queued items by `path`.

use ncm_convert_common::BatchId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Name of the engine's progress channel.
pub const PROGRESS_CHANNEL: &str = "ncm:progress";

/// Default buffer size for [`ProgressBus`].
pub const DEFAULT_PROGRESS_CAPACITY: usize = 1024;

/// Status carried by a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Converting,
    Done,
    Error,
}

/// Per-file progress notification emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub path: String,
    pub status: ProgressStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressEvent {
    pub fn converting(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: ProgressStatus::Converting,
            size: None,
            output_path: None,
            error: None,
        }
    }

    pub fn done(path: impl Into<String>, size: u64, output_path: Option<String>) -> Self {
        Self {
            path: path.into(),
            status: ProgressStatus::Done,
            size: Some(size),
            output_path,
            error: None,
        }
    }

    pub fn error(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: ProgressStatus::Error,
            size: None,
            output_path: None,
            error: Some(error.into()),
        }
    }
}

/// One batch handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub batch_id: BatchId,
    pub paths: Vec<String>,
    pub output_dir: String,
    pub pattern: String,
    /// Copy each input's `.lrc` sidecar next to its converted file.
    #[serde(default)]
    pub copy_auxiliary_lyrics: bool,
}

/// External conversion engine.
pub trait ConversionEngine: Send + Sync {
    /// Start converting a batch. Must not block; outcomes arrive as events.
    fn convert(&self, request: ConversionRequest);

    /// Subscribe to the progress channel.
    fn subscribe(&self) -> broadcast::Receiver<ProgressEvent>;
}

/// Broadcast channel carrying [`ProgressEvent`]s from an engine to listeners.
#[derive(Debug, Clone)]
pub struct ProgressBus {
    tx: broadcast::Sender<ProgressEvent>,
}

impl ProgressBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }

    /// Send an event to all current subscribers.
    ///
    /// With nobody listening the event is dropped.
    pub fn emit(&self, event: ProgressEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("No subscribers on {}", PROGRESS_CHANNEL);
        }
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_event_wire_format() {
        let event: ProgressEvent = serde_json::from_str(
            r#"{"path":"/a.ncm","status":"done","size":1024,"outputPath":"/out/a.flac"}"#,
        )
        .unwrap();
        assert_eq!(event.status, ProgressStatus::Done);
        assert_eq!(event.size, Some(1024));
        assert_eq!(event.output_path.as_deref(), Some("/out/a.flac"));
        assert!(event.error.is_none());

        let json = serde_json::to_value(ProgressEvent::converting("/b.ncm")).unwrap();
        assert_eq!(json, serde_json::json!({"path": "/b.ncm", "status": "converting"}));
    }

    #[test]
    fn test_error_event_without_message_parses() {
        let event: ProgressEvent =
            serde_json::from_str(r#"{"path":"/a.ncm","status":"error"}"#).unwrap();
        assert_eq!(event.status, ProgressStatus::Error);
        assert!(event.error.is_none());
    }

    #[tokio::test]
    async fn test_bus_delivers_in_order() {
        let bus = ProgressBus::new(8);
        let mut rx = bus.subscribe();

        bus.emit(ProgressEvent::converting("/a.ncm"));
        bus.emit(ProgressEvent::error("/a.ncm", "bad key"));

        assert_eq!(rx.recv().await.unwrap().status, ProgressStatus::Converting);
        assert_eq!(rx.recv().await.unwrap().status, ProgressStatus::Error);
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_dropped() {
        let bus = ProgressBus::default();
        bus.emit(ProgressEvent::done("/a.ncm", 1, None));

        let mut rx = bus.subscribe();
        bus.emit(ProgressEvent::converting("/b.ncm"));
        assert_eq!(rx.recv().await.unwrap().path, "/b.ncm");
    }
}
