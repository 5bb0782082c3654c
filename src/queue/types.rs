use chrono::{DateTime, Utc};
use ncm_convert_common::{paths, ItemId, ItemStatus};
use serde::{Deserialize, Serialize};

/// Message recorded when the engine reports a failure without detail.
pub const UNKNOWN_ERROR_MESSAGE: &str = "未知错误";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: ItemId,
    pub path: String,
    pub display_name: String,
    pub size_bytes: u64,
    pub status: ItemStatus,
    pub error_message: Option<String>,
    pub output_path: Option<String>,
    pub added_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl WorkItem {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let display_name = paths::display_name(&path);

        Self {
            id: ItemId::next(),
            path,
            display_name,
            size_bytes: 0,
            status: ItemStatus::Pending,
            error_message: None,
            output_path: None,
            added_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.status = ItemStatus::Converting;
        self.error_message = None;
    }

    pub fn complete(&mut self, size: Option<u64>, output_path: Option<&str>) {
        self.status = ItemStatus::Done;
        if let Some(size) = size.filter(|s| *s > 0) {
            self.size_bytes = size;
        }
        if let Some(output) = output_path {
            self.output_path = Some(output.to_string());
        }
        self.error_message = None;
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: Option<&str>) {
        let message = error
            .filter(|e| !e.is_empty())
            .unwrap_or(UNKNOWN_ERROR_MESSAGE);
        self.status = ItemStatus::Error;
        self.error_message = Some(message.to_string());
        self.finished_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSummary {
    pub pending: usize,
    pub converting: usize,
    pub done: usize,
    pub failed: usize,
    pub converted_bytes: u64,
}

impl QueueSummary {
    pub fn total(&self) -> usize {
        self.pending + self.converting + self.done + self.failed
    }

    pub fn record(&mut self, item: &WorkItem) {
        match item.status {
            ItemStatus::Pending => self.pending += 1,
            ItemStatus::Converting => self.converting += 1,
            ItemStatus::Done => {
                self.done += 1;
                self.converted_bytes += item.size_bytes;
            }
            ItemStatus::Error => self.failed += 1,
        }
    }
}
