//! Core type definitions for queued work items.
//!
//! Statuses serialize in lowercase so the wire form matches the status strings
//! carried by progress events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a queued file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Queued and waiting for the engine to pick it up.
    Pending,
    /// The engine reported that it started work on the file.
    Converting,
    /// Converted successfully.
    Done,
    /// The engine reported a failure.
    Error,
}

impl ItemStatus {
    /// `done` and `error` end a dispatch.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Converting => write!(f, "converting"),
            Self::Done => write!(f, "done"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Render a byte count for display.
///
/// # Examples
///
/// ```
/// use ncm_convert_common::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ItemStatus::Converting).unwrap(),
            "\"converting\""
        );
        let status: ItemStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(status, ItemStatus::Error);
    }

    #[test]
    fn test_item_status_display_matches_serde() {
        for status in [
            ItemStatus::Pending,
            ItemStatus::Converting,
            ItemStatus::Done,
            ItemStatus::Error,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn test_is_terminal() {
        assert!(!ItemStatus::Pending.is_terminal());
        assert!(!ItemStatus::Converting.is_terminal());
        assert!(ItemStatus::Done.is_terminal());
        assert!(ItemStatus::Error.is_terminal());
    }

    #[test]
    fn test_format_bytes_boundaries() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1024 * 1024 - 1), "1024.0 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 + 512 * 1024), "3.5 MB");
    }
}
