//! ncm-convert-common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across ncm-convert:
//!
//! - **Typed IDs**: Process-local work item IDs and batch correlation IDs
//! - **Core Types**: Work item status and byte-size formatting
//! - **Path Utilities**: Display names, `.ncm` detection, lyrics sidecars
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use ncm_convert_common::{ItemId, ItemStatus, Error, Result};
//! use ncm_convert_common::paths::display_name;
//!
//! let first = ItemId::next();
//! let second = ItemId::next();
//! assert_ne!(first, second);
//!
//! assert_eq!(display_name("/music/song.ncm"), "song.ncm");
//! assert!(!ItemStatus::Pending.is_terminal());
//!
//! fn example() -> Result<()> {
//!     Err(Error::config("store unavailable"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
