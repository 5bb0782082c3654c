//! ncm-convert - Conversion queue for encrypted music containers
//!
//! This library crate holds the queue, configuration and conversion
//! orchestration used by the `ncm-convert` binary.

pub mod config;
pub mod conversion;
pub mod queue;
pub mod state;
