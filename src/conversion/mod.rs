//! Conversion orchestration.
//!
//! This module connects the file queue to the external conversion engine:
//!
//! - [`engine`]: the engine boundary (requests, progress events, progress bus)
//! - [`ConversionCoordinator`]: batch eligibility, dispatch and progress
//!   reconciliation
//! - [`CommandEngine`]: an engine that drives an external converter program

pub mod engine;

mod coordinator;
mod executor;

pub use coordinator::{ConversionCoordinator, ProgressSubscription};
pub use engine::{
    ConversionEngine, ConversionRequest, ProgressBus, ProgressEvent, ProgressStatus,
    PROGRESS_CHANNEL,
};
pub use executor::{CommandEngine, EngineSettings, DEFAULT_ENGINE_PROGRAM};
