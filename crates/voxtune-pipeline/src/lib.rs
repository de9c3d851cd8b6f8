//! Voxtune Pipeline
//!
//! Resumable batch execution for long dataset-preparation jobs:
//! - Work units with stable, content-derived keys
//! - An incrementally-persisted progress ledger with idempotent resume
//! - A sequential runner that bounds how much work a crash can lose

pub mod error;
pub mod ledger;
pub mod runner;
pub mod unit;

pub use error::{PipelineError, PipelineResult};
pub use ledger::{ProgressLedger, ProgressRecord, LEDGER_SCHEMA_VERSION};
pub use runner::{CancellationFlag, ResumableBatchRunner, RunSummary, DEFAULT_FLUSH_EVERY};
pub use unit::WorkUnit;
