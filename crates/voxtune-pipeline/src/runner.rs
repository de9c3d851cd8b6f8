use crate::error::PipelineResult;
use crate::ledger::ProgressLedger;
use crate::unit::WorkUnit;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const DEFAULT_FLUSH_EVERY: usize = 10;

/// Cooperative cancellation signal, observed between unit boundaries only,
/// so a unit's record is either fully written or not written at all.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} completed, {} skipped, {} failed in {:.1}s",
            self.completed,
            self.skipped,
            self.failed,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Drives a long batch job over a work-unit queue, consulting the progress
/// ledger to skip completed units and flushing at a bounded cadence.
///
/// Crash-resilience contract: after any flush, durable storage reflects the
/// completed prefix exactly, so an abrupt termination risks at most
/// `flush_every - 1` completed-but-unflushed units.
pub struct ResumableBatchRunner {
    ledger_path: PathBuf,
    flush_every: usize,
    cancel: CancellationFlag,
}

impl ResumableBatchRunner {
    #[must_use]
    pub fn new(ledger_path: impl Into<PathBuf>) -> Self {
        Self {
            ledger_path: ledger_path.into(),
            flush_every: DEFAULT_FLUSH_EVERY,
            cancel: CancellationFlag::new(),
        }
    }

    /// Flush cadence in new completions per flush. Clamped to at least 1.
    #[must_use]
    pub fn with_flush_every(mut self, flush_every: usize) -> Self {
        self.flush_every = flush_every.max(1);
        self
    }

    /// A clone of the runner's cancellation flag, for wiring into signal
    /// handlers or a supervising task.
    #[must_use]
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Process `units` in input order. Completed keys are skipped without
    /// re-invoking `process_fn`; failures are logged and left incomplete so
    /// a future resume retries them. A final flush always happens, including
    /// on cancellation, so no completed work is lost at a clean exit.
    pub fn run<F>(&self, units: &[WorkUnit], mut process_fn: F) -> PipelineResult<RunSummary>
    where
        F: FnMut(&WorkUnit) -> anyhow::Result<serde_json::Value>,
    {
        let start = Instant::now();
        let mut ledger = ProgressLedger::load(&self.ledger_path);

        info!(
            units = units.len(),
            prior_records = ledger.len(),
            flush_every = self.flush_every,
            "starting batch run"
        );

        let mut completed = 0usize;
        let mut skipped = 0usize;
        let mut failed = 0usize;
        let mut unflushed = 0usize;

        for unit in units {
            if self.cancel.is_cancelled() {
                info!(completed, skipped, failed, "cancellation requested; stopping between units");
                break;
            }

            if ledger.is_completed(&unit.key) {
                skipped += 1;
                continue;
            }

            match process_fn(unit) {
                Ok(result) => {
                    ledger.record(unit.key.clone(), result);
                    completed += 1;
                    unflushed += 1;
                    if unflushed >= self.flush_every {
                        ledger.flush(&self.ledger_path)?;
                        unflushed = 0;
                    }
                }
                Err(e) => {
                    // The unit stays un-completed; a future resume retries it.
                    warn!(unit_key = %unit.key, error = %e, "work unit failed");
                    failed += 1;
                }
            }
        }

        ledger.flush(&self.ledger_path)?;
        debug!(records = ledger.len(), "final ledger flush");

        let summary = RunSummary { completed, skipped, failed, elapsed: start.elapsed() };
        info!(%summary, "batch run finished");
        Ok(summary)
    }
}
