use crate::error::{PipelineError, PipelineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, error, info};

pub const LEDGER_SCHEMA_VERSION: u32 = 1;

/// The result of processing one work unit. Append-only: once written it is
/// never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub unit_key: String,
    pub result: serde_json::Value,
    pub completed_at: DateTime<Utc>,
}

/// On-disk shape: a single complete JSON document, rewritten on each flush.
/// Write amplification is the price for a file that is always parseable and
/// crash-atomic via temp-then-rename.
#[derive(Debug, Serialize, Deserialize)]
struct LedgerDocument {
    schema_version: u32,
    records: Vec<ProgressRecord>,
}

/// The durable record of which work units a long batch job has completed.
///
/// Invariant: after a successful flush, `completed` holds exactly the keys
/// of `records`. The ledger is never deleted automatically; an operator
/// clears it to force a full re-run.
#[derive(Debug, Default)]
pub struct ProgressLedger {
    records: Vec<ProgressRecord>,
    completed: HashSet<String>,
}

impl ProgressLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load prior progress. A missing file means a fresh job. An unparseable
    /// file is treated as no prior progress, but logged loudly: silently
    /// discarding a large ledger is a data-loss event operators must be able
    /// to see.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no prior ledger; starting empty");
                return Self::new();
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "ledger unreadable; discarding prior progress and starting empty"
                );
                return Self::new();
            }
        };

        match serde_json::from_slice::<LedgerDocument>(&bytes) {
            Ok(doc) => {
                let completed = doc.records.iter().map(|r| r.unit_key.clone()).collect();
                info!(path = %path.display(), records = doc.records.len(), "loaded progress ledger");
                Self { records: doc.records, completed }
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    size_bytes = bytes.len(),
                    "ledger failed to parse; discarding prior progress and starting empty"
                );
                Self::new()
            }
        }
    }

    #[must_use]
    pub fn is_completed(&self, unit_key: &str) -> bool {
        self.completed.contains(unit_key)
    }

    /// Append a completion record. Re-recording an already-completed key is
    /// a no-op; returns whether a record was added.
    pub fn record(&mut self, unit_key: impl Into<String>, result: serde_json::Value) -> bool {
        let unit_key = unit_key.into();
        if self.completed.contains(&unit_key) {
            return false;
        }
        self.completed.insert(unit_key.clone());
        self.records.push(ProgressRecord { unit_key, result, completed_at: Utc::now() });
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[ProgressRecord] {
        &self.records
    }

    /// Rewrite the whole document durably. The temp file lives in the
    /// destination directory so the final rename stays on one filesystem.
    pub fn flush(&self, path: &Path) -> PipelineResult<()> {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            std::fs::create_dir_all(dir)?;
        }

        let document = LedgerDocument {
            schema_version: LEDGER_SCHEMA_VERSION,
            records: self.records.clone(),
        };
        let mut tmp = NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))?;
        serde_json::to_writer_pretty(&mut tmp, &document)?;
        tmp.write_all(b"\n")?;
        tmp.persist(path).map_err(|e| PipelineError::Io(e.error))?;

        debug!(path = %path.display(), records = self.records.len(), "flushed progress ledger");
        Ok(())
    }
}
