use crate::error::CheckpointResult;
use crate::layout::DEFAULT_EXTENSION;
use crate::metadata::{sidecar_path, ArtifactMetadata, MetadataStore};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub output_dir: PathBuf,
    pub interval: Duration,
    pub artifact_extension: String,
}

impl WatcherConfig {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            interval: Duration::from_secs(10),
            artifact_extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Background loop that keeps sidecar metadata in sync with the artifacts a
/// training process is actively writing.
///
/// It only ever reads artifact files and writes the separate sidecar paths,
/// so it cannot conflict with the writer. Started and stopped explicitly;
/// nothing spawns on import.
pub struct MetadataWatcher {
    config: WatcherConfig,
}

impl MetadataWatcher {
    #[must_use]
    pub fn new(config: WatcherConfig) -> Self {
        Self { config }
    }

    /// Spawn the background task. The returned handle stops it.
    #[must_use]
    pub fn spawn(self) -> WatcherHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut tick = tokio::time::interval(self.config.interval);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        if let Err(e) = self.scan_once() {
                            // Metadata is diagnostic; a failed scan never
                            // propagates to the training process.
                            warn!(error = %e, "metadata scan failed");
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("metadata watcher stopped");
        });
        WatcherHandle { stop: stop_tx, task }
    }

    /// One scan pass: refresh the sidecar of every artifact that lacks one
    /// or whose modification time is newer than its sidecar's. Returns how
    /// many sidecars were written.
    pub fn scan_once(&self) -> CheckpointResult<usize> {
        let dir = match std::fs::read_dir(&self.config.output_dir) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let suffix = format!(".{}", self.config.artifact_extension);
        let mut refreshed = 0;
        for entry in dir {
            let entry = entry?;
            let path = entry.path();
            let is_artifact = path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(&suffix));
            if !is_artifact {
                continue;
            }
            if !needs_refresh(&path) {
                continue;
            }
            match self.refresh(&path) {
                Ok(()) => refreshed += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to write sidecar metadata");
                }
            }
        }

        if refreshed > 0 {
            debug!(refreshed, dir = %self.config.output_dir.display(), "sidecar metadata refreshed");
        }
        Ok(refreshed)
    }

    fn refresh(&self, artifact: &Path) -> CheckpointResult<()> {
        // Keep any training-config snapshot the writer already recorded.
        let training_config = MetadataStore::load(artifact)
            .map(|m| m.training_config)
            .unwrap_or(serde_json::Value::Null);
        let metadata = ArtifactMetadata::for_artifact(artifact, training_config)?;
        MetadataStore::save(artifact, &metadata)
    }
}

fn needs_refresh(artifact: &Path) -> bool {
    let sidecar = sidecar_path(artifact);
    let Ok(sidecar_mtime) = std::fs::metadata(&sidecar).and_then(|m| m.modified()) else {
        return true;
    };
    let artifact_mtime = std::fs::metadata(artifact)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH);
    artifact_mtime > sidecar_mtime
}

pub struct WatcherHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Stop the loop and wait for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}
