//! Voxtune Checkpoint
//!
//! Checkpoint artifact management for voice-model fine-tuning runs:
//! - Resolving which checkpoint to load among several candidate locations
//! - Validating artifact integrity and quarantining corrupt files
//! - Sidecar provenance metadata and a background metadata watcher

pub mod config;
pub mod error;
pub mod layout;
pub mod metadata;
pub mod policy;
pub mod quarantine;
pub mod remote;
pub mod resolve;
pub mod validate;
pub mod watcher;

pub use config::CheckpointConfig;
pub use error::{CheckpointError, CheckpointResult};
pub use layout::CheckpointLayout;
pub use metadata::{sidecar_path, ArtifactMetadata, MetadataStore, METADATA_SCHEMA_VERSION};
pub use policy::{default_candidate_order, CandidateSource, ResolutionPolicy};
pub use quarantine::quarantine_artifact;
pub use remote::{HttpRepository, RemoteRepository};
pub use resolve::{AttemptOutcome, CandidateAttempt, CheckpointResolver, ResolvedCheckpoint};
pub use validate::{ArtifactValidator, InvalidReason, ValidationReport, ValidatorConfig};
pub use watcher::{MetadataWatcher, WatcherConfig, WatcherHandle};

#[cfg(test)]
pub(crate) mod testutil {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs::File;
    use std::path::Path;

    /// Write a checkpoint container with the given entries to `path`.
    pub fn write_checkpoint(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let enc = GzEncoder::new(file, Compression::default());
        let mut tar = tar::Builder::new(enc);
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            tar.append_data(&mut header, name, *data).unwrap();
        }
        tar.into_inner().unwrap().finish().unwrap();
    }

    /// Write a container that passes the default required-entry check.
    pub fn write_valid_checkpoint(path: &Path) {
        write_checkpoint(
            path,
            &[
                ("model_weights", b"w".repeat(256).as_slice()),
                ("vocab", b"{\"a\": 0}".as_slice()),
            ],
        );
    }
}
