use crate::error::{CheckpointError, CheckpointResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

pub const METADATA_SCHEMA_VERSION: u32 = 1;

const SIDECAR_SUFFIX: &str = "meta.json";

/// The fingerprint covers the first 4 MiB plus the total length, which is
/// enough to distinguish snapshots without re-reading multi-gigabyte files.
const FINGERPRINT_PREFIX_BYTES: u64 = 4 * 1024 * 1024;

/// Sidecar descriptor stored next to a checkpoint artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub artifact_name: String,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    pub content_fingerprint: String,
    #[serde(default)]
    pub training_config: serde_json::Value,
    pub schema_version: u32,
}

impl ArtifactMetadata {
    /// Build fresh metadata for an artifact on disk. `created_at` is taken
    /// from the file's modification time.
    pub fn for_artifact(path: &Path, training_config: serde_json::Value) -> CheckpointResult<Self> {
        let meta = std::fs::metadata(path)?;
        let artifact_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            artifact_name,
            created_at: DateTime::<Utc>::from(meta.modified()?),
            size_bytes: meta.len(),
            content_fingerprint: partial_fingerprint(path)?,
            training_config,
            schema_version: METADATA_SCHEMA_VERSION,
        })
    }
}

/// Sidecar path for an artifact: the full artifact file name plus `.meta.json`.
#[must_use]
pub fn sidecar_path(artifact: &Path) -> PathBuf {
    let name = artifact.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    artifact.with_file_name(format!("{name}.{SIDECAR_SUFFIX}"))
}

#[must_use]
pub fn is_sidecar(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(&format!(".{SIDECAR_SUFFIX}")))
}

/// Partial content hash: sha256 over the leading bytes and the file length.
pub fn partial_fingerprint(path: &Path) -> CheckpointResult<String> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    let mut remaining = FINGERPRINT_PREFIX_BYTES.min(len);
    while remaining > 0 {
        let want = buf.len().min(usize::try_from(remaining).unwrap_or(buf.len()));
        let n = file.read(&mut buf[..want])?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        remaining -= n as u64;
    }
    hasher.update(len.to_le_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Reads and writes sidecar descriptors. Writes go through a temp file in
/// the same directory and a rename, so a concurrent reader never observes a
/// half-written sidecar.
pub struct MetadataStore;

impl MetadataStore {
    pub fn save(artifact_path: &Path, metadata: &ArtifactMetadata) -> CheckpointResult<()> {
        let sidecar = sidecar_path(artifact_path);
        let dir = sidecar.parent().unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, metadata)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&sidecar).map_err(|e| CheckpointError::Io(e.error))?;
        Ok(())
    }

    /// Load the sidecar for an artifact. Missing sidecars are normal;
    /// unparseable ones are logged and treated as absent, since metadata is
    /// diagnostic rather than load-bearing.
    #[must_use]
    pub fn load(artifact_path: &Path) -> Option<ArtifactMetadata> {
        let sidecar = sidecar_path(artifact_path);
        let bytes = match std::fs::read(&sidecar) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(sidecar = %sidecar.display(), error = %e, "failed to read sidecar metadata");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(meta) => Some(meta),
            Err(e) => {
                warn!(sidecar = %sidecar.display(), error = %e, "sidecar metadata failed to parse");
                None
            }
        }
    }
}
