use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default size floor for a full voice-model snapshot. Anything smaller is
/// treated as a truncated write. Deployments with smaller artifact classes
/// override this in config.
pub const DEFAULT_MIN_SIZE_BYTES: u64 = 1_000_000_000;

/// Archive entries every usable checkpoint must contain.
pub fn default_required_entries() -> Vec<String> {
    vec!["model_weights".to_string(), "vocab".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub min_size_bytes: u64,
    pub required_entries: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_size_bytes: DEFAULT_MIN_SIZE_BYTES,
            required_entries: default_required_entries(),
        }
    }
}

/// Why an artifact was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidReason {
    NotFound,
    TooSmall { size_bytes: u64, min_size_bytes: u64 },
    Unreadable { detail: String },
    MissingKeys { missing: Vec<String> },
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND: file is missing or not readable"),
            Self::TooSmall { size_bytes, min_size_bytes } => write!(
                f,
                "TOO_SMALL: {size_bytes} bytes is below the {min_size_bytes} byte floor (truncated write?)"
            ),
            Self::Unreadable { detail } => {
                write!(f, "UNREADABLE: container failed to open: {detail}")
            }
            Self::MissingKeys { missing } => {
                write!(f, "MISSING_KEYS: container lacks required sections: {}", missing.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub path: PathBuf,
    pub is_valid: bool,
    pub size_bytes: u64,
    pub reason: Option<InvalidReason>,
}

impl ValidationReport {
    fn invalid(path: &Path, size_bytes: u64, reason: InvalidReason) -> Self {
        Self { path: path.to_path_buf(), is_valid: false, size_bytes, reason: Some(reason) }
    }
}

/// Inspects a candidate checkpoint file and decides whether it is usable.
///
/// Checks run in order and short-circuit on the first failure: existence,
/// minimum size, container readability, required entries. Validation never
/// mutates the artifact.
#[derive(Debug, Clone, Default)]
pub struct ArtifactValidator {
    config: ValidatorConfig,
}

impl ArtifactValidator {
    #[must_use]
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn validate(&self, path: &Path) -> ValidationReport {
        let meta = match std::fs::metadata(path) {
            Ok(m) if m.is_file() => m,
            _ => return ValidationReport::invalid(path, 0, InvalidReason::NotFound),
        };

        let size_bytes = meta.len();
        if size_bytes < self.config.min_size_bytes {
            return ValidationReport::invalid(
                path,
                size_bytes,
                InvalidReason::TooSmall { size_bytes, min_size_bytes: self.config.min_size_bytes },
            );
        }

        let entries = match read_entry_names(path) {
            Ok(names) => names,
            Err(e) => {
                return ValidationReport::invalid(
                    path,
                    size_bytes,
                    InvalidReason::Unreadable { detail: e.to_string() },
                );
            }
        };

        let missing: Vec<String> = self
            .config
            .required_entries
            .iter()
            .filter(|required| !entries.iter().any(|e| e == *required))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return ValidationReport::invalid(path, size_bytes, InvalidReason::MissingKeys { missing });
        }

        debug!(path = %path.display(), size_bytes, "checkpoint artifact passed validation");
        ValidationReport { path: path.to_path_buf(), is_valid: true, size_bytes, reason: None }
    }
}

/// List entry names in the gzipped tar container. An interrupted write
/// typically fails right here, which is what catches most real corruption.
fn read_entry_names(path: &Path) -> std::io::Result<Vec<String>> {
    let file = File::open(path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));

    let mut names = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        let entry_path = entry.path()?;
        let name = entry_path
            .to_string_lossy()
            .trim_start_matches("./")
            .trim_end_matches('/')
            .to_string();
        names.push(name);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{write_checkpoint, write_valid_checkpoint};
    use tempfile::TempDir;

    fn small_validator() -> ArtifactValidator {
        ArtifactValidator::new(ValidatorConfig {
            min_size_bytes: 16,
            ..ValidatorConfig::default()
        })
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let report = small_validator().validate(Path::new("/nope/model_1.ckpt"));
        assert!(!report.is_valid);
        assert_eq!(report.reason, Some(InvalidReason::NotFound));
    }

    #[test]
    fn test_small_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model_1.ckpt");
        std::fs::write(&path, b"tiny").unwrap();

        let report = small_validator().validate(&path);
        assert!(!report.is_valid);
        assert!(matches!(report.reason, Some(InvalidReason::TooSmall { size_bytes: 4, .. })));
    }

    #[test]
    fn test_valid_container_passes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model_1.ckpt");
        write_valid_checkpoint(&path);

        let report = small_validator().validate(&path);
        assert!(report.is_valid, "reason: {:?}", report.reason);
        assert!(report.reason.is_none());
        assert_eq!(report.size_bytes, std::fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn test_byte_for_byte_copy_passes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model_1.ckpt");
        write_valid_checkpoint(&path);
        let copy = temp.path().join("copy.ckpt");
        std::fs::copy(&path, &copy).unwrap();

        assert!(small_validator().validate(&copy).is_valid);
    }

    #[test]
    fn test_truncated_copy_is_unreadable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model_1.ckpt");
        write_valid_checkpoint(&path);

        let bytes = std::fs::read(&path).unwrap();
        let truncated = temp.path().join("truncated.ckpt");
        std::fs::write(&truncated, &bytes[..bytes.len() - 10]).unwrap();

        let report = small_validator().validate(&truncated);
        assert!(!report.is_valid);
        assert!(matches!(report.reason, Some(InvalidReason::Unreadable { .. })));
    }

    #[test]
    fn test_readable_but_incomplete_container_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model_1.ckpt");
        write_checkpoint(&path, &[("model_weights", b"w".repeat(64).as_slice())]);

        let report = small_validator().validate(&path);
        assert!(!report.is_valid);
        match report.reason {
            Some(InvalidReason::MissingKeys { missing }) => {
                assert_eq!(missing, vec!["vocab".to_string()]);
            }
            other => panic!("expected MissingKeys, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_does_not_mutate() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model_1.ckpt");
        write_valid_checkpoint(&path);
        let before = std::fs::read(&path).unwrap();

        let _ = small_validator().validate(&path);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }
}
