use crate::error::CheckpointResult;
use crate::layout::{CheckpointLayout, DEFAULT_EXTENSION, DEFAULT_QUARANTINE_SUFFIX};
use crate::policy::{default_candidate_order, CandidateSource};
use crate::validate::{default_required_entries, ValidatorConfig, DEFAULT_MIN_SIZE_BYTES};
use crate::watcher::WatcherConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Deployment-level tuning for the checkpoint engine. Everything here varies
/// by deployment (artifact sizes, safe cadences, repository endpoints), so
/// nothing is hardcoded at the call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    pub candidate_order: Vec<CandidateSource>,
    pub artifact_extension: String,
    pub quarantine_suffix: String,
    pub min_size_bytes: u64,
    pub required_entries: Vec<String>,
    pub watcher_interval_secs: u64,
    pub remote_base_url: Option<String>,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            candidate_order: default_candidate_order(),
            artifact_extension: DEFAULT_EXTENSION.to_string(),
            quarantine_suffix: DEFAULT_QUARANTINE_SUFFIX.to_string(),
            min_size_bytes: DEFAULT_MIN_SIZE_BYTES,
            required_entries: default_required_entries(),
            watcher_interval_secs: 10,
            remote_base_url: None,
        }
    }
}

impl CheckpointConfig {
    pub fn from_toml_path(path: &Path) -> CheckpointResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    #[must_use]
    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            min_size_bytes: self.min_size_bytes,
            required_entries: self.required_entries.clone(),
        }
    }

    #[must_use]
    pub fn layout_for(&self, output_dir: &Path) -> CheckpointLayout {
        CheckpointLayout::new(output_dir)
            .with_extension(self.artifact_extension.clone())
            .with_quarantine_suffix(self.quarantine_suffix.clone())
    }

    #[must_use]
    pub fn watcher_config(&self, output_dir: &Path) -> WatcherConfig {
        WatcherConfig {
            output_dir: output_dir.to_path_buf(),
            interval: std::time::Duration::from_secs(self.watcher_interval_secs),
            artifact_extension: self.artifact_extension.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = CheckpointConfig::default();
        assert_eq!(config.artifact_extension, "ckpt");
        assert_eq!(config.quarantine_suffix, "corrupted");
        assert_eq!(config.min_size_bytes, 1_000_000_000);
        assert_eq!(config.watcher_interval_secs, 10);
        assert_eq!(config.candidate_order, default_candidate_order());
    }

    #[test]
    fn test_from_toml_overrides_and_defaults() {
        let toml_content = r#"
min_size_bytes = 1024
quarantine_suffix = "bad"
candidate_order = ["last_marker", "highest_numbered"]
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();
        file.flush().unwrap();

        let config = CheckpointConfig::from_toml_path(file.path()).unwrap();
        assert_eq!(config.min_size_bytes, 1024);
        assert_eq!(config.quarantine_suffix, "bad");
        assert_eq!(
            config.candidate_order,
            vec![CandidateSource::LastMarker, CandidateSource::HighestNumbered]
        );
        // Untouched fields keep their defaults.
        assert_eq!(config.artifact_extension, "ckpt");
    }
}
