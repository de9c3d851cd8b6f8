use crate::error::CheckpointResult;
use crate::metadata;
use std::path::{Path, PathBuf};

/// File-name prefix shared by all checkpoint artifacts in an output directory.
pub const ARTIFACT_PREFIX: &str = "model_";

pub const DEFAULT_EXTENSION: &str = "ckpt";
pub const DEFAULT_QUARANTINE_SUFFIX: &str = "corrupted";

/// Naming conventions inside a training run's output directory.
///
/// Numbered artifacts are `model_<updates>.<ext>`, the best-validation-loss
/// snapshot is `model_best.<ext>` and the most recent one is
/// `model_last.<ext>`. Quarantined files carry an extra suffix appended to
/// the full file name, so none of the patterns here ever match them again.
#[derive(Debug, Clone)]
pub struct CheckpointLayout {
    output_dir: PathBuf,
    extension: String,
    quarantine_suffix: String,
}

impl CheckpointLayout {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            quarantine_suffix: DEFAULT_QUARANTINE_SUFFIX.to_string(),
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    #[must_use]
    pub fn with_quarantine_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.quarantine_suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub fn quarantine_suffix(&self) -> &str {
        &self.quarantine_suffix
    }

    #[must_use]
    pub fn numbered_path(&self, updates: u64) -> PathBuf {
        self.output_dir.join(format!("{ARTIFACT_PREFIX}{updates}.{}", self.extension))
    }

    #[must_use]
    pub fn best_path(&self) -> PathBuf {
        self.output_dir.join(format!("{ARTIFACT_PREFIX}best.{}", self.extension))
    }

    #[must_use]
    pub fn last_path(&self) -> PathBuf {
        self.output_dir.join(format!("{ARTIFACT_PREFIX}last.{}", self.extension))
    }

    /// Path for a caller-named artifact. Names without an extension get the
    /// layout's artifact extension appended.
    #[must_use]
    pub fn named_path(&self, name: &str) -> PathBuf {
        if Path::new(name).extension().is_some() {
            self.output_dir.join(name)
        } else {
            self.output_dir.join(format!("{name}.{}", self.extension))
        }
    }

    #[must_use]
    pub fn is_quarantined(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&format!(".{}", self.quarantine_suffix)))
    }

    /// The name a quarantined copy of `path` would have.
    #[must_use]
    pub fn quarantined_path(&self, path: &Path) -> PathBuf {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        path.with_file_name(format!("{name}.{}", self.quarantine_suffix))
    }

    /// Scan the output directory for update-numbered artifacts and return the
    /// highest-numbered one. Quarantined files and sidecars never match the
    /// numbered pattern. A missing output directory yields `None`.
    pub fn highest_numbered(&self) -> CheckpointResult<Option<(u64, PathBuf)>> {
        let dir = match std::fs::read_dir(&self.output_dir) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut best: Option<(u64, PathBuf)> = None;
        for entry in dir {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || metadata::is_sidecar(&path) {
                continue;
            }
            let Some(updates) = self.parse_numbered(&path) else {
                continue;
            };
            if best.as_ref().is_none_or(|(n, _)| updates > *n) {
                best = Some((updates, path));
            }
        }
        Ok(best)
    }

    /// Parse `model_<updates>.<ext>` out of a file name, if it matches.
    #[must_use]
    pub fn parse_numbered(&self, path: &Path) -> Option<u64> {
        let name = path.file_name()?.to_str()?;
        let stem = name.strip_suffix(&format!(".{}", self.extension))?;
        let digits = stem.strip_prefix(ARTIFACT_PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_numbered_names() {
        let layout = CheckpointLayout::new("/runs/a");
        assert_eq!(layout.numbered_path(500), PathBuf::from("/runs/a/model_500.ckpt"));
        assert_eq!(layout.best_path(), PathBuf::from("/runs/a/model_best.ckpt"));
        assert_eq!(layout.last_path(), PathBuf::from("/runs/a/model_last.ckpt"));
    }

    #[test]
    fn test_named_path_keeps_explicit_extension() {
        let layout = CheckpointLayout::new("/runs/a");
        assert_eq!(layout.named_path("model_42.ckpt"), PathBuf::from("/runs/a/model_42.ckpt"));
        assert_eq!(layout.named_path("snapshot"), PathBuf::from("/runs/a/snapshot.ckpt"));
    }

    #[test]
    fn test_parse_numbered() {
        let layout = CheckpointLayout::new("/runs/a");
        assert_eq!(layout.parse_numbered(Path::new("model_500.ckpt")), Some(500));
        assert_eq!(layout.parse_numbered(Path::new("model_best.ckpt")), None);
        assert_eq!(layout.parse_numbered(Path::new("model_500.ckpt.corrupted")), None);
        assert_eq!(layout.parse_numbered(Path::new("model_.ckpt")), None);
    }

    #[test]
    fn test_highest_numbered_skips_quarantined_and_sidecars() {
        let temp = TempDir::new().unwrap();
        let layout = CheckpointLayout::new(temp.path());
        std::fs::write(layout.numbered_path(100), b"a").unwrap();
        std::fs::write(layout.numbered_path(500), b"b").unwrap();
        std::fs::write(temp.path().join("model_900.ckpt.corrupted"), b"c").unwrap();
        std::fs::write(temp.path().join("model_500.ckpt.meta.json"), b"{}").unwrap();

        let (updates, path) = layout.highest_numbered().unwrap().unwrap();
        assert_eq!(updates, 500);
        assert_eq!(path, layout.numbered_path(500));
    }

    #[test]
    fn test_highest_numbered_missing_dir_is_none() {
        let layout = CheckpointLayout::new("/definitely/not/here");
        assert!(layout.highest_numbered().unwrap().is_none());
    }

    #[test]
    fn test_quarantined_path_appends_suffix() {
        let layout = CheckpointLayout::new("/runs/a");
        let q = layout.quarantined_path(Path::new("/runs/a/model_500.ckpt"));
        assert_eq!(q, PathBuf::from("/runs/a/model_500.ckpt.corrupted"));
        assert!(layout.is_quarantined(&q));
        assert!(!layout.is_quarantined(Path::new("/runs/a/model_500.ckpt")));
    }
}
