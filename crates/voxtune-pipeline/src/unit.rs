use std::path::{Path, PathBuf};

/// An atomic, independently processable item in a batch job, e.g. one audio
/// segment awaiting transcription. Immutable once enqueued; the key is
/// stable across runs so a resumed job recognizes completed units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub key: String,
    pub source: PathBuf,
}

impl WorkUnit {
    #[must_use]
    pub fn new(key: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self { key: key.into(), source: source.into() }
    }

    /// Derive the key from the source path itself, the common case for
    /// per-file jobs.
    #[must_use]
    pub fn from_source(source: impl AsRef<Path>) -> Self {
        let source = source.as_ref();
        Self { key: source.to_string_lossy().into_owned(), source: source.to_path_buf() }
    }
}
