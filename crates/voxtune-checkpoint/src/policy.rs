use crate::error::{CheckpointError, CheckpointResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One rung of the resolution priority ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    ExplicitOverride,
    Named,
    BestMarker,
    LastMarker,
    HighestNumbered,
    PretrainedBase,
    RemoteFetch,
}

impl std::fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ExplicitOverride => "explicit_override",
            Self::Named => "named",
            Self::BestMarker => "best_marker",
            Self::LastMarker => "last_marker",
            Self::HighestNumbered => "highest_numbered",
            Self::PretrainedBase => "pretrained_base",
            Self::RemoteFetch => "remote_fetch",
        };
        f.write_str(s)
    }
}

/// The default priority ladder: explicit override, then the named artifact,
/// the best and last markers, the highest update-numbered artifact, the
/// configured pretrained base, and finally a remote fetch.
#[must_use]
pub fn default_candidate_order() -> Vec<CandidateSource> {
    vec![
        CandidateSource::ExplicitOverride,
        CandidateSource::Named,
        CandidateSource::BestMarker,
        CandidateSource::LastMarker,
        CandidateSource::HighestNumbered,
        CandidateSource::PretrainedBase,
        CandidateSource::RemoteFetch,
    ]
}

/// Caller-side inputs to one resolution attempt. All fields except
/// `output_dir` are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionPolicy {
    pub explicit_override: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub named_checkpoint: Option<String>,
    pub pretrained_path: Option<PathBuf>,
    pub base_model_id: Option<String>,
    pub allow_remote_fetch: bool,
}

impl ResolutionPolicy {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            explicit_override: None,
            output_dir: output_dir.into(),
            named_checkpoint: None,
            pretrained_path: None,
            base_model_id: None,
            allow_remote_fetch: false,
        }
    }

    #[must_use]
    pub fn with_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_override = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_named_checkpoint(mut self, name: impl Into<String>) -> Self {
        self.named_checkpoint = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_pretrained_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pretrained_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_remote_fetch(mut self, base_model_id: impl Into<String>) -> Self {
        self.base_model_id = Some(base_model_id.into());
        self.allow_remote_fetch = true;
        self
    }

    /// Validate once at construction time, instead of checking fields ad hoc
    /// throughout resolution.
    pub fn validate(&self) -> CheckpointResult<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(CheckpointError::InvalidPolicy("output_dir is required".to_string()));
        }
        if self.allow_remote_fetch && self.base_model_id.as_deref().is_none_or(str::is_empty) {
            return Err(CheckpointError::InvalidPolicy(
                "allow_remote_fetch requires base_model_id".to_string(),
            ));
        }
        Ok(())
    }
}
