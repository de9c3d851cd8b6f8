use crate::config::CheckpointConfig;
use crate::error::{CheckpointError, CheckpointResult};
use crate::layout::CheckpointLayout;
use crate::policy::{CandidateSource, ResolutionPolicy};
use crate::quarantine::quarantine_artifact;
use crate::remote::RemoteRepository;
use crate::validate::ArtifactValidator;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Subdirectory of the output dir where remote fetches land.
const REMOTE_CACHE_DIR: &str = "remote";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Accepted,
    /// The policy does not configure this rung (no override path, no name...).
    NotConfigured,
    /// The candidate path does not exist; nothing to validate or quarantine.
    Missing,
    /// The candidate failed validation and was quarantined.
    Rejected { reason: String },
}

/// One rung of the ladder as tried during a resolution pass.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateAttempt {
    pub source: CandidateSource,
    pub path: Option<PathBuf>,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedCheckpoint {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub origin: CandidateSource,
    /// Every candidate tried before (and including) the accepted one.
    pub trace: Vec<CandidateAttempt>,
}

/// Walks the candidate priority ladder, validating each rung and
/// quarantining corrupt artifacts, until one yields a usable checkpoint.
///
/// A bad candidate never fails the pass; only an exhausted ladder does.
/// Given a fixed filesystem state and policy the result is deterministic.
pub struct CheckpointResolver {
    config: CheckpointConfig,
    validator: ArtifactValidator,
    remote: Option<Arc<dyn RemoteRepository>>,
}

impl CheckpointResolver {
    #[must_use]
    pub fn new(config: CheckpointConfig) -> Self {
        let validator = ArtifactValidator::new(config.validator_config());
        Self { config, validator, remote: None }
    }

    #[must_use]
    pub fn with_remote(mut self, remote: Arc<dyn RemoteRepository>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub async fn resolve(&self, policy: &ResolutionPolicy) -> CheckpointResult<ResolvedCheckpoint> {
        policy.validate()?;
        let layout = self.config.layout_for(&policy.output_dir);

        let mut trace = Vec::new();
        for source in &self.config.candidate_order {
            let candidate = match self.candidate_path(*source, policy, &layout).await {
                Ok(c) => c,
                Err(e) => {
                    // A failed remote fetch is a rejected rung, not a fatal error.
                    warn!(source = %source, error = %e, "candidate lookup failed");
                    trace.push(CandidateAttempt {
                        source: *source,
                        path: None,
                        outcome: AttemptOutcome::Rejected { reason: e.to_string() },
                    });
                    continue;
                }
            };

            let Some(path) = candidate else {
                trace.push(CandidateAttempt {
                    source: *source,
                    path: None,
                    outcome: AttemptOutcome::NotConfigured,
                });
                continue;
            };

            if !path.exists() {
                debug!(source = %source, path = %path.display(), "candidate missing");
                trace.push(CandidateAttempt {
                    source: *source,
                    path: Some(path),
                    outcome: AttemptOutcome::Missing,
                });
                continue;
            }

            let report = self.validator.validate(&path);
            if report.is_valid {
                info!(
                    source = %source,
                    path = %path.display(),
                    size_bytes = report.size_bytes,
                    "resolved checkpoint"
                );
                trace.push(CandidateAttempt {
                    source: *source,
                    path: Some(path.clone()),
                    outcome: AttemptOutcome::Accepted,
                });
                return Ok(ResolvedCheckpoint {
                    path,
                    size_bytes: report.size_bytes,
                    origin: *source,
                    trace,
                });
            }

            let reason = report
                .reason
                .map(|r| r.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            if let Err(e) = quarantine_artifact(&layout, &path, &reason) {
                warn!(path = %path.display(), error = %e, "failed to quarantine corrupt artifact");
            }
            trace.push(CandidateAttempt {
                source: *source,
                path: Some(path),
                outcome: AttemptOutcome::Rejected { reason },
            });
        }

        Err(CheckpointError::NotFound(render_trace(&trace)))
    }

    async fn candidate_path(
        &self,
        source: CandidateSource,
        policy: &ResolutionPolicy,
        layout: &CheckpointLayout,
    ) -> CheckpointResult<Option<PathBuf>> {
        let candidate = match source {
            CandidateSource::ExplicitOverride => policy.explicit_override.clone(),
            CandidateSource::Named => {
                policy.named_checkpoint.as_deref().map(|n| layout.named_path(n))
            }
            CandidateSource::BestMarker => Some(layout.best_path()),
            CandidateSource::LastMarker => Some(layout.last_path()),
            CandidateSource::HighestNumbered => {
                layout.highest_numbered()?.map(|(_, path)| path)
            }
            CandidateSource::PretrainedBase => policy.pretrained_path.clone(),
            CandidateSource::RemoteFetch => {
                if !policy.allow_remote_fetch {
                    return Ok(None);
                }
                let Some(remote) = &self.remote else {
                    debug!("remote fetch allowed but no repository configured");
                    return Ok(None);
                };
                // validate() already guarantees base_model_id is set.
                let Some(model_id) = policy.base_model_id.as_deref() else {
                    return Ok(None);
                };
                let artifact_name = policy
                    .named_checkpoint
                    .clone()
                    .unwrap_or_else(|| format!("model_base.{}", layout.extension()));
                let dest_dir = policy.output_dir.join(REMOTE_CACHE_DIR);
                let fetched = remote.fetch(model_id, &artifact_name, &dest_dir).await?;
                Some(fetched)
            }
        };
        Ok(candidate)
    }
}

fn render_trace(trace: &[CandidateAttempt]) -> String {
    let parts: Vec<String> = trace
        .iter()
        .map(|attempt| {
            let detail = match &attempt.outcome {
                AttemptOutcome::Accepted => "accepted".to_string(),
                AttemptOutcome::NotConfigured => "not configured".to_string(),
                AttemptOutcome::Missing => "missing".to_string(),
                AttemptOutcome::Rejected { reason } => format!("rejected ({reason})"),
            };
            format!("{}: {detail}", attempt.source)
        })
        .collect();
    parts.join("; ")
}
