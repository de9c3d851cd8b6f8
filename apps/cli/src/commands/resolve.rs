//! `voxt resolve` - walk the candidate ladder and print the winner.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use voxtune_checkpoint::{
    AttemptOutcome, CandidateAttempt, CheckpointConfig, CheckpointError, CheckpointResolver,
    HttpRepository, ResolutionPolicy,
};

pub struct ResolveArgs {
    pub output_dir: PathBuf,
    pub name: Option<String>,
    pub override_path: Option<PathBuf>,
    pub pretrained: Option<PathBuf>,
    pub model_id: Option<String>,
    pub no_download: bool,
    pub trace: bool,
    pub json: bool,
    pub config: CheckpointConfig,
}

pub async fn execute(args: ResolveArgs) -> Result<i32> {
    let mut policy = ResolutionPolicy::new(&args.output_dir);
    policy.named_checkpoint = args.name;
    policy.explicit_override = args.override_path;
    policy.pretrained_path = args.pretrained;
    if !args.no_download {
        if let Some(model_id) = args.model_id {
            policy = policy.with_remote_fetch(model_id);
        }
    }

    let mut resolver = CheckpointResolver::new(args.config.clone());
    if let Some(base_url) = &args.config.remote_base_url {
        resolver = resolver.with_remote(Arc::new(HttpRepository::new(base_url.clone())));
    }

    match resolver.resolve(&policy).await {
        Ok(resolved) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&resolved)?);
            } else {
                println!("{}", resolved.path.display());
                if args.trace {
                    print_trace(&resolved.trace);
                }
            }
            Ok(0)
        }
        Err(CheckpointError::NotFound(reasons)) => {
            if args.json {
                println!("{}", serde_json::json!({ "error": "not found", "reasons": reasons }));
            } else {
                println!("{}: {}", "not found".red().bold(), reasons);
            }
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_trace(trace: &[CandidateAttempt]) {
    for attempt in trace {
        let path = attempt
            .path
            .as_ref()
            .map_or_else(String::new, |p| format!(" {}", p.display()));
        let outcome = match &attempt.outcome {
            AttemptOutcome::Accepted => "accepted".green().to_string(),
            AttemptOutcome::NotConfigured => "not configured".dimmed().to_string(),
            AttemptOutcome::Missing => "missing".yellow().to_string(),
            AttemptOutcome::Rejected { reason } => format!("{} ({reason})", "rejected".red()),
        };
        eprintln!("  {}{path}: {outcome}", attempt.source);
    }
}
