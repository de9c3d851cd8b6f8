//! `voxt validate` - run the artifact validator against one file.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use voxtune_checkpoint::{ArtifactValidator, CheckpointConfig};

pub fn execute(path: &Path, json: bool, config: &CheckpointConfig) -> Result<i32> {
    let validator = ArtifactValidator::new(config.validator_config());
    let report = validator.validate(path);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_valid {
        println!(
            "{} {} ({} bytes)",
            "valid".green().bold(),
            report.path.display(),
            report.size_bytes
        );
    } else {
        let reason = report
            .reason
            .as_ref()
            .map_or_else(|| "unknown".to_string(), ToString::to_string);
        println!("{} {}: {}", "invalid".red().bold(), report.path.display(), reason);
    }

    Ok(i32::from(!report.is_valid))
}
