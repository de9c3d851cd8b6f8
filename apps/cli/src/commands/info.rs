//! `voxt info` - print sidecar provenance metadata for an artifact.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use voxtune_checkpoint::MetadataStore;

pub fn execute(path: &Path, json: bool) -> Result<i32> {
    let Some(metadata) = MetadataStore::load(path) else {
        println!("{} for {}", "no metadata".yellow(), path.display());
        return Ok(1);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        println!("{}", metadata.artifact_name.bold());
        println!("  created_at:  {}", metadata.created_at);
        println!("  size_bytes:  {}", metadata.size_bytes);
        println!("  fingerprint: {}", metadata.content_fingerprint);
        println!("  schema:      v{}", metadata.schema_version);
        if !metadata.training_config.is_null() {
            println!("  training_config: {}", metadata.training_config);
        }
    }
    Ok(0)
}
