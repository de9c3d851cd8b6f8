//! Voxtune CLI - Checkpoint management for voice-model training runs
//!
//! This CLI provides a `voxt` command for validating checkpoint artifacts,
//! resolving which checkpoint a run should load, and inspecting sidecar
//! provenance metadata.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use voxtune_checkpoint::CheckpointConfig;

/// Voxtune CLI - checkpoint validation, resolution and inspection
#[derive(Parser, Debug)]
#[command(
    name = "voxt",
    author,
    version,
    about = "Voxtune - checkpoint management for voice-model training runs"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Path to a checkpoint engine config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a checkpoint artifact
    ///
    /// Exit code 0 when the artifact is usable, 1 otherwise.
    Validate {
        /// Path to the artifact
        path: PathBuf,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve the checkpoint a run should load
    ///
    /// Walks the candidate priority ladder (override, named, best marker,
    /// last marker, highest numbered, pretrained base, remote fetch) and
    /// prints the first valid artifact. Exit code 1 when nothing resolves.
    Resolve {
        /// Training run output directory
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Specific artifact name inside the output directory
        #[arg(long)]
        name: Option<String>,

        /// Explicit checkpoint path, tried before anything else
        #[arg(long = "override")]
        override_path: Option<PathBuf>,

        /// Pretrained base checkpoint to fall back on
        #[arg(long)]
        pretrained: Option<PathBuf>,

        /// Base model id in the remote repository
        #[arg(long)]
        model_id: Option<String>,

        /// Never fetch from the remote repository
        #[arg(long)]
        no_download: bool,

        /// Print every candidate tried and why it was rejected
        #[arg(long)]
        trace: bool,

        /// Output the resolution as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show sidecar metadata for an artifact
    Info {
        /// Path to the artifact
        path: PathBuf,

        /// Output the metadata as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => CheckpointConfig::from_toml_path(path)?,
        None => CheckpointConfig::default(),
    };

    let exit_code = match args.command {
        Command::Validate { path, json } => commands::validate::execute(&path, json, &config)?,
        Command::Resolve {
            output_dir,
            name,
            override_path,
            pretrained,
            model_id,
            no_download,
            trace,
            json,
        } => {
            commands::resolve::execute(commands::resolve::ResolveArgs {
                output_dir,
                name,
                override_path,
                pretrained,
                model_id,
                no_download,
                trace,
                json,
                config,
            })
            .await?
        }
        Command::Info { path, json } => commands::info::execute(&path, json)?,
    };

    std::process::exit(exit_code);
}
