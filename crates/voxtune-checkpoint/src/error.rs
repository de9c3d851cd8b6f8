use thiserror::Error;

pub type CheckpointResult<T> = std::result::Result<T, CheckpointError>;

#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Every candidate in the resolution order was exhausted without a valid
    /// artifact. The message carries the per-candidate rejection reasons.
    #[error("no valid checkpoint found: {0}")]
    NotFound(String),

    #[error("invalid resolution policy: {0}")]
    InvalidPolicy(String),

    #[error("remote fetch failed: {0}")]
    Remote(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
