use crate::error::{CheckpointError, CheckpointResult};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Fetch seam for a remote model repository. The engine only ever calls this
/// when the policy explicitly allows remote fetch and every local candidate
/// has been exhausted; it is never hidden inside the local resolution path.
#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Download one artifact of `base_model_id` into `dest_dir` and return
    /// the local path.
    async fn fetch(
        &self,
        base_model_id: &str,
        artifact_name: &str,
        dest_dir: &Path,
    ) -> CheckpointResult<PathBuf>;
}

/// HTTP-backed repository: artifacts live at
/// `<base_url>/<base_model_id>/<artifact_name>`.
pub struct HttpRepository {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRepository {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), client: reqwest::Client::new() }
    }
}

#[async_trait]
impl RemoteRepository for HttpRepository {
    async fn fetch(
        &self,
        base_model_id: &str,
        artifact_name: &str,
        dest_dir: &Path,
    ) -> CheckpointResult<PathBuf> {
        let url = format!(
            "{}/{base_model_id}/{artifact_name}",
            self.base_url.trim_end_matches('/')
        );
        info!(%url, "fetching base checkpoint from remote repository");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CheckpointError::Remote(format!("{url}: {e}")))?;
        if !response.status().is_success() {
            return Err(CheckpointError::Remote(format!("{url}: HTTP {}", response.status())));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CheckpointError::Remote(format!("{url}: {e}")))?;

        std::fs::create_dir_all(dest_dir)?;
        let dest = dest_dir.join(artifact_name);

        // Temp-then-rename so a concurrent resolver never sees a partial file.
        let mut tmp = NamedTempFile::new_in(dest_dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&dest).map_err(|e| CheckpointError::Io(e.error))?;

        info!(dest = %dest.display(), size_bytes = bytes.len(), "remote fetch complete");
        Ok(dest)
    }
}
