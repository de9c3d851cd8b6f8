use crate::error::CheckpointResult;
use crate::layout::CheckpointLayout;
use crate::metadata::sidecar_path;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Rename a corrupt artifact in place so candidate discovery never matches it
/// again. The sidecar, if present, follows the artifact. Idempotent: an
/// already-quarantined path is left alone. Never deletes anything, so a
/// false positive stays recoverable by manual rename.
pub fn quarantine_artifact(
    layout: &CheckpointLayout,
    path: &Path,
    reason: &str,
) -> CheckpointResult<PathBuf> {
    if layout.is_quarantined(path) {
        return Ok(path.to_path_buf());
    }

    let dest = layout.quarantined_path(path);
    std::fs::rename(path, &dest)?;
    warn!(
        from = %path.display(),
        to = %dest.display(),
        reason,
        "quarantined corrupt checkpoint artifact"
    );

    let sidecar = sidecar_path(path);
    if sidecar.exists() {
        let sidecar_dest = sidecar_path(&dest);
        if let Err(e) = std::fs::rename(&sidecar, &sidecar_dest) {
            warn!(
                sidecar = %sidecar.display(),
                error = %e,
                "failed to move sidecar alongside quarantined artifact"
            );
        }
    }

    Ok(dest)
}
