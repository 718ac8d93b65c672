use crate::error::{Result, SyncError};
use crate::git::command::Vcs;
use crate::github::types::RepositoryDescriptor;
use std::path::{Path, PathBuf};

pub fn local_copy_path(root: &Path, repo: &RepositoryDescriptor) -> PathBuf {
    root.join(&repo.name)
}

/// Clones the fork under `root` when its directory is missing, otherwise
/// pulls inside the existing one. Returns the working copy path.
pub async fn ensure_local_copy<V: Vcs>(
    vcs: &V,
    repo: &RepositoryDescriptor,
    root: &Path,
) -> Result<PathBuf> {
    let dir = local_copy_path(root, repo);

    if dir.exists() {
        tracing::info!("Updating {}", repo.full_name);
        vcs.pull(&dir).await?;
    } else {
        tracing::info!("Cloning {}", repo.full_name);
        vcs.clone_repo(&repo.clone_url, root).await?;
    }

    Ok(dir)
}

/// Deletes a working copy. Failures (including an already missing directory)
/// are logged and swallowed.
pub fn remove_local_copy(path: &Path) {
    match try_remove(path) {
        Ok(()) => tracing::info!("Removed local repository {}", path.display()),
        Err(e) => tracing::warn!("Error: {e}"),
    }
}

fn try_remove(path: &Path) -> Result<()> {
    std::fs::remove_dir_all(path).map_err(|source| SyncError::Filesystem {
        path: path.to_path_buf(),
        source,
    })
}
