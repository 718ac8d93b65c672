use crate::error::{Result, SyncError};
use std::path::Path;
use tokio::process::Command;

/// The version control operations a fork sync performs. Every call names the
/// directory it runs in; nothing depends on the process's current directory.
pub trait Vcs {
    /// Clones `url` into a new directory under `into_dir`.
    async fn clone_repo(&self, url: &str, into_dir: &Path) -> Result<()>;

    async fn pull(&self, dir: &Path) -> Result<()>;

    /// Never fails: a remote that already exists is left as it is.
    async fn add_remote(&self, name: &str, url: &str, dir: &Path);

    async fn fetch(&self, remote: &str, dir: &Path) -> Result<()>;

    async fn checkout(&self, branch: &str, dir: &Path) -> Result<()>;

    /// Merges `{remote}/{branch}` into the checked-out branch.
    async fn merge(&self, remote: &str, branch: &str, dir: &Path) -> Result<()>;

    async fn push(&self, remote: &str, branch: &str, dir: &Path) -> Result<()>;
}

/// Runs the `git` executable, one blocking-until-exit subprocess per call.
#[derive(Clone, Debug)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitCli {
    #[cfg(test)]
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    async fn run(&self, dir: &Path, args: &[&str]) -> Result<()> {
        let command = args.join(" ");
        tracing::debug!(dir = %dir.display(), "git {command}");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await
            .map_err(|source| SyncError::VcsSpawn {
                command: command.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stderr = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        Err(SyncError::Vcs {
            command,
            code: output.status.code(),
            stderr,
        })
    }
}

impl Vcs for GitCli {
    async fn clone_repo(&self, url: &str, into_dir: &Path) -> Result<()> {
        self.run(into_dir, &["clone", url]).await
    }

    async fn pull(&self, dir: &Path) -> Result<()> {
        self.run(dir, &["pull"]).await
    }

    async fn add_remote(&self, name: &str, url: &str, dir: &Path) {
        if let Err(e) = self.run(dir, &["remote", "add", name, url]).await {
            tracing::debug!(remote = name, error = %e, "remote add ignored");
        }
    }

    async fn fetch(&self, remote: &str, dir: &Path) -> Result<()> {
        self.run(dir, &["fetch", remote]).await
    }

    async fn checkout(&self, branch: &str, dir: &Path) -> Result<()> {
        self.run(dir, &["checkout", branch]).await
    }

    async fn merge(&self, remote: &str, branch: &str, dir: &Path) -> Result<()> {
        let tracking = format!("{remote}/{branch}");
        self.run(dir, &["merge", &tracking]).await
    }

    async fn push(&self, remote: &str, branch: &str, dir: &Path) -> Result<()> {
        self.run(dir, &["push", remote, branch]).await
    }
}
