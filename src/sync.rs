use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::git::command::Vcs;
use crate::git::workdir;
use crate::github::client::HostingApi;
use crate::github::discovery;
use crate::github::types::RepositoryDescriptor;
use std::fmt;
use std::path::PathBuf;

pub const UPSTREAM_REMOTE: &str = "upstream";
pub const ORIGIN_REMOTE: &str = "origin";

/// Progress of one repository through the update sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncStage {
    Start,
    UpstreamResolved,
    LocalCopyReady,
    RemoteConfigured,
    Fetched,
    CheckedOut,
    Merged,
    Pushed,
    Done,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::Start => "start",
            SyncStage::UpstreamResolved => "upstream resolved",
            SyncStage::LocalCopyReady => "local copy ready",
            SyncStage::RemoteConfigured => "remote configured",
            SyncStage::Fetched => "fetched",
            SyncStage::CheckedOut => "checked out",
            SyncStage::Merged => "merged",
            SyncStage::Pushed => "pushed",
            SyncStage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Updated,
    NoUpstream,
}

/// What a single repository's run amounted to, for logs and the summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncResult {
    Updated,
    NoUpstream,
    VcsFailure(String),
    UnknownFailure(String),
}

impl From<Result<SyncOutcome>> for SyncResult {
    fn from(result: Result<SyncOutcome>) -> Self {
        match result {
            Ok(SyncOutcome::Updated) => SyncResult::Updated,
            Ok(SyncOutcome::NoUpstream) => SyncResult::NoUpstream,
            Err(e @ SyncError::Vcs { .. }) => SyncResult::VcsFailure(e.to_string()),
            Err(e) => SyncResult::UnknownFailure(e.to_string()),
        }
    }
}

impl SyncResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncResult::VcsFailure(_) | SyncResult::UnknownFailure(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoReport {
    pub full_name: String,
    pub result: SyncResult,
    /// Last stage reached before the outcome was decided.
    pub stage: SyncStage,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<RepoReport>,
}

impl RunSummary {
    pub fn updated(&self) -> usize {
        self.count(|r| *r == SyncResult::Updated)
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| *r == SyncResult::NoUpstream)
    }

    pub fn failed(&self) -> usize {
        self.count(SyncResult::is_failure)
    }

    fn count(&self, pred: impl Fn(&SyncResult) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.result)).count()
    }
}

pub struct Orchestrator<A, V> {
    api: A,
    vcs: V,
    username: String,
    root: PathBuf,
}

impl<A: HostingApi, V: Vcs> Orchestrator<A, V> {
    pub fn new(config: &Config, api: A, vcs: V) -> Self {
        Self {
            api,
            vcs,
            username: config.username.clone(),
            root: config.root_path.clone(),
        }
    }

    /// Discovers every fork, then updates them one at a time. Only discovery
    /// and root creation can fail the run; per-repository failures land in
    /// the summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let forks = discovery::list_forks(&self.api, &self.username).await?;
        tracing::info!(count = forks.len(), "found forks of {}", self.username);

        std::fs::create_dir_all(&self.root).map_err(|source| SyncError::Filesystem {
            path: self.root.clone(),
            source,
        })?;

        let mut summary = RunSummary::default();
        for fork in &forks {
            summary.reports.push(self.process(fork).await);
        }

        tracing::info!(
            updated = summary.updated(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "sync finished"
        );
        Ok(summary)
    }

    /// Runs one fork through the sequence and always removes its working copy.
    pub async fn process(&self, repo: &RepositoryDescriptor) -> RepoReport {
        let mut stage = SyncStage::Start;
        let result = SyncResult::from(self.sync_repository(repo, &mut stage).await);

        match &result {
            SyncResult::Updated => tracing::info!("Successfully updated {}", repo.full_name),
            SyncResult::NoUpstream => {}
            SyncResult::VcsFailure(detail) => {
                tracing::error!(repo = %repo.full_name, %stage, "Git command failed: {detail}")
            }
            SyncResult::UnknownFailure(detail) => {
                tracing::error!(%stage, "Failed to update {}: {detail}", repo.full_name)
            }
        }

        workdir::remove_local_copy(&workdir::local_copy_path(&self.root, repo));

        RepoReport {
            full_name: repo.full_name.clone(),
            result,
            stage,
        }
    }

    async fn sync_repository(
        &self,
        repo: &RepositoryDescriptor,
        stage: &mut SyncStage,
    ) -> Result<SyncOutcome> {
        let Some(upstream_url) = discovery::resolve_upstream_url(&self.api, repo).await? else {
            tracing::info!("No upstream repository found for {}", repo.full_name);
            return Ok(SyncOutcome::NoUpstream);
        };
        advance(stage, SyncStage::UpstreamResolved, repo);

        // re-resolved on every run, even for an existing local copy
        let branch = discovery::resolve_default_branch(&self.api, repo).await;

        let dir = workdir::ensure_local_copy(&self.vcs, repo, &self.root).await?;
        advance(stage, SyncStage::LocalCopyReady, repo);

        self.vcs.add_remote(UPSTREAM_REMOTE, &upstream_url, &dir).await;
        advance(stage, SyncStage::RemoteConfigured, repo);

        self.vcs.fetch(UPSTREAM_REMOTE, &dir).await?;
        advance(stage, SyncStage::Fetched, repo);

        self.vcs.checkout(&branch, &dir).await?;
        advance(stage, SyncStage::CheckedOut, repo);

        self.vcs.merge(UPSTREAM_REMOTE, &branch, &dir).await?;
        advance(stage, SyncStage::Merged, repo);

        self.vcs.push(ORIGIN_REMOTE, &branch, &dir).await?;
        advance(stage, SyncStage::Pushed, repo);

        advance(stage, SyncStage::Done, repo);
        Ok(SyncOutcome::Updated)
    }
}

fn advance(stage: &mut SyncStage, next: SyncStage, repo: &RepositoryDescriptor) {
    tracing::debug!(repo = %repo.full_name, from = %stage, to = %next, "stage");
    *stage = next;
}
