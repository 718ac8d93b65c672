#![cfg(test)]

use crate::error::{Result, SyncError};
use crate::git::command::Vcs;
use crate::github::client::HostingApi;
use crate::github::types::{ParentRepository, RepositoryDescriptor, RepositoryDetail};
use git2::{build::RepoBuilder, Commit, Repository, RepositoryInitOptions, Signature};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn parent(clone_url: &str) -> ParentRepository {
    ParentRepository {
        clone_url: clone_url.to_string(),
    }
}

pub fn make_repo(name: &str) -> RepositoryDescriptor {
    RepositoryDescriptor {
        name: name.to_string(),
        full_name: format!("octo/{name}"),
        fork: false,
        url: format!("https://api.github.com/repos/octo/{name}"),
        clone_url: format!("https://github.com/octo/{name}.git"),
        parent: None,
    }
}

pub fn make_fork(name: &str, parent_url: Option<&str>) -> RepositoryDescriptor {
    RepositoryDescriptor {
        fork: true,
        parent: parent_url.map(parent),
        ..make_repo(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    ListPage(u32),
    Detail(String),
}

/// Serves canned pages and detail objects; anything unregistered is a 404.
#[derive(Default)]
pub struct FakeApi {
    pages: Vec<Vec<RepositoryDescriptor>>,
    details: HashMap<String, RepositoryDetail>,
    failing_page: Option<u32>,
    calls: RefCell<Vec<ApiCall>>,
}

impl FakeApi {
    pub fn with_pages(pages: Vec<Vec<RepositoryDescriptor>>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    pub fn with_detail(mut self, url: &str, detail: RepositoryDetail) -> Self {
        self.details.insert(url.to_string(), detail);
        self
    }

    pub fn failing_page(mut self, page: u32) -> Self {
        self.failing_page = Some(page);
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.borrow().clone()
    }
}

impl HostingApi for FakeApi {
    async fn list_user_repos(&self, username: &str, page: u32) -> Result<Vec<RepositoryDescriptor>> {
        self.calls.borrow_mut().push(ApiCall::ListPage(page));
        if self.failing_page == Some(page) {
            return Err(SyncError::Api(format!("{username} page {page}: 502 Bad Gateway")));
        }
        let idx = page.saturating_sub(1) as usize;
        Ok(self.pages.get(idx).cloned().unwrap_or_default())
    }

    async fn repository_detail(&self, url: &str) -> Result<RepositoryDetail> {
        self.calls.borrow_mut().push(ApiCall::Detail(url.to_string()));
        self.details
            .get(url)
            .cloned()
            .ok_or_else(|| SyncError::Api(format!("{url}: 404 Not Found")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VcsCall {
    Clone { url: String, into: PathBuf },
    Pull { dir: PathBuf },
    AddRemote { name: String, url: String, dir: PathBuf },
    Fetch { remote: String, dir: PathBuf },
    Checkout { branch: String, dir: PathBuf },
    Merge { remote: String, branch: String, dir: PathBuf },
    Push { remote: String, branch: String, dir: PathBuf },
}

impl VcsCall {
    pub fn op(&self) -> &'static str {
        match self {
            VcsCall::Clone { .. } => "clone",
            VcsCall::Pull { .. } => "pull",
            VcsCall::AddRemote { .. } => "remote",
            VcsCall::Fetch { .. } => "fetch",
            VcsCall::Checkout { .. } => "checkout",
            VcsCall::Merge { .. } => "merge",
            VcsCall::Push { .. } => "push",
        }
    }
}

/// Records every call. A clone creates the directory git would; `fail_on`
/// makes the named operation exit non-zero.
#[derive(Default)]
pub struct FakeVcs {
    fail_on: Option<&'static str>,
    calls: RefCell<Vec<VcsCall>>,
}

impl FakeVcs {
    pub fn failing_on(op: &'static str) -> Self {
        Self {
            fail_on: Some(op),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.borrow().clone()
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(VcsCall::op).collect()
    }

    fn record(&self, call: VcsCall) -> Result<()> {
        let op = call.op();
        self.calls.borrow_mut().push(call);
        if self.fail_on == Some(op) {
            return Err(SyncError::Vcs {
                command: op.to_string(),
                code: Some(1),
                stderr: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Vcs for FakeVcs {
    async fn clone_repo(&self, url: &str, into_dir: &Path) -> Result<()> {
        self.record(VcsCall::Clone {
            url: url.to_string(),
            into: into_dir.to_path_buf(),
        })?;
        let name = url.rsplit('/').next().unwrap_or(url).trim_end_matches(".git");
        std::fs::create_dir_all(into_dir.join(name))?;
        Ok(())
    }

    async fn pull(&self, dir: &Path) -> Result<()> {
        self.record(VcsCall::Pull {
            dir: dir.to_path_buf(),
        })
    }

    async fn add_remote(&self, name: &str, url: &str, dir: &Path) {
        let _ = self.record(VcsCall::AddRemote {
            name: name.to_string(),
            url: url.to_string(),
            dir: dir.to_path_buf(),
        });
    }

    async fn fetch(&self, remote: &str, dir: &Path) -> Result<()> {
        self.record(VcsCall::Fetch {
            remote: remote.to_string(),
            dir: dir.to_path_buf(),
        })
    }

    async fn checkout(&self, branch: &str, dir: &Path) -> Result<()> {
        self.record(VcsCall::Checkout {
            branch: branch.to_string(),
            dir: dir.to_path_buf(),
        })
    }

    async fn merge(&self, remote: &str, branch: &str, dir: &Path) -> Result<()> {
        self.record(VcsCall::Merge {
            remote: remote.to_string(),
            branch: branch.to_string(),
            dir: dir.to_path_buf(),
        })
    }

    async fn push(&self, remote: &str, branch: &str, dir: &Path) -> Result<()> {
        self.record(VcsCall::Push {
            remote: remote.to_string(),
            branch: branch.to_string(),
            dir: dir.to_path_buf(),
        })
    }
}

/// A non-bare upstream one commit ahead of a bare `fork.git` cloned from it,
/// plus an empty working root.
pub struct GitFixture {
    _tmp: TempDir,
    upstream: PathBuf,
    origin: PathBuf,
    root: PathBuf,
}

impl GitFixture {
    pub const FORK_NAME: &'static str = "fork";

    pub fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let upstream = tmp.path().join("upstream");
        let origin = tmp.path().join(format!("{}.git", Self::FORK_NAME));
        let root = tmp.path().join("work");
        std::fs::create_dir(&root).unwrap();

        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let up = Repository::init_opts(&upstream, &opts).unwrap();
        commit_file(&up, "README.md", "one\n", "initial");

        RepoBuilder::new()
            .bare(true)
            .clone(&upstream.to_string_lossy(), &origin)
            .unwrap();

        commit_file(&up, "README.md", "one\ntwo\n", "upstream change");

        Self {
            _tmp: tmp,
            upstream,
            origin,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn origin_url(&self) -> String {
        self.origin.to_string_lossy().to_string()
    }

    pub fn upstream_url(&self) -> String {
        self.upstream.to_string_lossy().to_string()
    }

    pub fn origin_main(&self) -> git2::Oid {
        Repository::open_bare(&self.origin)
            .unwrap()
            .refname_to_id("refs/heads/main")
            .unwrap()
    }

    pub fn upstream_main(&self) -> git2::Oid {
        Repository::open(&self.upstream)
            .unwrap()
            .refname_to_id("refs/heads/main")
            .unwrap()
    }
}

fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> git2::Oid {
    let sig = Signature::now("Fixture", "fixture@example.com").unwrap();
    let workdir = repo.workdir().unwrap();
    std::fs::write(workdir.join(name), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let parents: Vec<Commit> = repo
        .head()
        .ok()
        .and_then(|h| h.peel_to_commit().ok())
        .into_iter()
        .collect();
    let parent_refs: Vec<&Commit> = parents.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}
