use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::github::types::{RepositoryDescriptor, RepositoryDetail};
use octocrab::Octocrab;
use serde::Serialize;

pub const PAGE_SIZE: u8 = 100;

/// Read-only view of the hosting API used during discovery.
pub trait HostingApi {
    /// One page of the user's repositories, in API order. Pages start at 1.
    async fn list_user_repos(&self, username: &str, page: u32) -> Result<Vec<RepositoryDescriptor>>;

    /// The detail object behind a repository's API `url`.
    async fn repository_detail(&self, url: &str) -> Result<RepositoryDetail>;
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Clone)]
pub struct GitHubClient {
    octo: Octocrab,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Octocrab::builder()
            .base_uri(config.api_url.as_str())
            .map_err(|e| SyncError::Config(format!("invalid api_url {}: {e}", config.api_url)))?;
        if let Some(token) = &config.github_token {
            builder = builder.personal_token(token.clone());
        }
        let octo = builder
            .build()
            .map_err(|e| SyncError::Api(e.to_string()))?;

        Ok(Self { octo })
    }
}

impl HostingApi for GitHubClient {
    async fn list_user_repos(&self, username: &str, page: u32) -> Result<Vec<RepositoryDescriptor>> {
        let params = PageParams {
            per_page: PAGE_SIZE,
            page,
        };
        self.octo
            .get(format!("/users/{username}/repos"), Some(&params))
            .await
            .map_err(|e| SyncError::Api(format!("listing repositories of {username} (page {page}): {e}")))
    }

    async fn repository_detail(&self, url: &str) -> Result<RepositoryDetail> {
        self.octo
            .get(url, None::<&()>)
            .await
            .map_err(|e| SyncError::Api(format!("{url}: {e}")))
    }
}
