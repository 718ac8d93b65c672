use crate::error::Result;
use crate::github::client::HostingApi;
use crate::github::types::RepositoryDescriptor;

pub const FALLBACK_BRANCH: &str = "master";

/// Walks the user's repository pages from page 1 until an empty page and
/// keeps the forks, in API order. Any failed page fails the whole listing.
pub async fn list_forks<A: HostingApi>(api: &A, username: &str) -> Result<Vec<RepositoryDescriptor>> {
    let mut forks = Vec::new();
    let mut page = 1u32;

    loop {
        let repos = api.list_user_repos(username, page).await?;
        if repos.is_empty() {
            break;
        }
        tracing::debug!(page, count = repos.len(), "fetched repository page");
        forks.extend(repos.into_iter().filter(|r| r.fork));
        page += 1;
    }

    Ok(forks)
}

pub async fn resolve_default_branch<A: HostingApi>(api: &A, repo: &RepositoryDescriptor) -> String {
    match api.repository_detail(&repo.url).await {
        Ok(detail) => detail
            .default_branch
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string()),
        Err(e) => {
            tracing::debug!(repo = %repo.full_name, error = %e, "default branch lookup failed, assuming {FALLBACK_BRANCH}");
            FALLBACK_BRANCH.to_string()
        }
    }
}

/// Parent clone URL, taken from the listing when present, otherwise from one
/// detail request. `None` means the repository shows no upstream.
pub async fn resolve_upstream_url<A: HostingApi>(
    api: &A,
    repo: &RepositoryDescriptor,
) -> Result<Option<String>> {
    if let Some(parent) = &repo.parent {
        return Ok(Some(parent.clone_url.clone()));
    }

    let detail = api.repository_detail(&repo.url).await?;
    Ok(detail.parent.map(|p| p.clone_url))
}
