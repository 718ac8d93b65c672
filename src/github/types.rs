use serde::Deserialize;

/// One entry of `GET /users/{username}/repos`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub fork: bool,
    pub url: String,
    pub clone_url: String,
    #[serde(default)]
    pub parent: Option<ParentRepository>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ParentRepository {
    pub clone_url: String,
}

/// The fields of `GET {repo.url}` that a fork sync needs.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct RepositoryDetail {
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub parent: Option<ParentRepository>,
}
