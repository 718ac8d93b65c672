use crate::error::{Result, SyncError};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub username: String,
    pub github_token: Option<String>,
    pub root_path: PathBuf,
    pub api_url: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("github_token", &self.github_token.as_ref().map(|_| "[REDACTED]"))
            .field("root_path", &self.root_path)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            github_token: None,
            root_path: PathBuf::from("forks"),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub username: Option<String>,
    pub root_path: Option<PathBuf>,
}

impl Config {
    pub fn load(overrides: Overrides) -> Result<Self> {
        let config_file = match &overrides.config_file {
            Some(path) if !path.is_file() => {
                return Err(SyncError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            Some(path) => path.clone(),
            None => config_dir().join("forksync").join("config.toml"),
        };

        Self::figment(&config_file, overrides)
            .extract::<Config>()
            .map_err(|e| SyncError::Config(e.to_string()))?
            .validated()
    }

    fn figment(config_file: &std::path::Path, overrides: Overrides) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if config_file.exists() {
            figment = figment.merge(Toml::file(config_file));
        }

        figment = figment
            .merge(Env::prefixed("FORKSYNC_").ignore(&["username"]))
            .merge(
                Env::raw()
                    .only(&["GITHUB_TOKEN"])
                    .map(|_| "github_token".into()),
            );

        // taken verbatim: figment would parse an all-digit login as an integer
        if let Some(username) = Env::var("FORKSYNC_USERNAME") {
            figment = figment.merge(Serialized::default("username", username));
        }

        if let Some(username) = overrides.username {
            figment = figment.merge(Serialized::default("username", username));
        }
        if let Some(root) = overrides.root_path {
            figment = figment.merge(Serialized::default("root_path", root));
        }
        figment
    }

    fn validated(mut self) -> Result<Self> {
        self.username = self.username.trim().to_string();
        if self.username.is_empty() {
            return Err(SyncError::Config(
                "no GitHub username configured (set `username`, FORKSYNC_USERNAME or --user)"
                    .to_string(),
            ));
        }
        if self
            .github_token
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
        {
            self.github_token = None;
        }
        Ok(self)
    }
}

pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}
