mod config;
mod error;
mod git;
mod github;
mod sync;
#[cfg(test)]
mod test_utils;

use clap::Parser;
use config::{Config, Overrides};
use git::command::GitCli;
use github::client::GitHubClient;
use std::path::PathBuf;
use sync::Orchestrator;

#[derive(Parser)]
#[command(name = "forksync", about = "Merge upstream changes into your GitHub forks")]
struct Cli {
    #[arg(long, help = "Path to a config file")]
    config: Option<PathBuf>,

    #[arg(long, short, help = "GitHub user whose forks are synced")]
    user: Option<String>,

    #[arg(long, short, help = "Directory for temporary working copies")]
    root: Option<PathBuf>,

    #[arg(long, help = "List the forks that would be synced and exit")]
    list: bool,

    #[arg(long, short, help = "Log every git command and stage change")]
    verbose: bool,
}

// Repositories are processed one at a time; a single thread is all the run needs
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> error::Result<()> {
    let config = Config::load(Overrides {
        config_file: cli.config,
        username: cli.user,
        root_path: cli.root,
    })?;
    tracing::debug!(?config, "configuration loaded");

    let client = GitHubClient::new(&config)?;

    if cli.list {
        let forks = github::discovery::list_forks(&client, &config.username).await?;
        for fork in &forks {
            match &fork.parent {
                Some(parent) => println!("{}\t{}\t<- {}", fork.full_name, fork.clone_url, parent.clone_url),
                None => println!("{}\t{}", fork.full_name, fork.clone_url),
            }
        }
        return Ok(());
    }

    Orchestrator::new(&config, client, GitCli::default())
        .run()
        .await?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "forksync=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
