mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use content_sync::store::{CONFIG_FETCHED_KEY, LAST_COMMIT_HASH_KEY};
use content_sync::{
    FrontMatterParser, MetadataStore, PublishedContent, RepositoryInfo, Synchronizer,
};
use content_sync_github::{GitHubRemote, GitHubRemoteConfig};
use content_sync_store::ContentStore;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "content-sync")]
#[command(about = "Synchronize repository content into a local cache")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one sync pass against the configured repository
    Sync,
    /// Show stored sync metadata and cache statistics
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .init();

    let config = config::load_config()?;
    let store = open_store(&config)?;

    match cli.command {
        Command::Sync => run_sync(&config, store).await,
        Command::Status => run_status(&config, store).await,
    }
}

fn open_store(config: &AppConfig) -> Result<Arc<ContentStore>> {
    let db_path =
        config::cache_db_path(config).context("no data directory available for the cache")?;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let store = ContentStore::open(&db_path, config.namespace())
        .with_context(|| format!("failed to open cache at {}", db_path.display()))?;

    Ok(Arc::new(store))
}

async fn run_sync(config: &AppConfig, store: Arc<ContentStore>) -> Result<()> {
    let remote = Arc::new(GitHubRemote::new(GitHubRemoteConfig {
        owner: config.owner.clone(),
        repo: config.repo.clone(),
        token: config.token.clone(),
        api_base_url: None,
    }));

    let state = Arc::new(PublishedContent::new());

    let mut synchronizer = Synchronizer::new(
        RepositoryInfo {
            namespace: config.namespace(),
            branch: config.branch.clone(),
        },
        remote,
        store.clone(),
        store.clone(),
        Arc::new(config.path_rules()),
        Arc::new(FrontMatterParser),
        state.clone(),
    );

    let outcome = synchronizer
        .synchronize()
        .await
        .with_context(|| format!("sync failed for {}", config.namespace()))?;

    println!(
        "synced {} at {} ({} entries, {} assets, {} config files, {} fetched)",
        config.namespace(),
        outcome.commit_hash,
        outcome.entries,
        outcome.assets,
        outcome.config_files,
        outcome.fetched,
    );

    for error in &state.snapshot().parse_errors {
        eprintln!("warning: {error}");
    }

    if !state.last_commit_published() {
        println!("note: the latest commit did not trigger a deployment");
    }

    // The process is about to exit, so give the background prune a chance
    // to land.
    if let Some(prune) = outcome.prune {
        let _ = prune.await;
    }

    Ok(())
}

async fn run_status(config: &AppConfig, store: Arc<ContentStore>) -> Result<()> {
    let last_hash = store.get(LAST_COMMIT_HASH_KEY).await?;
    let config_fetched = store.get(CONFIG_FETCHED_KEY).await?;
    let cached_files = store.cached_file_count()?;

    println!("repository:     {}", config.namespace());
    println!("branch:         {}", config.branch.as_deref().unwrap_or("(default)"));
    println!(
        "last commit:    {}",
        last_hash.as_deref().unwrap_or("(never synced)")
    );
    println!(
        "config fetched: {}",
        config_fetched.as_deref().unwrap_or("false")
    );
    println!("cached files:   {cached_files}");

    Ok(())
}
