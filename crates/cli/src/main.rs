mod cli;
mod commands;
mod config;
mod snapshot;
mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::Result;
use novella_core::{Library, ProviderRegistry};
use novella_storage::FilesystemStorage;
use tracing::{debug, info};

use crate::cli::{Cli, Commands};
use crate::commands::{
    handle_chapter_command, handle_config_command, handle_glossary_command,
    handle_history_command, handle_novel_command, handle_patch_command, handle_rank_command,
    handle_toc_command,
};
use crate::config::Config;
use crate::snapshot::SnapshotProvider;

async fn build_library(config: &Config, storage_path: PathBuf) -> Result<Library> {
    info!("Using storage at {}", storage_path.display());
    let storage = Arc::new(FilesystemStorage::new(storage_path));
    storage.initialize().await?;

    let mut providers = ProviderRegistry::new();
    for provider in &config.providers {
        debug!(
            "Registering provider {} from {}",
            provider.id, provider.snapshot_dir
        );
        providers.register(Arc::new(SnapshotProvider::from_config(provider)));
    }

    Ok(Library::new(storage, providers).with_options(config.library_options()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::get_config_path);

    // Commands that never touch the library
    let command = match cli.command {
        Commands::Config { command } => {
            return handle_config_command(command, &config_path, cli.dry_run).await;
        }
        Commands::Toc { command } => return handle_toc_command(command).await,
        command => command,
    };

    let config = Config::load(&config_path).await?;
    let storage_path = cli
        .storage_path
        .unwrap_or_else(|| PathBuf::from(&config.storage.path));
    let library = build_library(&config, storage_path).await?;
    library.seed_cookies().await;

    match command {
        Commands::Novel { command } => handle_novel_command(command, &library, &config).await,
        Commands::Chapter { command } => handle_chapter_command(command, &library).await,
        Commands::Glossary { command } => handle_glossary_command(command, &library).await,
        Commands::Patch { command } => handle_patch_command(command, &library).await,
        Commands::History { command } => handle_history_command(command, &library).await,
        Commands::Rank {
            provider,
            list,
            page,
            keyword,
        } => handle_rank_command(&library, provider, list, page, keyword).await,
        Commands::Config { .. } | Commands::Toc { .. } => Ok(()),
    }
}
