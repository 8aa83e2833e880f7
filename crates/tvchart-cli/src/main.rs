mod cli;

use std::sync::Arc;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tvchart_api::{MetadataError, ReqwestHost, SyncClient, TransportError, TvMazeClient};
use tvchart_core::codec::watched_map;
use tvchart_core::config::{AppConfig, ServerConfig};
use tvchart_core::error::CoreError;
use tvchart_runtime::{
    CommandContext, CommandError, CommandPipeline, ErrorDisplayList, LoadData, LoadMetadata,
    MarkWatchedUpTo, UpdateEpisodeStatus,
};

use crate::cli::{Cli, Command};

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] CoreError),
    #[error("{0}")]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Metadata(#[from] MetadataError),
    #[error("{0}")]
    Command(#[from] CommandError),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tvchart=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        let mut errors = ErrorDisplayList::new();
        match &e {
            CliError::Config(e) => errors.add_plain(e),
            CliError::Transport(e) => errors.add(e),
            CliError::Metadata(e) => errors.add(e),
            CliError::Command(e) => errors.add(e),
        };
        for item in errors.items() {
            match &item.details {
                Some(details) => eprintln!("Error: {} ({details})", item.description),
                None => eprintln!("Error: {}", item.description),
            }
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if !cli.hosts.is_empty() {
        config.server.hosts = cli.hosts;
    }

    let backend = sync_client(&config.server)?;
    let metadata = TvMazeClient::from_base_url(&config.metadata.base_url)?;
    let mut pipeline =
        CommandPipeline::new(CommandContext::new(Arc::new(backend), Arc::new(metadata)));

    let count = pipeline.execute(LoadData).await?;
    tracing::debug!(count, "Shows loaded");

    match cli.command {
        Command::List => print_library(&pipeline).await,
        Command::Watch(args) => {
            pipeline
                .execute(UpdateEpisodeStatus::new(args.descriptor(), true))
                .await?;
            println!("Marked {} watched", args.descriptor());
        }
        Command::Unwatch(args) => {
            pipeline
                .execute(UpdateEpisodeStatus::new(args.descriptor(), false))
                .await?;
            println!("Marked {} unwatched", args.descriptor());
        }
        Command::WatchUpTo(args) => {
            let changed = pipeline
                .execute(MarkWatchedUpTo::new(args.descriptor()))
                .await?;
            println!("Marked {} episode(s) watched", changed.len());
            for desc in changed {
                println!("  {desc}");
            }
        }
        Command::Metadata(args) => {
            let meta = pipeline
                .execute(LoadMetadata::new(args.descriptor()))
                .await?;
            let number = meta
                .episode
                .map_or_else(|| "special".to_string(), |n| format!("#{n}"));
            println!("S{} {number}: {}", meta.season, meta.title);
            println!("Length: {}", meta.length);
            if let Some(synopsis) = meta.synopsis {
                println!();
                println!("{synopsis}");
            }
        }
    }
    Ok(())
}

/// Host list problems surface as config errors, not transport errors.
fn sync_client(server: &ServerConfig) -> Result<SyncClient<ReqwestHost>, CliError> {
    let hosts = server.host_urls()?;
    Ok(SyncClient::with_hosts(hosts, server.request_timeout())?)
}

async fn print_library(pipeline: &CommandPipeline) {
    let library = pipeline.library().read().await;
    for show in library.shows() {
        let marker = if show.favorite { "*" } else { " " };
        println!(
            "{marker}{:>6}  {}  [{}/{}]",
            show.id,
            show.title,
            show.watched_count(),
            show.episode_count()
        );
        for season in &show.seasons {
            println!("         S{:<3} {}", season.number, watched_map(season));
        }
    }
}
