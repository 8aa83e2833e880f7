use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tvchart_core::models::EpisodeDescriptor;

#[derive(Parser, Debug)]
#[command(name = "tvchart")]
#[command(about = "Track watched episodes against a TV chart sync server", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the per-user config, then built-in defaults)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Server base URL; repeat to race several. Replaces the configured hosts.
    #[arg(long = "host", global = true, value_name = "URL")]
    pub hosts: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every show with its per-season watched maps
    List,
    /// Mark one episode watched
    Watch(EpisodeArgs),
    /// Mark one episode unwatched
    Unwatch(EpisodeArgs),
    /// Mark every episode up to and including this one watched
    WatchUpTo(EpisodeArgs),
    /// Look up catalog details for one episode
    Metadata(EpisodeArgs),
}

#[derive(Args, Debug, Clone, Copy)]
pub struct EpisodeArgs {
    pub show_id: i64,
    /// 1-based season number
    pub season: u32,
    /// 0-based episode index within the season, separators excluded
    pub episode_index: u32,
}

impl EpisodeArgs {
    pub fn descriptor(self) -> EpisodeDescriptor {
        EpisodeDescriptor::new(self.show_id, self.season, self.episode_index)
    }
}
