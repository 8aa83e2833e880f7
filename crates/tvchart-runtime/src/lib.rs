pub mod command;
pub mod commands;
pub mod error;
pub mod error_list;
pub mod pipeline;

pub use command::{Command, CommandContext, SharedLibrary, UndoableCommand};
pub use commands::{LoadData, LoadMetadata, MarkWatchedUpTo, UpdateEpisodeStatus};
pub use error::CommandError;
pub use error_list::{ErrorDisplayItem, ErrorDisplayList};
pub use pipeline::CommandPipeline;
