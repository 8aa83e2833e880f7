use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tvchart_api::traits::{Backend, MetadataService};
use tvchart_core::models::{EpisodeDescriptor, Library};

use crate::error::CommandError;

/// The show library shared between commands and whatever renders it.
pub type SharedLibrary = Arc<RwLock<Library>>;

/// Everything a command may touch.
#[derive(Clone)]
pub struct CommandContext {
    pub backend: Arc<dyn Backend>,
    pub metadata: Arc<dyn MetadataService>,
    pub library: SharedLibrary,
}

impl CommandContext {
    pub fn new(backend: Arc<dyn Backend>, metadata: Arc<dyn MetadataService>) -> Self {
        Self {
            backend,
            metadata,
            library: SharedLibrary::default(),
        }
    }

    /// Set one episode's watched flag, returning its previous value. `None` when the
    /// episode is not in the library, e.g. after a reload reshaped its season.
    pub(crate) async fn set_watched(
        &self,
        episode: &EpisodeDescriptor,
        watched: bool,
    ) -> Option<bool> {
        let mut library = self.library.write().await;
        let ep = library.find_episode_mut(episode)?;
        Some(std::mem::replace(&mut ep.is_watched, watched))
    }

    /// Set the watched flag on every described episode of one show.
    pub(crate) async fn set_all_watched(
        &self,
        show_id: i64,
        episodes: &[EpisodeDescriptor],
        watched: bool,
    ) {
        let mut library = self.library.write().await;
        if let Some(show) = library.find_show_mut(show_id) {
            show.set_watched(episodes, watched);
        }
    }
}

/// A user intent that can be executed against a [`CommandContext`].
#[async_trait]
pub trait Command: Send {
    type Output: Send;

    async fn execute(&mut self, ctx: &CommandContext) -> Result<Self::Output, CommandError>;

    /// Hand an executed command over to the undo stack. Commands that cannot be
    /// undone keep the default.
    fn into_undoable(self: Box<Self>) -> Option<Box<dyn UndoableCommand>> {
        None
    }
}

/// The reversible half of a command that has already been executed.
#[async_trait]
pub trait UndoableCommand: Send + Sync {
    /// What undoing would revert, e.g. "Mark Episode Watched".
    fn undo_description(&self) -> String;

    async fn undo(&mut self, ctx: &CommandContext) -> Result<(), CommandError>;
}
