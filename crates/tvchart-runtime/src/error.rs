use thiserror::Error;
use tvchart_api::ConnectionError;
use tvchart_core::error::DisplayableError;
use tvchart_core::models::EpisodeDescriptor;

/// A command failed. Local state has already been restored when this is returned.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("episode not found: {0}")]
    EpisodeNotFound(EpisodeDescriptor),
}

impl DisplayableError for CommandError {
    fn display_description(&self) -> String {
        match self {
            Self::Connection(e) => e.display_description(),
            Self::EpisodeNotFound(_) => "Episode is no longer available".into(),
        }
    }

    fn display_details(&self) -> Option<String> {
        match self {
            Self::Connection(e) => e.display_details(),
            Self::EpisodeNotFound(desc) => Some(desc.to_string()),
        }
    }
}
