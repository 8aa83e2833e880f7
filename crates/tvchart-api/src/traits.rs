//! Seams between the command layer and remote services.
//!
//! Both traits are object-safe so commands can hold them as `Arc<dyn ...>`
//! and tests can substitute in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tvchart_core::models::{EpisodeDescriptor, Show};

use crate::error::{ConnectionError, MetadataError};

/// The sync server.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetch every show with its full season layout and watched status.
    async fn fetch_all_shows(&self) -> Result<Vec<Show>, ConnectionError>;

    /// Submit one show's batch of watched/unwatched changes.
    async fn update_episode_status(
        &self,
        show_id: i64,
        watched: &[EpisodeDescriptor],
        unwatched: &[EpisodeDescriptor],
    ) -> Result<(), ConnectionError>;
}

/// Per-episode details from the external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeMetadata {
    pub season: u32,
    /// Official number; `None` for specials.
    pub episode: Option<u32>,
    pub title: String,
    pub length: String,
    pub synopsis: Option<String>,
}

/// Episode metadata lookup, addressed the same way as the show tree.
#[async_trait]
pub trait MetadataService: Send + Sync {
    async fn get_episode_metadata(
        &self,
        catalog_id: &str,
        season: u32,
        episode_index: u32,
    ) -> Result<EpisodeMetadata, MetadataError>;
}
