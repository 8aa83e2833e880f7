use serde::{Deserialize, Serialize};

use tvchart_core::codec::{decode_seasons, encode_seasons};
use tvchart_core::error::CodecError;
use tvchart_core::legacy::{apply_seen_thru, SeenThru};
use tvchart_core::models::{EpisodeDescriptor, Show};

/// A show as served by `GET /shows`.
///
/// Older servers send `seenThru` instead of `watchedEpisodeMaps`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowDto {
    pub id: i64,
    pub title: String,
    pub tvmaze_id: String,
    pub favorite: bool,
    pub location: String,
    pub length: String,
    pub season_maps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_episode_maps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seen_thru: Option<SeenThru>,
}

impl ShowDto {
    pub fn into_show(self) -> Result<Show, CodecError> {
        let watched_maps = self.watched_episode_maps.as_deref().unwrap_or_default();
        let seasons = decode_seasons(&self.season_maps, watched_maps)?;

        let mut show = Show {
            id: self.id,
            title: self.title,
            catalog_id: self.tvmaze_id,
            favorite: self.favorite,
            location: self.location,
            episode_length: self.length,
            seasons,
        };
        show.relink();

        if self.watched_episode_maps.is_none() {
            if let Some(mark) = self.seen_thru {
                apply_seen_thru(&mut show, mark);
            }
        }
        Ok(show)
    }

    pub fn from_show(show: &Show) -> Self {
        let (season_maps, watched_maps) = encode_seasons(show);
        Self {
            id: show.id,
            title: show.title.clone(),
            tvmaze_id: show.catalog_id.clone(),
            favorite: show.favorite,
            location: show.location.clone(),
            length: show.episode_length.clone(),
            season_maps,
            watched_episode_maps: Some(watched_maps),
            seen_thru: None,
        }
    }
}

/// Episode address on the wire. Unlike the domain model, seasons are 0-based here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEpisodeDescriptor {
    pub season_index: u32,
    pub episode_index: u32,
}

impl From<&EpisodeDescriptor> for ApiEpisodeDescriptor {
    fn from(desc: &EpisodeDescriptor) -> Self {
        Self {
            season_index: desc.season.saturating_sub(1),
            episode_index: desc.episode_index,
        }
    }
}

/// Body of `POST /shows/{id}/update-status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateDto {
    pub watched: Vec<ApiEpisodeDescriptor>,
    pub unwatched: Vec<ApiEpisodeDescriptor>,
}

impl StatusUpdateDto {
    pub fn new(watched: &[EpisodeDescriptor], unwatched: &[EpisodeDescriptor]) -> Self {
        Self {
            watched: watched.iter().map(Into::into).collect(),
            unwatched: unwatched.iter().map(Into::into).collect(),
        }
    }
}
