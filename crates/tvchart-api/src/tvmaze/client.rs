use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::types::{group_by_season, TvMazeEpisode};
use crate::error::MetadataError;
use crate::traits::{EpisodeMetadata, MetadataService};

/// TVmaze episode listing client. Every lookup fetches the full listing.
pub struct TvMazeClient {
    base_url: Url,
    http: Client,
}

impl TvMazeClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            http: Client::new(),
        }
    }

    pub fn from_base_url(base_url: &str) -> Result<Self, MetadataError> {
        let url = Url::parse(base_url).map_err(|e| MetadataError::InvalidUrl(e.to_string()))?;
        Ok(Self::new(url))
    }

    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, MetadataError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "TVmaze API error");
            Err(MetadataError::Api {
                status,
                message: body,
            })
        }
    }

    /// Fetch every episode of a show, specials included, in airing order.
    pub async fn fetch_show_episodes(
        &self,
        catalog_id: &str,
    ) -> Result<Vec<EpisodeMetadata>, MetadataError> {
        let url = episodes_url(&self.base_url, catalog_id)?;
        let resp = self.http.get(url).send().await?;
        let resp = Self::check_response(resp).await?;
        let episodes: Vec<TvMazeEpisode> = resp
            .json()
            .await
            .map_err(|e| MetadataError::Parse(e.to_string()))?;

        Ok(episodes
            .into_iter()
            .map(TvMazeEpisode::into_metadata)
            .collect())
    }
}

/// `{base}/shows/{id}/episodes?specials=1`, with the id percent-encoded.
fn episodes_url(base: &Url, catalog_id: &str) -> Result<Url, MetadataError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| MetadataError::InvalidUrl(format!("{base} cannot be a base")))?
        .pop_if_empty()
        .extend(["shows", catalog_id, "episodes"]);
    url.query_pairs_mut().append_pair("specials", "1");
    Ok(url)
}

/// Pick one episode out of a grouped listing.
fn select_episode(
    mut seasons: Vec<Vec<EpisodeMetadata>>,
    season: u32,
    episode_index: u32,
) -> Result<EpisodeMetadata, MetadataError> {
    let last_season = seasons.len() as u32;
    if season == 0 || season > last_season {
        return Err(MetadataError::SeasonOutOfRange {
            requested_season: season,
            last_season,
        });
    }

    let mut episodes = seasons.swap_remove(season as usize - 1);
    let episode_count = episodes.len();
    if episode_index as usize >= episode_count {
        return Err(MetadataError::EpisodeOutOfRange {
            season,
            episode_index,
            episode_count,
        });
    }
    Ok(episodes.swap_remove(episode_index as usize))
}

#[async_trait]
impl MetadataService for TvMazeClient {
    async fn get_episode_metadata(
        &self,
        catalog_id: &str,
        season: u32,
        episode_index: u32,
    ) -> Result<EpisodeMetadata, MetadataError> {
        let episodes = self.fetch_show_episodes(catalog_id).await?;
        select_episode(group_by_season(episodes), season, episode_index)
    }
}
