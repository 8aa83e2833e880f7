use std::time::Duration;

use async_trait::async_trait;
use tvchart_core::models::{EpisodeDescriptor, Show};
use url::Url;

use super::types::{ShowDto, StatusUpdateDto};
use crate::error::{ApiError, ConnectionError, ConnectionErrorKind, TransportError};
use crate::traits::Backend;
use crate::transport::{HostClient, HttpRequest, ReqwestHost, Transport};

const SHOWS_PATH: &str = "/shows";

/// Client for the sync server, built on the multi-host [`Transport`].
pub struct SyncClient<H> {
    transport: Transport<H>,
}

impl SyncClient<ReqwestHost> {
    /// Build a reqwest-backed client racing `hosts`, e.g. the parsed
    /// [`ServerConfig::host_urls`](tvchart_core::config::ServerConfig::host_urls).
    pub fn with_hosts(hosts: Vec<Url>, timeout: Duration) -> Result<Self, TransportError> {
        let transport = Transport::new(ReqwestHost::new(), hosts)?.with_timeout(timeout);
        Ok(Self::new(transport))
    }
}

impl<H: HostClient> SyncClient<H> {
    pub fn new(transport: Transport<H>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport<H> {
        &self.transport
    }

    async fn load_shows(&self) -> Result<Vec<Show>, ApiError> {
        let resp = self.transport.request(&HttpRequest::get(SHOWS_PATH)).await?;
        let dtos: Vec<ShowDto> = serde_json::from_slice(&resp.body)?;
        let shows = dtos
            .into_iter()
            .map(ShowDto::into_show)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = shows.len(), "Loaded shows");
        Ok(shows)
    }

    async fn post_status_update(
        &self,
        show_id: i64,
        watched: &[EpisodeDescriptor],
        unwatched: &[EpisodeDescriptor],
    ) -> Result<(), ApiError> {
        let body = serde_json::to_vec(&StatusUpdateDto::new(watched, unwatched))?;
        let path = format!("{SHOWS_PATH}/{show_id}/update-status");
        self.transport
            .request(&HttpRequest::post_json(path, body))
            .await?;
        tracing::debug!(
            show_id,
            watched = watched.len(),
            unwatched = unwatched.len(),
            "Submitted status update"
        );
        Ok(())
    }
}

#[async_trait]
impl<H: HostClient> Backend for SyncClient<H> {
    async fn fetch_all_shows(&self) -> Result<Vec<Show>, ConnectionError> {
        self.load_shows()
            .await
            .map_err(|e| ConnectionError::new(ConnectionErrorKind::LoadShowsFailed, e))
    }

    async fn update_episode_status(
        &self,
        show_id: i64,
        watched: &[EpisodeDescriptor],
        unwatched: &[EpisodeDescriptor],
    ) -> Result<(), ConnectionError> {
        self.post_status_update(show_id, watched, unwatched)
            .await
            .map_err(|e| ConnectionError::new(ConnectionErrorKind::UpdateStatusFailed, e))
    }
}
