//! Multi-host HTTP transport.
//!
//! The server may be reachable under several addresses (for example a LAN address
//! and a public one), and which of them works depends on where the client is.
//! While more than one host is considered viable, a request is sent to all of them
//! at once and the first success wins; that host then serves every later request
//! alone until it fails, at which point all candidates are raced again.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use url::Url;

use crate::error::TransportError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the host's base address.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn post_json(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends one request to one host. Any HTTP response, whatever its status, is `Ok`.
pub trait HostClient: Send + Sync {
    fn send(
        &self,
        base: &Url,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// [`HostClient`] backed by a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHost {
    http: Client,
}

impl ReqwestHost {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

/// Resolve `path` under `base`, keeping any path prefix the base carries.
pub fn resolve(base: &Url, path: &str) -> Result<Url, TransportError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|e| TransportError::InvalidUrl(format!("{base} + {path}: {e}")))
}

impl HostClient for ReqwestHost {
    async fn send(
        &self,
        base: &Url,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let url = resolve(base, &request.path)?;

        let mut req = self.http.request(request.method.clone(), url);
        if let Some(body) = &request.body {
            req = req
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_connect() {
                TransportError::Unreachable(e.to_string())
            } else {
                TransportError::Http(e)
            }
        })?;

        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

/// Picks a working host among a fixed set of candidates and remembers it.
pub struct Transport<H> {
    host: H,
    candidates: Vec<Url>,
    /// Hosts still considered viable. Never held across an await.
    active: Mutex<Vec<Url>>,
    timeout: Duration,
}

impl<H: HostClient> Transport<H> {
    pub fn new(host: H, candidates: Vec<Url>) -> Result<Self, TransportError> {
        if candidates.is_empty() {
            return Err(TransportError::NoCandidates);
        }
        Ok(Self {
            host,
            active: Mutex::new(candidates.clone()),
            candidates,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Per-host request timeout. A timeout counts as an ordinary host failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn candidates(&self) -> &[Url] {
        &self.candidates
    }

    /// Snapshot of the hosts currently considered viable.
    pub fn active_hosts(&self) -> Vec<Url> {
        self.lock_active().clone()
    }

    /// Issue `request` against some working host.
    ///
    /// Non-2xx responses are failures. The error is `NoReachableServers` when a race
    /// found no working host, or the host's own error when there is only one
    /// candidate to begin with.
    pub async fn request(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut active = self.active_or_reset();

        if active.len() == 1 {
            match self.attempt(&active[0], request).await {
                Ok(resp) => return Ok(resp),
                Err(e) if self.candidates.len() == 1 => return Err(e),
                Err(e) => tracing::warn!(
                    host = %active[0],
                    error = %e,
                    "Preferred host failed, racing all candidates"
                ),
            }
            active = self.reset_active();
        }

        self.race(active, request).await
    }

    /// Send to every host in `hosts` at once; the first success wins.
    ///
    /// Returning drops the remaining in-flight requests, which cancels them.
    async fn race(
        &self,
        hosts: Vec<Url>,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        tracing::debug!(candidates = hosts.len(), path = %request.path, "Racing hosts");

        let mut causes = Vec::new();
        let mut pending: FuturesUnordered<_> = hosts
            .into_iter()
            .map(|host| async move {
                let result = self.attempt(&host, request).await;
                (host, result)
            })
            .collect();

        while let Some((host, result)) = pending.next().await {
            match result {
                Ok(resp) => {
                    tracing::info!(host = %host, "Selected host");
                    self.anoint(host);
                    return Ok(resp);
                }
                Err(e) => {
                    tracing::warn!(host = %host, error = %e, "Host failed");
                    self.remove(&host);
                    causes.push(format!("{host}: {e}"));
                }
            }
        }

        Err(TransportError::NoReachableServers { causes })
    }

    async fn attempt(
        &self,
        host: &Url,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let resp = tokio::time::timeout(self.timeout, self.host.send(host, request))
            .await
            .map_err(|_| TransportError::Timeout {
                host: host.to_string(),
            })??;

        if resp.is_success() {
            Ok(resp)
        } else {
            Err(TransportError::Status {
                status: resp.status,
                message: resp.text(),
            })
        }
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Vec<Url>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current active set; an empty set is refilled from the candidates first,
    /// since the network may have changed since every host last failed.
    fn active_or_reset(&self) -> Vec<Url> {
        let mut active = self.lock_active();
        if active.is_empty() {
            tracing::debug!("No viable hosts left, resetting to all candidates");
            *active = self.candidates.clone();
        }
        active.clone()
    }

    fn reset_active(&self) -> Vec<Url> {
        let mut active = self.lock_active();
        *active = self.candidates.clone();
        active.clone()
    }

    fn anoint(&self, host: Url) {
        *self.lock_active() = vec![host];
    }

    fn remove(&self, host: &Url) {
        self.lock_active().retain(|h| h != host);
    }
}
