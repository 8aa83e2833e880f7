use thiserror::Error;
use tvchart_core::error::{CodecError, DisplayableError};

/// Failures of the multi-host transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Every candidate host failed within one call. `causes` holds one
    /// `"{host}: {error}"` line per host, in the order the failures arrived.
    #[error("no servers were reachable")]
    NoReachableServers { causes: Vec<String> },

    #[error("no candidate hosts configured")]
    NoCandidates,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("connection failed: {0}")]
    Unreachable(String),

    #[error("server error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("request to {host} timed out")]
    Timeout { host: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl DisplayableError for TransportError {
    fn display_description(&self) -> String {
        match self {
            Self::NoReachableServers { .. } => "No servers were reachable".into(),
            _ => "Network request failed".into(),
        }
    }

    fn display_details(&self) -> Option<String> {
        match self {
            Self::NoReachableServers { causes } if causes.is_empty() => None,
            Self::NoReachableServers { causes } => Some(causes.join("; ")),
            other => Some(other.to_string()),
        }
    }
}

/// A remote call failed either in transit or while decoding its payload.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("decode failed: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

impl From<CodecError> for ApiError {
    fn from(e: CodecError) -> Self {
        Self::Decode(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    LoadShowsFailed,
    LoadShowMetadataFailed,
    UpdateStatusFailed,
}

impl ConnectionErrorKind {
    pub fn description(self) -> &'static str {
        match self {
            Self::LoadShowsFailed => "Error loading shows",
            Self::LoadShowMetadataFailed => "Error loading show details",
            Self::UpdateStatusFailed => "Error updating episode status",
        }
    }
}

/// A remote operation failed; `kind` says which one.
#[derive(Debug, Error)]
#[error("{}: {cause}", .kind.description())]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    #[source]
    pub cause: Box<dyn std::error::Error + Send + Sync>,
}

impl ConnectionError {
    pub fn new(
        kind: ConnectionErrorKind,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            kind,
            cause: cause.into(),
        }
    }

    /// True when the failure was that no candidate host answered at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self.cause.downcast_ref::<ApiError>(),
            Some(ApiError::Transport(TransportError::NoReachableServers { .. }))
        )
    }
}

impl DisplayableError for ConnectionError {
    fn display_description(&self) -> String {
        self.kind.description().into()
    }

    fn display_details(&self) -> Option<String> {
        Some(self.cause.to_string())
    }
}

/// Errors from the episode metadata provider.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("requested season {requested_season} is out of bounds - last season is {last_season}")]
    SeasonOutOfRange {
        requested_season: u32,
        last_season: u32,
    },

    #[error("season {season} has no episode #{episode_index} ({episode_count} episodes)")]
    EpisodeOutOfRange {
        season: u32,
        episode_index: u32,
        episode_count: usize,
    },
}

impl DisplayableError for MetadataError {
    fn display_description(&self) -> String {
        "Error loading episode details".into()
    }

    fn display_details(&self) -> Option<String> {
        Some(self.to_string())
    }
}
