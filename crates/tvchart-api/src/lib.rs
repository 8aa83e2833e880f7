pub mod backend;
pub mod error;
pub mod traits;
pub mod transport;
pub mod tvmaze;

pub use backend::SyncClient;
pub use error::{ApiError, ConnectionError, ConnectionErrorKind, MetadataError, TransportError};
pub use transport::{HostClient, HttpRequest, HttpResponse, ReqwestHost, Transport};
pub use tvmaze::TvMazeClient;
