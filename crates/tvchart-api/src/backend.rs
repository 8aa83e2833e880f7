pub mod client;
pub mod types;

pub use client::SyncClient;
pub use types::{ApiEpisodeDescriptor, ShowDto, StatusUpdateDto};
