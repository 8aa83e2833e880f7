pub mod codec;
pub mod config;
pub mod error;
pub mod legacy;
pub mod models;
