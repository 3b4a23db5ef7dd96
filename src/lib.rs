pub mod cache;
pub mod config;
pub mod error;
pub mod hls;
pub mod provider;
pub mod proxy;
pub mod server;
pub mod stream;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
