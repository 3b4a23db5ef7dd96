pub mod client;
pub mod url_codec;

pub use client::{FetchedContent, ProxyClient};
pub use url_codec::UrlCodec;
