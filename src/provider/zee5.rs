pub mod auth;
pub mod catalog;
pub mod extract;
pub mod handlers;

#[cfg(test)]
mod fixture;

use axum::{
    Router,
    http::{HeaderValue, header},
    routing::get,
};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

use super::{Channel, Provider};
use crate::{
    cache::CredentialCache,
    config::Config,
    proxy::{ProxyClient, UrlCodec},
};

pub use auth::{AuthEndpoints, AuthFlow, SessionManager};
pub use catalog::{Catalog, ChannelEntry};

/// Route prefix and plugin name.
pub const PROVIDER: &str = "zee5";

/// Shared state of the ZEE5 routes.
#[derive(Clone)]
pub struct Zee5State {
    pub catalog: Arc<Catalog>,
    pub sessions: SessionManager,
    pub client: ProxyClient,
    pub codec: UrlCodec,
    /// Origin for rewritten URLs when a request has no Host header.
    pub fallback_origin: String,
}

/// ZEE5 live channels behind the rewriting proxy.
pub struct Zee5Provider {
    state: Zee5State,
}

impl Zee5Provider {
    pub fn new(state: Zee5State) -> Self {
        Self { state }
    }

    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let catalog = Catalog::embedded()?;
        tracing::info!("Loaded {} channels from {}", catalog.len(), catalog.title());

        let client = ProxyClient::new(config.upstream_timeout)?;
        let cache = Arc::new(CredentialCache::new(
            config.credential_cache_capacity,
            config.credential_ttl,
        ));
        let flow = AuthFlow::new(client.inner().clone(), AuthEndpoints::default());

        Ok(Self::new(Zee5State {
            catalog: Arc::new(catalog),
            sessions: SessionManager::new(cache, flow, config.user_agent.clone()),
            client,
            codec: UrlCodec::from_secret(config.url_secret.as_deref()),
            fallback_origin: config.fallback_origin(),
        }))
    }

    pub fn state(&self) -> &Zee5State {
        &self.state
    }
}

impl Provider for Zee5Provider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/zee5/{id}", get(handlers::live))
            .route("/zee5/render/playlist.m3u8", get(handlers::render_playlist))
            .route("/zee5/render/segment.ts", get(handlers::render_segment))
            .route("/zee5/render/segment.mp4", get(handlers::render_segment))
            .with_state(self.state.clone())
            .layer(SetResponseHeaderLayer::if_not_present(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
    }

    fn channels(&self) -> Vec<Channel> {
        self.state.catalog.channels(PROVIDER)
    }
}
