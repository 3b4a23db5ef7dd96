use axum::Router;
use std::sync::Arc;

use super::{Channel, Provider, zee5::Zee5Provider};
use crate::config::Config;

/// Providers enabled by configuration, in registration order.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    active: Vec<Arc<dyn Provider>>,
}

impl PluginRegistry {
    /// Build every provider named in `config.plugins` and mount its routes.
    pub fn init(config: &Config) -> anyhow::Result<(Self, Router)> {
        let mut registry = Self::default();
        let mut router = Router::new();

        for name in &config.plugins {
            let provider: Arc<dyn Provider> = match name.as_str() {
                "zee5" => Arc::new(Zee5Provider::from_config(config)?),
                other => {
                    tracing::warn!("Plugin {} not found", other);
                    continue;
                }
            };

            router = router.merge(provider.routes());
            tracing::info!("Plugin {} registered", provider.name());
            registry.active.push(provider);
        }

        Ok((registry, router))
    }

    /// Register an already constructed provider.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.active.push(provider);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.active.iter().map(|p| p.name()).collect()
    }

    /// Channels of every active provider, concatenated in registration order.
    pub fn channels(&self) -> Vec<Channel> {
        self.active.iter().flat_map(|p| p.channels()).collect()
    }
}
