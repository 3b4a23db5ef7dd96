pub mod registry;
pub mod zee5;

use axum::Router;
use serde::Serialize;

pub use registry::PluginRegistry;

/// Channel record aggregated across providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    /// Path relative to the proxy root, e.g. `zee5/<id>`.
    pub url: String,
    pub logo_url: String,
    pub category: i32,
    pub language: i32,
    pub is_hd: bool,
    pub is_custom: bool,
}

/// A streaming provider that can be mounted into the host router.
pub trait Provider: Send + Sync {
    /// Route prefix and configuration name.
    fn name(&self) -> &'static str;

    /// Routes served under `/<name>/...`.
    fn routes(&self) -> Router;

    /// Channels this provider exposes, in catalog order.
    fn channels(&self) -> Vec<Channel>;
}
