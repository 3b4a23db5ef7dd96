use axum::{Json, Router, extract::State, routing::get};
use tower_http::trace::TraceLayer;

use super::state::AppState;
use crate::{
    config::Config,
    provider::{Channel, PluginRegistry},
};

/// Create the application router.
pub fn create_router(config: &Config) -> anyhow::Result<Router> {
    let (registry, provider_routes) = PluginRegistry::init(config)?;
    tracing::info!("Active plugins: {:?}", registry.names());

    Ok(build_router(AppState::new(registry), provider_routes))
}

/// Mount the host endpoints next to already built provider routes.
pub fn build_router(state: AppState, provider_routes: Router) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/channels", get(list_channels))
        .with_state(state)
        .merge(provider_routes)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn list_channels(State(state): State<AppState>) -> Json<Vec<Channel>> {
    Json(state.registry.channels())
}
