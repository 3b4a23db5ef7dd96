use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use url::Url;

use super::{PROVIDER, Zee5State};
use crate::{Error, Result, server::origin::proxy_origin, stream};

const MPEGURL: &str = "application/vnd.apple.mpegurl";

/// Query parameters of the render endpoints.
#[derive(Debug, Deserialize)]
pub struct RenderParams {
    /// Codec token of the upstream URL.
    #[serde(default)]
    pub auth: Option<String>,
}

impl RenderParams {
    fn decode(&self, state: &Zee5State) -> Result<String> {
        let token = self
            .auth
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(Error::MissingAuth)?;
        state.codec.decode(token)
    }
}

/// Handle GET /zee5/{id}: resolve the channel, attach the session cookie and
/// rewrite its master manifest.
pub async fn live(
    State(state): State<Zee5State>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let id = id.strip_suffix(".m3u8").unwrap_or(&id);
    tracing::info!("Live request: {}", id);

    let Some(channel) = state.catalog.lookup(id) else {
        tracing::debug!("Unknown channel {}", id);
        return Ok(([("ID", id.to_string())], "Channel not found").into_response());
    };

    let cookie = state.sessions.cookie().await?;
    let separator = if channel.url.contains('?') { '&' } else { '?' };
    let target = format!("{}{}{}", channel.url, separator, cookie);

    let origin = proxy_origin(&headers, &state.fallback_origin);
    render(&state, true, &target, &origin).await
}

/// Handle GET /zee5/render/playlist.m3u8 requests.
pub async fn render_playlist(
    State(state): State<Zee5State>,
    Query(params): Query<RenderParams>,
    headers: HeaderMap,
) -> Result<Response> {
    let target = params.decode(&state)?;
    tracing::info!("Playlist request: {}", target);

    let origin = proxy_origin(&headers, &state.fallback_origin);
    render(&state, false, &target, &origin).await
}

/// Handle GET /zee5/render/segment.{ts,mp4} requests.
pub async fn render_segment(
    State(state): State<Zee5State>,
    Query(params): Query<RenderParams>,
) -> Result<Response> {
    let target = params.decode(&state)?;
    tracing::debug!("Segment request: {}", target);

    let content = state
        .client
        .fetch(&target, state.sessions.user_agent())
        .await?;

    let mut response = Body::from(content.body).into_response();
    let response_headers = response.headers_mut();
    if let Some(content_type) = content.content_type {
        response_headers.insert(header::CONTENT_TYPE, content_type);
    }
    if let Some(content_length) = content.content_length {
        response_headers.insert(header::CONTENT_LENGTH, content_length);
    }

    Ok(response)
}

/// Fetch a manifest and rewrite it against its own URL.
async fn render(state: &Zee5State, is_master: bool, target: &str, origin: &str) -> Result<Response> {
    let base_url = Url::parse(target)?;

    let content = state
        .client
        .fetch_text(target, state.sessions.user_agent())
        .await
        .map_err(Error::into_manifest_fetch)?;

    let transformed = stream::rewrite(
        &content,
        base_url,
        is_master,
        origin,
        PROVIDER,
        state.codec.clone(),
    );

    tracing::debug!(
        "Rewrote {} manifest: {} -> {} bytes",
        if is_master { "master" } else { "media" },
        content.len(),
        transformed.len()
    );

    Ok(([(header::CONTENT_TYPE, MPEGURL)], transformed).into_response())
}
