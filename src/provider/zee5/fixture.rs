//! In-process stand-in for the ZEE5 web app, playback API and CDN.

use axum::{
    Json, Router,
    extract::{Query, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::net::TcpListener;

use super::AuthEndpoints;

pub const PLATFORM_TOKEN: &str = "platform-abc.DEF";
pub const SESSION_COOKIE: &str = "hdntl=exp=1700000000~acl=%2f*~hmac=ff00";
pub const SEGMENT_BYTES: &[u8] = &[0x47, 0x40, 0x11, 0x10, 0x00, 0xff, 0x47, 0x00];
pub const USER_AGENT: &str = "fixture-agent";

#[derive(Clone)]
struct FixtureState {
    base_url: String,
    playback_calls: Arc<AtomicUsize>,
}

pub struct TestUpstream {
    base_url: String,
    playback_calls: Arc<AtomicUsize>,
}

impl TestUpstream {
    pub async fn new() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://127.0.0.1:{}", addr.port());

        let state = FixtureState {
            base_url: base_url.clone(),
            playback_calls: Arc::new(AtomicUsize::new(0)),
        };
        let playback_calls = state.playback_calls.clone();

        let app = Router::new()
            .route("/live-tv", get(landing_page))
            .route("/playback", post(playback))
            .route("/redirect", get(|| async { Redirect::temporary("/event/master.m3u8") }))
            .route("/event/master.m3u8", get(tokenised_master))
            .route("/live/master.m3u8", get(channel_master))
            .route("/live/720p/index.m3u8", get(media_playlist))
            .route("/seg/segment0.ts", get(segment))
            .route("/forbidden.m3u8", get(|| async { StatusCode::FORBIDDEN }))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            playback_calls,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn endpoints(&self) -> AuthEndpoints {
        AuthEndpoints {
            landing_page: self.url("/live-tv"),
            playback_api: self.url("/playback"),
        }
    }

    /// Number of playback API calls that passed validation.
    pub fn playback_calls(&self) -> usize {
        self.playback_calls.load(Ordering::SeqCst)
    }
}

async fn landing_page() -> String {
    format!(
        r#"<html><script>window.__APP__={{"config":{{"gwapiPlatformToken":"{}"}}}}</script></html>"#,
        PLATFORM_TOKEN
    )
}

async fn playback(
    State(state): State<FixtureState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let guest_token = body["X-Z5-Guest-Token"].as_str().unwrap_or_default();
    let valid = query.get("channel_id").map(String::as_str) == Some("0-9-9z583538")
        && query.get("user_type").map(String::as_str) == Some("guest")
        && query.get("device_id").map(String::as_str) == Some(guest_token)
        && uuid::Uuid::parse_str(guest_token).is_ok()
        && body["x-access-token"] == PLATFORM_TOKEN
        && body["x-dd-token"].as_str().is_some_and(|s| !s.is_empty())
        && headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) == Some(USER_AGENT);

    if !valid {
        return (StatusCode::BAD_REQUEST, "bad playback request").into_response();
    }

    state.playback_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "keyOsDetails": { "video_token": format!("{}/redirect", state.base_url) }
    }))
    .into_response()
}

async fn tokenised_master() -> String {
    format!(
        "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=800000\nindex_1.m3u8?{}\n",
        SESSION_COOKIE
    )
}

/// Echoes the received query as a comment so tests can see the attached cookie.
async fn channel_master(RawQuery(query): RawQuery) -> String {
    format!(
        "#EXTM3U\n#X-QUERY:{}\n#EXT-X-STREAM-INF:BANDWIDTH=800000\n720p/index.m3u8\n",
        query.unwrap_or_default()
    )
}

async fn media_playlist() -> &'static str {
    "#EXTM3U\n#EXT-X-TARGETDURATION:6\n#EXTINF:6.0,\n../../seg/segment0.ts\n#EXT-X-ENDLIST\n"
}

async fn segment() -> Response {
    (
        [
            (header::CONTENT_TYPE, "video/mp2t"),
            (header::CONTENT_LENGTH, "8"),
        ],
        SEGMENT_BYTES,
    )
        .into_response()
}
