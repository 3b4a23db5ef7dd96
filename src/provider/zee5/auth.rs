use axum::http::header;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::Arc;

use super::extract;
use crate::{
    Error, Result,
    cache::{CredentialCache, fingerprint},
};

/// Live-tv page embedding the web app's platform token.
pub const LANDING_PAGE_URL: &str = "https://www.zee5.com/live-tv/aaj-tak/0-9-aajtak";

/// Secure playback API returning a tokenised manifest URL.
pub const PLAYBACK_API_URL: &str = "https://spapi.zee5.com/singlePlayback/getDetails/secure";

const SITE_ORIGIN: &str = "https://www.zee5.com";
const PLAYBACK_CHANNEL_ID: &str = "0-9-9z583538";

/// Upstream endpoints used by the authentication flow.
#[derive(Debug, Clone)]
pub struct AuthEndpoints {
    pub landing_page: String,
    pub playback_api: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            landing_page: LANDING_PAGE_URL.to_string(),
            playback_api: PLAYBACK_API_URL.to_string(),
        }
    }
}

/// Random guest device token (UUID v4).
pub fn guest_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Base64 device capability descriptor sent as `x-dd-token`.
pub fn device_token() -> String {
    let descriptor = json!({
        "schema_version": "1",
        "os_name": "N/A",
        "os_version": "N/A",
        "platform_name": "Chrome",
        "platform_version": "104",
        "device_name": "",
        "app_name": "Web",
        "app_version": "2.52.31",
        "player_capabilities": {
            "audio_channel": ["STEREO"],
            "video_codec": ["H264"],
            "container": ["MP4", "TS"],
            "package": ["DASH", "HLS"],
            "resolution": ["240p", "SD", "HD", "FHD"],
            "dynamic_range": ["SDR"],
        },
        "security_capabilities": {
            "encryption": ["WIDEVINE_AES_CTR"],
            "widevine_security_level": ["L3"],
            "hdcp_version": ["HDCP_V1", "HDCP_V2", "HDCP_V2_1", "HDCP_V2_2"],
        },
    });

    STANDARD.encode(descriptor.to_string())
}

/// Multi-step token exchange producing an `hdntl` session cookie.
#[derive(Clone)]
pub struct AuthFlow {
    client: Client,
    endpoints: AuthEndpoints,
}

impl AuthFlow {
    pub fn new(client: Client, endpoints: AuthEndpoints) -> Self {
        Self { client, endpoints }
    }

    /// Run the whole exchange for `user_agent`.
    ///
    /// Steps run in order and any failure aborts the flow.
    pub async fn generate_cookie(&self, user_agent: &str) -> Result<String> {
        let guest_token = guest_token();
        let platform_token = self.fetch_platform_token(user_agent).await?;
        let device_token = device_token();

        let manifest_url = self
            .fetch_manifest_url(&guest_token, &platform_token, &device_token, user_agent)
            .await?;
        tracing::debug!("Secure playback returned manifest {}", manifest_url);

        self.fetch_cookie(&manifest_url, user_agent).await
    }

    /// Run the flow and store its result under the identity's fingerprint.
    pub async fn refresh(&self, cache: &CredentialCache, user_agent: &str) -> Result<String> {
        let cookie = self.generate_cookie(user_agent).await?;
        cache.put(&fingerprint(user_agent), cookie.clone());
        tracing::info!(
            "Stored fresh session cookie (ttl {}s)",
            cache.ttl().as_secs()
        );
        Ok(cookie)
    }

    async fn fetch_platform_token(&self, user_agent: &str) -> Result<String> {
        let url = &self.endpoints.landing_page;
        let page = self.get_text(url, user_agent).await?;
        extract::platform_token(&page)
    }

    async fn fetch_manifest_url(
        &self,
        guest_token: &str,
        platform_token: &str,
        device_token: &str,
        user_agent: &str,
    ) -> Result<String> {
        let mut url = url::Url::parse(&self.endpoints.playback_api)?;
        url.query_pairs_mut()
            .append_pair("channel_id", PLAYBACK_CHANNEL_ID)
            .append_pair("device_id", guest_token)
            .append_pair("platform_name", "desktop_web")
            .append_pair("translation", "en")
            .append_pair("user_language", "en,hi,te")
            .append_pair("country", "IN")
            .append_pair("state", "")
            .append_pair("app_version", "4.24.0")
            .append_pair("user_type", "guest")
            .append_pair("check_parental_control", "false");

        let payload = json!({
            "x-access-token": platform_token,
            "X-Z5-Guest-Token": guest_token,
            "x-dd-token": device_token,
        });

        let response = self
            .client
            .post(url.as_str())
            .header(header::ACCEPT, "application/json")
            .header(header::ORIGIN, SITE_ORIGIN)
            .header(header::REFERER, format!("{}/", SITE_ORIGIN))
            .header(header::USER_AGENT, user_agent)
            .json(&payload)
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamUnavailable {
                url: self.endpoints.playback_api.clone(),
                reason: format!("invalid response from API, status {}", status.as_u16()),
            });
        }

        let body = response.bytes().await.map_err(unavailable)?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| Error::TokenFieldMissing(format!("json decode error: {}", e)))?;

        extract::video_token(&value)
    }

    async fn fetch_cookie(&self, manifest_url: &str, user_agent: &str) -> Result<String> {
        let body = self.get_text(manifest_url, user_agent).await?;
        extract::hdntl_cookie(&body)
    }

    /// GET following redirects; any failure is `UpstreamUnavailable`.
    async fn get_text(&self, url: &str, user_agent: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, user_agent)
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamUnavailable {
                url: url.to_string(),
                reason: format!("unexpected status code {}", status.as_u16()),
            });
        }

        response.text().await.map_err(unavailable)
    }
}

fn unavailable(e: reqwest::Error) -> Error {
    match Error::from(e) {
        Error::UpstreamStatus { url, status } => Error::UpstreamUnavailable {
            url,
            reason: format!("unexpected status code {}", status),
        },
        other => other,
    }
}

/// Hands out the provider session cookie, running the auth flow on a cache miss.
#[derive(Clone)]
pub struct SessionManager {
    cache: Arc<CredentialCache>,
    flow: AuthFlow,
    user_agent: String,
}

impl SessionManager {
    pub fn new(cache: Arc<CredentialCache>, flow: AuthFlow, user_agent: impl Into<String>) -> Self {
        Self {
            cache,
            flow,
            user_agent: user_agent.into(),
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub async fn cookie(&self) -> Result<String> {
        if let Some(cookie) = self.cache.get(&fingerprint(&self.user_agent)) {
            return Ok(cookie);
        }

        tracing::info!("No cached session cookie, running auth flow");
        self.flow.refresh(&self.cache, &self.user_agent).await
    }
}
