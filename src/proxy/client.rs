use crate::{Error, Result};
use axum::http::{HeaderValue, header};
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

/// Body and passthrough headers of an upstream response.
#[derive(Debug, Clone)]
pub struct FetchedContent {
    pub body: Bytes,
    pub content_type: Option<HeaderValue>,
    pub content_length: Option<HeaderValue>,
}

/// HTTP client for proxying requests to upstream servers.
#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
}

impl ProxyClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Underlying client, shared with the authentication flow.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// GET a URL with the given identity. Any non-2xx status is an error.
    pub async fn fetch(&self, url: &str, user_agent: &str) -> Result<FetchedContent> {
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let content_length = response.headers().get(header::CONTENT_LENGTH).cloned();
        let body = response.bytes().await?;

        Ok(FetchedContent {
            body,
            content_type,
            content_length,
        })
    }

    /// Fetch content and return as string.
    pub async fn fetch_text(&self, url: &str, user_agent: &str) -> Result<String> {
        let content = self.fetch(url, user_agent).await?;
        String::from_utf8(content.body.to_vec()).map_err(|e| Error::UpstreamUnavailable {
            url: url.to_string(),
            reason: format!("Invalid UTF-8: {}", e),
        })
    }
}
