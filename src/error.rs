use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Upstream URLs can carry the session cookie. They are logged, never rendered.
    #[error("upstream unavailable: {reason}")]
    UpstreamUnavailable { url: String, reason: String },

    #[error("upstream returned status {status}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("failed to fetch: {reason}")]
    ManifestFetch { url: String, reason: String },

    #[error("Platform token not found in page")]
    TokenNotFound,

    #[error("Could not fetch m3u8 URL: {0}")]
    TokenFieldMissing(String),

    #[error("hdntl token not found in response")]
    CookieNotFound,

    #[error("invalid auth param: {0}")]
    MalformedToken(String),

    #[error("invalid auth param")]
    DecodeFailure,

    #[error("missing auth param")]
    MissingAuth,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamStatus { .. } => "UPSTREAM_STATUS",
            Self::ManifestFetch { .. } => "MANIFEST_FETCH_FAILED",
            Self::TokenNotFound => "TOKEN_NOT_FOUND",
            Self::TokenFieldMissing(_) => "TOKEN_FIELD_MISSING",
            Self::CookieNotFound => "COOKIE_NOT_FOUND",
            Self::MalformedToken(_) => "MALFORMED_TOKEN",
            Self::DecodeFailure => "DECODE_FAILURE",
            Self::MissingAuth => "MISSING_AUTH",
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ManifestFetch { .. }
            | Self::MalformedToken(_)
            | Self::DecodeFailure
            | Self::MissingAuth
            | Self::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamUnavailable { .. }
            | Self::UpstreamStatus { .. }
            | Self::TokenNotFound
            | Self::TokenFieldMissing(_)
            | Self::CookieNotFound
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Upstream URL involved in the failure, for logging only.
    pub fn upstream_url(&self) -> Option<&str> {
        match self {
            Self::UpstreamUnavailable { url, .. }
            | Self::UpstreamStatus { url, .. }
            | Self::ManifestFetch { url, .. } => Some(url.as_str()),
            _ => None,
        }
    }

    /// Upstream shape changed and a scraping pattern no longer matches.
    pub fn is_scrape_failure(&self) -> bool {
        matches!(
            self,
            Self::TokenNotFound | Self::TokenFieldMissing(_) | Self::CookieNotFound
        )
    }

    /// Re-tag a fetch failure that happened while loading a manifest.
    pub fn into_manifest_fetch(self) -> Self {
        match self {
            Self::UpstreamUnavailable { url, reason } => Self::ManifestFetch { url, reason },
            Self::UpstreamStatus { url, status } => Self::ManifestFetch {
                url,
                reason: format!("upstream returned status {}", status),
            },
            other => other,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let url = self.upstream_url().unwrap_or_default();

        if self.is_scrape_failure() {
            tracing::error!(code = self.error_code(), "Scraping failed: {}", self);
        } else if status.is_client_error() {
            tracing::warn!(code = self.error_code(), url, "{}", self);
        } else {
            tracing::error!(code = self.error_code(), url, "{}", self);
        }

        (status, self.to_string()).into_response()
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(|u| u.to_string()).unwrap_or_default();
        if let Some(status) = e.status() {
            return Self::UpstreamStatus {
                url,
                status: status.as_u16(),
            };
        }

        let reason = if e.is_timeout() {
            "request timed out".to_string()
        } else if e.is_connect() {
            "connection failed".to_string()
        } else {
            e.without_url().to_string()
        };
        Self::UpstreamUnavailable { url, reason }
    }
}
