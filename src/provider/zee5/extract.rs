//! Scraping patterns for the ZEE5 web app and playback API.
//!
//! Each function extracts exactly one value from a response of a known shape,
//! so a change on the provider's side breaks exactly one of these tests.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::{Error, Result};

static PLATFORM_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""gwapiPlatformToken"\s*:\s*"([^"]+)""#).expect("valid platform token pattern")
});

static HDNTL_COOKIE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"hdntl=([^\s"]+)"#).expect("valid hdntl pattern"));

/// Extract `gwapiPlatformToken` from the embedded app state of a live-tv page.
pub fn platform_token(page: &str) -> Result<String> {
    PLATFORM_TOKEN
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or(Error::TokenNotFound)
}

/// Extract `keyOsDetails.video_token` from a secure playback response.
///
/// The token is the absolute URL of a master manifest.
pub fn video_token(response: &Value) -> Result<String> {
    let details = response
        .get("keyOsDetails")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::TokenFieldMissing("keyOsDetails missing".to_string()))?;

    let token = details
        .get("video_token")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::TokenFieldMissing("video_token missing".to_string()))?;

    if !token.starts_with("http") {
        return Err(Error::TokenFieldMissing(
            "invalid video_token url".to_string(),
        ));
    }

    Ok(token.to_string())
}

/// Extract the `hdntl=...` session cookie from a manifest body.
///
/// The returned value includes the `hdntl=` prefix so it can be used as a query string.
pub fn hdntl_cookie(body: &str) -> Result<String> {
    HDNTL_COOKIE
        .find(body)
        .map(|m| m.as_str().to_string())
        .ok_or(Error::CookieNotFound)
}
