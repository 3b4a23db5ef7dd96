use axum::http::{HeaderMap, header};

/// Scheme and authority the client used to reach this proxy.
///
/// Honours `X-Forwarded-Proto`/`X-Forwarded-Host` from a fronting proxy, then
/// the `Host` header, and finally `fallback`.
pub fn proxy_origin(headers: &HeaderMap, fallback: &str) -> String {
    let first_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let host = first_value("x-forwarded-host").or_else(|| first_value(header::HOST.as_str()));
    let Some(host) = host else {
        return fallback.trim_end_matches('/').to_string();
    };

    let scheme = first_value("x-forwarded-proto")
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "http".to_string());

    format!("{}://{}", scheme, host)
}
