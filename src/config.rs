use std::time::Duration;

/// Desktop browser identity sent to the provider when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Process configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Providers to register, in order.
    pub plugins: Vec<String>,
    /// Secret for the URL codec. A random key is used when absent.
    pub url_secret: Option<Vec<u8>>,
    pub upstream_timeout: Duration,
    pub credential_cache_capacity: usize,
    pub credential_ttl: Duration,
    pub user_agent: String,
}

impl Config {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let url_secret = match std::env::var("TVPROXY_URL_SECRET") {
            Ok(secret) if !secret.is_empty() => {
                // Try hex first, fall back to the raw string
                Some(hex::decode(&secret).unwrap_or_else(|_| secret.into_bytes()))
            }
            _ => None,
        };

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT").unwrap_or(8080),
            plugins: std::env::var("PLUGINS")
                .map(|s| parse_plugins(&s))
                .unwrap_or_else(|_| vec!["zee5".to_string()]),
            url_secret,
            upstream_timeout: Duration::from_secs(parse_env("UPSTREAM_TIMEOUT_SECS").unwrap_or(30)),
            credential_cache_capacity: parse_env("CREDENTIAL_CACHE_CAPACITY")
                .filter(|n| *n > 0)
                .unwrap_or(50),
            credential_ttl: Duration::from_secs(parse_env("CREDENTIAL_TTL_SECS").unwrap_or(3600)),
            user_agent: std::env::var("ZEE5_USER_AGENT")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Origin used for rewritten URLs when the request carries no Host header.
    pub fn fallback_origin(&self) -> String {
        let host = if self.host == "0.0.0.0" {
            "localhost"
        } else {
            self.host.as_str()
        };
        format!("http://{}:{}", host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            plugins: vec!["zee5".to_string()],
            url_secret: None,
            upstream_timeout: Duration::from_secs(30),
            credential_cache_capacity: 50,
            credential_ttl: Duration::from_secs(3600),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn parse_plugins(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}
