use std::{env, path::PathBuf, time::Duration};

use url::Url;

// Runtime settings, read from the environment (and `.env` when present).

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_AI_URL: &str = "http://localhost:8000";
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_DEBOUNCE_MS: u64 = 500;
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
const DEFAULT_TOKEN_FILE: &str = ".feed_client/session.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub ai_url: String,
    pub page_size: u32,
    pub analyze_debounce: Duration,
    pub http_timeout: Duration,
    pub token_file: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: api_url(),
            ai_url: ai_url(),
            page_size: page_size(),
            analyze_debounce: analyze_debounce(),
            http_timeout: http_timeout(),
            token_file: token_file(),
        }
    }
}

pub fn api_url() -> String {
    base_url("API_URL", env::var("API_URL").ok(), DEFAULT_API_URL)
}

pub fn ai_url() -> String {
    base_url("AI_URL", env::var("AI_URL").ok(), DEFAULT_AI_URL)
}

pub fn page_size() -> u32 {
    env::var("FEED_PAGE_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|size| *size > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

pub fn analyze_debounce() -> Duration {
    let millis = env::var("ANALYZE_DEBOUNCE_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(DEFAULT_DEBOUNCE_MS);
    Duration::from_millis(millis)
}

pub fn http_timeout() -> Duration {
    let millis = env::var("HTTP_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_MS);
    Duration::from_millis(millis)
}

pub fn token_file() -> PathBuf {
    env::var("TOKEN_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_FILE))
}

// Accept only absolute http(s) URLs; anything else falls back to the default.
fn base_url(name: &str, value: Option<String>, default: &str) -> String {
    let Some(value) = value else {
        return default.to_string();
    };

    match Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            value.trim_end_matches('/').to_string()
        }
        Ok(_) => {
            tracing::warn!(%name, %value, "base url must be http(s), using default.");
            default.to_string()
        }
        Err(err) => {
            tracing::warn!(%name, %value, error = %err, "invalid base url, using default.");
            default.to_string()
        }
    }
}
