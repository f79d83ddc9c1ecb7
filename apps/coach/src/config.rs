use anyhow::{Context, Result};

use crate::messages::Locale;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_OAUTH_PROVIDER: &str = "google";
pub const DEFAULT_CALLBACK_PORT: u16 = 54321;
pub const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 120;

/// Identity provider credentials. Both values must be present for login to be
/// offered at all.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub url: String,
    pub anon_key: String,
    pub oauth_provider: String,
    pub callback_port: u16,
    pub callback_timeout_secs: u64,
}

/// Client configuration loaded from environment variables (and `.env`).
/// Only malformed values are errors; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub auth: Option<AuthConfig>,
    pub http_timeout_secs: u64,
    pub locale: Locale,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let auth = match (var("SUPABASE_URL"), var("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(AuthConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
                oauth_provider: var("COACH_OAUTH_PROVIDER")
                    .unwrap_or_else(|| DEFAULT_OAUTH_PROVIDER.to_string()),
                callback_port: var("COACH_CALLBACK_PORT")
                    .map(|p| p.parse::<u16>())
                    .transpose()
                    .context("COACH_CALLBACK_PORT must be a valid port number")?
                    .unwrap_or(DEFAULT_CALLBACK_PORT),
                callback_timeout_secs: var("COACH_CALLBACK_TIMEOUT_SECS")
                    .map(|s| s.parse::<u64>())
                    .transpose()
                    .context("COACH_CALLBACK_TIMEOUT_SECS must be a whole number of seconds")?
                    .unwrap_or(DEFAULT_CALLBACK_TIMEOUT_SECS),
            }),
            _ => None,
        };

        Ok(Config {
            api_url: var("COACH_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            auth,
            http_timeout_secs: var("COACH_HTTP_TIMEOUT_SECS")
                .map(|s| s.parse::<u64>())
                .transpose()
                .context("COACH_HTTP_TIMEOUT_SECS must be a whole number of seconds")?
                .unwrap_or(120),
            locale: var("COACH_LOCALE")
                .map(|s| s.parse::<Locale>())
                .transpose()
                .map_err(anyhow::Error::msg)?
                .unwrap_or_default(),
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
