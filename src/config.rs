use anyhow::{anyhow, Context};
use shuttle_runtime::SecretStore;

use crate::services::rate_limiter::RateLimitPolicy;

const DEFAULT_AI_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
const DEFAULT_AI_MODEL: &str = "google/gemini-2.5-flash";
const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";
const DEFAULT_EMAIL_FROM: &str = "SOIA <notificacoes@soia.app>";

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub ai_gateway_url: String,
    pub ai_gateway_api_key: String,
    pub ai_model: String,
    pub email_api_url: String,
    pub email_api_key: String,
    pub email_from: String,
    pub app_url: Option<String>,
    pub http_timeout_secs: u64,
    pub rate_limit_max_requests: i64,
    pub rate_limit_window_secs: i64,
    pub rate_limit_cleanup_probability: f64,
    pub rate_limit_fail_open: bool,
    pub rate_limit_sweep_cron: Option<String>,
    pub internal_api_key: Option<String>,
}

impl AppConfig {
    pub fn new(secret_store: &SecretStore) -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| secret_store.get(key))
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| anyhow!("{} not found", key));

        let database_url = require("DATABASE_URL")?;
        let ai_gateway_api_key = require("AI_GATEWAY_API_KEY")?;
        let email_api_key = require("EMAIL_API_KEY")?;

        let db_max_connections = parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?;
        let http_timeout_secs = parse_or(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS", 30)?;
        let rate_limit_max_requests = parse_or(
            get("RATE_LIMIT_MAX_REQUESTS"),
            "RATE_LIMIT_MAX_REQUESTS",
            50,
        )?;
        let rate_limit_window_secs = parse_or(
            get("RATE_LIMIT_WINDOW_SECS"),
            "RATE_LIMIT_WINDOW_SECS",
            3600,
        )?;
        let rate_limit_cleanup_probability = parse_or(
            get("RATE_LIMIT_CLEANUP_PROBABILITY"),
            "RATE_LIMIT_CLEANUP_PROBABILITY",
            0.1,
        )?;
        let rate_limit_fail_open =
            parse_or(get("RATE_LIMIT_FAIL_OPEN"), "RATE_LIMIT_FAIL_OPEN", false)?;

        if rate_limit_max_requests < 1 {
            return Err(anyhow!("RATE_LIMIT_MAX_REQUESTS must be at least 1"));
        }
        if rate_limit_window_secs < 1 {
            return Err(anyhow!("RATE_LIMIT_WINDOW_SECS must be at least 1"));
        }
        if !(0.0..=1.0).contains(&rate_limit_cleanup_probability) {
            return Err(anyhow!(
                "RATE_LIMIT_CLEANUP_PROBABILITY must be between 0 and 1"
            ));
        }

        Ok(AppConfig {
            database_url,
            db_max_connections,
            ai_gateway_url: get("AI_GATEWAY_URL").unwrap_or_else(|| DEFAULT_AI_GATEWAY_URL.into()),
            ai_gateway_api_key,
            ai_model: get("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.into()),
            email_api_url: get("EMAIL_API_URL").unwrap_or_else(|| DEFAULT_EMAIL_API_URL.into()),
            email_api_key,
            email_from: get("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.into()),
            app_url: get("APP_URL").map(|url| url.trim_end_matches('/').to_string()),
            http_timeout_secs,
            rate_limit_max_requests,
            rate_limit_window_secs,
            rate_limit_cleanup_probability,
            rate_limit_fail_open,
            rate_limit_sweep_cron: get("RATE_LIMIT_SWEEP_CRON"),
            internal_api_key: get("INTERNAL_API_KEY"),
        })
    }

    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            max_requests: self.rate_limit_max_requests,
            window: chrono::Duration::seconds(self.rate_limit_window_secs),
            cleanup_probability: self.rate_limit_cleanup_probability,
            fail_open: self.rate_limit_fail_open,
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value", key)),
        None => Ok(default),
    }
}
