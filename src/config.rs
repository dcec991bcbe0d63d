// Application configuration loaded from environment variables

use std::time::Duration;

/// Runtime configuration for the IndieZone API
///
/// Every value comes from the environment (a `.env` file is loaded first).
/// Values with sensible defaults fall back silently; values the process
/// cannot run without produce an error naming the missing variable.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub host: String,
    pub port: String,
    pub jwt_secret: String,

    /// IsThereAnyDeal pricing API
    pub itad_api_key: String,
    pub itad_base_url: String,
    pub itad_country: String,

    /// Twitch client-credentials exchange (for the IGDB metadata API)
    pub twitch_auth_url: String,
    pub twitch_client_id: String,
    pub twitch_client_secret: String,
    pub igdb_api_url: String,

    /// RAWG catalog-import API
    pub rawg_api_key: String,
    pub rawg_api_url: String,

    /// Name of the Redis list backing the price-sync queue
    pub price_sync_queue: String,
    /// Pause after each successful external price fetch (provider rate limit)
    pub price_sync_cooldown: Duration,
    /// Bound on every outbound HTTP call
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: require("DATABASE_URL")?,
            redis_url: optional("REDIS_URL", "redis://127.0.0.1:6379"),
            host: optional("HOST", "0.0.0.0"),
            port: optional("PORT", "8080"),
            jwt_secret: require("JWT_SECRET")?,
            itad_api_key: require("ITAD_API_KEY")?,
            itad_base_url: optional("ITAD_BASE_URL", "https://api.isthereanydeal.com"),
            itad_country: optional("ITAD_COUNTRY", "BR"),
            twitch_auth_url: optional("TWITCH_AUTH_URL", "https://id.twitch.tv/oauth2/token"),
            twitch_client_id: require("TWITCH_CLIENT_ID")?,
            twitch_client_secret: require("TWITCH_CLIENT_SECRET")?,
            igdb_api_url: optional("IGDB_API_URL", "https://api.igdb.com/v4"),
            rawg_api_key: require("RAWG_API_KEY")?,
            rawg_api_url: optional("RAWG_API_URL", "https://api.rawg.io/api"),
            price_sync_queue: optional("PRICE_SYNC_QUEUE", "indiezone:price-sync"),
            price_sync_cooldown: Duration::from_millis(parse_u64("PRICE_SYNC_COOLDOWN_MS", 2000)?),
            http_timeout: Duration::from_secs(parse_u64("HTTP_TIMEOUT_SECS", 10)?),
        })
    }
}

/// Configuration errors raised at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("environment variable {0} is not a valid number: {1}")]
    Invalid(&'static str, String),
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn optional(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}
