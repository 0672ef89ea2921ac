use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB v3 API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Redis connection URL (keyword search cache)
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Region used for watch-provider availability (ISO 3166-1)
    #[serde(default = "default_watch_region")]
    pub watch_region: String,

    /// Provider ids allowed when a request does not name its own
    #[serde(default = "default_services")]
    pub default_services: Vec<u32>,

    /// Maximum discovery pages fetched by one batch fill
    #[serde(default = "default_page_budget")]
    pub page_budget: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pause between consecutive curated keyword lookups
    #[serde(default = "default_keyword_lookup_delay_ms")]
    pub keyword_lookup_delay_ms: u64,

    #[serde(default = "default_keyword_cache_ttl_secs")]
    pub keyword_cache_ttl_secs: u64,

    /// Vote-count floor applied to every discovery query
    #[serde(default = "default_min_vote_count")]
    pub min_vote_count: u32,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_watch_region() -> String {
    "GB".to_string()
}

fn default_services() -> Vec<u32> {
    vec![8, 9, 337]
}

fn default_page_budget() -> u32 {
    50
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_keyword_lookup_delay_ms() -> u64 {
    250
}

fn default_keyword_cache_ttl_secs() -> u64 {
    86_400
}

fn default_min_vote_count() -> u32 {
    50
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn keyword_lookup_delay(&self) -> Duration {
        Duration::from_millis(self.keyword_lookup_delay_ms)
    }
}
