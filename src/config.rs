use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub autoplay: AutoplayConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    /// Base URL of the audio node, e.g. "http://localhost:2333".
    pub url: String,
    pub password: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    /// Ordered search prefixes tried during resolution.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    /// Candidates kept per (query, source) call.
    #[serde(default = "default_per_source_cap")]
    pub per_source_cap: usize,
    /// TTL of the repeat-query cache.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AutoplayConfig {
    /// How many recent guild history entries block re-recommendation.
    #[serde(default = "default_history_block")]
    pub history_block: usize,
    #[serde(default = "default_guild_history_cap")]
    pub guild_history_cap: usize,
    #[serde(default = "default_global_recent_cap")]
    pub global_recent_cap: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub filters: Option<String>,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_sources() -> Vec<String> {
    vec!["ytsearch".to_string(), "ytmsearch".to_string()]
}

fn default_per_source_cap() -> usize {
    15
}

fn default_cache_ttl_secs() -> u64 {
    120
}

fn default_history_block() -> usize {
    10
}

fn default_guild_history_cap() -> usize {
    30
}

fn default_global_recent_cap() -> usize {
    200
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            per_source_cap: default_per_source_cap(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            history_block: default_history_block(),
            guild_history_cap: default_guild_history_cap(),
            global_recent_cap: default_global_recent_cap(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_str = std::fs::read_to_string("config.toml").unwrap_or_else(|_| "".to_string());
        if config_str.is_empty() {
            return Err("config.toml not found or empty".into());
        }
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }
}
