use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::{FilterCriteria, MarketCapBucket, PeBucket, PerformanceBucket, RiskTier};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Remote API; None runs fully on the local fallbacks
    pub api_base_url: Option<String>,
    pub request_timeout_secs: u64,

    // Session
    pub preload_count: usize,
    pub default_filters: FilterCriteria,

    // Local persistence
    pub data_dir: String,
    pub swipe_history_capacity: usize,
    pub portfolio_cache_ttl_secs: u64,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };
        let opt = |key: &str| -> Option<String> {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut default_filters = FilterCriteria::default()
            .with_sector(&env("DEFAULT_SECTOR", "All"))
            .hiding_owned(env("HIDE_OWNED", "false").to_lowercase() == "true");
        default_filters.market_cap = opt("DEFAULT_MARKET_CAP")
            .and_then(|s| MarketCapBucket::from_str_loose(&s));
        default_filters.risk_level = opt("DEFAULT_RISK").and_then(|s| RiskTier::from_str_loose(&s));
        default_filters.performance = opt("DEFAULT_PERFORMANCE")
            .and_then(|s| PerformanceBucket::from_str_loose(&s));
        default_filters.pe_range = opt("DEFAULT_PE_RANGE").and_then(|s| PeBucket::from_str_loose(&s));

        Config {
            api_base_url: opt("SWIPE_API_URL").map(|u| u.trim_end_matches('/').to_string()),
            request_timeout_secs: env("REQUEST_TIMEOUT_SECS", "5").parse().unwrap_or(5),
            preload_count: env("PRELOAD_COUNT", "3").parse().unwrap_or(3),
            default_filters,
            data_dir: env("DATA_DIR", "data"),
            swipe_history_capacity: env("SWIPE_HISTORY_CAPACITY", "1000")
                .parse()
                .unwrap_or(1000),
            portfolio_cache_ttl_secs: env("PORTFOLIO_CACHE_TTL_SECS", "300")
                .parse()
                .unwrap_or(300),
            log_level: env("LOG_LEVEL", "info"),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn portfolio_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.portfolio_cache_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: None,
            request_timeout_secs: 5,
            preload_count: 3,
            default_filters: FilterCriteria::default(),
            data_dir: "data".to_string(),
            swipe_history_capacity: 1000,
            portfolio_cache_ttl_secs: 300,
            log_level: "info".to_string(),
        }
    }
}
