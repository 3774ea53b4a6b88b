use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const PORTFOLIO_CACHE_KEY: &str = "user_portfolio";

/// Owned symbols as last fetched from the holdings endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioCache {
    #[serde(rename = "portfolio")]
    pub symbols: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

impl PortfolioCache {
    pub fn new(symbols: Vec<String>, last_updated: DateTime<Utc>) -> Self {
        Self {
            symbols,
            last_updated,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_updated).to_std().unwrap_or(Duration::ZERO)
    }

    /// Fresh strictly below the TTL.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn freshness_boundary() {
        let now = Utc::now();
        let cache = PortfolioCache::new(vec!["AAPL".into()], now - ChronoDuration::seconds(299));
        assert!(cache.is_fresh(now, TTL));

        let cache = PortfolioCache::new(vec!["AAPL".into()], now - ChronoDuration::seconds(300));
        assert!(!cache.is_fresh(now, TTL));
    }

    #[test]
    fn future_timestamp_counts_as_fresh() {
        let now = Utc::now();
        let cache = PortfolioCache::new(vec![], now + ChronoDuration::seconds(30));
        assert_eq!(cache.age(now), Duration::ZERO);
        assert!(cache.is_fresh(now, TTL));
    }

    #[test]
    fn stored_shape_uses_portfolio_key() {
        let now = DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let json = serde_json::to_value(PortfolioCache::new(vec!["V".into()], now)).unwrap();
        assert_eq!(json["portfolio"][0], "V");
        assert_eq!(json["lastUpdated"], "2024-01-15T12:00:00Z");
    }
}
