use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<RiskTier> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(RiskTier::Low),
            "medium" | "med" => Some(RiskTier::Medium),
            "high" => Some(RiskTier::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Returns {
    pub one_month: f64,
    pub six_month: f64,
    pub one_year: f64,
}

/// A stock eligible to be shown for a swipe decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeCandidate {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub change: f64,
    #[serde(default)]
    pub change_percent: f64,
    #[serde(default)]
    pub sector: String,
    /// Display string ("2.85T", "759.8B") or a bucket label ("Large").
    #[serde(default)]
    pub market_cap: String,
    #[serde(default)]
    pub pe: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    #[serde(default)]
    pub risk: RiskTier,
    #[serde(default)]
    pub already_owned: bool,
    #[serde(default)]
    pub priority_score: f64,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub is_gainer: Option<bool>,
    #[serde(default)]
    pub news_summary: Option<String>,
    #[serde(default)]
    pub returns: Option<Returns>,
    #[serde(default)]
    pub earnings_date: Option<String>,
}

impl SwipeCandidate {
    /// Market cap in USD, parsed from suffixed display strings.
    pub fn market_cap_usd(&self) -> Option<f64> {
        parse_dollar_amount(&self.market_cap)
    }
}

fn parse_dollar_amount(raw: &str) -> Option<f64> {
    let s = raw.trim().trim_start_matches('$');
    let (digits, multiplier) = match s.chars().last()? {
        'T' | 't' => (&s[..s.len() - 1], 1e12),
        'B' | 'b' => (&s[..s.len() - 1], 1e9),
        'M' | 'm' => (&s[..s.len() - 1], 1e6),
        'K' | 'k' => (&s[..s.len() - 1], 1e3),
        _ => (s, 1.0),
    };
    digits.trim().parse::<f64>().ok().map(|v| v * multiplier)
}

/// A position in the user's portfolio, as reported by the holdings endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    #[serde(default)]
    pub shares: Option<f64>,
    #[serde(default)]
    pub avg_cost: Option<f64>,
    #[serde(default)]
    pub current_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub symbol: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

/// Trim and uppercase a user-entered ticker.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_suffixed_market_caps() {
        assert_eq!(parse_dollar_amount("2.85T"), Some(2.85e12));
        assert_eq!(parse_dollar_amount("759.8B"), Some(759.8e9));
        assert_eq!(parse_dollar_amount("$450M"), Some(450e6));
        assert_eq!(parse_dollar_amount("Large"), None);
        assert_eq!(parse_dollar_amount(""), None);
    }

    #[test]
    fn deserializes_sparse_api_record() {
        let json = r#"{
            "symbol": "AAPL",
            "name": "Apple Inc.",
            "price": 175.43,
            "changePercent": 1.24,
            "sector": "Technology",
            "marketCap": "Large",
            "risk": "Medium",
            "alreadyOwned": true,
            "priorityScore": 0.3
        }"#;
        let c: SwipeCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(c.symbol, "AAPL");
        assert!(c.already_owned);
        assert!((c.priority_score - 0.3).abs() < f64::EPSILON);
        assert_eq!(c.pe, None);
        assert_eq!(c.risk, RiskTier::Medium);
    }

    #[test]
    fn normalizes_symbols() {
        assert_eq!(normalize_symbol("  brk.b "), "BRK.B");
    }
}
