use std::collections::HashSet;

use crate::models::{FilterCriteria, Returns, RiskTier, SwipeCandidate};

const OWNED_PRIORITY: f64 = 0.3;
const UNOWNED_PRIORITY: f64 = 0.8;

/// A fixed, in-memory stock universe. Answers candidate queries when the
/// remote is down: degraded, but deterministic for the same inputs.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    stocks: Vec<SwipeCandidate>,
}

impl StaticCatalog {
    pub fn new(stocks: Vec<SwipeCandidate>) -> Self {
        Self { stocks }
    }

    /// The built-in demo universe.
    pub fn builtin() -> Self {
        Self::new(builtin_stocks())
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&SwipeCandidate> {
        self.stocks.iter().find(|s| s.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Filter, flag ownership, rank and cap the universe.
    ///
    /// Owned stocks rank below unowned ones unless `hide_owned` drops them
    /// outright. Ties keep table order. Symbols in `exclude` are skipped.
    pub fn query(
        &self,
        filters: &FilterCriteria,
        owned: &HashSet<String>,
        exclude: &HashSet<String>,
        limit: usize,
    ) -> Vec<SwipeCandidate> {
        let mut matches: Vec<SwipeCandidate> = self
            .stocks
            .iter()
            .filter(|s| !exclude.contains(&s.symbol))
            .filter(|s| filters.matches(s))
            .map(|s| {
                let is_owned = owned.contains(&s.symbol);
                SwipeCandidate {
                    already_owned: is_owned,
                    priority_score: if is_owned { OWNED_PRIORITY } else { UNOWNED_PRIORITY },
                    ..s.clone()
                }
            })
            .filter(|s| !(filters.hide_owned && s.already_owned))
            .collect();

        matches.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
        matches.truncate(limit);
        matches
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[allow(clippy::too_many_arguments)]
fn stock(
    symbol: &str,
    name: &str,
    price: f64,
    change: f64,
    change_percent: f64,
    sector: &str,
    market_cap: &str,
    pe: Option<f64>,
    dividend_yield: Option<f64>,
    risk: RiskTier,
    volume: &str,
    returns: (f64, f64, f64),
    news_summary: &str,
) -> SwipeCandidate {
    SwipeCandidate {
        symbol: symbol.to_string(),
        name: name.to_string(),
        price,
        change,
        change_percent,
        sector: sector.to_string(),
        market_cap: market_cap.to_string(),
        pe,
        dividend_yield,
        risk,
        already_owned: false,
        priority_score: UNOWNED_PRIORITY,
        volume: Some(volume.to_string()),
        is_gainer: Some(change > 0.0),
        news_summary: Some(news_summary.to_string()),
        returns: Some(Returns {
            one_month: returns.0,
            six_month: returns.1,
            one_year: returns.2,
        }),
        earnings_date: None,
    }
}

fn builtin_stocks() -> Vec<SwipeCandidate> {
    use RiskTier::{High, Low, Medium};
    vec![
        stock("AAPL", "Apple Inc.", 182.52, 2.31, 1.28, "Technology", "2.85T", Some(29.8), Some(0.5), Medium, "52.4M", (3.2, 12.7, 18.4), "Strong iPhone sales, AI momentum"),
        stock("MSFT", "Microsoft Corporation", 378.85, -1.22, -0.32, "Technology", "2.81T", Some(35.2), Some(0.8), Low, "21.7M", (2.1, 14.9, 27.5), "Azure growth steady, Copilot rollout"),
        stock("GOOGL", "Alphabet Inc.", 138.21, 1.82, 1.33, "Communication Services", "1.75T", Some(27.3), None, Medium, "28.1M", (4.1, 15.3, 22.8), "Search dominance, AI investments"),
        stock("AMZN", "Amazon.com, Inc.", 144.05, 1.88, 1.32, "Consumer Discretionary", "1.50T", Some(45.6), None, Medium, "44.3M", (2.8, 18.9, 31.7), "AWS growth, retail margins up"),
        stock("NVDA", "NVIDIA Corporation", 722.48, 12.66, 1.78, "Technology", "1.78T", Some(68.9), Some(0.3), High, "67.8M", (8.9, 42.1, 186.3), "AI chip demand surging, earnings beat"),
        stock("TSLA", "Tesla, Inc.", 238.77, -8.32, -3.37, "Consumer Discretionary", "759.8B", Some(73.2), None, High, "89.7M", (-5.2, 8.1, 45.2), "Production delays, competition fears"),
        stock("META", "Meta Platforms, Inc.", 298.35, 4.67, 1.59, "Communication Services", "765.2B", Some(23.1), None, Medium, "18.3M", (5.4, 21.6, 48.9), "Ad revenue rebound, Reality Labs spend"),
        stock("JPM", "JPMorgan Chase & Co.", 154.23, -0.87, -0.56, "Financial Services", "452.1B", Some(12.8), Some(2.4), Low, "12.4M", (1.2, 5.8, 12.3), "Rate concerns, lending slowdown"),
        stock("V", "Visa Inc.", 267.89, 2.33, 0.88, "Financial Services", "548.3B", Some(30.4), Some(0.8), Low, "6.2M", (1.9, 7.4, 16.1), "Cross-border volume recovering"),
        stock("JNJ", "Johnson & Johnson", 161.42, 0.34, 0.21, "Healthcare", "427.3B", Some(15.2), Some(3.1), Low, "8.9M", (0.8, 3.2, 7.9), "Pharmaceutical pipeline strong"),
        stock("UNH", "UnitedHealth Group", 524.75, 3.21, 0.62, "Healthcare", "485.6B", Some(22.9), Some(1.4), Low, "3.1M", (1.5, 4.4, 9.8), "Medical cost trends in focus"),
        stock("PFE", "Pfizer Inc.", 28.91, -0.41, -1.40, "Healthcare", "163.2B", Some(14.1), Some(5.8), Low, "31.5M", (-2.3, -9.7, -24.6), "Post-pandemic revenue reset"),
        stock("KO", "Coca-Cola Company", 59.84, 0.22, 0.37, "Consumer Staples", "258.4B", Some(23.7), Some(3.1), Low, "11.8M", (0.6, 2.9, 4.2), "Pricing power offsets volume dip"),
        stock("XOM", "Exxon Mobil Corporation", 104.19, -1.35, -1.28, "Energy", "417.9B", Some(11.6), Some(3.5), High, "17.6M", (-3.1, -1.8, 2.4), "Crude prices slide on supply"),
        stock("AMD", "Advanced Micro Devices", 168.52, 9.12, 5.72, "Technology", "272.3B", Some(44.0), None, High, "74.9M", (22.4, 51.3, 112.7), "MI300 accelerators ramping"),
        stock("INTC", "Intel Corporation", 43.18, -2.90, -6.29, "Technology", "182.1B", None, Some(1.2), Medium, "58.0M", (-8.4, 12.6, 38.0), "Foundry roadmap questioned"),
        stock("SOFI", "SoFi Technologies", 7.85, 0.12, 1.55, "Financial Services", "7.6B", None, None, High, "41.2M", (-11.2, 9.4, 22.1), "Member growth, bank charter tailwinds"),
        stock("LMND", "Lemonade, Inc.", 16.40, -0.58, -3.42, "Financial Services", "1.2B", None, None, High, "2.3M", (-14.8, -6.5, -21.3), "Loss ratio improving slowly"),
    ]
}
