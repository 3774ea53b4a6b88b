use serde::{Deserialize, Serialize};
use std::fmt;

use super::candidate::{RiskTier, SwipeCandidate};

const LARGE_CAP_FLOOR: f64 = 10e9;
const MID_CAP_FLOOR: f64 = 2e9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketCapBucket {
    Small,
    Mid,
    Large,
}

impl MarketCapBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketCapBucket::Small => "Small",
            MarketCapBucket::Mid => "Mid",
            MarketCapBucket::Large => "Large",
        }
    }

    /// Accepts bare labels and the picker strings ("Large Cap (>$10B)").
    pub fn from_str_loose(s: &str) -> Option<MarketCapBucket> {
        let s = s.trim().to_lowercase();
        if s.starts_with("large") {
            Some(MarketCapBucket::Large)
        } else if s.starts_with("mid") {
            Some(MarketCapBucket::Mid)
        } else if s.starts_with("small") {
            Some(MarketCapBucket::Small)
        } else {
            None
        }
    }

    pub fn for_usd(amount: f64) -> MarketCapBucket {
        if amount >= LARGE_CAP_FLOOR {
            MarketCapBucket::Large
        } else if amount >= MID_CAP_FLOOR {
            MarketCapBucket::Mid
        } else {
            MarketCapBucket::Small
        }
    }

    pub fn contains(&self, candidate: &SwipeCandidate) -> bool {
        let bucket = match candidate.market_cap_usd() {
            Some(usd) => Some(MarketCapBucket::for_usd(usd)),
            None => MarketCapBucket::from_str_loose(&candidate.market_cap),
        };
        bucket == Some(*self)
    }
}

impl fmt::Display for MarketCapBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformanceBucket {
    #[serde(rename = "Today's Gainers (>5%)")]
    TodayGainers,
    #[serde(rename = "Today's Losers (<-5%)")]
    TodayLosers,
    #[serde(rename = "Weekly Gainers (>10%)")]
    WeeklyGainers,
    #[serde(rename = "Weekly Losers (<-10%)")]
    WeeklyLosers,
    #[serde(rename = "Monthly Winners (>20%)")]
    MonthlyWinners,
    #[serde(rename = "Monthly Losers (<-20%)")]
    MonthlyLosers,
    #[serde(rename = "YTD Winners (>50%)")]
    YtdWinners,
    #[serde(rename = "YTD Losers (<-50%)")]
    YtdLosers,
}

impl PerformanceBucket {
    pub const ALL: [PerformanceBucket; 8] = [
        PerformanceBucket::TodayGainers,
        PerformanceBucket::TodayLosers,
        PerformanceBucket::WeeklyGainers,
        PerformanceBucket::WeeklyLosers,
        PerformanceBucket::MonthlyWinners,
        PerformanceBucket::MonthlyLosers,
        PerformanceBucket::YtdWinners,
        PerformanceBucket::YtdLosers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceBucket::TodayGainers => "Today's Gainers (>5%)",
            PerformanceBucket::TodayLosers => "Today's Losers (<-5%)",
            PerformanceBucket::WeeklyGainers => "Weekly Gainers (>10%)",
            PerformanceBucket::WeeklyLosers => "Weekly Losers (<-10%)",
            PerformanceBucket::MonthlyWinners => "Monthly Winners (>20%)",
            PerformanceBucket::MonthlyLosers => "Monthly Losers (<-20%)",
            PerformanceBucket::YtdWinners => "YTD Winners (>50%)",
            PerformanceBucket::YtdLosers => "YTD Losers (<-50%)",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<PerformanceBucket> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s))
    }

    /// The fallback table only carries a daily change, so the weekly
    /// buckets are judged on it as well.
    pub fn contains(&self, candidate: &SwipeCandidate) -> bool {
        let pct = candidate.change_percent;
        let returns = candidate.returns;
        match self {
            PerformanceBucket::TodayGainers => pct > 5.0,
            PerformanceBucket::TodayLosers => pct < -5.0,
            PerformanceBucket::WeeklyGainers => pct > 10.0,
            PerformanceBucket::WeeklyLosers => pct < -10.0,
            PerformanceBucket::MonthlyWinners => returns.is_some_and(|r| r.one_month > 20.0),
            PerformanceBucket::MonthlyLosers => returns.is_some_and(|r| r.one_month < -20.0),
            PerformanceBucket::YtdWinners => returns.is_some_and(|r| r.one_year > 50.0),
            PerformanceBucket::YtdLosers => returns.is_some_and(|r| r.one_year < -50.0),
        }
    }
}

impl fmt::Display for PerformanceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeBucket {
    #[serde(rename = "0-15")]
    UpTo15,
    #[serde(rename = "15-25")]
    From15To25,
    #[serde(rename = "25-40")]
    From25To40,
    #[serde(rename = "40+")]
    Above40,
}

impl PeBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeBucket::UpTo15 => "0-15",
            PeBucket::From15To25 => "15-25",
            PeBucket::From25To40 => "25-40",
            PeBucket::Above40 => "40+",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<PeBucket> {
        match s.trim() {
            "0-15" => Some(PeBucket::UpTo15),
            "15-25" => Some(PeBucket::From15To25),
            "25-40" => Some(PeBucket::From25To40),
            "40+" => Some(PeBucket::Above40),
            _ => None,
        }
    }

    /// Lower bound inclusive, upper bound exclusive. No P/E never matches.
    pub fn contains(&self, candidate: &SwipeCandidate) -> bool {
        let Some(pe) = candidate.pe else {
            return false;
        };
        match self {
            PeBucket::UpTo15 => (0.0..15.0).contains(&pe),
            PeBucket::From15To25 => (15.0..25.0).contains(&pe),
            PeBucket::From25To40 => (25.0..40.0).contains(&pe),
            PeBucket::Above40 => pe >= 40.0,
        }
    }
}

impl fmt::Display for PeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Candidate selection criteria. `None` on any field means "All".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub market_cap: Option<MarketCapBucket>,
    #[serde(default)]
    pub risk_level: Option<RiskTier>,
    #[serde(default)]
    pub performance: Option<PerformanceBucket>,
    #[serde(default)]
    pub pe_range: Option<PeBucket>,
    #[serde(default)]
    pub hide_owned: bool,
}

impl FilterCriteria {
    /// "All" and "All Sectors" clear the sector filter.
    pub fn with_sector(mut self, sector: &str) -> Self {
        let sector = sector.trim();
        self.sector = if sector.is_empty() || sector.to_lowercase().starts_with("all") {
            None
        } else {
            Some(sector.to_string())
        };
        self
    }

    pub fn with_market_cap(mut self, bucket: MarketCapBucket) -> Self {
        self.market_cap = Some(bucket);
        self
    }

    pub fn with_risk(mut self, risk: RiskTier) -> Self {
        self.risk_level = Some(risk);
        self
    }

    pub fn with_performance(mut self, bucket: PerformanceBucket) -> Self {
        self.performance = Some(bucket);
        self
    }

    pub fn with_pe_range(mut self, bucket: PeBucket) -> Self {
        self.pe_range = Some(bucket);
        self
    }

    pub fn hiding_owned(mut self, hide: bool) -> Self {
        self.hide_owned = hide;
        self
    }

    /// Query string pairs for the candidate endpoint.
    pub fn query_params(&self, limit: usize) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(sector) = &self.sector {
            params.push(("sector", sector.clone()));
        }
        if let Some(cap) = self.market_cap {
            params.push(("market_cap", cap.as_str().to_string()));
        }
        if let Some(risk) = self.risk_level {
            params.push(("risk_level", risk.as_str().to_string()));
        }
        params.push(("hide_owned", self.hide_owned.to_string()));
        if let Some(perf) = self.performance {
            params.push(("performance", perf.as_str().to_string()));
        }
        if let Some(pe) = self.pe_range {
            params.push(("pe_range", pe.as_str().to_string()));
        }
        params.push(("limit", limit.to_string()));
        params
    }

    /// Attribute match. Ownership is judged separately against the
    /// portfolio, see `hide_owned`.
    pub fn matches(&self, candidate: &SwipeCandidate) -> bool {
        if let Some(sector) = &self.sector {
            if !candidate.sector.eq_ignore_ascii_case(sector) {
                return false;
            }
        }
        if let Some(risk) = self.risk_level {
            if candidate.risk != risk {
                return false;
            }
        }
        if let Some(cap) = self.market_cap {
            if !cap.contains(candidate) {
                return false;
            }
        }
        if let Some(perf) = self.performance {
            if !perf.contains(candidate) {
                return false;
            }
        }
        if let Some(pe) = self.pe_range {
            if !pe.contains(candidate) {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(sector) = &self.sector {
            parts.push(format!("sector={}", sector));
        }
        if let Some(cap) = self.market_cap {
            parts.push(format!("cap={}", cap));
        }
        if let Some(risk) = self.risk_level {
            parts.push(format!("risk={}", risk));
        }
        if let Some(perf) = self.performance {
            parts.push(format!("perf={}", perf));
        }
        if let Some(pe) = self.pe_range {
            parts.push(format!("pe={}", pe));
        }
        if self.hide_owned {
            parts.push("hide_owned".to_string());
        }
        if parts.is_empty() {
            write!(f, "all")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}
