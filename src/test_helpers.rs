use anyhow::{bail, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::api::SwipeApi;
use crate::config::Config;
use crate::models::{
    FilterCriteria, Holding, RiskTier, SwipeCandidate, SwipeRecord, WatchlistEntry,
};

/// Config pointing at a throwaway data dir, with no remote configured.
pub fn default_test_config() -> Config {
    Config {
        data_dir: scratch_dir("config").to_string_lossy().into_owned(),
        ..Config::default()
    }
}

/// A fresh, unique directory under the system temp dir.
pub fn scratch_dir(label: &str) -> PathBuf {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let n = NEXT.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "swipe_session_{}_{}_{}",
        label,
        std::process::id(),
        n
    ))
}

/// A large-cap, medium-risk technology stock with the given priority.
pub fn make_candidate(symbol: &str, priority_score: f64) -> SwipeCandidate {
    SwipeCandidate {
        symbol: symbol.to_string(),
        name: format!("{} Inc.", symbol),
        price: 100.0,
        change: 1.0,
        change_percent: 1.0,
        sector: "Technology".to_string(),
        market_cap: "Large".to_string(),
        pe: Some(20.0),
        dividend_yield: None,
        risk: RiskTier::Medium,
        already_owned: false,
        priority_score,
        volume: None,
        is_gainer: None,
        news_summary: None,
        returns: None,
        earnings_date: None,
    }
}

/// In-process stand-in for the remote API.
///
/// Serves `universe` filtered by the request's criteria, in universe order,
/// capped at the requested limit. Each surface can be made to fail.
#[derive(Default)]
pub struct MockApi {
    universe: Vec<SwipeCandidate>,
    holdings: Vec<String>,
    records: Mutex<Vec<SwipeRecord>>,
    watchlist: Mutex<Vec<String>>,

    pub fail_fetch: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_holdings: AtomicBool,
    pub fail_watchlist: AtomicBool,

    pub fetch_calls: AtomicUsize,
    pub holdings_calls: AtomicUsize,
    pub last_limit: AtomicUsize,
}

impl MockApi {
    pub fn with_universe(universe: Vec<SwipeCandidate>) -> Self {
        Self {
            universe,
            ..Self::default()
        }
    }

    pub fn holding(mut self, symbols: &[&str]) -> Self {
        self.holdings = symbols.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn recorded(&self) -> Vec<SwipeRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl SwipeApi for MockApi {
    async fn fetch_candidates(
        &self,
        filters: &FilterCriteria,
        limit: usize,
    ) -> Result<Vec<SwipeCandidate>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.last_limit.store(limit, Ordering::SeqCst);

        if self.fail_fetch.load(Ordering::SeqCst) {
            bail!("mock: candidate fetch failed");
        }

        Ok(self
            .universe
            .iter()
            .filter(|c| filters.matches(c))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn record_swipe(&self, record: &SwipeRecord) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("mock: swipe write failed");
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn fetch_holdings(&self) -> Result<Vec<Holding>> {
        self.holdings_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_holdings.load(Ordering::SeqCst) {
            bail!("mock: holdings unavailable");
        }
        Ok(self
            .holdings
            .iter()
            .map(|s| Holding {
                symbol: s.clone(),
                shares: Some(10.0),
                avg_cost: None,
                current_value: None,
            })
            .collect())
    }

    async fn fetch_watchlist(&self) -> Result<Vec<WatchlistEntry>> {
        if self.fail_watchlist.load(Ordering::SeqCst) {
            bail!("mock: watchlist unavailable");
        }
        Ok(self
            .watchlist
            .lock()
            .unwrap()
            .iter()
            .map(|s| WatchlistEntry {
                symbol: s.clone(),
                note: None,
                added_at: None,
            })
            .collect())
    }

    async fn add_to_watchlist(&self, symbol: &str, _note: Option<&str>) -> Result<()> {
        if self.fail_watchlist.load(Ordering::SeqCst) {
            bail!("mock: watchlist unavailable");
        }
        let mut list = self.watchlist.lock().unwrap();
        if !list.iter().any(|s| s == symbol) {
            list.push(symbol.to_string());
        }
        Ok(())
    }

    async fn remove_from_watchlist(&self, symbol: &str) -> Result<()> {
        if self.fail_watchlist.load(Ordering::SeqCst) {
            bail!("mock: watchlist unavailable");
        }
        self.watchlist.lock().unwrap().retain(|s| s != symbol);
        Ok(())
    }
}
