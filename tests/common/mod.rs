use anyhow::{bail, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use swipe_session::api::SwipeApi;
use swipe_session::config::Config;
use swipe_session::models::{
    FilterCriteria, Holding, RiskTier, SwipeCandidate, SwipeRecord, WatchlistEntry,
};
use swipe_session::session::{SessionOptions, SwipeClient, SwipeSession};
use swipe_session::store::{KeyValueStore, MemoryStore};

pub fn candidate(symbol: &str, sector: &str, priority_score: f64) -> SwipeCandidate {
    SwipeCandidate {
        symbol: symbol.to_string(),
        name: format!("{} Corp", symbol),
        price: 50.0,
        change: 0.5,
        change_percent: 1.0,
        sector: sector.to_string(),
        market_cap: "120.5B".to_string(),
        pe: Some(18.0),
        dividend_yield: Some(1.2),
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

/// A fresh data dir under the system temp dir, removed if it already exists.
pub fn temp_data_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "swipe_session_it_{}_{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

pub fn test_config() -> Config {
    Config {
        data_dir: temp_data_dir("config").to_string_lossy().into_owned(),
        ..Config::default()
    }
}

/// Scriptable remote. Serves its universe filtered by the request
/// criteria, in insertion order, up to the requested limit.
#[derive(Default)]
pub struct FakeRemote {
    universe: Mutex<Vec<SwipeCandidate>>,
    holdings: Mutex<Vec<String>>,
    swipes: Mutex<Vec<SwipeRecord>>,
    requests: Mutex<Vec<FilterCriteria>>,
    gated_sector: Mutex<Option<String>>,
    gate: Notify,

    pub fail_fetch: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_holdings: AtomicBool,
    pub fetch_calls: AtomicUsize,
    pub holdings_calls: AtomicUsize,
}

impl FakeRemote {
    pub fn new(universe: Vec<SwipeCandidate>) -> Arc<Self> {
        let fake = Self::default();
        *fake.universe.lock().unwrap() = universe;
        Arc::new(fake)
    }

    pub fn push(&self, c: SwipeCandidate) {
        self.universe.lock().unwrap().push(c);
    }

    pub fn set_holdings(&self, symbols: &[&str]) {
        *self.holdings.lock().unwrap() = symbols.iter().map(|s| s.to_string()).collect();
    }

    /// Hold fetches for `sector` until `open_gate`.
    pub fn gate(&self, sector: &str) {
        *self.gated_sector.lock().unwrap() = Some(sector.to_string());
    }

    pub fn open_gate(&self) {
        self.gate.notify_one();
    }

    pub fn swipes(&self) -> Vec<SwipeRecord> {
        self.swipes.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<FilterCriteria> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SwipeApi for FakeRemote {
    async fn fetch_candidates(
        &self,
        filters: &FilterCriteria,
        limit: usize,
    ) -> Result<Vec<SwipeCandidate>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(filters.clone());
        if self.fail_fetch.load(Ordering::SeqCst) {
            bail!("503 Service Unavailable");
        }

        let gated = self.gated_sector.lock().unwrap().clone();
        if gated.is_some() && gated == filters.sector {
            self.gate.notified().await;
        }

        Ok(self
            .universe
            .lock()
            .unwrap()
            .iter()
            .filter(|c| filters.matches(c))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn record_swipe(&self, record: &SwipeRecord) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("500 Internal Server Error");
        }
        self.swipes.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn fetch_holdings(&self) -> Result<Vec<Holding>> {
        self.holdings_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_holdings.load(Ordering::SeqCst) {
            bail!("401 Unauthorized");
        }
        Ok(self
            .holdings
            .lock()
            .unwrap()
            .iter()
            .map(|s| Holding {
                symbol: s.clone(),
                shares: None,
                avg_cost: None,
                current_value: None,
            })
            .collect())
    }

    async fn fetch_watchlist(&self) -> Result<Vec<WatchlistEntry>> {
        bail!("404 Not Found")
    }

    async fn add_to_watchlist(&self, _symbol: &str, _note: Option<&str>) -> Result<()> {
        bail!("404 Not Found")
    }

    async fn remove_from_watchlist(&self, _symbol: &str) -> Result<()> {
        bail!("404 Not Found")
    }
}

/// Session over `api` and an in-memory store.
pub fn session_over(
    api: Arc<dyn SwipeApi>,
    filters: FilterCriteria,
    preload_count: usize,
) -> (SwipeSession, Arc<SwipeClient>) {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    session_with_store(api, store, filters, preload_count)
}

pub fn session_with_store(
    api: Arc<dyn SwipeApi>,
    store: Arc<dyn KeyValueStore>,
    filters: FilterCriteria,
    preload_count: usize,
) -> (SwipeSession, Arc<SwipeClient>) {
    let client = Arc::new(SwipeClient::new(api, store, &test_config()));
    let session = SwipeSession::new(
        client.clone(),
        SessionOptions {
            filters,
            preload_count,
        },
    )
    .unwrap();
    (session, client)
}
