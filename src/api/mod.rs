pub mod catalog;
pub mod http;

pub use catalog::StaticCatalog;
pub use http::HttpSwipeApi;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::models::{FilterCriteria, Holding, SwipeCandidate, SwipeRecord, WatchlistEntry};

/// The remote side of a swipe session.
#[async_trait]
pub trait SwipeApi: Send + Sync {
    async fn fetch_candidates(
        &self,
        filters: &FilterCriteria,
        limit: usize,
    ) -> Result<Vec<SwipeCandidate>>;
    async fn record_swipe(&self, record: &SwipeRecord) -> Result<()>;
    async fn fetch_holdings(&self) -> Result<Vec<Holding>>;
    async fn fetch_watchlist(&self) -> Result<Vec<WatchlistEntry>>;
    async fn add_to_watchlist(&self, symbol: &str, note: Option<&str>) -> Result<()>;
    async fn remove_from_watchlist(&self, symbol: &str) -> Result<()>;
}

/// An API with no remote behind it. Every call fails, so every operation
/// takes its local fallback path.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineApi;

#[async_trait]
impl SwipeApi for OfflineApi {
    async fn fetch_candidates(
        &self,
        _filters: &FilterCriteria,
        _limit: usize,
    ) -> Result<Vec<SwipeCandidate>> {
        bail!("offline: no API configured")
    }

    async fn record_swipe(&self, _record: &SwipeRecord) -> Result<()> {
        bail!("offline: no API configured")
    }

    async fn fetch_holdings(&self) -> Result<Vec<Holding>> {
        bail!("offline: no API configured")
    }

    async fn fetch_watchlist(&self) -> Result<Vec<WatchlistEntry>> {
        bail!("offline: no API configured")
    }

    async fn add_to_watchlist(&self, _symbol: &str, _note: Option<&str>) -> Result<()> {
        bail!("offline: no API configured")
    }

    async fn remove_from_watchlist(&self, _symbol: &str) -> Result<()> {
        bail!("offline: no API configured")
    }
}
