use anyhow::{anyhow, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::api::{StaticCatalog, SwipeApi};
use crate::config::Config;
use crate::error::SessionError;
use crate::models::{normalize_symbol, FilterCriteria, SwipeCandidate, SwipeRecord};
use crate::session::portfolio::{PortfolioCache, PORTFOLIO_CACHE_KEY};
use crate::store::{JsonStoreExt, KeyValueStore, LocalWatchlist, SwipeHistory};

/// Ceiling on extra rows requested from the remote to cover excluded
/// symbols. Keeps the request size fixed however long the session runs.
pub const MAX_REMOTE_OVERFETCH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Remote,
    Fallback,
}

/// One answer to a candidate request, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct CandidateBatch {
    pub candidates: Vec<SwipeCandidate>,
    pub source: DataSource,
    /// Set when the remote failed and the fallback table answered instead.
    pub remote_error: Option<String>,
}

/// Where a swipe record ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Remote,
    LocalFallback,
    /// Both the remote log and the local ring buffer failed.
    Dropped,
}

/// Remote calls with local fallbacks. Every operation resolves to a usable
/// value; transport failures are logged and absorbed here.
pub struct SwipeClient {
    api: Arc<dyn SwipeApi>,
    store: Arc<dyn KeyValueStore>,
    catalog: StaticCatalog,
    history: SwipeHistory,
    watchlist: LocalWatchlist,
    request_timeout: Duration,
    portfolio_ttl: Duration,
}

impl SwipeClient {
    pub fn new(api: Arc<dyn SwipeApi>, store: Arc<dyn KeyValueStore>, cfg: &Config) -> Self {
        Self {
            api,
            history: SwipeHistory::new(store.clone(), cfg.swipe_history_capacity),
            watchlist: LocalWatchlist::new(store.clone()),
            store,
            catalog: StaticCatalog::builtin(),
            request_timeout: cfg.request_timeout(),
            portfolio_ttl: cfg.portfolio_cache_ttl(),
        }
    }

    pub fn with_catalog(mut self, catalog: StaticCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn history(&self) -> &SwipeHistory {
        &self.history
    }

    pub fn catalog(&self) -> &StaticCatalog {
        &self.catalog
    }

    async fn remote<T, F>(&self, what: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!("{} timed out after {:?}", what, self.request_timeout)),
        }
    }

    /// Fetch up to `limit` candidates not in `exclude`.
    ///
    /// The remote cannot be told what to exclude, so it is asked for up to
    /// `MAX_REMOTE_OVERFETCH` extra items and the caller drops the overlap.
    /// On failure the static table answers with the same criteria and the
    /// full exclusion set.
    pub async fn get_swipeable_stocks(
        &self,
        filters: &FilterCriteria,
        limit: usize,
        owned: &HashSet<String>,
        exclude: &HashSet<String>,
    ) -> CandidateBatch {
        let remote_limit = limit + exclude.len().min(MAX_REMOTE_OVERFETCH);
        match self
            .remote("Candidate fetch", self.api.fetch_candidates(filters, remote_limit))
            .await
        {
            Ok(candidates) => CandidateBatch {
                candidates,
                source: DataSource::Remote,
                remote_error: None,
            },
            Err(e) => {
                warn!("Swipeable stocks API not available, using fallback: {:#}", e);
                let candidates = self.catalog.query(filters, owned, exclude, limit);
                debug!("Fallback table matched {} candidates ({})", candidates.len(), filters);
                CandidateBatch {
                    candidates,
                    source: DataSource::Fallback,
                    remote_error: Some(format!("{:#}", e)),
                }
            }
        }
    }

    /// Write a swipe to the remote log, or to the local ring buffer if that
    /// fails.
    pub async fn record_swipe(&self, record: &SwipeRecord) -> WriteOutcome {
        let err = match self
            .remote("Swipe recording", self.api.record_swipe(record))
            .await
        {
            Ok(()) => return WriteOutcome::Remote,
            Err(e) => e,
        };
        warn!("Swipe recording API not available, storing locally: {:#}", err);

        match self.history.append(record).await {
            Ok(len) => {
                debug!("Stored {} {} locally ({} entries)", record.action, record.symbol, len);
                WriteOutcome::LocalFallback
            }
            Err(e) => {
                error!(
                    "Dropped swipe {} {} at {}: {}",
                    record.action,
                    record.symbol,
                    record.timestamp.to_rfc3339(),
                    e
                );
                WriteOutcome::Dropped
            }
        }
    }

    /// Owned symbols. A fresh cache answers without touching the network;
    /// otherwise the remote is asked, then a stale cache, then nothing.
    pub async fn get_user_portfolio(&self) -> Vec<String> {
        let cached: Option<PortfolioCache> = match self.store.get_json_lenient(PORTFOLIO_CACHE_KEY).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Failed to load cached portfolio: {}", e);
                None
            }
        };

        if let Some(cache) = &cached {
            if cache.is_fresh(Utc::now(), self.portfolio_ttl) {
                debug!("Using cached portfolio ({} symbols)", cache.symbols.len());
                return cache.symbols.clone();
            }
        }

        match self.remote("Portfolio fetch", self.api.fetch_holdings()).await {
            Ok(holdings) => {
                let mut symbols: Vec<String> = Vec::with_capacity(holdings.len());
                for h in holdings {
                    let s = normalize_symbol(&h.symbol);
                    if !s.is_empty() && !symbols.contains(&s) {
                        symbols.push(s);
                    }
                }
                let cache = PortfolioCache::new(symbols.clone(), Utc::now());
                if let Err(e) = self.store.set_json(PORTFOLIO_CACHE_KEY, &cache).await {
                    warn!("Failed to cache portfolio: {}", e);
                }
                info!("Loaded portfolio: {} holdings", symbols.len());
                symbols
            }
            Err(e) => {
                warn!("Portfolio API not available: {:#}", e);
                match cached {
                    Some(cache) => {
                        warn!(
                            "Using stale cached portfolio ({}s old)",
                            cache.age(Utc::now()).as_secs()
                        );
                        cache.symbols
                    }
                    None => Vec::new(),
                }
            }
        }
    }

    /// Watchlist symbols: remote when reachable (mirrored locally), else
    /// the local mirror.
    pub async fn get_watchlist(&self) -> Vec<String> {
        match self.remote("Watchlist fetch", self.api.fetch_watchlist()).await {
            Ok(entries) => {
                let symbols: Vec<String> = entries.iter().map(|e| normalize_symbol(&e.symbol)).collect();
                if let Err(e) = self.watchlist.replace(&symbols).await {
                    warn!("Failed to mirror watchlist locally: {}", e);
                }
                symbols
            }
            Err(e) => {
                warn!("Watchlist API not available, using local storage: {:#}", e);
                self.watchlist.symbols().await.unwrap_or_else(|e| {
                    warn!("Failed to read local watchlist: {}", e);
                    Vec::new()
                })
            }
        }
    }

    pub async fn add_to_watchlist(&self, symbol: &str, note: Option<&str>) -> Result<(), SessionError> {
        let symbol = validated_symbol(symbol)?;
        let note = note.map(str::trim).filter(|n| !n.is_empty());

        if let Err(e) = self
            .remote("Watchlist add", self.api.add_to_watchlist(&symbol, note))
            .await
        {
            warn!("Watchlist add API not available, storing locally: {:#}", e);
        }
        if let Err(e) = self.watchlist.add(&symbol).await {
            error!("Failed to store {} in local watchlist: {}", symbol, e);
        }
        Ok(())
    }

    pub async fn remove_from_watchlist(&self, symbol: &str) -> Result<(), SessionError> {
        let symbol = validated_symbol(symbol)?;

        if let Err(e) = self
            .remote("Watchlist remove", self.api.remove_from_watchlist(&symbol))
            .await
        {
            warn!("Watchlist remove API not available, storing locally: {:#}", e);
        }
        if let Err(e) = self.watchlist.remove(&symbol).await {
            error!("Failed to remove {} from local watchlist: {}", symbol, e);
        }
        Ok(())
    }
}

fn validated_symbol(raw: &str) -> Result<String, SessionError> {
    let symbol = normalize_symbol(raw);
    let valid = !symbol.is_empty()
        && symbol.len() <= 12
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if !valid {
        return Err(SessionError::Validation(format!("not a ticker symbol: '{}'", raw)));
    }
    Ok(symbol)
}
