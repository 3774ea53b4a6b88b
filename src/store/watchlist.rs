use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::models::normalize_symbol;
use crate::store::{JsonStoreExt, KeyValueStore};

pub const WATCHLIST_KEY: &str = "watchlist";

/// Local mirror of the watchlist: a deduplicated, insertion-ordered list of
/// symbols, used whenever the watchlist endpoint is unavailable.
pub struct LocalWatchlist {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl LocalWatchlist {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn symbols(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .store
            .get_json_lenient(WATCHLIST_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Returns false if the symbol was already present.
    pub async fn add(&self, symbol: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let symbol = normalize_symbol(symbol);
        let mut symbols = self.symbols().await?;
        if symbols.contains(&symbol) {
            return Ok(false);
        }
        symbols.push(symbol);
        self.store.set_json(WATCHLIST_KEY, &symbols).await?;
        Ok(true)
    }

    /// Returns false if the symbol was not present.
    pub async fn remove(&self, symbol: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let symbol = normalize_symbol(symbol);
        let mut symbols = self.symbols().await?;
        let before = symbols.len();
        symbols.retain(|s| *s != symbol);
        if symbols.len() == before {
            return Ok(false);
        }
        self.store.set_json(WATCHLIST_KEY, &symbols).await?;
        Ok(true)
    }

    /// Replace the mirror with a list fetched from the remote.
    pub async fn replace(&self, symbols: &[String]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut deduped: Vec<String> = Vec::with_capacity(symbols.len());
        for s in symbols.iter().map(|s| normalize_symbol(s)) {
            if !deduped.contains(&s) {
                deduped.push(s);
            }
        }
        self.store.set_json(WATCHLIST_KEY, &deduped).await
    }
}
