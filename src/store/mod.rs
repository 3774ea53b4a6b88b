pub mod file;
pub mod history;
pub mod memory;
pub mod watchlist;

pub use file::JsonFileStore;
pub use history::SwipeHistory;
pub use memory::MemoryStore;
pub use watchlist::LocalWatchlist;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::StoreError;

/// String-keyed blob storage for everything the session persists locally.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// JSON helpers, available on every store.
#[async_trait]
pub trait JsonStoreExt: KeyValueStore {
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::Corrupt {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    async fn set_json<T: Serialize + Send + Sync>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw).await
    }

    /// Like `get_json`, but a corrupt blob reads as absent.
    async fn get_json_lenient<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get_json(key).await {
            Err(StoreError::Corrupt { key, reason }) => {
                warn!("Discarding corrupt local value '{}': {}", key, reason);
                Ok(None)
            }
            other => other,
        }
    }
}

impl<T: KeyValueStore + ?Sized> JsonStoreExt for T {}
