use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::models::SwipeRecord;
use crate::store::{JsonStoreExt, KeyValueStore};

pub const SWIPE_HISTORY_KEY: &str = "swipe_history";
pub const DEFAULT_CAPACITY: usize = 1000;

/// Capped, append-only swipe log kept in the local store. Used as the
/// sink of last resort when the remote log is unreachable; once full, the
/// oldest entries are evicted first.
pub struct SwipeHistory {
    store: Arc<dyn KeyValueStore>,
    capacity: usize,
    // Serializes the load-append-save cycle between concurrent writers
    write_lock: Mutex<()>,
}

impl SwipeHistory {
    pub fn new(store: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
            write_lock: Mutex::new(()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a record, evicting from the front past capacity.
    /// Returns the number of entries retained.
    pub async fn append(&self, record: &SwipeRecord) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load().await?;
        entries.push(record.clone());
        if entries.len() > self.capacity {
            let overflow = entries.len() - self.capacity;
            entries.drain(..overflow);
            debug!("Swipe history full, evicted {} oldest entries", overflow);
        }

        self.store.set_json(SWIPE_HISTORY_KEY, &entries).await?;
        Ok(entries.len())
    }

    /// All retained records, oldest first.
    pub async fn entries(&self) -> Result<Vec<SwipeRecord>, StoreError> {
        self.load().await
    }

    pub async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.load().await?.len())
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(SWIPE_HISTORY_KEY).await
    }

    async fn load(&self) -> Result<Vec<SwipeRecord>, StoreError> {
        Ok(self
            .store
            .get_json_lenient(SWIPE_HISTORY_KEY)
            .await?
            .unwrap_or_default())
    }
}
