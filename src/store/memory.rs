use crate::core::store::KeyValueStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Process-local store, used for tests and when no data directory is available
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        let store = self.inner.lock().await;
        let value = store.get(key).cloned();
        if value.is_some() {
            debug!("Store HIT for key: {}", key);
        } else {
            debug!("Store MISS for key: {}", key);
        }
        value
    }

    async fn put(&self, key: &str, value: &str) {
        let mut store = self.inner.lock().await;
        debug!("Store PUT for key: {}", key);
        store.insert(key.to_string(), value.to_string());
    }
}
