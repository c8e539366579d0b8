pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::store::KeyValueStore;
use disk::DiskStore;
use memory::MemoryStore;
use std::sync::Arc;
use tracing::warn;

/// Opens the persistent store under the configured data path.
///
/// Falls back to an in-memory store when the data directory cannot be opened,
/// in which case selections only last for this run.
pub fn open_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    let disk = config
        .default_data_path()
        .and_then(|path| DiskStore::open(&path.join("store")));

    match disk {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Could not open data store, preferences will not persist");
            Arc::new(MemoryStore::new())
        }
    }
}
