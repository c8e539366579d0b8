use crate::core::store::KeyValueStore;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION_NAME: &str = "preferences";

/// Store backed by a fjall keyspace on disk. Every write is synced before it
/// returns so a selection survives an abrupt exit.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let keyspace = Config::new(path).open()?;
        let partition = keyspace.open_partition(PARTITION_NAME, PartitionCreateOptions::default())?;
        debug!("Opened disk store at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

#[async_trait]
impl KeyValueStore for DiskStore {
    async fn get(&self, key: &str) -> Option<String> {
        let res: Result<Option<String>> = (|| {
            if let Some(value) = self.partition.get(key.as_bytes())? {
                debug!("Store HIT for key: {}", key);
                return Ok(Some(String::from_utf8(value.to_vec())?));
            }
            debug!("Store MISS for key: {}", key);
            Ok(None)
        })();

        match res {
            Ok(val) => val,
            Err(e) => {
                debug!("DiskStore get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &str) {
        let res: Result<()> = (|| {
            self.partition.insert(key.as_bytes(), value.as_bytes())?;
            self.keyspace.persist(PersistMode::SyncAll)?;
            debug!("Store PUT for key: {}", key);
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskStore put error: {}", e);
        }
    }
}
