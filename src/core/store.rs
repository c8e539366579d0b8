//! Persistence abstractions

use async_trait::async_trait;

/// Store key holding the selected display currency.
pub const CURRENCY_KEY: &str = "currency";
/// Store key holding the last ad impression, as epoch milliseconds.
pub const AD_IMPRESSION_KEY: &str = "ad_last_impression";

/// String key-value persistence that outlives the process.
///
/// Implementations log and swallow their own failures: a read that fails is
/// a miss and a write that fails is dropped.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn put(&self, key: &str, value: &str);
}
