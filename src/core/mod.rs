//! Core currency logic and abstractions

pub mod ads;
pub mod config;
pub mod context;
pub mod currency;
pub mod format;
pub mod log;
pub mod rates;
pub mod store;

// Re-export main types for cleaner imports
pub use context::{CacheState, CurrencyContext, RefreshOutcome};
pub use currency::{FetchError, RateSource};
pub use rates::{BASE_CURRENCY, RateOrigin, RateSnapshot, RateTable};
pub use store::KeyValueStore;
