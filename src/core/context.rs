//! The currency context: rate cache, refresh policy and display selection.
//!
//! One context is built at start-up and shared as `Arc<CurrencyContext>`.
//! Consumers only read rates; the selection changes through
//! [`CurrencyContext::set_selection`] alone.

use crate::core::currency::{FetchError, RateSource};
use crate::core::format::format_amount;
use crate::core::rates::{BASE_CURRENCY, RateSnapshot, RateTable};
use crate::core::store::{CURRENCY_KEY, KeyValueStore};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Uninitialized,
    Ready,
}

/// What a refresh did to the cached table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated,
    /// The fetch failed and the previous table was kept.
    KeptStale,
    /// The fetch failed before any table existed; static rates were installed.
    SeededFallback,
}

pub struct CurrencyContext {
    source: Arc<dyn RateSource>,
    store: Arc<dyn KeyValueStore>,
    default_currency: String,
    refresh_interval: Duration,
    snapshot: RwLock<Option<RateSnapshot>>,
    selection: RwLock<String>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl CurrencyContext {
    pub fn new(
        source: Arc<dyn RateSource>,
        store: Arc<dyn KeyValueStore>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            source,
            store,
            default_currency: BASE_CURRENCY.to_string(),
            refresh_interval,
            snapshot: RwLock::new(None),
            selection: RwLock::new(BASE_CURRENCY.to_string()),
            refresh_task: Mutex::new(None),
        }
    }

    /// Selection used when nothing has been persisted yet.
    pub fn with_default_currency(mut self, code: &str) -> Self {
        let code = code.trim();
        if !code.is_empty() {
            self.default_currency = code.to_string();
            *self
                .selection
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner) = code.to_string();
        }
        self
    }

    /// Restores the persisted selection, loads rates once and schedules the
    /// periodic refresh. Calling it again only refreshes.
    pub async fn initialize(self: &Arc<Self>) {
        let selection = match self.store.get(CURRENCY_KEY).await {
            Some(saved) if !saved.trim().is_empty() => saved.trim().to_string(),
            _ => self.default_currency.clone(),
        };
        debug!(%selection, "Restored currency selection");
        *self.selection.write().unwrap_or_else(PoisonError::into_inner) = selection;

        self.refresh().await;
        self.schedule_refresh();
    }

    fn schedule_refresh(self: &Arc<Self>) {
        if self.refresh_interval.is_zero() {
            debug!("Periodic rate refresh disabled");
            return;
        }

        let mut task = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if task.is_some() {
            return;
        }

        let context: Weak<Self> = Arc::downgrade(self);
        let source = Arc::clone(&self.source);
        let period = self.refresh_interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if context.strong_count() == 0 {
                    break;
                }
                let result = source.fetch_rates().await;
                // The owner may have gone away while the request was in flight
                let Some(ctx) = context.upgrade() else {
                    break;
                };
                ctx.apply_fetch_result(result);
            }
            debug!("Periodic rate refresh stopped");
        }));
        debug!(?period, "Scheduled periodic rate refresh");
    }

    /// Fetches fresh rates. Never fails; see [`RefreshOutcome`].
    pub async fn refresh(&self) -> RefreshOutcome {
        let result = self.source.fetch_rates().await;
        self.apply_fetch_result(result)
    }

    /// Applies the fallback policy to a fetch result.
    pub fn apply_fetch_result(&self, result: Result<RateTable, FetchError>) -> RefreshOutcome {
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok(table) => {
                info!(currencies = table.len(), "Exchange rates updated");
                *snapshot = Some(RateSnapshot::live(table));
                RefreshOutcome::Updated
            }
            Err(e) if snapshot.is_some() => {
                warn!(error = %e, "Failed to fetch exchange rates, keeping previous rates");
                RefreshOutcome::KeptStale
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch exchange rates, using fallback rates");
                *snapshot = Some(RateSnapshot::fallback());
                RefreshOutcome::SeededFallback
            }
        }
    }

    /// Changes and persists the display currency. The code is not checked
    /// against the rate table; unknown codes convert at 1.0.
    pub async fn set_selection(&self, code: &str) {
        let code = code.trim();
        if code.is_empty() {
            warn!("Ignoring empty currency selection");
            return;
        }
        *self.selection.write().unwrap_or_else(PoisonError::into_inner) = code.to_string();
        self.store.put(CURRENCY_KEY, code).await;
        debug!(currency = %code, "Currency selection changed");
    }

    pub fn selection(&self) -> String {
        self.selection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn snapshot(&self) -> Option<RateSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn state(&self) -> CacheState {
        if self.snapshot().is_some() {
            CacheState::Ready
        } else {
            CacheState::Uninitialized
        }
    }

    /// Rate for `code`, or 1.0 when the code (or any table) is missing.
    pub fn get_rate(&self, code: &str) -> f64 {
        self.snapshot()
            .and_then(|s| s.table.get(code))
            .unwrap_or(1.0)
    }

    /// Converts a base-currency amount into the selected currency.
    pub fn convert(&self, amount: f64) -> f64 {
        amount * self.get_rate(&self.selection())
    }

    /// Converts between two arbitrary currencies through the base currency.
    pub fn convert_between(&self, amount: f64, from: &str, to: &str) -> f64 {
        if from == to {
            return amount;
        }
        let in_base = if from == BASE_CURRENCY {
            amount
        } else {
            amount / self.get_rate(from)
        };
        in_base * self.get_rate(to)
    }

    /// Formats a base-currency amount for display in the selected currency.
    pub fn format(&self, amount: f64) -> String {
        let selection = self.selection();
        format_amount(amount, &selection, self.get_rate(&selection))
    }

    /// Stops the periodic refresh. Cached rates stay readable.
    pub fn shutdown(&self) {
        let task = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
            debug!("Cancelled periodic rate refresh");
        }
    }
}

impl Drop for CurrencyContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::RateOrigin;
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    /// Replays queued results, then keeps failing.
    struct MockSource {
        results: Mutex<VecDeque<Result<RateTable, FetchError>>>,
        call_count: AtomicUsize,
    }

    impl MockSource {
        fn new(results: Vec<Result<RateTable, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
                call_count: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateSource for MockSource {
        async fn fetch_rates(&self) -> Result<RateTable, FetchError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(FetchError::Unsuccessful))
        }
    }

    fn live_table() -> RateTable {
        RateTable::from_rates([("EUR", 0.9), ("JPY", 110.5), ("GBP", 0.8)])
    }

    fn context(source: Arc<MockSource>, store: Arc<MemoryStore>) -> Arc<CurrencyContext> {
        Arc::new(CurrencyContext::new(source, store, DAY))
    }

    #[tokio::test]
    async fn test_uninitialized_context() {
        let ctx = context(MockSource::new(vec![]), Arc::new(MemoryStore::new()));

        assert_eq!(ctx.state(), CacheState::Uninitialized);
        assert_eq!(ctx.get_rate("EUR"), 1.0);
        assert_eq!(ctx.selection(), "USD");
        assert_eq!(ctx.format(10.0), "$10.00");
    }

    #[tokio::test]
    async fn test_first_failure_seeds_fallback() {
        let source = MockSource::new(vec![Err(FetchError::EmptyRates)]);
        let ctx = context(source, Arc::new(MemoryStore::new()));

        ctx.initialize().await;

        assert_eq!(ctx.state(), CacheState::Ready);
        let snapshot = ctx.snapshot().unwrap();
        assert_eq!(snapshot.origin, RateOrigin::Fallback);
        assert_eq!(ctx.get_rate("USD"), 1.0);
        assert_eq!(ctx.get_rate("KES"), 130.0);
        assert_eq!(ctx.format(10.0), "$10.00");
        ctx.shutdown();
    }

    #[tokio::test]
    async fn test_success_replaces_table() {
        let source = MockSource::new(vec![Ok(live_table())]);
        let ctx = context(source, Arc::new(MemoryStore::new()));

        assert_eq!(ctx.refresh().await, RefreshOutcome::Updated);

        let snapshot = ctx.snapshot().unwrap();
        assert_eq!(snapshot.origin, RateOrigin::Live);
        assert_eq!(ctx.get_rate("EUR"), 0.9);
        assert_eq!(ctx.get_rate("USD"), 1.0);
        // Not in the live table, and the fallback was never installed
        assert_eq!(ctx.get_rate("KES"), 1.0);
    }

    #[tokio::test]
    async fn test_later_failure_keeps_stale_table() {
        let source = MockSource::new(vec![Ok(live_table()), Err(FetchError::Unsuccessful)]);
        let ctx = context(source, Arc::new(MemoryStore::new()));

        assert_eq!(ctx.refresh().await, RefreshOutcome::Updated);
        let before = ctx.snapshot().unwrap();

        assert_eq!(ctx.refresh().await, RefreshOutcome::KeptStale);
        let after = ctx.snapshot().unwrap();
        assert!(Arc::ptr_eq(&before.table, &after.table));
        assert_eq!(after.origin, RateOrigin::Live);
    }

    #[tokio::test]
    async fn test_fallback_is_replaced_by_later_success() {
        let source = MockSource::new(vec![Err(FetchError::EmptyRates), Ok(live_table())]);
        let ctx = context(source, Arc::new(MemoryStore::new()));

        assert_eq!(ctx.refresh().await, RefreshOutcome::SeededFallback);
        assert_eq!(ctx.refresh().await, RefreshOutcome::Updated);
        assert_eq!(ctx.snapshot().unwrap().origin, RateOrigin::Live);
        assert_eq!(ctx.get_rate("EUR"), 0.9);
    }

    #[tokio::test]
    async fn test_base_rate_always_one() {
        let skewed = RateTable::from_rates([("USD", 3.0), ("EUR", 0.9)]);
        let source = MockSource::new(vec![Ok(skewed)]);
        let ctx = context(source, Arc::new(MemoryStore::new()));

        ctx.refresh().await;
        assert_eq!(ctx.get_rate("USD"), 1.0);

        let ctx = context(MockSource::new(vec![]), Arc::new(MemoryStore::new()));
        ctx.refresh().await;
        assert_eq!(ctx.get_rate("USD"), 1.0);
    }

    #[tokio::test]
    async fn test_unknown_selection_degrades() {
        let source = MockSource::new(vec![Ok(live_table())]);
        let ctx = context(source, Arc::new(MemoryStore::new()));
        ctx.refresh().await;

        ctx.set_selection("ZZZ").await;
        assert_eq!(ctx.format(100.0), "ZZZ100.00");
    }

    #[tokio::test]
    async fn test_zero_decimal_selection() {
        let source = MockSource::new(vec![Ok(live_table())]);
        let ctx = context(source, Arc::new(MemoryStore::new()));
        ctx.refresh().await;

        ctx.set_selection("JPY").await;
        assert_eq!(ctx.format(10.0), "¥1,105");
    }

    #[tokio::test]
    async fn test_grouping_in_base_currency() {
        let source = MockSource::new(vec![Ok(live_table())]);
        let ctx = context(source, Arc::new(MemoryStore::new()));
        ctx.refresh().await;

        assert_eq!(ctx.format(1234567.0), "$1,234,567.00");
        assert_eq!(ctx.format(1234567.0), ctx.format(1234567.0));
    }

    #[tokio::test]
    async fn test_conversion_is_monotonic() {
        let source = MockSource::new(vec![Ok(live_table())]);
        let ctx = context(source, Arc::new(MemoryStore::new()));
        ctx.refresh().await;
        ctx.set_selection("GBP").await;

        let amounts = [0.0, 0.01, 1.0, 9.99, 10.0, 250.0, 1e6];
        for pair in amounts.windows(2) {
            assert!(ctx.convert(pair[0]) < ctx.convert(pair[1]));
        }
    }

    #[tokio::test]
    async fn test_convert_between() {
        let source = MockSource::new(vec![Ok(live_table())]);
        let ctx = context(source, Arc::new(MemoryStore::new()));
        ctx.refresh().await;

        assert_eq!(ctx.convert_between(42.0, "EUR", "EUR"), 42.0);
        assert_eq!(ctx.convert_between(10.0, "USD", "JPY"), 1105.0);
        assert!((ctx.convert_between(9.0, "EUR", "USD") - 10.0).abs() < 1e-9);
        assert!((ctx.convert_between(9.0, "EUR", "GBP") - 8.0).abs() < 1e-9);
        // Unknown codes convert at 1.0
        assert_eq!(ctx.convert_between(5.0, "ZZZ", "USD"), 5.0);
    }

    #[tokio::test]
    async fn test_selection_is_persisted() {
        let store = Arc::new(MemoryStore::new());
        let ctx = context(MockSource::new(vec![]), store.clone());

        ctx.set_selection("EUR").await;
        assert_eq!(ctx.selection(), "EUR");
        assert_eq!(store.get(CURRENCY_KEY).await.as_deref(), Some("EUR"));

        ctx.set_selection("   ").await;
        assert_eq!(ctx.selection(), "EUR");
        assert_eq!(store.get(CURRENCY_KEY).await.as_deref(), Some("EUR"));
    }

    #[tokio::test]
    async fn test_initialize_restores_selection() {
        let store = Arc::new(MemoryStore::new());
        store.put(CURRENCY_KEY, "GBP").await;
        let source = MockSource::new(vec![Ok(live_table())]);
        let ctx = context(source.clone(), store);

        ctx.initialize().await;

        assert_eq!(ctx.selection(), "GBP");
        assert_eq!(ctx.format(100.0), "£80.00");
        assert_eq!(source.calls(), 1);
        ctx.shutdown();
    }

    #[tokio::test]
    async fn test_default_currency_without_saved_selection() {
        let ctx = Arc::new(
            CurrencyContext::new(
                MockSource::new(vec![]),
                Arc::new(MemoryStore::new()),
                Duration::ZERO,
            )
            .with_default_currency("KES"),
        );

        ctx.initialize().await;
        assert_eq!(ctx.selection(), "KES");
        assert_eq!(ctx.format(1.0), "KSh130.00");
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_refresh() {
        let source = MockSource::new(vec![Ok(live_table()), Ok(live_table())]);
        let ctx = context(source.clone(), Arc::new(MemoryStore::new()));

        ctx.initialize().await;
        assert_eq!(source.calls(), 1);

        tokio::time::sleep(DAY - Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 1);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(source.calls(), 2);

        // Second initialize refreshes without scheduling a second timer
        ctx.initialize().await;
        assert_eq!(source.calls(), 3);
        tokio::time::sleep(DAY).await;
        assert_eq!(source.calls(), 4);
        ctx.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_refresh() {
        let source = MockSource::new(vec![Ok(live_table())]);
        let ctx = context(source.clone(), Arc::new(MemoryStore::new()));

        ctx.initialize().await;
        ctx.shutdown();
        tokio::time::sleep(DAY * 3).await;

        assert_eq!(source.calls(), 1);
        // Rates remain readable after shutdown
        assert_eq!(ctx.get_rate("EUR"), 0.9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_context_stops_refresh() {
        let source = MockSource::new(vec![Ok(live_table())]);
        let ctx = context(source.clone(), Arc::new(MemoryStore::new()));

        ctx.initialize().await;
        drop(ctx);
        tokio::time::sleep(DAY * 3).await;

        assert_eq!(source.calls(), 1);
    }
}
