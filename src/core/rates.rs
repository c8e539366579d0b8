//! Rate tables and snapshots

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Currency every price is stored in.
pub const BASE_CURRENCY: &str = "USD";

/// Approximate static rates used when no live table could be fetched yet.
pub const FALLBACK_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 0.85),
    ("GBP", 0.73),
    ("JPY", 110.5),
    ("AUD", 1.35),
    ("CAD", 1.25),
    ("CHF", 0.92),
    ("CNY", 6.45),
    ("INR", 74.5),
    ("KES", 130.0),
    ("ZAR", 18.5),
];

/// Immutable mapping of currency code to "units per one base currency".
///
/// The base currency always maps to exactly `1.0` and every other rate is
/// positive and finite.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn from_rates<I, S>(rates: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut table = HashMap::new();
        for (code, rate) in rates {
            let code = code.into();
            if !rate.is_finite() || rate <= 0.0 {
                warn!(%code, rate, "Dropping invalid exchange rate");
                continue;
            }
            table.insert(code, rate);
        }
        table.insert(BASE_CURRENCY.to_string(), 1.0);
        Self { rates: table }
    }

    pub fn fallback() -> Self {
        Self::from_rates(FALLBACK_RATES.iter().copied())
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Codes in alphabetical order.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    Live,
    Fallback,
}

/// A table together with where and when it came from.
#[derive(Debug, Clone)]
pub struct RateSnapshot {
    pub table: Arc<RateTable>,
    pub origin: RateOrigin,
    pub fetched_at: DateTime<Utc>,
}

impl RateSnapshot {
    pub fn live(table: RateTable) -> Self {
        Self {
            table: Arc::new(table),
            origin: RateOrigin::Live,
            fetched_at: Utc::now(),
        }
    }

    pub fn fallback() -> Self {
        Self {
            table: Arc::new(RateTable::fallback()),
            origin: RateOrigin::Fallback,
            fetched_at: Utc::now(),
        }
    }
}
