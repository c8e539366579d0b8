use super::ui;
use crate::core::CurrencyContext;
use crate::core::format::{SUPPORTED_CURRENCIES, format_amount};
use comfy_table::Cell;

/// Lists the selectable currencies with the current one marked.
pub fn display_currencies(context: &CurrencyContext) -> String {
    let selection = context.selection();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(""),
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell("Symbol"),
        ui::header_cell("Example"),
    ]);

    for info in SUPPORTED_CURRENCIES {
        let selected = info.code == selection;
        let rate = context.get_rate(info.code);
        table.add_row(vec![
            ui::marker_cell(selected),
            Cell::new(info.code),
            Cell::new(info.name),
            Cell::new(info.symbol),
            ui::value_cell(&format_amount(100.0, info.code, rate), selected),
        ]);
    }
    table.to_string()
}

pub async fn select(context: &CurrencyContext, code: &str) -> String {
    context.set_selection(code).await;
    let selection = context.selection();
    let mut output = format!(
        "Display currency set to {}",
        ui::style_text(&selection, ui::StyleType::Highlight)
    );
    if context
        .snapshot()
        .is_some_and(|s| s.table.get(&selection).is_none())
    {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                "No exchange rate known for this code yet; prices are shown unconverted.",
                ui::StyleType::Warning
            )
        ));
    }
    output.push_str(&format!("\nExample: $100 is {}", context.format(100.0)));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{CURRENCY_KEY, KeyValueStore};
    use crate::core::{FetchError, RateSource, RateTable};
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct StaticSource;

    #[async_trait]
    impl RateSource for StaticSource {
        async fn fetch_rates(&self) -> Result<RateTable, FetchError> {
            Ok(RateTable::from_rates([("EUR", 0.5)]))
        }
    }

    async fn ready_context(store: Arc<MemoryStore>) -> Arc<CurrencyContext> {
        let context = Arc::new(CurrencyContext::new(
            Arc::new(StaticSource),
            store,
            Duration::ZERO,
        ));
        context.initialize().await;
        context
    }

    #[tokio::test]
    async fn test_select_known_currency() {
        let store = Arc::new(MemoryStore::new());
        let context = ready_context(store.clone()).await;

        let output = select(&context, "EUR").await;
        assert!(output.contains("EUR"));
        assert!(output.contains("€50.00"));
        assert!(!output.contains("No exchange rate"));
        assert_eq!(store.get(CURRENCY_KEY).await.as_deref(), Some("EUR"));
    }

    #[tokio::test]
    async fn test_select_unknown_currency_warns() {
        let context = ready_context(Arc::new(MemoryStore::new())).await;

        let output = select(&context, "GBP").await;
        assert!(output.contains("No exchange rate"));
        assert!(output.contains("£100.00"));
    }

    #[tokio::test]
    async fn test_display_currencies() {
        let context = ready_context(Arc::new(MemoryStore::new())).await;

        let output = display_currencies(&context);
        assert!(output.contains("Kenyan Shilling"));
        assert!(output.contains("€50.00"));
        assert!(output.contains("CHF100.00"));
    }
}
