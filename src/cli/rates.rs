use super::ui;
use crate::core::format::{currency_info, format_amount};
use crate::core::{CurrencyContext, RateOrigin, RateSnapshot};
use comfy_table::Cell;

/// Amount shown in the sample column, in the base currency.
const SAMPLE_AMOUNT: f64 = 100.0;

pub fn display_rates(snapshot: &RateSnapshot, selection: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(""),
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell("Rate"),
        ui::header_cell("$100 is"),
    ]);

    for code in snapshot.table.codes() {
        let rate = snapshot.table.get(code).unwrap_or(1.0);
        let selected = code == selection;
        let name = currency_info(code).map_or("", |c| c.name);
        table.add_row(vec![
            ui::marker_cell(selected),
            Cell::new(code),
            Cell::new(name),
            ui::value_cell(&format!("{rate:.4}"), selected),
            ui::value_cell(&format_amount(SAMPLE_AMOUNT, code, rate), selected),
        ]);
    }

    let origin = match snapshot.origin {
        RateOrigin::Live => ui::style_text("live", ui::StyleType::Highlight),
        RateOrigin::Fallback => ui::style_text(
            "fallback (rate source unavailable)",
            ui::StyleType::Warning,
        ),
    };
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Exchange rates per 1 USD", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\nSource: {origin}  {}",
        ui::style_text(
            &format!("as of {}", snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC")),
            ui::StyleType::Subtle
        )
    ));
    output
}

pub fn run(context: &CurrencyContext) {
    match context.snapshot() {
        Some(snapshot) => println!("{}", display_rates(&snapshot, &context.selection())),
        None => println!("No exchange rates available."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RateTable;

    #[test]
    fn test_display_rates_lists_every_code() {
        let snapshot = RateSnapshot::live(RateTable::from_rates([("EUR", 0.85), ("JPY", 110.5)]));
        let output = display_rates(&snapshot, "JPY");

        assert!(output.contains("EUR"));
        assert!(output.contains("Japanese Yen"));
        assert!(output.contains("¥11,050"));
        assert!(output.contains("€85.00"));
        assert!(output.contains("$100.00"));
        assert!(output.contains("live"));
    }

    #[test]
    fn test_display_rates_flags_fallback() {
        let output = display_rates(&RateSnapshot::fallback(), "USD");
        assert!(output.contains("fallback"));
        assert!(output.contains("KSh13,000.00"));
    }
}
