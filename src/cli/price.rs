use crate::core::CurrencyContext;
use crate::core::format::format_amount;

/// Formats each base-currency amount in `currency`, or in the saved
/// selection when none is given. An explicit currency is not persisted.
pub fn format_prices(
    context: &CurrencyContext,
    amounts: &[f64],
    currency: Option<&str>,
) -> Vec<String> {
    match currency.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => {
            let rate = context.get_rate(code);
            amounts
                .iter()
                .map(|amount| format_amount(*amount, code, rate))
                .collect()
        }
        None => amounts.iter().map(|amount| context.format(*amount)).collect(),
    }
}

pub fn run(context: &CurrencyContext, amounts: &[f64], currency: Option<&str>) {
    for line in format_prices(context, amounts, currency) {
        println!("{line}");
    }
}
