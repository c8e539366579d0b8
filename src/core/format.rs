//! Display formatting for converted prices

/// A currency the selector offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

impl CurrencyInfo {
    const fn new(code: &'static str, name: &'static str, symbol: &'static str) -> Self {
        Self { code, name, symbol }
    }
}

pub const SUPPORTED_CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo::new("USD", "US Dollar", "$"),
    CurrencyInfo::new("EUR", "Euro", "€"),
    CurrencyInfo::new("GBP", "British Pound", "£"),
    CurrencyInfo::new("JPY", "Japanese Yen", "¥"),
    CurrencyInfo::new("AUD", "Australian Dollar", "A$"),
    CurrencyInfo::new("CAD", "Canadian Dollar", "C$"),
    CurrencyInfo::new("CHF", "Swiss Franc", "CHF"),
    CurrencyInfo::new("CNY", "Chinese Yuan", "¥"),
    CurrencyInfo::new("INR", "Indian Rupee", "₹"),
    CurrencyInfo::new("KES", "Kenyan Shilling", "KSh"),
    CurrencyInfo::new("ZAR", "South African Rand", "R"),
];

/// Currencies without a minor unit.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &["JPY", "KRW", "VND", "CLP", "ISK", "UGX"];

pub fn currency_info(code: &str) -> Option<&'static CurrencyInfo> {
    SUPPORTED_CURRENCIES.iter().find(|c| c.code == code)
}

/// Display prefix for `code`. Unknown codes are used verbatim.
pub fn symbol_for(code: &str) -> &str {
    currency_info(code).map_or(code, |c| c.symbol)
}

pub fn is_zero_decimal(code: &str) -> bool {
    ZERO_DECIMAL_CURRENCIES.contains(&code)
}

/// Inserts a comma every three digits counting from the right.
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Groups the integer part of an already rounded decimal string.
///
/// Anything that is not a plain decimal (NaN, infinities) is returned as is.
fn group_decimal(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return number.to_string();
    }

    let mut out = format!("{sign}{}", group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Rounds to two places with ties away from zero. The float printer alone
/// would round exact halves to even.
fn round_cents(value: f64) -> f64 {
    let cents = value * 100.0;
    if cents.is_finite() {
        cents.round() / 100.0
    } else {
        value
    }
}

/// Converts a base-currency `amount` at `rate` and renders it for `code`.
///
/// Never panics. Negative amounts keep their sign after the symbol and
/// non-finite values render as the float printer spells them.
pub fn format_amount(amount: f64, code: &str, rate: f64) -> String {
    let converted = amount * rate;
    let symbol = symbol_for(code);

    let number = if is_zero_decimal(code) {
        format!("{:.0}", converted.round())
    } else {
        format!("{:.2}", round_cents(converted))
    };

    format!("{symbol}{}", group_decimal(&number))
}
