use crate::constants::DEFAULT_CURRENCY;

/// (code, symbol) for the currencies the settings page offers most often.
const SYMBOLS: [(&str, &str); 12] = [
    ("GBP", "£"),
    ("USD", "$"),
    ("EUR", "€"),
    ("JPY", "¥"),
    ("CNY", "¥"),
    ("INR", "₹"),
    ("KRW", "₩"),
    ("AUD", "A$"),
    ("CAD", "C$"),
    ("CHF", "CHF "),
    ("NGN", "₦"),
    ("TRY", "₺"),
];

/// Resolve a user preference to a currency code, falling back to GBP.
pub fn resolve_code(preference: Option<&str>) -> String {
    preference
        .map(|code| code.trim().to_uppercase())
        .filter(|code| code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

pub fn symbol_for(code: &str) -> Option<&'static str> {
    SYMBOLS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, symbol)| *symbol)
}

/// Render an amount with two decimals in the given currency.
pub fn format_amount(amount: f64, code: &str) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let sign = if amount < 0.0 { "-" } else { "" };
    match symbol_for(code) {
        Some(symbol) => format!("{}{}{:.2}", sign, symbol, amount.abs()),
        None => format!("{}{} {:.2}", sign, code.to_uppercase(), amount.abs()),
    }
}
