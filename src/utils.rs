use chrono::{Local, NaiveDate};
use urlencoding::encode;

use crate::error::{ClientError, ClientResult};

/// Round to 2 decimals, the precision the backend stores amounts with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn build_query_params(params: &[(&str, Option<String>)]) -> String {
    let query_parts: Vec<String> = params
        .iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| format!("{}={}", encode(key), encode(v))))
        .collect();

    if query_parts.is_empty() {
        String::new()
    } else {
        format!("?{}", query_parts.join("&"))
    }
}

/// Loose email shape check; the backend owns real validation.
pub fn looks_like_email(value: &str) -> bool {
    let trimmed = value.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !trimmed.contains(char::is_whitespace)
        }
        None => false,
    }
}

pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn validate_not_empty(value: &str, message: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

/// Destructive actions only go out once the user confirmed `prompt`.
pub fn require_confirmation(confirmed: bool, prompt: &'static str) -> ClientResult<()> {
    if confirmed {
        Ok(())
    } else {
        Err(ClientError::ConfirmationRequired(prompt))
    }
}
