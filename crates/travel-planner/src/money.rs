//! Amount parsing
//!
//! Model output and third-party APIs report money as JSON numbers, numeric
//! strings, or strings carrying a currency marker ("¥150", "498元"). All of
//! them are converted to `Decimal` from their literal text, never through f64.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

const CURRENCY_MARKERS: &[&str] = &["¥", "￥", "$", "元", "CNY", "RMB"];

/// Parse a JSON value into an exact amount
pub fn parse_amount(value: &Value) -> Result<Decimal, String> {
    match value {
        Value::Number(n) => parse_amount_str(&n.to_string()),
        Value::String(s) => parse_amount_str(s),
        Value::Null => Err("value is null".into()),
        other => Err(format!("expected a number, got {}", other)),
    }
}

/// Parse numeric text, tolerating surrounding whitespace and currency markers
pub fn parse_amount_str(text: &str) -> Result<Decimal, String> {
    let mut cleaned = text.trim();
    for marker in CURRENCY_MARKERS {
        cleaned = cleaned.trim_start_matches(marker).trim_end_matches(marker).trim();
    }
    let cleaned = cleaned.replace(',', "");

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map(|d| d.normalize())
        .map_err(|_| format!("'{}' is not a number", text.trim()))
}

/// Sum amounts, or `None` when the total leaves the `Decimal` range
pub fn checked_sum<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().try_fold(Decimal::ZERO, Decimal::checked_add)
}
