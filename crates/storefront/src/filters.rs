//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats an amount as kwanza, e.g. `19.900,00 Kz`.
///
/// Values that are not decimals render unchanged.
///
/// Usage in templates: `{{ order.total_amount|kwanza }}`
#[askama::filter_fn]
pub fn kwanza(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    Ok(Decimal::from_str(&text).map_or(text, angohost_core::format_kwanza))
}

/// Renders an RFC 3339 timestamp or ISO date as `DD/MM/YYYY`.
///
/// Usage in templates: `{{ order.created_at|date }}`
#[askama::filter_fn]
pub fn date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    let day = text.get(..10).unwrap_or(&text);
    Ok(chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_or(text.clone(), |d| d.format("%d/%m/%Y").to_string()))
}

