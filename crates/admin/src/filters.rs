//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;

/// Formats an amount as kwanza, e.g. `19.900,00 Kz`.
///
/// Usage in templates: `{{ invoice.amount|kwanza }}`
#[askama::filter_fn]
pub fn kwanza(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    Ok(Decimal::from_str(&text).map_or(text, angohost_core::format_kwanza))
}

/// Renders a timestamp as `DD/MM/YYYY HH:MM` and a plain date as
/// `DD/MM/YYYY`. Anything else renders unchanged.
#[askama::filter_fn]
pub fn datetime(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    let Some(day) = text
        .get(..10)
        .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    else {
        return Ok(text);
    };
    let day = day.format("%d/%m/%Y");
    // `2026-10-19 08:30:00 UTC` and `2026-10-19T08:30:00Z` both carry HH:MM here
    Ok(match text.get(11..16) {
        Some(time) if time.chars().nth(2) == Some(':') => format!("{day} {time}"),
        _ => day.to_string(),
    })
}

/// Short form of a UUID, for dense tables.
#[askama::filter_fn]
pub fn short_id(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    Ok(text.get(..8).unwrap_or(&text).to_string())
}
