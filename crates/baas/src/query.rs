//! Single-table queries.
//!
//! A [`Query`] names a table plus optional filters, ordering and a row limit.
//! The REST backend turns it into PostgREST query parameters; the in-memory
//! backend evaluates it against JSON rows directly.

use std::cmp::Ordering;

use angohost_core::Table;
use serde_json::Value;

/// A column filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(String, String),
    Neq(String, String),
    Lt(String, String),
    In(String, Vec<String>),
}

impl Filter {
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Eq(c, _) | Self::Neq(c, _) | Self::Lt(c, _) | Self::In(c, _) => c,
        }
    }

    /// PostgREST operator expression, e.g. `eq.pending` or `in.(a,b)`.
    #[must_use]
    pub fn expression(&self) -> String {
        match self {
            Self::Eq(_, v) => format!("eq.{v}"),
            Self::Neq(_, v) => format!("neq.{v}"),
            Self::Lt(_, v) => format!("lt.{v}"),
            Self::In(_, vs) => format!("in.({})", vs.join(",")),
        }
    }

    /// Evaluate the filter against one row.
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        let cell = row.get(self.column()).map(cell_text);
        match self {
            Self::Eq(_, v) => cell.as_deref() == Some(v.as_str()),
            Self::Neq(_, v) => cell.as_deref() != Some(v.as_str()),
            Self::Lt(_, v) => cell
                .as_deref()
                .is_some_and(|c| compare_text(c, v) == Ordering::Less),
            Self::In(_, vs) => cell.is_some_and(|c| vs.contains(&c)),
        }
    }
}

/// Text form of a JSON cell, the way the BaaS compares it.
#[must_use]
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Compare numerically when both sides are numbers, lexically otherwise.
///
/// ISO dates and RFC 3339 timestamps order correctly as text.
#[must_use]
pub fn compare_text(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// A query against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: Table,
    pub filters: Vec<Filter>,
    pub order: Option<(String, bool)>,
    pub limit: Option<usize>,
}

impl Query {
    /// Every row of `table`.
    #[must_use]
    pub const fn table(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push(Filter::Eq(column.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn neq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push(Filter::Neq(column.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn lt(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push(Filter::Lt(column.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn in_list<T: ToString>(mut self, column: &str, values: &[T]) -> Self {
        self.filters.push(Filter::In(
            column.to_string(),
            values.iter().map(ToString::to_string).collect(),
        ));
        self
    }

    /// Order by `column`, newest/largest first when `descending`.
    #[must_use]
    pub fn order(mut self, column: &str, descending: bool) -> Self {
        self.order = Some((column.to_string(), descending));
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether every filter matches `row`.
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// PostgREST query parameters for this query.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|f| (f.column().to_string(), f.expression()))
            .collect();
        if let Some((column, descending)) = &self.order {
            let direction = if *descending { "desc" } else { "asc" };
            params.push(("order".to_string(), format!("{column}.{direction}")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Sort and truncate already-filtered rows the way the BaaS would.
    pub fn apply_order_and_limit(&self, rows: &mut Vec<Value>) {
        if let Some((column, descending)) = &self.order {
            rows.sort_by(|a, b| {
                let ord = compare_text(
                    &a.get(column).map(cell_text).unwrap_or_default(),
                    &b.get(column).map(cell_text).unwrap_or_default(),
                );
                if *descending { ord.reverse() } else { ord }
            });
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
    }
}
