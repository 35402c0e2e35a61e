//! Data table component types.
//!
//! These types describe the list tables shared by every back-office screen:
//! the header columns, the filter selects above the table and the empty
//! state. Row cells are rendered by each screen's own template.

use serde::Serialize;

/// Column definition for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct TableColumn {
    /// Unique key for the column.
    pub key: String,
    /// Display label for the column header.
    pub label: String,
    /// Right-align the column (amounts, counts).
    pub numeric: bool,
}

impl TableColumn {
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            numeric: false,
        }
    }

    /// Create a right-aligned column.
    #[must_use]
    pub fn numeric(key: &str, label: &str) -> Self {
        Self {
            numeric: true,
            ..Self::new(key, label)
        }
    }
}

/// Option for select filters.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOption {
    /// Option value.
    pub value: String,
    /// Display label.
    pub label: String,
}

impl FilterOption {
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// A select filter above the table. Submitting it reloads the page with
/// `?{key}={value}`.
#[derive(Debug, Clone, Serialize)]
pub struct TableFilter {
    /// Query parameter key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Available options; an implicit "All" option comes first.
    pub options: Vec<FilterOption>,
    /// Currently selected value, if any.
    pub selected: Option<String>,
}

impl TableFilter {
    /// A select whose options are stored values shown as-is.
    #[must_use]
    pub fn select<'a>(key: &str, label: &str, values: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            options: values
                .into_iter()
                .map(|v| FilterOption::new(v, v))
                .collect(),
            selected: None,
        }
    }

    /// Whether `value` is the selected option.
    #[must_use]
    pub fn is_selected(&self, value: &str) -> bool {
        self.selected.as_deref() == Some(value)
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct DataTableConfig {
    /// Unique table identifier; also the BaaS table the rows come from, so
    /// live refresh signals can be matched to the page.
    pub table_id: String,
    /// Column definitions.
    pub columns: Vec<TableColumn>,
    /// Filter definitions.
    pub filters: Vec<TableFilter>,
    /// Title for empty state.
    pub empty_title: String,
    /// Description for empty state.
    pub empty_description: Option<String>,
}

impl DataTableConfig {
    #[must_use]
    pub fn new(table_id: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            columns: vec![],
            filters: vec![],
            empty_title: "No items found".to_string(),
            empty_description: None,
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set empty state configuration.
    #[must_use]
    pub fn empty_state(mut self, title: &str, description: Option<&str>) -> Self {
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }

    /// Mark `value` as selected in the filter named `key`.
    #[must_use]
    pub fn with_selection(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(filter) = self.filters.iter_mut().find(|f| f.key == key) {
            filter.selected = value.map(ToString::to_string);
        }
        self
    }

    /// Whether any filter currently narrows the list.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.filters.iter().any(|f| f.selected.is_some())
    }

    /// Number of header columns including the trailing actions column.
    #[must_use]
    pub fn span(&self) -> usize {
        self.columns.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_marks_option() {
        let config = DataTableConfig::new("orders")
            .column(TableColumn::new("number", "Order"))
            .column(TableColumn::numeric("total", "Total"))
            .filter(TableFilter::select("status", "Status", ["pending", "completed"]))
            .with_selection("status", Some("pending"));

        assert!(config.is_filtered());
        assert!(config.filters[0].is_selected("pending"));
        assert!(!config.filters[0].is_selected("completed"));
        assert_eq!(config.span(), 3);
    }

    #[test]
    fn test_unknown_filter_key_is_ignored() {
        let config = DataTableConfig::new("orders").with_selection("status", Some("pending"));
        assert!(!config.is_filtered());
    }
}
