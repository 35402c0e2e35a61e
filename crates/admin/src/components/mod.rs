//! Reusable UI component types for admin templates.

pub mod data_table;

pub use data_table::{DataTableConfig, FilterOption, TableColumn, TableFilter};
