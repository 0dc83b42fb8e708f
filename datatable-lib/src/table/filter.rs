//! Column filters and global search

use std::collections::BTreeMap;

use crate::model::CellValue;
use crate::model::Column;
use crate::model::find_column;
use crate::store::SharedStore;

/// Active column filters keyed by column id.
pub type ColumnFilters = BTreeMap<String, CellValue>;

/// Stages delegated to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Skip column filters; the caller fetches filtered data.
    pub server_filter: bool,
    /// Skip global search; the caller fetches searched data.
    pub server_search: bool,
}

/// Returns `false` for filter values that disable a filter (null, `""`).
pub fn is_active_filter(value: &CellValue) -> bool {
    !(value.is_null() || value.as_str() == Some(""))
}

/// Tests a row against one column filter.
///
/// A custom `filter_fn` decides on its own. Otherwise string filters are a
/// case-insensitive substring match on the cell's search string and any
/// other value must be strictly equal to the cell.
pub fn matches_column_filter<T>(row: &T, column: &Column<T>, value: &CellValue) -> bool {
    if let Some(filter_fn) = &column.meta.filter_fn {
        return filter_fn(row, value);
    }
    let cell = column.cell_value(row);
    match value.as_str() {
        Some(needle) => cell
            .to_search_string()
            .to_lowercase()
            .contains(&needle.to_lowercase()),
        None => cell.strict_eq(value),
    }
}

/// Tests a row against a normalized (trimmed, lowercased) search query.
pub fn matches_search<T>(row: &T, columns: &[Column<T>], needle: &str) -> bool {
    columns
        .iter()
        .filter(|c| c.meta.searchable)
        .any(|c| c.search_text(row).to_lowercase().contains(needle))
}

/// Keeps rows passing every active column filter.
///
/// Filters naming unknown or non-filterable columns are ignored.
pub fn apply_column_filters<'a, T>(
    rows: Vec<&'a T>,
    columns: &[Column<T>],
    filters: &ColumnFilters,
) -> Vec<&'a T> {
    let active: Vec<(&Column<T>, &CellValue)> = filters
        .iter()
        .filter(|(_, value)| is_active_filter(value))
        .filter_map(|(id, value)| {
            find_column(columns, id)
                .filter(|c| c.meta.filterable)
                .map(|c| (c, value))
        })
        .collect();

    if active.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| {
            active
                .iter()
                .all(|(column, value)| matches_column_filter(*row, column, value))
        })
        .collect()
}

/// Keeps rows where any searchable column contains the query.
///
/// The query is trimmed and lowercased; an empty query keeps every row.
pub fn apply_global_search<'a, T>(
    rows: Vec<&'a T>,
    columns: &[Column<T>],
    query: &str,
) -> Vec<&'a T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| matches_search(*row, columns, &needle))
        .collect()
}

/// Runs column filters, then global search, honoring server delegation.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use datatable_lib::model::Column;
/// use datatable_lib::table::{ColumnFilters, FilterOptions, filter_rows};
///
/// let rows = vec![json!({"name": "Ada"}), json!({"name": "Bob"})];
/// let columns = vec![Column::field("name", "Name")];
///
/// let found = filter_rows(&rows, &columns, &ColumnFilters::new(), "ada", FilterOptions::default());
/// assert_eq!(found, vec![&rows[0]]);
/// ```
pub fn filter_rows<'a, T, I>(
    rows: I,
    columns: &[Column<T>],
    filters: &ColumnFilters,
    query: &str,
    options: FilterOptions,
) -> Vec<&'a T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut rows: Vec<&'a T> = rows.into_iter().collect();
    if !options.server_filter {
        rows = apply_column_filters(rows, columns, filters);
    }
    if !options.server_search {
        rows = apply_global_search(rows, columns, query);
    }
    rows
}

/// Owns the search query and column filters.
pub struct FilterController {
    query: SharedStore<String>,
    filters: SharedStore<ColumnFilters>,
    options: FilterOptions,
}

impl FilterController {
    pub fn new(
        query: SharedStore<String>,
        filters: SharedStore<ColumnFilters>,
        options: FilterOptions,
    ) -> Self {
        Self {
            query,
            filters,
            options,
        }
    }

    pub fn query(&self) -> String {
        self.query.get()
    }

    pub fn filters(&self) -> ColumnFilters {
        self.filters.get()
    }

    pub fn options(&self) -> FilterOptions {
        self.options
    }

    /// Requests a new global search query.
    pub fn set_query(&self, query: impl Into<String>) {
        self.query.set(query.into());
    }

    /// Requests a new value for one column filter.
    pub fn set_filter(&self, column_id: impl Into<String>, value: impl Into<CellValue>) {
        let mut next = self.filters.get();
        next.insert(column_id.into(), value.into());
        self.filters.set(next);
    }

    /// Removes one column filter. Returns `false` if it was not set.
    pub fn clear_filter(&self, column_id: &str) -> bool {
        let mut next = self.filters.get();
        if next.remove(column_id).is_none() {
            return false;
        }
        self.filters.set(next);
        true
    }

    /// Filters rows with the current state.
    pub fn apply<'a, T>(&self, rows: &'a [T], columns: &[Column<T>]) -> Vec<&'a T> {
        filter_rows(
            rows,
            columns,
            &self.filters.get(),
            &self.query.get(),
            self.options,
        )
    }
}

impl std::fmt::Debug for FilterController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterController")
            .field("query", &self.query.get())
            .field("filters", &self.filters.get())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};

    use super::*;
    use crate::store::InternalStore;

    fn people() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "Ada Lovelace", "age": 36, "tags": ["math", "poetry"]}),
            json!({"id": 2, "name": "Bob", "age": 40, "tags": []}),
            json!({"id": 3, "name": "Charlie", "age": null, "secret": "ada"}),
        ]
    }

    fn columns() -> Vec<Column<Value>> {
        vec![
            Column::field("name", "Name"),
            Column::field("age", "Age"),
            Column::field("tags", "Tags"),
            Column::field("secret", "Secret").searchable(false),
        ]
    }

    fn names(rows: &[&Value]) -> Vec<String> {
        rows.iter().map(|r| r["name"].as_str().unwrap_or("").to_string()).collect()
    }

    #[test]
    fn test_string_filter_is_case_insensitive_substring() {
        let rows = people();
        let filters = ColumnFilters::from([("name".to_string(), CellValue::from("LOVE"))]);
        let found = apply_column_filters(rows.iter().collect(), &columns(), &filters);
        assert_eq!(names(&found), vec!["Ada Lovelace"]);
    }

    #[test]
    fn test_non_string_filter_is_strict() {
        let rows = people();
        let filters = ColumnFilters::from([("age".to_string(), CellValue::from(40i64))]);
        let found = apply_column_filters(rows.iter().collect(), &columns(), &filters);
        assert_eq!(names(&found), vec!["Bob"]);

        let filters = ColumnFilters::from([("age".to_string(), CellValue::from(true))]);
        assert!(apply_column_filters(rows.iter().collect(), &columns(), &filters).is_empty());
    }

    #[test]
    fn test_inactive_and_unknown_filters_are_ignored() {
        let rows = people();
        let cols = vec![
            Column::field("name", "Name"),
            Column::field("age", "Age").filterable(false),
        ];
        let filters = ColumnFilters::from([
            ("name".to_string(), CellValue::from("")),
            ("age".to_string(), CellValue::from(40i64)),
            ("missing".to_string(), CellValue::from("x")),
            ("other".to_string(), CellValue::Null),
        ]);
        assert_eq!(apply_column_filters(rows.iter().collect(), &cols, &filters).len(), 3);
    }

    #[test]
    fn test_filters_are_anded() {
        let rows = people();
        let filters = ColumnFilters::from([
            ("name".to_string(), CellValue::from("b")),
            ("age".to_string(), CellValue::from(36i64)),
        ]);
        assert!(apply_column_filters(rows.iter().collect(), &columns(), &filters).is_empty());
    }

    #[test]
    fn test_custom_filter_fn() {
        let rows = people();
        let cols = vec![Column::field("age", "Age").with_filter_fn(|row: &Value, value: &CellValue| {
            match (row["age"].as_f64(), value.as_f64()) {
                (Some(age), Some(min)) => age >= min,
                _ => false,
            }
        })];
        let filters = ColumnFilters::from([("age".to_string(), CellValue::from(38i64))]);
        assert_eq!(names(&apply_column_filters(rows.iter().collect(), &cols, &filters)), vec!["Bob"]);
    }

    #[test]
    fn test_search_skips_unsearchable_columns() {
        let rows = people();
        let found = apply_global_search(rows.iter().collect(), &columns(), "  ADA ");
        assert_eq!(names(&found), vec!["Ada Lovelace"]);
    }

    #[test]
    fn test_search_uses_custom_search_value_and_array_coercion() {
        let rows = people();
        let found = apply_global_search(rows.iter().collect(), &columns(), "math,poetry");
        assert_eq!(names(&found), vec!["Ada Lovelace"]);

        let cols = vec![Column::field("name", "Name").with_search_value(|row: &Value| {
            format!("person-{}", row["id"])
        })];
        let found = apply_global_search(rows.iter().collect(), &cols, "person-2");
        assert_eq!(names(&found), vec!["Bob"]);
    }

    #[test]
    fn test_empty_query_keeps_everything() {
        let rows = people();
        assert_eq!(apply_global_search(rows.iter().collect(), &columns(), "   ").len(), 3);
    }

    #[test]
    fn test_server_delegation_short_circuits() {
        let rows = people();
        let filters = ColumnFilters::from([("name".to_string(), CellValue::from("zzz"))]);
        let options = FilterOptions {
            server_filter: true,
            server_search: true,
        };
        assert_eq!(filter_rows(&rows, &columns(), &filters, "zzz", options).len(), 3);
    }

    #[test]
    fn test_controller_reads_and_writes_stores() {
        let controller = FilterController::new(
            Arc::new(InternalStore::new(String::new())),
            Arc::new(InternalStore::new(ColumnFilters::new())),
            FilterOptions::default(),
        );
        let rows = people();
        controller.set_filter("name", "o");
        assert_eq!(controller.apply(&rows, &columns()).len(), 2);
        controller.set_query("bob");
        assert_eq!(names(&controller.apply(&rows, &columns())), vec!["Bob"]);
        assert!(controller.clear_filter("name"));
        assert!(!controller.clear_filter("name"));
        assert_eq!(controller.query(), "bob");
    }
}
