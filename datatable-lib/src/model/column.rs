//! Column definitions

use std::cmp::Ordering;
use std::sync::Arc;

use super::CellValue;
use super::TableRow;

/// Custom column filter: `(row, filter value) -> keep`.
pub type FilterFn<T> = Arc<dyn Fn(&T, &CellValue) -> bool + Send + Sync>;

/// Custom search text for a row in one column.
pub type SearchValueFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Custom ascending comparator for two rows.
pub type SortFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// How a column reads its value out of a row.
pub enum Accessor<T> {
    /// Named field read through [`TableRow`].
    Field {
        /// Field name.
        name: String,
        /// Field reader, captured when the accessor is built.
        read: fn(&T, &str) -> CellValue,
    },
    /// Arbitrary computed value.
    Compute(Arc<dyn Fn(&T) -> CellValue + Send + Sync>),
}

impl<T> Accessor<T> {
    /// Accessor reading a named field.
    pub fn field(name: impl Into<String>) -> Self
    where
        T: TableRow,
    {
        Accessor::Field {
            name: name.into(),
            read: <T as TableRow>::field,
        }
    }

    /// Accessor computing the value with a closure.
    pub fn compute<F>(f: F) -> Self
    where
        F: Fn(&T) -> CellValue + Send + Sync + 'static,
    {
        Accessor::Compute(Arc::new(f))
    }

    /// Reads the value for a row.
    pub fn value(&self, row: &T) -> CellValue {
        match self {
            Accessor::Field { name, read } => read(row, name),
            Accessor::Compute(f) => f(row),
        }
    }

    /// Returns the field name for field accessors.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Accessor::Field { name, .. } => Some(name),
            Accessor::Compute(_) => None,
        }
    }
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        match self {
            Accessor::Field { name, read } => Accessor::Field {
                name: name.clone(),
                read: *read,
            },
            Accessor::Compute(f) => Accessor::Compute(Arc::clone(f)),
        }
    }
}

impl<T> std::fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Accessor::Field { name, .. } => f.debug_tuple("Field").field(name).finish(),
            Accessor::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

/// Per-column capabilities and overrides.
///
/// Sorting, filtering and searching are enabled unless switched off.
pub struct ColumnMeta<T> {
    pub sortable: bool,
    pub filterable: bool,
    pub searchable: bool,
    pub filter_fn: Option<FilterFn<T>>,
    pub search_value: Option<SearchValueFn<T>>,
    pub sort_fn: Option<SortFn<T>>,
}

impl<T> Default for ColumnMeta<T> {
    fn default() -> Self {
        Self {
            sortable: true,
            filterable: true,
            searchable: true,
            filter_fn: None,
            search_value: None,
            sort_fn: None,
        }
    }
}

impl<T> Clone for ColumnMeta<T> {
    fn clone(&self) -> Self {
        Self {
            sortable: self.sortable,
            filterable: self.filterable,
            searchable: self.searchable,
            filter_fn: self.filter_fn.clone(),
            search_value: self.search_value.clone(),
            sort_fn: self.sort_fn.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ColumnMeta<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnMeta")
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("searchable", &self.searchable)
            .field("filter_fn", &self.filter_fn.is_some())
            .field("search_value", &self.search_value.is_some())
            .field("sort_fn", &self.sort_fn.is_some())
            .finish()
    }
}

/// A table column definition.
///
/// # Example
///
/// ```
/// use datatable_lib::model::{CellValue, Column, Record};
///
/// let name: Column<Record> = Column::field("name", "Name");
/// let initials: Column<Record> = Column::computed("initials", "Initials", |row: &Record| {
///     let name = row.get("name").map(|v| v.to_search_string()).unwrap_or_default();
///     CellValue::from(name.chars().take(1).collect::<String>())
/// })
/// .sortable(false);
///
/// assert!(name.meta.sortable);
/// assert!(!initials.meta.sortable);
/// ```
#[derive(Debug)]
pub struct Column<T> {
    /// Unique column id.
    pub id: String,
    /// Header label, passed through to the presentation layer.
    pub header: String,
    /// Value accessor.
    pub accessor: Accessor<T>,
    /// Capabilities and overrides.
    pub meta: ColumnMeta<T>,
}

impl<T> Column<T> {
    /// Creates a column with an explicit accessor.
    pub fn new(id: impl Into<String>, header: impl Into<String>, accessor: Accessor<T>) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            accessor,
            meta: ColumnMeta::default(),
        }
    }

    /// Creates a column reading the field named like its id.
    pub fn field(id: impl Into<String>, header: impl Into<String>) -> Self
    where
        T: TableRow,
    {
        let id = id.into();
        let accessor = Accessor::field(id.clone());
        Self::new(id, header, accessor)
    }

    /// Creates a column with a computed value.
    pub fn computed<F>(id: impl Into<String>, header: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T) -> CellValue + Send + Sync + 'static,
    {
        Self::new(id, header, Accessor::compute(f))
    }

    /// Enables or disables sorting.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.meta.sortable = sortable;
        self
    }

    /// Enables or disables column filters.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.meta.filterable = filterable;
        self
    }

    /// Enables or disables participation in global search.
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.meta.searchable = searchable;
        self
    }

    /// Sets a custom column filter predicate.
    pub fn with_filter_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&T, &CellValue) -> bool + Send + Sync + 'static,
    {
        self.meta.filter_fn = Some(Arc::new(f));
        self
    }

    /// Sets a custom search text extractor.
    pub fn with_search_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.meta.search_value = Some(Arc::new(f));
        self
    }

    /// Sets a custom ascending comparator.
    pub fn with_sort_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.meta.sort_fn = Some(Arc::new(f));
        self
    }

    /// Reads this column's raw value from a row.
    pub fn cell_value(&self, row: &T) -> CellValue {
        self.accessor.value(row)
    }

    /// Text matched by global search for this column.
    pub fn search_text(&self, row: &T) -> String {
        match &self.meta.search_value {
            Some(f) => f(row),
            None => self.cell_value(row).to_search_string(),
        }
    }

    /// Text shown when rendering this column's cell.
    pub fn display_text(&self, row: &T) -> String {
        self.cell_value(row).to_display_string()
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: self.accessor.clone(),
            meta: self.meta.clone(),
        }
    }
}

/// Finds a column by id.
pub fn find_column<'a, T>(columns: &'a [Column<T>], id: &str) -> Option<&'a Column<T>> {
    columns.iter().find(|c| c.id == id)
}
