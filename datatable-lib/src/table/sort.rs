//! Row ordering

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::model::CellValue;
use crate::model::Column;
use crate::model::find_column;
use crate::store::SharedStore;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

/// The active sort column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub column_id: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column_id: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_id: column_id.into(),
            direction,
        }
    }

    pub fn asc(column_id: impl Into<String>) -> Self {
        Self::new(column_id, SortDirection::Asc)
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        Self::new(column_id, SortDirection::Desc)
    }
}

/// Default ascending comparison of two cell values.
///
/// Null sorts after everything. Booleans order `false` first, timestamps
/// chronologically, finite numbers numerically, and anything else by its
/// search string, case-sensitively.
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    if let (Some(x), Some(y)) = (a.as_bool(), b.as_bool()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_datetime(), b.as_datetime()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64())
        && x.is_finite()
        && y.is_finite()
    {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    a.to_search_string().cmp(&b.to_search_string())
}

/// Compares two rows for a column in a direction.
///
/// Rows whose cell is null go last in both directions; the direction only
/// flips comparisons between non-null cells. A column `sort_fn` replaces
/// [`compare_values`] for those.
pub fn compare_rows<T>(a: &T, b: &T, column: &Column<T>, direction: SortDirection) -> Ordering {
    compare_cells(a, &column.cell_value(a), b, &column.cell_value(b), column, direction)
}

fn compare_cells<T>(
    a: &T,
    a_value: &CellValue,
    b: &T,
    b_value: &CellValue,
    column: &Column<T>,
    direction: SortDirection,
) -> Ordering {
    match (a_value.is_null(), b_value.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let base = match &column.meta.sort_fn {
                Some(sort_fn) => sort_fn(a, b),
                None => compare_values(a_value, b_value),
            };
            direction.apply(base)
        }
    }
}

/// Stably sorts rows by a column.
pub fn sort_rows<'a, T>(rows: Vec<&'a T>, column: &Column<T>, direction: SortDirection) -> Vec<&'a T> {
    let mut decorated: Vec<(&'a T, CellValue)> = rows
        .into_iter()
        .map(|row| (row, column.cell_value(row)))
        .collect();
    decorated.sort_by(|(a, av), (b, bv)| compare_cells(*a, av, *b, bv, column, direction));
    decorated.into_iter().map(|(row, _)| row).collect()
}

/// Reported to sort observers on every header toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortChange {
    pub sort: SortState,
    pub column_id: String,
}

/// Observes sort toggles.
pub type SortObserver = Arc<dyn Fn(&SortChange) + Send + Sync>;

/// Owns the active sort.
pub struct SortController {
    store: SharedStore<Option<SortState>>,
    on_sort_change: Option<SortObserver>,
    server_sort: bool,
}

impl SortController {
    pub fn new(store: SharedStore<Option<SortState>>) -> Self {
        Self {
            store,
            on_sort_change: None,
            server_sort: false,
        }
    }

    /// Sets an observer called on every toggle, controlled or not.
    pub fn with_observer(mut self, observer: Option<SortObserver>) -> Self {
        self.on_sort_change = observer;
        self
    }

    /// Leaves row order to the server.
    pub fn with_server_sort(mut self, server_sort: bool) -> Self {
        self.server_sort = server_sort;
        self
    }

    pub fn current(&self) -> Option<SortState> {
        self.store.get()
    }

    pub fn is_server_sort(&self) -> bool {
        self.server_sort
    }

    /// Requests a sort state directly.
    pub fn set(&self, sort: Option<SortState>) {
        self.store.set(sort);
    }

    /// Handles a header click on `column`.
    ///
    /// The active column flips direction; any other column starts ascending.
    /// Returns `None` for non-sortable columns.
    pub fn toggle<T>(&self, column: &Column<T>) -> Option<SortState> {
        if !column.meta.sortable {
            return None;
        }
        let direction = match self.store.get() {
            Some(active) if active.column_id == column.id => active.direction.flipped(),
            _ => SortDirection::Asc,
        };
        let next = SortState::new(column.id.clone(), direction);
        log::debug!("Sort toggled: {} {:?}", next.column_id, next.direction);
        self.store.set(Some(next.clone()));
        if let Some(observer) = &self.on_sort_change {
            observer(&SortChange {
                sort: next.clone(),
                column_id: column.id.clone(),
            });
        }
        Some(next)
    }

    /// Orders filtered rows by the active sort.
    ///
    /// Rows keep their order under server sorting, with no active sort, or
    /// when the active column is unknown or not sortable.
    pub fn apply<'a, T>(&self, rows: Vec<&'a T>, columns: &[Column<T>]) -> Vec<&'a T> {
        if self.server_sort || rows.len() < 2 {
            return rows;
        }
        let Some(active) = self.store.get() else {
            return rows;
        };
        match find_column(columns, &active.column_id) {
            Some(column) if column.meta.sortable => sort_rows(rows, column, active.direction),
            _ => rows,
        }
    }
}

impl std::fmt::Debug for SortController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortController")
            .field("sort", &self.store.get())
            .field("server_sort", &self.server_sort)
            .finish()
    }
}
