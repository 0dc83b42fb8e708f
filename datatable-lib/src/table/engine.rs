//! Table engine
//!
//! [`DataTable`] wires the filter, sort, page and selection controllers
//! together. Each call to [`DataTable::view`] derives a fresh [`TableView`]:
//!
//! ```text
//! data -> filter -> sort -> paginate -> page keys -> selection sync
//! ```

use std::sync::Arc;
use std::sync::RwLock;

use super::BulkAction;
use super::BulkActionRunner;
use super::BulkOutcome;
use super::ColumnFilters;
use super::DataTableConfig;
use super::Diagnostic;
use super::Diagnostics;
use super::FilterController;
use super::LoadState;
use super::MAX_OVERLAY_ROWS;
use super::PageController;
use super::PageControls;
use super::Pagination;
use super::SelectionController;
use super::SelectionSet;
use super::SortController;
use super::SortState;
use super::reconcile;
use crate::connection::PageInfo;
use crate::error::QueryError;
use crate::model::CellValue;
use crate::model::Column;
use crate::model::RowKey;
use crate::model::RowKeySource;
use crate::model::find_column;
use crate::store::InternalStore;
use crate::store::Ownership;
use crate::store::SharedStore;

/// Which state the table is in, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    /// The query failed.
    Error,
    /// First load with no data: render a full skeleton.
    Loading,
    /// Nothing to show.
    Empty,
    /// Rows to show.
    Ready,
}

/// Availability of one bulk action for the current page selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkActionState {
    pub id: String,
    pub label: String,
    pub disabled: bool,
}

/// Derived state for one render.
#[derive(Debug)]
pub struct TableView<'a, T> {
    /// Visible rows, in display order.
    pub rows: Vec<&'a T>,
    /// Keys of `rows`, index for index.
    pub keys: Vec<RowKey>,
    /// Absolute index of the first visible row.
    pub start_index: usize,
    /// Rows surviving filters, across all pages.
    pub filtered_count: usize,
    pub sort: Option<SortState>,
    pub controls: Option<PageControls>,
    pub show_page_controls: bool,
    pub selected_keys: Vec<RowKey>,
    pub selected_rows: Vec<&'a T>,
    pub all_selected_on_page: bool,
    pub some_selected_on_page: bool,
    /// Skeleton rows to append while loading more.
    pub placeholder_rows: usize,
    /// Overlay rows drawn over the page during a refetch.
    pub overlay_rows: usize,
    pub busy: bool,
    pub status: TableStatus,
    pub error: Option<QueryError>,
}

impl<T> TableView<'_, T> {
    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.selected_keys.contains(key)
    }

    /// Visible rows paired with their keys.
    pub fn keyed_rows(&self) -> impl Iterator<Item = (&RowKey, &T)> {
        self.keys.iter().zip(self.rows.iter().copied())
    }
}

/// Tabular data state engine.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use datatable_lib::model::{Column, RowKeySource};
/// use datatable_lib::table::{DataTable, DataTableConfig, LoadState, Pagination};
///
/// let rows = vec![json!({"id": 1, "name": "Ada"}), json!({"id": 2, "name": "Bob"})];
/// let table = DataTable::new(
///     DataTableConfig::new(vec![Column::field("name", "Name")])
///         .with_row_key(RowKeySource::field("id"))
///         .with_pagination(Pagination::client(10.0)),
/// );
///
/// table.set_global_search("ada");
/// let view = table.view(&rows, &LoadState::default());
/// assert_eq!(view.rows, vec![&rows[0]]);
/// ```
pub struct DataTable<T> {
    columns: Vec<Column<T>>,
    row_key: RowKeySource<T>,
    pagination: RwLock<Pagination>,
    filter: FilterController,
    sort: SortController,
    page: PageController,
    selection: SelectionController,
    bulk_actions: Vec<BulkAction<T>>,
    runner: BulkActionRunner,
    skeleton_rows: usize,
    loading_overlay: bool,
    diagnostics: Arc<Diagnostics>,
}

impl<T> DataTable<T> {
    pub fn new(config: DataTableConfig<T>) -> Self {
        let diagnostics = Arc::new(Diagnostics::new());

        let page_store: SharedStore<usize> = match config.page {
            Ownership::Controlled(store) if !store.has_on_change() => {
                diagnostics.warn_once(Diagnostic::ControlledPageWithoutHandler);
                Arc::new(InternalStore::new(1))
            }
            other => other.into_store(),
        };

        let filter = FilterController::new(
            config.global_search.into_store(),
            config.column_filters.into_store(),
            config.filter_options,
        );
        let sort = SortController::new(config.sort.into_store())
            .with_observer(config.on_sort_change)
            .with_server_sort(config.server_sort);
        let selection = SelectionController::new(config.selection.into_store(), config.selectable)
            .with_retention(config.retention);
        let runner = BulkActionRunner::new()
            .with_confirmer(config.confirmer)
            .with_reporter(config.reporter);

        Self {
            columns: config.columns,
            row_key: config.row_key,
            pagination: RwLock::new(config.pagination),
            filter,
            sort,
            page: PageController::new(page_store),
            selection,
            bulk_actions: config.bulk_actions,
            runner,
            skeleton_rows: config.skeleton_rows,
            loading_overlay: config.loading_overlay,
            diagnostics,
        }
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn bulk_actions(&self) -> &[BulkAction<T>] {
        &self.bulk_actions
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
            .read()
            .map(|g| g.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn global_search(&self) -> String {
        self.filter.query()
    }

    pub fn column_filters(&self) -> ColumnFilters {
        self.filter.filters()
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort.current()
    }

    /// The requested page, before clamping.
    pub fn page(&self) -> usize {
        self.page.current()
    }

    pub fn selection(&self) -> SelectionSet {
        self.selection.current()
    }

    /// Diagnostics fired so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.fired()
    }

    /// Derives the view of `data` for the current state.
    pub fn view<'a>(&self, data: &'a [T], load: &LoadState) -> TableView<'a, T> {
        let filtered = self.filter.apply(data, &self.columns);
        let filtered_count = filtered.len();
        let sorted = self.sort.apply(filtered, &self.columns);

        let pagination = self.pagination();
        if let Pagination::Server(server) = &pagination
            && server.total_items.is_none()
        {
            self.diagnostics
                .warn_once(Diagnostic::ServerPaginationWithoutTotal);
        }

        let window = reconcile(&pagination, self.page.current(), sorted.len());
        let rows: Vec<&'a T> = window.slice(&sorted).to_vec();
        let keys: Vec<RowKey> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| self.row_key.key_for(row, window.start + i))
            .collect();

        self.selection.sync_page_keys(&keys);
        let selected = if self.selection.is_selectable() {
            self.selection.current()
        } else {
            SelectionSet::new()
        };
        let (selected_keys, selected_rows): (Vec<RowKey>, Vec<&'a T>) = keys
            .iter()
            .zip(rows.iter())
            .filter(|(key, _)| selected.contains(*key))
            .map(|(key, row)| (key.clone(), *row))
            .unzip();
        let all_selected_on_page =
            self.selection.is_selectable() && !keys.is_empty() && selected_keys.len() == keys.len();
        let some_selected_on_page = self.selection.is_selectable()
            && !selected_keys.is_empty()
            && selected_keys.len() < keys.len();

        let placeholder_rows = if load.loading_more && !rows.is_empty() {
            self.skeleton_rows
        } else {
            0
        };

        let status = if load.error.is_some() {
            TableStatus::Error
        } else if load.loading && data.is_empty() {
            TableStatus::Loading
        } else if !load.loading && rows.is_empty() {
            TableStatus::Empty
        } else {
            TableStatus::Ready
        };

        let busy = self.loading_overlay && load.loading && status == TableStatus::Ready;
        let overlay_rows = if busy {
            self.skeleton_rows.min(MAX_OVERLAY_ROWS)
        } else {
            0
        };

        TableView {
            rows,
            keys,
            start_index: window.start,
            filtered_count,
            sort: self.sort.current(),
            show_page_controls: !load.loading && pagination.shows_controls(),
            controls: window.controls,
            selected_keys,
            selected_rows,
            all_selected_on_page,
            some_selected_on_page,
            placeholder_rows,
            overlay_rows,
            busy,
            status,
            error: load.error.clone(),
        }
    }

    /// Requests a new global search and returns to page 1 in client mode.
    pub fn set_global_search(&self, query: impl Into<String>) {
        self.filter.set_query(query);
        self.reset_page_after_filter_change();
    }

    /// Requests a column filter and returns to page 1 in client mode.
    pub fn set_column_filter(&self, column_id: impl Into<String>, value: impl Into<CellValue>) {
        self.filter.set_filter(column_id, value);
        self.reset_page_after_filter_change();
    }

    /// Removes a column filter and returns to page 1 in client mode.
    pub fn clear_column_filter(&self, column_id: &str) {
        if self.filter.clear_filter(column_id) {
            self.reset_page_after_filter_change();
        }
    }

    fn reset_page_after_filter_change(&self) {
        if self.pagination().is_client() {
            self.page.reset();
        }
    }

    /// Handles a header click. Returns `None` for unknown or non-sortable
    /// columns.
    pub fn toggle_sort(&self, column_id: &str) -> Option<SortState> {
        let column = find_column(&self.columns, column_id)?;
        self.sort.toggle(column)
    }

    pub fn set_page(&self, page: usize) {
        self.page.set(page);
    }

    pub fn set_pagination(&self, pagination: Pagination) {
        if let Ok(mut guard) = self.pagination.write() {
            *guard = pagination;
        }
    }

    /// Updates the page info of server pagination. Other modes are unchanged.
    pub fn set_page_info(&self, page_info: Option<PageInfo>) {
        if let Ok(mut guard) = self.pagination.write()
            && let Pagination::Server(server) = &mut *guard
        {
            server.page_info = page_info;
        }
    }

    pub fn toggle_row(&self, key: RowKey) {
        self.selection.toggle(key);
    }

    pub fn select_all_on_page(&self, checked: bool) {
        self.selection.select_all_on_page(checked);
    }

    pub fn clear_selection_on_page(&self) {
        self.selection.clear_on_page();
    }

    /// Evaluates every bulk action against the view's page selection.
    pub fn bulk_action_states(&self, view: &TableView<'_, T>) -> Vec<BulkActionState> {
        self.bulk_actions
            .iter()
            .map(|action| BulkActionState {
                id: action.id.clone(),
                label: action.label.clone(),
                disabled: action.is_disabled(&view.selected_rows, &view.selected_keys),
            })
            .collect()
    }

    /// Runs a bulk action with the view's page selection. Returns `None` for
    /// an unknown action id.
    pub fn run_bulk_action(&self, action_id: &str, view: &TableView<'_, T>) -> Option<BulkOutcome>
    where
        T: Clone,
    {
        let action = self.bulk_actions.iter().find(|a| a.id == action_id)?;
        Some(
            self.runner
                .run(action, &view.selected_rows, &view.selected_keys),
        )
    }
}

impl<T> std::fmt::Debug for DataTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataTable")
            .field("columns", &self.columns.len())
            .field("pagination", &self.pagination())
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("page", &self.page)
            .field("selection", &self.selection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::{Value, json};

    use super::*;
    use crate::store::ControlledStore;
    use crate::table::ServerPagination;

    fn rows(n: i64) -> Vec<Value> {
        (1..=n).map(|i| json!({"id": i, "name": format!("row {}", i)})).collect()
    }

    fn config() -> DataTableConfig<Value> {
        DataTableConfig::new(vec![Column::field("id", "Id"), Column::field("name", "Name")])
            .with_row_key(RowKeySource::field("id"))
    }

    #[test]
    fn test_status_priority() {
        let table = DataTable::new(config());
        let data = rows(2);
        let error = LoadState::loading().with_error(QueryError::new("boom"));
        assert_eq!(table.view(&data, &error).status, TableStatus::Error);
        assert_eq!(table.view(&[], &LoadState::loading()).status, TableStatus::Loading);
        assert_eq!(table.view(&data, &LoadState::loading()).status, TableStatus::Ready);
        assert_eq!(table.view(&[], &LoadState::default()).status, TableStatus::Empty);
        assert_eq!(table.view(&data, &LoadState::default()).status, TableStatus::Ready);
    }

    #[test]
    fn test_placeholders_only_with_rows() {
        let table = DataTable::new(config().with_skeleton_rows(3));
        let more = LoadState::default().with_loading_more(true);
        assert_eq!(table.view(&rows(2), &more).placeholder_rows, 3);
        assert_eq!(table.view(&[], &more).placeholder_rows, 0);
        assert_eq!(table.view(&rows(2), &LoadState::default()).placeholder_rows, 0);
    }

    #[test]
    fn test_loading_overlay_during_refetch() {
        let data = rows(2);
        let plain = DataTable::new(config());
        let view = plain.view(&data, &LoadState::loading());
        assert_eq!((view.overlay_rows, view.busy), (0, false));

        let table = DataTable::new(config().with_loading_overlay(true));
        let view = table.view(&data, &LoadState::loading());
        assert_eq!((view.overlay_rows, view.busy), (3, true));

        let view = table.view(&data, &LoadState::default());
        assert_eq!((view.overlay_rows, view.busy), (0, false));
        assert!(!table.view(&[], &LoadState::loading()).busy);

        let short = DataTable::new(config().with_loading_overlay(true).with_skeleton_rows(2));
        assert_eq!(short.view(&data, &LoadState::loading()).overlay_rows, 2);
    }

    #[test]
    fn test_filter_change_resets_client_page() {
        let table = DataTable::new(config().with_pagination(Pagination::client(2.0)));
        table.set_page(3);
        table.set_global_search("row");
        assert_eq!(table.page(), 1);

        table.set_page(2);
        table.set_column_filter("name", "row");
        assert_eq!(table.page(), 1);

        table.set_page(2);
        table.clear_column_filter("name");
        assert_eq!(table.page(), 1);
    }

    #[test]
    fn test_filter_change_keeps_server_page() {
        let table = DataTable::new(config().with_pagination(Pagination::server(2.0)));
        table.set_page(3);
        table.set_global_search("row");
        assert_eq!(table.page(), 3);
    }

    #[test]
    fn test_controlled_page_without_handler_falls_back() {
        let table = DataTable::new(
            config()
                .with_pagination(Pagination::client(2.0))
                .with_controlled_page(ControlledStore::fixed(3)),
        );
        assert_eq!(table.page(), 1);
        table.set_page(2);
        assert_eq!(table.page(), 2);
        assert_eq!(table.diagnostics(), vec![Diagnostic::ControlledPageWithoutHandler]);
    }

    #[test]
    fn test_controlled_page_receives_resets() {
        let requested = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&requested);
        let store = ControlledStore::fixed(3).with_on_change(move |p| sink.lock().unwrap().push(p));
        let table = DataTable::new(
            config()
                .with_pagination(Pagination::client(2.0))
                .with_controlled_page(store),
        );
        let data = rows(10);
        assert_eq!(table.view(&data, &LoadState::default()).start_index, 4);
        table.set_global_search("x");
        assert_eq!(*requested.lock().unwrap(), vec![1]);
        assert!(table.diagnostics().is_empty());
    }

    #[test]
    fn test_controlled_search_follows_caller() {
        let query = Arc::new(RwLock::new(String::new()));
        let requested = Arc::new(Mutex::new(Vec::new()));
        let (read, write, sink) = (Arc::clone(&query), Arc::clone(&query), Arc::clone(&requested));
        let store = ControlledStore::new(move || read.read().unwrap().clone()).with_on_change(move |q: String| {
            sink.lock().unwrap().push(q.clone());
            *write.write().unwrap() = q;
        });
        let table = DataTable::new(
            config()
                .with_pagination(Pagination::client(2.0))
                .with_controlled_search(store),
        );
        let data = rows(12);

        table.set_page(3);
        table.set_global_search("row 1");
        assert_eq!(*requested.lock().unwrap(), vec!["row 1".to_string()]);
        assert_eq!(table.page(), 1);
        assert_eq!(table.view(&data, &LoadState::default()).filtered_count, 4);

        *query.write().unwrap() = "row 12".to_string();
        let view = table.view(&data, &LoadState::default());
        assert_eq!(table.global_search(), "row 12");
        assert_eq!(view.keys, vec![RowKey::from(12)]);
    }

    #[test]
    fn test_controlled_filters_without_handler_ignore_writes() {
        let mut pinned = ColumnFilters::new();
        pinned.insert("name".to_string(), "row 1".into());
        let table = DataTable::new(
            config()
                .with_controlled_search(ControlledStore::fixed("row 1".to_string()))
                .with_controlled_filters(ControlledStore::fixed(pinned.clone())),
        );

        table.set_global_search("row 2");
        table.set_column_filter("name", "row 3");
        table.clear_column_filter("name");

        assert_eq!(table.global_search(), "row 1");
        assert_eq!(table.column_filters(), pinned);
        let data = rows(12);
        let view = table.view(&data, &LoadState::default());
        assert_eq!(view.keys, vec![RowKey::from(1), RowKey::from(10), RowKey::from(11), RowKey::from(12)]);
    }

    #[test]
    fn test_controlled_selection_receives_pruning() {
        let initial: SelectionSet = [1i64, 2, 5].into_iter().map(RowKey::from).collect();
        let selected = Arc::new(RwLock::new(initial));
        let requested = Arc::new(Mutex::new(Vec::new()));
        let (read, write, sink) = (Arc::clone(&selected), Arc::clone(&selected), Arc::clone(&requested));
        let store = ControlledStore::new(move || read.read().unwrap().clone()).with_on_change(
            move |next: SelectionSet| {
                sink.lock().unwrap().push(next.clone());
                *write.write().unwrap() = next;
            },
        );
        let table = DataTable::new(
            config()
                .with_pagination(Pagination::client(2.0))
                .with_selectable(true)
                .with_controlled_selection(store),
        );
        let data = rows(6);

        let view = table.view(&data, &LoadState::default());
        let page_one: SelectionSet = [RowKey::from(1), RowKey::from(2)].into_iter().collect();
        assert_eq!(*requested.lock().unwrap(), vec![page_one]);
        assert!(view.all_selected_on_page);

        table.toggle_row(RowKey::from(2));
        let view = table.view(&data, &LoadState::default());
        assert_eq!(view.selected_keys, vec![RowKey::from(1)]);
        assert_eq!(requested.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_server_without_total_warns_once() {
        let table = DataTable::new(config().with_pagination(Pagination::server(10.0)));
        let data = rows(3);
        let view = table.view(&data, &LoadState::default());
        table.view(&data, &LoadState::default());
        assert_eq!(view.rows.len(), 3);
        assert!(!view.show_page_controls);
        assert_eq!(table.diagnostics(), vec![Diagnostic::ServerPaginationWithoutTotal]);

        table.set_page_info(Some(PageInfo::new(true, false)));
        let view = table.view(&data, &LoadState::default());
        assert!(view.show_page_controls);
        assert!(view.controls.unwrap().has_next);
        assert!(!table.view(&data, &LoadState::loading()).show_page_controls);
    }

    #[test]
    fn test_server_with_total_is_quiet() {
        let table = DataTable::new(
            config().with_pagination(Pagination::Server(ServerPagination::new(10.0).with_total_items(3.0))),
        );
        table.view(&rows(3), &LoadState::default());
        assert!(table.diagnostics().is_empty());
    }

    #[test]
    fn test_index_keys_are_absolute() {
        let table = DataTable::new(
            DataTableConfig::new(vec![Column::field("name", "Name")])
                .with_pagination(Pagination::client(2.0))
                .with_initial_page(2),
        );
        let data = rows(5);
        let view = table.view(&data, &LoadState::default());
        assert_eq!(view.keys, vec![RowKey::from(2), RowKey::from(3)]);
    }

    #[test]
    fn test_sort_then_paginate() {
        let table = DataTable::new(config().with_pagination(Pagination::client(2.0)));
        assert_eq!(table.toggle_sort("id"), Some(SortState::asc("id")));
        assert_eq!(table.toggle_sort("id"), Some(SortState::desc("id")));
        assert_eq!(table.toggle_sort("missing"), None);
        let data = rows(5);
        let view = table.view(&data, &LoadState::default());
        assert_eq!(view.keys, vec![RowKey::from(5), RowKey::from(4)]);
        assert_eq!(view.sort, Some(SortState::desc("id")));
    }

    #[test]
    fn test_bulk_action_states_and_runs() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let table = DataTable::new(
            config()
                .with_selectable(true)
                .with_initial_selection([2i64, 9])
                .with_bulk_action(
                    BulkAction::sync("export", "Export", move |rows: Vec<Value>, _| {
                        sink.lock().unwrap().extend(rows);
                        Ok(())
                    })
                    .disabled_when(|rows, _| rows.is_empty()),
                ),
        );
        let data = rows(3);
        let view = table.view(&data, &LoadState::default());
        assert_eq!(table.selection().len(), 1);
        assert_eq!(view.selected_keys, vec![RowKey::from(2)]);
        assert!(view.some_selected_on_page);

        let states = table.bulk_action_states(&view);
        assert_eq!(states, vec![BulkActionState {
            id: "export".to_string(),
            label: "Export".to_string(),
            disabled: false,
        }]);

        assert!(matches!(table.run_bulk_action("export", &view), Some(BulkOutcome::Completed)));
        assert!(table.run_bulk_action("missing", &view).is_none());
        assert_eq!(*seen.lock().unwrap(), vec![data[1].clone()]);
    }
}
