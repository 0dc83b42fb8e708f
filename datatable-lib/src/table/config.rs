//! Table configuration

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::BulkAction;
use super::ColumnFilters;
use super::Confirmer;
use super::ErrorReporter;
use super::FilterOptions;
use super::LogReporter;
use super::Pagination;
use super::SelectionRetention;
use super::SelectionSet;
use super::SortObserver;
use super::SortState;
use super::pagination::{ClientPagination, DEFAULT_PAGE_SIZE, ServerPagination};
use crate::connection::DataPath;
use crate::connection::QueryResult;
use crate::connection::TableData;
use crate::connection::TableDataSource;
use crate::error::Error;
use crate::error::ConfigError;
use crate::error::QueryError;
use crate::model::Accessor;
use crate::model::Column;
use crate::model::RowKeySource;
use crate::store::ControlledStore;
use crate::store::Ownership;

/// Placeholder rows shown while loading.
pub const DEFAULT_SKELETON_ROWS: usize = 5;

/// Upper bound on overlay rows during a refetch.
pub const MAX_OVERLAY_ROWS: usize = 3;

/// Everything needed to build a [`DataTable`](super::DataTable).
///
/// # Example
///
/// ```
/// use serde_json::Value;
/// use datatable_lib::model::{Column, RowKeySource};
/// use datatable_lib::table::{DataTableConfig, Pagination};
///
/// let config = DataTableConfig::<Value>::new(vec![Column::field("name", "Name")])
///     .with_row_key(RowKeySource::field("id"))
///     .with_pagination(Pagination::client(25.0))
///     .with_selectable(true);
///
/// assert!(config.selectable);
/// ```
pub struct DataTableConfig<T> {
    pub columns: Vec<Column<T>>,
    pub row_key: RowKeySource<T>,
    pub pagination: Pagination,
    /// Default: uncontrolled, page 1.
    pub page: Ownership<usize>,
    pub global_search: Ownership<String>,
    pub column_filters: Ownership<ColumnFilters>,
    pub filter_options: FilterOptions,
    pub sort: Ownership<Option<SortState>>,
    pub on_sort_change: Option<SortObserver>,
    pub server_sort: bool,
    /// Default: `false`.
    pub selectable: bool,
    pub selection: Ownership<SelectionSet>,
    pub retention: SelectionRetention,
    pub bulk_actions: Vec<BulkAction<T>>,
    /// Without one, actions that ask for confirmation never run.
    pub confirmer: Option<Arc<dyn Confirmer>>,
    pub reporter: Arc<dyn ErrorReporter>,
    /// Default: 5.
    pub skeleton_rows: usize,
    /// Mark the table busy and show overlay rows while refetching with
    /// rows already on screen. Default: `false`.
    pub loading_overlay: bool,
}

impl<T> DataTableConfig<T> {
    /// Creates a config with default settings for `columns`.
    pub fn new(columns: Vec<Column<T>>) -> Self {
        Self {
            columns,
            row_key: RowKeySource::default(),
            pagination: Pagination::default(),
            page: Ownership::Uncontrolled(1),
            global_search: Ownership::default(),
            column_filters: Ownership::default(),
            filter_options: FilterOptions::default(),
            sort: Ownership::default(),
            on_sort_change: None,
            server_sort: false,
            selectable: false,
            selection: Ownership::default(),
            retention: SelectionRetention::default(),
            bulk_actions: Vec::new(),
            confirmer: None,
            reporter: Arc::new(LogReporter),
            skeleton_rows: DEFAULT_SKELETON_ROWS,
            loading_overlay: false,
        }
    }

    pub fn with_row_key(mut self, row_key: RowKeySource<T>) -> Self {
        self.row_key = row_key;
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Starts uncontrolled pagination on `page`.
    pub fn with_initial_page(mut self, page: usize) -> Self {
        self.page = Ownership::Uncontrolled(page.max(1));
        self
    }

    /// Lets the caller own the page number.
    pub fn with_controlled_page(mut self, store: ControlledStore<usize>) -> Self {
        self.page = Ownership::Controlled(store);
        self
    }

    pub fn with_initial_search(mut self, query: impl Into<String>) -> Self {
        self.global_search = Ownership::Uncontrolled(query.into());
        self
    }

    pub fn with_controlled_search(mut self, store: ControlledStore<String>) -> Self {
        self.global_search = Ownership::Controlled(store);
        self
    }

    pub fn with_initial_filters(mut self, filters: ColumnFilters) -> Self {
        self.column_filters = Ownership::Uncontrolled(filters);
        self
    }

    pub fn with_controlled_filters(mut self, store: ControlledStore<ColumnFilters>) -> Self {
        self.column_filters = Ownership::Controlled(store);
        self
    }

    pub fn with_filter_options(mut self, options: FilterOptions) -> Self {
        self.filter_options = options;
        self
    }

    pub fn with_initial_sort(mut self, sort: SortState) -> Self {
        self.sort = Ownership::Uncontrolled(Some(sort));
        self
    }

    pub fn with_controlled_sort(mut self, store: ControlledStore<Option<SortState>>) -> Self {
        self.sort = Ownership::Controlled(store);
        self
    }

    pub fn with_sort_observer(mut self, observer: SortObserver) -> Self {
        self.on_sort_change = Some(observer);
        self
    }

    pub fn with_server_sort(mut self, server_sort: bool) -> Self {
        self.server_sort = server_sort;
        self
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn with_initial_selection<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<crate::model::RowKey>,
    {
        self.selection = Ownership::Uncontrolled(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_controlled_selection(mut self, store: ControlledStore<SelectionSet>) -> Self {
        self.selection = Ownership::Controlled(store);
        self
    }

    pub fn with_retention(mut self, retention: SelectionRetention) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_bulk_action(mut self, action: BulkAction<T>) -> Self {
        self.bulk_actions.push(action);
        self
    }

    pub fn with_confirmer(mut self, confirmer: Arc<dyn Confirmer>) -> Self {
        self.confirmer = Some(confirmer);
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_skeleton_rows(mut self, rows: usize) -> Self {
        self.skeleton_rows = rows;
        self
    }

    pub fn with_loading_overlay(mut self, overlay: bool) -> Self {
        self.loading_overlay = overlay;
        self
    }
}

/// Request flags handed to [`DataTable::view`](super::DataTable::view).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadState {
    pub loading: bool,
    pub loading_more: bool,
    pub error: Option<QueryError>,
}

impl LoadState {
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }

    pub fn with_loading_more(mut self, loading_more: bool) -> Self {
        self.loading_more = loading_more;
        self
    }

    pub fn with_error(mut self, error: QueryError) -> Self {
        self.error = Some(error);
        self
    }
}

impl<R> From<&crate::connection::TableData<R>> for LoadState {
    fn from(data: &crate::connection::TableData<R>) -> Self {
        Self {
            loading: data.loading,
            loading_more: data.loading_more,
            error: data.error.clone(),
        }
    }
}

// =============================================================================
// Declarative definition
// =============================================================================

/// One column of a [`TableDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub id: String,
    /// Defaults to the id.
    #[serde(default)]
    pub header: Option<String>,
    /// Field read from each row; defaults to the id.
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default = "enabled")]
    pub sortable: bool,
    #[serde(default = "enabled")]
    pub filterable: bool,
    #[serde(default = "enabled")]
    pub searchable: bool,
}

/// Pagination section of a [`TableDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDefinition {
    /// `none`, `client` or `server`.
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub page_size: Option<f64>,
    #[serde(default)]
    pub total_items: Option<f64>,
}

impl Default for PaginationDefinition {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            page_size: None,
            total_items: None,
        }
    }
}

impl PaginationDefinition {
    pub fn to_pagination(&self) -> Result<Pagination, ConfigError> {
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        match self.mode.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Pagination::None),
            "client" => Ok(Pagination::Client(ClientPagination {
                page_size,
                total_items: self.total_items,
            })),
            "server" => Ok(Pagination::Server(ServerPagination {
                page_size,
                page_info: None,
                total_items: self.total_items,
            })),
            other => Err(ConfigError::UnknownPaginationMode(other.to_string())),
        }
    }
}

/// JSON description of a table over raw JSON rows.
///
/// # Example
///
/// ```
/// use datatable_lib::table::TableDefinition;
///
/// let definition: TableDefinition = serde_json::from_str(r#"{
///     "path": "organization.members",
///     "rowKey": "id",
///     "columns": [{"id": "name", "header": "Name"}, {"id": "email", "sortable": false}],
///     "pagination": {"mode": "client", "pageSize": 20}
/// }"#).unwrap();
///
/// let config = definition.clone().into_config().unwrap();
/// assert_eq!(config.columns.len(), 2);
/// assert!(definition.data_path().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    /// Dotted path to the connection; empty means the response root.
    #[serde(default)]
    pub path: String,
    pub columns: Vec<ColumnDefinition>,
    /// Key field; without one rows are keyed by `id`, `_id`, then position.
    #[serde(default)]
    pub row_key: Option<String>,
    #[serde(default)]
    pub pagination: PaginationDefinition,
    #[serde(default)]
    pub initial_sort: Option<SortState>,
    #[serde(default)]
    pub selectable: bool,
    #[serde(default)]
    pub server_search: bool,
    #[serde(default)]
    pub server_filter: bool,
    #[serde(default)]
    pub server_sort: bool,
    #[serde(default)]
    pub skeleton_rows: Option<usize>,
    #[serde(default)]
    pub loading_overlay: bool,
}

impl TableDefinition {
    /// Parses the data path.
    pub fn data_path(&self) -> Result<DataPath, ConfigError> {
        DataPath::parse(&self.path)
    }

    /// Checks column ids and the initial sort.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns.is_empty() {
            return Err(ConfigError::NoColumns);
        }
        let mut seen = HashSet::new();
        for (position, column) in self.columns.iter().enumerate() {
            if column.id.trim().is_empty() {
                return Err(ConfigError::EmptyColumnId(position));
            }
            if !seen.insert(column.id.as_str()) {
                return Err(ConfigError::DuplicateColumn(column.id.clone()));
            }
        }
        if let Some(sort) = &self.initial_sort
            && !seen.contains(sort.column_id.as_str())
        {
            return Err(ConfigError::UnknownColumn(sort.column_id.clone()));
        }
        Ok(())
    }

    /// Builds a config over JSON rows.
    pub fn into_config(self) -> Result<DataTableConfig<Value>, ConfigError> {
        self.validate()?;
        let pagination = self.pagination.to_pagination()?;

        let columns: Vec<Column<Value>> = self
            .columns
            .into_iter()
            .map(|def| {
                let header = def.header.unwrap_or_else(|| def.id.clone());
                let field = def.field.unwrap_or_else(|| def.id.clone());
                Column::new(def.id, header, Accessor::field(field))
                    .sortable(def.sortable)
                    .filterable(def.filterable)
                    .searchable(def.searchable)
            })
            .collect();

        let row_key = match self.row_key {
            Some(field) if !field.trim().is_empty() => RowKeySource::field(field),
            _ => RowKeySource::auto(),
        };

        let mut config = DataTableConfig::new(columns)
            .with_row_key(row_key)
            .with_pagination(pagination)
            .with_selectable(self.selectable)
            .with_filter_options(FilterOptions {
                server_filter: self.server_filter,
                server_search: self.server_search,
            })
            .with_server_sort(self.server_sort)
            .with_skeleton_rows(self.skeleton_rows.unwrap_or(DEFAULT_SKELETON_ROWS))
            .with_loading_overlay(self.loading_overlay);
        if let Some(sort) = self.initial_sort {
            config = config.with_initial_sort(sort);
        }
        Ok(config)
    }

    /// Reads the rows at the definition's path out of `result` and builds
    /// the matching config.
    pub fn open(self, result: &QueryResult) -> Result<(DataTableConfig<Value>, TableData<Value>), Error> {
        let source = TableDataSource::new(self.data_path()?);
        let data = source.read(result)?;
        let config = self.into_config()?;
        Ok((config, data))
    }
}

fn enabled() -> bool {
    true
}

fn default_mode() -> String {
    "none".to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn definition(value: Value) -> TableDefinition {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = DataTableConfig::<Value>::new(Vec::new());
        assert!(matches!(config.page, Ownership::Uncontrolled(1)));
        assert!(matches!(config.pagination, Pagination::None));
        assert!(config.row_key.is_positional());
        assert!(!config.selectable);
        assert_eq!(config.skeleton_rows, 5);
        assert_eq!(config.retention, SelectionRetention::PruneToPage);
    }

    #[test]
    fn test_definition_builds_columns() {
        let config = definition(json!({
            "columns": [
                {"id": "name"},
                {"id": "mail", "header": "Email", "field": "email", "searchable": false}
            ],
            "pagination": {"mode": "Client", "pageSize": 5, "totalItems": 12},
            "initialSort": {"columnId": "name", "direction": "desc"}
        }))
        .into_config()
        .unwrap();

        assert_eq!(config.columns[0].header, "name");
        assert_eq!(config.columns[1].header, "Email");
        assert_eq!(config.columns[1].accessor.field_name(), Some("email"));
        assert!(!config.columns[1].meta.searchable);
        assert_eq!(
            config.pagination,
            Pagination::Client(ClientPagination::new(5.0).with_total_items(12.0))
        );
        assert!(matches!(config.sort, Ownership::Uncontrolled(Some(ref s)) if *s == SortState::desc("name")));
        assert!(matches!(config.row_key, RowKeySource::Auto { .. }));
    }

    #[test]
    fn test_definition_validation() {
        let no_columns = definition(json!({"columns": []}));
        assert_eq!(no_columns.validate(), Err(ConfigError::NoColumns));

        let empty_id = definition(json!({"columns": [{"id": "a"}, {"id": " "}]}));
        assert_eq!(empty_id.validate(), Err(ConfigError::EmptyColumnId(1)));

        let duplicate = definition(json!({"columns": [{"id": "a"}, {"id": "a"}]}));
        assert_eq!(duplicate.validate(), Err(ConfigError::DuplicateColumn("a".to_string())));

        let unknown_sort = definition(json!({"columns": [{"id": "a"}], "initialSort": {"columnId": "b"}}));
        assert_eq!(unknown_sort.validate(), Err(ConfigError::UnknownColumn("b".to_string())));

        let bad_mode = definition(json!({"columns": [{"id": "a"}], "pagination": {"mode": "infinite"}}));
        assert!(matches!(
            bad_mode.into_config(),
            Err(ConfigError::UnknownPaginationMode(mode)) if mode == "infinite"
        ));
    }

    #[test]
    fn test_definition_path() {
        let def = definition(json!({"path": "org.members", "columns": [{"id": "a"}]}));
        let data = json!({"org": {"members": {"edges": []}}});
        assert!(def.data_path().unwrap().resolve(&data).is_some());

        let bad = definition(json!({"path": "org..members", "columns": [{"id": "a"}]}));
        assert!(bad.data_path().is_err());
    }

    #[test]
    fn test_open_reads_rows_and_config() {
        let def = definition(json!({"path": "org.members", "columns": [{"id": "name"}], "rowKey": "id"}));
        let result = QueryResult::ready(json!({"org": {"members": {
            "edges": [{"node": {"id": 1, "name": "Ada"}}, {"node": {"id": 2, "name": "Bob"}}],
            "pageInfo": {"hasNextPage": true, "hasPreviousPage": false}
        }}}));

        let (config, data) = def.open(&result).unwrap();
        assert_eq!(config.columns.len(), 1);
        assert_eq!(data.rows.len(), 2);
        assert!(data.page_info.is_some_and(|info| info.has_next_page));

        let bad_path = definition(json!({"path": "org..members", "columns": [{"id": "a"}]}));
        assert!(matches!(bad_path.open(&result), Err(Error::Config(_))));

        let no_columns = definition(json!({"path": "org.members", "columns": []}));
        assert!(matches!(no_columns.open(&result), Err(Error::Config(ConfigError::NoColumns))));
    }
}
