//! Query results and the connection-backed data source

use std::sync::Arc;

use serde_json::Value;

use super::DataPath;
use super::MemoCell;
use super::NodeTransform;
use super::PageInfo;
use super::extract_rows;
use super::resolve_connection;
use crate::error::QueryError;
use crate::error::TransformError;

/// Request state reported by the data-fetching client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NetworkStatus {
    /// First request in flight.
    Loading,
    /// Variables changed, request in flight.
    SetVariables,
    /// Fetching an additional page.
    FetchMore,
    /// Refetching the same variables.
    Refetch,
    /// Polling.
    Poll,
    /// Idle with a result.
    #[default]
    Ready,
    /// Last request failed.
    Error,
}

impl NetworkStatus {
    /// Numeric wire code.
    pub fn code(self) -> u8 {
        match self {
            NetworkStatus::Loading => 1,
            NetworkStatus::SetVariables => 2,
            NetworkStatus::FetchMore => 3,
            NetworkStatus::Refetch => 4,
            NetworkStatus::Poll => 6,
            NetworkStatus::Ready => 7,
            NetworkStatus::Error => 8,
        }
    }

    /// Parses a wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(NetworkStatus::Loading),
            2 => Some(NetworkStatus::SetVariables),
            3 => Some(NetworkStatus::FetchMore),
            4 => Some(NetworkStatus::Refetch),
            6 => Some(NetworkStatus::Poll),
            7 => Some(NetworkStatus::Ready),
            8 => Some(NetworkStatus::Error),
            _ => None,
        }
    }

    /// Returns `true` while a request is in flight.
    pub fn is_in_flight(self) -> bool {
        !matches!(self, NetworkStatus::Ready | NetworkStatus::Error)
    }
}

/// Raw output of the data-fetching client.
///
/// `data` is shared so that identity survives across reads: handing the same
/// `Arc` back in reuses previously extracted rows.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub data: Option<Arc<Value>>,
    pub loading: bool,
    pub error: Option<QueryError>,
    pub network_status: NetworkStatus,
}

impl QueryResult {
    /// A settled result holding `data`.
    pub fn ready(data: Value) -> Self {
        Self::shared(Arc::new(data))
    }

    /// A settled result holding already shared `data`.
    pub fn shared(data: Arc<Value>) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }

    /// A first load with no data yet.
    pub fn loading() -> Self {
        Self {
            loading: true,
            network_status: NetworkStatus::Loading,
            ..Default::default()
        }
    }

    /// Sets the loading flag.
    pub fn with_loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Sets the error.
    pub fn with_error(mut self, error: QueryError) -> Self {
        self.error = Some(error);
        self
    }

    /// Sets the network status.
    pub fn with_network_status(mut self, status: NetworkStatus) -> Self {
        self.network_status = status;
        self
    }
}

/// Rows and flags derived from a [`QueryResult`].
#[derive(Debug, Clone)]
pub struct TableData<R> {
    pub rows: Arc<Vec<R>>,
    pub loading: bool,
    pub loading_more: bool,
    pub error: Option<QueryError>,
    /// `None` when the response held no connection or the connection had no
    /// page info.
    pub page_info: Option<PageInfo>,
    pub network_status: NetworkStatus,
}

struct ExtractKey<R> {
    data: Arc<Value>,
    connection: usize,
    transform: NodeTransform<R>,
    deps: Vec<Value>,
}

impl<R> PartialEq for ExtractKey<R> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
            && self.connection == other.connection
            && self.transform.ptr_eq(&other.transform)
            && self.deps == other.deps
    }
}

/// Flattens a connection found at a path into table rows.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use datatable_lib::connection::{DataPath, QueryResult, TableDataSource};
///
/// let source = TableDataSource::new(DataPath::segments(["org", "members"]));
/// let result = QueryResult::ready(json!({
///     "org": {"members": {
///         "edges": [{"node": {"id": 1}}, null, {"node": null}],
///         "pageInfo": {"hasNextPage": true, "hasPreviousPage": false}
///     }}
/// }));
///
/// let data = source.read(&result).unwrap();
/// assert_eq!(data.rows.len(), 1);
/// assert!(data.page_info.unwrap().has_next_page);
/// ```
pub struct TableDataSource<R> {
    path: DataPath,
    transform: NodeTransform<R>,
    memo: MemoCell<ExtractKey<R>, Arc<Vec<R>>>,
}

impl TableDataSource<Value> {
    /// Source yielding the raw nodes.
    pub fn new(path: DataPath) -> Self {
        Self::with_transform(path, NodeTransform::identity())
    }
}

impl<R: 'static> TableDataSource<R> {
    /// Source applying `transform` to every node.
    pub fn with_transform(path: DataPath, transform: NodeTransform<R>) -> Self {
        Self {
            path,
            transform,
            memo: MemoCell::new(),
        }
    }

    /// The path this source resolves.
    pub fn path(&self) -> &DataPath {
        &self.path
    }

    /// Replaces the transform. The next read re-extracts.
    pub fn set_transform(&mut self, transform: NodeTransform<R>) {
        self.transform = transform;
    }

    /// Reads a query result.
    pub fn read(&self, result: &QueryResult) -> Result<TableData<R>, TransformError> {
        self.read_with_deps(result, &[])
    }

    /// Reads a query result, re-extracting whenever `deps` change.
    ///
    /// Rows are reused while the response, the resolved connection, the
    /// transform and `deps` are all unchanged.
    pub fn read_with_deps(
        &self,
        result: &QueryResult,
        deps: &[Value],
    ) -> Result<TableData<R>, TransformError> {
        let resolved = result
            .data
            .as_ref()
            .and_then(|data| resolve_connection(data, &self.path).map(|c| (data, c)));

        let (rows, page_info) = match resolved {
            Some((data, connection)) => {
                let key = ExtractKey {
                    data: Arc::clone(data),
                    connection: connection.as_value() as *const Value as usize,
                    transform: self.transform.clone(),
                    deps: deps.to_vec(),
                };
                let rows = self.memo.get_or_try_insert(key, || {
                    log::debug!("Extracting rows from connection at {:?}", self.path);
                    extract_rows(&connection, &self.transform).map(Arc::new)
                })?;
                (rows, connection.page_info())
            }
            None => (Arc::new(Vec::new()), None),
        };

        Ok(TableData {
            rows,
            loading: result.loading,
            loading_more: result.network_status == NetworkStatus::FetchMore,
            error: result.error.clone(),
            page_info,
            network_status: result.network_status,
        })
    }
}

impl<R> std::fmt::Debug for TableDataSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableDataSource")
            .field("path", &self.path)
            .field("transform", &self.transform)
            .finish()
    }
}
