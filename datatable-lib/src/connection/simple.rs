//! Plain list data source

use std::convert::Infallible;
use std::sync::Arc;

use serde_json::Value;

use super::DataPath;
use super::MemoCell;
use super::QueryResult;
use crate::error::QueryError;
use crate::error::TransformError;

type RowSelector<R> = dyn Fn(&Value) -> Result<Option<Vec<R>>, TransformError> + Send + Sync;

/// Rows and flags derived by a [`SimpleDataSource`].
#[derive(Debug, Clone)]
pub struct SimpleTableData<R> {
    pub rows: Arc<Vec<R>>,
    pub loading: bool,
    pub error: Option<QueryError>,
}

struct DataKey(Option<Arc<Value>>);

impl PartialEq for DataKey {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Reads rows from a response that is not shaped as a connection.
///
/// Unlike [`TableDataSource`](super::TableDataSource), selector failures are
/// logged and produce an empty table.
pub struct SimpleDataSource<R> {
    select: Arc<RowSelector<R>>,
    memo: MemoCell<DataKey, Arc<Vec<R>>>,
}

impl<R> SimpleDataSource<R> {
    /// Source using a row selector. `Ok(None)` means "no rows".
    pub fn new<F>(select: F) -> Self
    where
        F: Fn(&Value) -> Result<Option<Vec<R>>, TransformError> + Send + Sync + 'static,
    {
        Self {
            select: Arc::new(select),
            memo: MemoCell::new(),
        }
    }

    /// Reads a query result. Rows are reused while `data` is the same `Arc`.
    pub fn read(&self, result: &QueryResult) -> SimpleTableData<R> {
        let rows = match &result.data {
            Some(data) => {
                let key = DataKey(Some(Arc::clone(data)));
                let outcome: Result<_, Infallible> = self.memo.get_or_try_insert(key, || {
                    Ok(Arc::new(match (self.select)(data) {
                        Ok(rows) => rows.unwrap_or_default(),
                        Err(e) => {
                            log::error!("Failed to select table rows: {}", e);
                            Vec::new()
                        }
                    }))
                });
                match outcome {
                    Ok(rows) => rows,
                    Err(never) => match never {},
                }
            }
            None => Arc::new(Vec::new()),
        };

        SimpleTableData {
            rows,
            loading: result.loading,
            error: result.error.clone(),
        }
    }
}

impl SimpleDataSource<Value> {
    /// Source reading the array found at `path`.
    ///
    /// A missing or null value yields no rows; any other non-array value is
    /// an error.
    pub fn at_path(path: DataPath) -> Self {
        Self::new(move |data| match path.resolve(data) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items.clone())),
            Some(other) => Err(TransformError::msg(format!(
                "expected an array at {:?}, found {}",
                path,
                kind(other)
            ))),
        })
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
