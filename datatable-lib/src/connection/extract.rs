//! Node to row extraction

use std::any::Any;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Connection;
use crate::error::TransformError;

type TransformFn<R> = dyn Fn(&Value) -> Result<Option<R>, TransformError> + Send + Sync;

/// Maps a connection node to a row.
///
/// Returning `Ok(None)` drops the node, as does a JSON row that is `null`. Errors propagate to the caller.
/// Two transforms are the same transform only if they are clones of each
/// other; memoization compares them by identity.
pub struct NodeTransform<R> {
    f: Arc<TransformFn<R>>,
}

impl<R> NodeTransform<R> {
    /// Wraps a fallible transform.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Option<R>, TransformError> + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Wraps an infallible transform.
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Option<R> + Send + Sync + 'static,
    {
        Self::new(move |node| Ok(f(node)))
    }

    /// Applies the transform to one node.
    pub fn apply(&self, node: &Value) -> Result<Option<R>, TransformError> {
        (self.f)(node)
    }

    /// Returns `true` if both handles share the same closure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl NodeTransform<Value> {
    /// Passes nodes through unchanged.
    pub fn identity() -> Self {
        Self::map(|node| Some(node.clone()))
    }
}

impl<R: DeserializeOwned> NodeTransform<R> {
    /// Deserializes each node into `R`.
    pub fn deserialize() -> Self {
        Self::new(|node| Ok(Some(R::deserialize(node)?)))
    }
}

impl<R> Clone for NodeTransform<R> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<R> std::fmt::Debug for NodeTransform<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeTransform")
            .field("ptr", &Arc::as_ptr(&self.f).cast::<()>())
            .finish()
    }
}

/// Extracts rows from a connection, preserving edge order.
pub fn extract_rows<R: 'static>(
    connection: &Connection<'_>,
    transform: &NodeTransform<R>,
) -> Result<Vec<R>, TransformError> {
    let mut rows = Vec::new();
    for node in connection.nodes() {
        match transform.apply(node)? {
            Some(row) if !is_null_row(&row) => rows.push(row),
            _ => {}
        }
    }
    Ok(rows)
}

fn is_null_row<R: 'static>(row: &R) -> bool {
    (row as &dyn Any)
        .downcast_ref::<Value>()
        .is_some_and(Value::is_null)
}
