//! Connection shape validation

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::DataPath;

/// Cursor pagination descriptor attached to a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub has_previous_page: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Creates page info with the given navigation flags.
    pub fn new(has_next_page: bool, has_previous_page: bool) -> Self {
        Self {
            has_next_page,
            has_previous_page,
            ..Default::default()
        }
    }

    /// Sets both cursors.
    pub fn with_cursors(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_cursor = Some(start.into());
        self.end_cursor = Some(end.into());
        self
    }
}

/// A validated view of a connection inside a raw response.
///
/// Only values that are objects with an `edges` key holding `null` or an
/// array qualify. Anything else is rejected rather than treated as empty.
#[derive(Debug, Clone, Copy)]
pub struct Connection<'a> {
    value: &'a Value,
    edges: Option<&'a [Value]>,
}

impl<'a> Connection<'a> {
    /// Validates a candidate value.
    pub fn from_value(candidate: &'a Value) -> Option<Self> {
        let object = candidate.as_object()?;
        let edges = match object.get("edges")? {
            Value::Null => None,
            Value::Array(items) => Some(items.as_slice()),
            _ => return None,
        };
        Some(Self {
            value: candidate,
            edges,
        })
    }

    /// The underlying JSON value. Its address is the connection's identity.
    pub fn as_value(&self) -> &'a Value {
        self.value
    }

    /// Raw edges, `None` when `edges` is null.
    pub fn edges(&self) -> Option<&'a [Value]> {
        self.edges
    }

    /// Parsed page info, `None` when absent, null or malformed.
    pub fn page_info(&self) -> Option<PageInfo> {
        match self.value.get("pageInfo") {
            None | Some(Value::Null) => None,
            Some(raw) => match PageInfo::deserialize(raw) {
                Ok(info) => Some(info),
                Err(e) => {
                    log::warn!("Connection has a malformed pageInfo, ignoring it: {}", e);
                    None
                }
            },
        }
    }

    /// Non-null nodes of non-null edges, in source order.
    pub fn nodes(&self) -> impl Iterator<Item = &'a Value> + 'a {
        self.edges
            .unwrap_or_default()
            .iter()
            .filter(|edge| !edge.is_null())
            .filter_map(|edge| edge.get("node"))
            .filter(|node| !node.is_null())
    }
}

/// Resolves a path and validates the result as a connection.
pub fn resolve_connection<'a>(data: &'a Value, path: &DataPath) -> Option<Connection<'a>> {
    path.resolve(data).and_then(Connection::from_value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_rejects_non_connections() {
        assert!(Connection::from_value(&json!({"pageInfo": {}})).is_none());
        assert!(Connection::from_value(&json!({"edges": "not-an-array"})).is_none());
        assert!(Connection::from_value(&json!([{"edges": []}])).is_none());
        assert!(Connection::from_value(&json!(null)).is_none());
    }

    #[test]
    fn test_null_edges_keep_page_info() {
        let value = json!({"edges": null, "pageInfo": {"hasNextPage": false, "hasPreviousPage": true}});
        let connection = Connection::from_value(&value).unwrap();
        assert!(connection.edges().is_none());
        assert_eq!(connection.nodes().count(), 0);
        assert_eq!(connection.page_info(), Some(PageInfo::new(false, true)));
    }

    #[test]
    fn test_nodes_skip_null_edges_and_nodes() {
        let value = json!({"edges": [null, {"node": null}, {"node": {"id": 1}}, 4, {"node": {"id": 2}}]});
        let connection = Connection::from_value(&value).unwrap();
        let ids: Vec<_> = connection.nodes().map(|n| n["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_malformed_page_info_keeps_connection() {
        let value = json!({"edges": [{"node": {"id": 1}}], "pageInfo": {"hasNextPage": "yes"}});
        let connection = Connection::from_value(&value).unwrap();
        assert_eq!(connection.nodes().count(), 1);
        assert_eq!(connection.page_info(), None);
    }

    #[test]
    fn test_page_info_cursors() {
        let value = json!({
            "edges": [],
            "pageInfo": {"hasNextPage": true, "hasPreviousPage": true, "startCursor": "START", "endCursor": "END"}
        });
        let info = Connection::from_value(&value).unwrap().page_info().unwrap();
        assert_eq!(info, PageInfo::new(true, true).with_cursors("START", "END"));
    }
}
