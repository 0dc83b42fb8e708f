//! Path descriptors into a raw response

use std::sync::Arc;

use serde_json::Value;

use crate::error::ConfigError;

/// One step of a segment path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object property.
    Key(String),
    /// Array position.
    Index(usize),
}

impl From<&str> for Segment {
    fn from(v: &str) -> Self {
        Segment::Key(v.to_string())
    }
}

impl From<String> for Segment {
    fn from(v: String) -> Self {
        Segment::Key(v)
    }
}

impl From<usize> for Segment {
    fn from(v: usize) -> Self {
        Segment::Index(v)
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Key(k) => f.write_str(k),
            Segment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Selector closure borrowing the candidate out of the response.
pub type Selector = Arc<dyn for<'a> Fn(&'a Value) -> Option<&'a Value> + Send + Sync>;

/// Where to find a value inside a raw response.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use datatable_lib::connection::DataPath;
///
/// let data = json!({"org": {"teams": [{"name": "core"}]}});
///
/// let by_segments = DataPath::segments(["org", "teams"]).then_index(0);
/// assert_eq!(by_segments.resolve(&data), Some(&json!({"name": "core"})));
///
/// let by_selector = DataPath::selector(|d| d.get("org")?.get("teams")?.get(0));
/// assert_eq!(by_selector.resolve(&data), by_segments.resolve(&data));
/// ```
#[derive(Clone)]
pub enum DataPath {
    /// Successive property/index accesses.
    Segments(Vec<Segment>),
    /// Caller-supplied selector.
    Selector(Selector),
}

impl DataPath {
    /// Builds a segment path.
    pub fn segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        DataPath::Segments(segments.into_iter().map(Into::into).collect())
    }

    /// Builds a selector path.
    pub fn selector<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a Value) -> Option<&'a Value> + Send + Sync + 'static,
    {
        DataPath::Selector(Arc::new(f))
    }

    /// Appends a property segment. Selector paths are returned unchanged.
    pub fn then_key(self, key: impl Into<String>) -> Self {
        self.push(Segment::Key(key.into()))
    }

    /// Appends an index segment. Selector paths are returned unchanged.
    pub fn then_index(self, index: usize) -> Self {
        self.push(Segment::Index(index))
    }

    fn push(self, segment: Segment) -> Self {
        match self {
            DataPath::Segments(mut segments) => {
                segments.push(segment);
                DataPath::Segments(segments)
            }
            selector => selector,
        }
    }

    /// Parses a dotted path such as `org.members.0.connection`.
    ///
    /// All-digit parts become index segments. An empty string is the root.
    pub fn parse(path: &str) -> Result<Self, ConfigError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Ok(DataPath::Segments(Vec::new()));
        }
        trimmed
            .split('.')
            .map(|part| {
                if part.is_empty() {
                    Err(ConfigError::InvalidPath {
                        path: path.to_string(),
                        reason: "empty segment".to_string(),
                    })
                } else if part.bytes().all(|b| b.is_ascii_digit()) {
                    part.parse::<usize>()
                        .map(Segment::Index)
                        .map_err(|e| ConfigError::InvalidPath {
                            path: path.to_string(),
                            reason: e.to_string(),
                        })
                } else {
                    Ok(Segment::Key(part.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(DataPath::Segments)
    }

    /// Resolves the path against a response.
    ///
    /// Returns `None` as soon as an intermediate value is null or not an
    /// object/array, or a property or index is missing.
    pub fn resolve<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        match self {
            DataPath::Segments(segments) => segments
                .iter()
                .try_fold(data, |current, segment| step(current, segment)),
            DataPath::Selector(select) => select(data),
        }
    }
}

fn step<'a>(current: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (current, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get(key),
        (Value::Object(map), Segment::Index(index)) => map.get(&index.to_string()),
        (Value::Array(items), Segment::Index(index)) => items.get(*index),
        (Value::Array(items), Segment::Key(key)) => {
            key.parse::<usize>().ok().and_then(|index| items.get(index))
        }
        _ => None,
    }
}

impl std::fmt::Debug for DataPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataPath::Segments(segments) => f.debug_tuple("Segments").field(segments).finish(),
            DataPath::Selector(_) => f.write_str("Selector(..)"),
        }
    }
}

impl Default for DataPath {
    /// The response root.
    fn default() -> Self {
        DataPath::Segments(Vec::new())
    }
}

impl From<Vec<Segment>> for DataPath {
    fn from(segments: Vec<Segment>) -> Self {
        DataPath::Segments(segments)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_dotted_path() {
        let path = DataPath::parse("org.members.0.connection").unwrap();
        match path {
            DataPath::Segments(segments) => assert_eq!(
                segments,
                vec![
                    Segment::from("org"),
                    Segment::from("members"),
                    Segment::Index(0),
                    Segment::from("connection"),
                ]
            ),
            DataPath::Selector(_) => panic!("expected segments"),
        }
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        assert!(matches!(
            DataPath::parse("org..members"),
            Err(ConfigError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_short_circuits_on_null_and_primitives() {
        let data = json!({"a": null, "b": 5, "c": [1, 2]});
        assert_eq!(DataPath::segments(["a", "x"]).resolve(&data), None);
        assert_eq!(DataPath::segments(["b", "x"]).resolve(&data), None);
        assert_eq!(DataPath::segments(["missing"]).resolve(&data), None);
    }

    #[test]
    fn test_index_segments() {
        let data = json!({"c": [10, 20], "o": {"0": "zero"}});
        assert_eq!(DataPath::segments(["c"]).then_index(1).resolve(&data), Some(&json!(20)));
        assert_eq!(DataPath::segments(["c"]).then_index(5).resolve(&data), None);
        assert_eq!(DataPath::segments(["o"]).then_index(0).resolve(&data), Some(&json!("zero")));
        assert_eq!(DataPath::segments(["c", "0"]).resolve(&data), Some(&json!(10)));
    }

    #[test]
    fn test_empty_path_is_root() {
        let data = json!({"edges": []});
        assert_eq!(DataPath::parse("").unwrap().resolve(&data), Some(&data));
    }
}
