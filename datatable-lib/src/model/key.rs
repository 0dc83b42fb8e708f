//! Row identity

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::CellValue;
use super::TableRow;

/// Identity of a row, used to track selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowKey {
    /// Numeric key.
    Int(i64),
    /// String key.
    Str(String),
}

impl RowKey {
    /// Converts a cell value into a key.
    ///
    /// Strings and numbers are used as they are; other non-null values are
    /// stringified. Returns `None` for null.
    pub fn from_cell(value: &CellValue) -> Option<RowKey> {
        if value.is_null() {
            return None;
        }
        if let Some(s) = value.as_str() {
            return Some(RowKey::Str(s.to_string()));
        }
        match value {
            CellValue::Int(v) => Some(RowKey::Int(*v)),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 => {
                Some(RowKey::Int(*v as i64))
            }
            CellValue::Json(serde_json::Value::Number(n)) if n.as_i64().is_some() => {
                n.as_i64().map(RowKey::Int)
            }
            other => Some(RowKey::Str(other.to_search_string())),
        }
    }

    fn is_string_or_number(value: &CellValue) -> bool {
        value.as_str().is_some() || value.as_f64().is_some()
    }
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowKey::Int(v) => write!(f, "{}", v),
            RowKey::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowKey {
    fn from(v: i64) -> Self {
        RowKey::Int(v)
    }
}

impl From<i32> for RowKey {
    fn from(v: i32) -> Self {
        RowKey::Int(v as i64)
    }
}

impl From<usize> for RowKey {
    fn from(v: usize) -> Self {
        RowKey::Int(v as i64)
    }
}

impl From<&str> for RowKey {
    fn from(v: &str) -> Self {
        RowKey::Str(v.to_string())
    }
}

impl From<String> for RowKey {
    fn from(v: String) -> Self {
        RowKey::Str(v)
    }
}

impl From<Uuid> for RowKey {
    fn from(v: Uuid) -> Self {
        RowKey::Str(v.hyphenated().to_string())
    }
}

/// Where a row's key comes from.
///
/// `Index` keys are positions in the sorted, filtered result. They are not
/// stable across filtering, sorting or paging; callers that need selection
/// to follow a row must use a field or closure.
pub enum RowKeySource<T> {
    /// Absolute position in the sorted rows.
    Index,
    /// Value of a named field; null falls back to the position.
    Field {
        /// Field name.
        name: String,
        /// Field reader.
        read: fn(&T, &str) -> CellValue,
    },
    /// `id`, then `_id`, then the position.
    Auto {
        /// Field reader.
        read: fn(&T, &str) -> CellValue,
    },
    /// Caller-computed key.
    Custom(Arc<dyn Fn(&T) -> RowKey + Send + Sync>),
}

impl<T> RowKeySource<T> {
    /// Keys rows by a named field.
    pub fn field(name: impl Into<String>) -> Self
    where
        T: TableRow,
    {
        RowKeySource::Field {
            name: name.into(),
            read: <T as TableRow>::field,
        }
    }

    /// Keys rows by their `id` or `_id` field when present.
    pub fn auto() -> Self
    where
        T: TableRow,
    {
        RowKeySource::Auto {
            read: <T as TableRow>::field,
        }
    }

    /// Keys rows with a closure.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&T) -> RowKey + Send + Sync + 'static,
    {
        RowKeySource::Custom(Arc::new(f))
    }

    /// Computes the key for a row at an absolute position.
    pub fn key_for(&self, row: &T, index: usize) -> RowKey {
        match self {
            RowKeySource::Index => RowKey::from(index),
            RowKeySource::Field { name, read } => {
                RowKey::from_cell(&read(row, name)).unwrap_or_else(|| RowKey::from(index))
            }
            RowKeySource::Auto { read } => {
                let mut value = read(row, "id");
                if value.is_null() {
                    value = read(row, "_id");
                }
                if RowKey::is_string_or_number(&value) {
                    RowKey::from_cell(&value).unwrap_or_else(|| RowKey::from(index))
                } else {
                    RowKey::from(index)
                }
            }
            RowKeySource::Custom(f) => f(row),
        }
    }

    /// Returns `true` when keys are positional.
    pub fn is_positional(&self) -> bool {
        matches!(self, RowKeySource::Index)
    }
}

impl<T> Default for RowKeySource<T> {
    fn default() -> Self {
        RowKeySource::Index
    }
}

impl<T> Clone for RowKeySource<T> {
    fn clone(&self) -> Self {
        match self {
            RowKeySource::Index => RowKeySource::Index,
            RowKeySource::Field { name, read } => RowKeySource::Field {
                name: name.clone(),
                read: *read,
            },
            RowKeySource::Auto { read } => RowKeySource::Auto { read: *read },
            RowKeySource::Custom(f) => RowKeySource::Custom(Arc::clone(f)),
        }
    }
}

impl<T> std::fmt::Debug for RowKeySource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowKeySource::Index => f.write_str("Index"),
            RowKeySource::Field { name, .. } => f.debug_tuple("Field").field(name).finish(),
            RowKeySource::Auto { .. } => f.write_str("Auto"),
            RowKeySource::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
