//! Value enum for dynamic cell values

use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use uuid::Uuid;

/// A dynamic value produced by a column accessor.
///
/// Rows are opaque to the engine; everything it knows about a row comes from
/// the `CellValue`s its columns extract. Filtering, searching, sorting and
/// display all work on this type.
///
/// # Type Mapping
///
/// | JSON / source value | Rust Variant |
/// |---------------------|--------------|
/// | null, missing       | `Null` |
/// | boolean             | `Bool` |
/// | integral number     | `Int` |
/// | other number        | `Float` |
/// | string              | `String` |
/// | array, object       | `Json` |
///
/// `Decimal`, `Guid` and `DateTime` are only produced by typed accessors.
///
/// # Example
///
/// ```
/// use datatable_lib::model::CellValue;
///
/// let name = CellValue::from("Ada");
/// let age = CellValue::from(36i64);
/// let active = CellValue::from(true);
/// let empty = CellValue::Null;
/// assert_eq!(name.to_search_string(), "Ada");
/// assert_eq!(empty.to_search_string(), "");
/// # let _ = (age, active);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    /// Null or absent value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Arbitrary precision decimal.
    Decimal(Decimal),
    /// String value.
    String(String),
    /// GUID/UUID value.
    Guid(Uuid),
    /// Date and time.
    DateTime(DateTime<Utc>),
    /// Arrays, objects and anything else without a dedicated variant.
    Json(serde_json::Value),
}

impl CellValue {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null | CellValue::Json(serde_json::Value::Null))
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Null => "null",
            CellValue::Bool(_) => "bool",
            CellValue::Int(_) => "int",
            CellValue::Float(_) => "float",
            CellValue::Decimal(_) => "decimal",
            CellValue::String(_) => "string",
            CellValue::Guid(_) => "guid",
            CellValue::DateTime(_) => "datetime",
            CellValue::Json(_) => "json",
        }
    }

    /// Returns the string slice if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            CellValue::Json(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a number, if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            CellValue::Decimal(v) => v.to_f64(),
            CellValue::Json(serde_json::Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::Json(serde_json::Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Returns the timestamp, if this is a `DateTime`.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// String form used by filtering and global search.
    ///
    /// Null becomes the empty string, dates become ISO-8601, and compound
    /// values follow default string coercion (arrays join their elements with
    /// `,`, objects become `[object Object]`). This is not JSON.
    pub fn to_search_string(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(v) => v.to_string(),
            CellValue::Float(v) => format_number(*v),
            CellValue::Decimal(v) => v.normalize().to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::Guid(id) => id.hyphenated().to_string(),
            CellValue::DateTime(dt) => format_datetime(dt),
            CellValue::Json(value) => coerce_json(value),
        }
    }

    /// String form used when rendering a cell.
    ///
    /// Identical to [`to_search_string`](Self::to_search_string) for scalars;
    /// arrays and objects are JSON-serialized instead, falling back to the
    /// empty string if serialization fails.
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Json(value @ (serde_json::Value::Array(_) | serde_json::Value::Object(_))) => {
                serde_json::to_string(value).unwrap_or_default()
            }
            other => other.to_search_string(),
        }
    }

    /// Strict equality used by non-string column filters.
    ///
    /// Numeric variants compare by numeric value (`NaN` never equals
    /// anything); other variants must match in kind and value.
    pub fn strict_eq(&self, other: &CellValue) -> bool {
        match (self, other) {
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Decimal(a), CellValue::Decimal(b)) => a == b,
            _ if self.is_numeric() && other.is_numeric() => {
                match (self.as_f64(), other.as_f64()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            _ if self.is_null() && other.is_null() => true,
            (a, b) => match (a.as_bool(), b.as_bool()) {
                (Some(x), Some(y)) => x == y,
                _ => match (a.as_str(), b.as_str()) {
                    (Some(x), Some(y)) => x == y,
                    _ => match (a, b) {
                        (CellValue::Guid(x), CellValue::Guid(y)) => x == y,
                        (CellValue::DateTime(x), CellValue::DateTime(y)) => x == y,
                        (CellValue::Json(x), CellValue::Json(y)) => x == y,
                        _ => false,
                    },
                },
            },
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            CellValue::Int(_)
                | CellValue::Float(_)
                | CellValue::Decimal(_)
                | CellValue::Json(serde_json::Value::Number(_))
        )
    }
}

/// Formats a float the way default number coercion does: integral values
/// without a fractional part, non-finite values by name.
pub(crate) fn format_number(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if v == 0.0 {
        "0".to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e21 {
        format!("{v:.0}")
    } else {
        v.to_string()
    }
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn coerce_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(format_number).unwrap_or_default(),
        },
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(coerce_json)
            .collect::<Vec<_>>()
            .join(","),
        serde_json::Value::Object(_) => "[object Object]".to_string(),
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int(v as i64)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<u32> for CellValue {
    fn from(v: u32) -> Self {
        CellValue::Int(v as i64)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<Decimal> for CellValue {
    fn from(v: Decimal) -> Self {
        CellValue::Decimal(v)
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::String(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::String(v.to_string())
    }
}

impl From<Uuid> for CellValue {
    fn from(v: Uuid) -> Self {
        CellValue::Guid(v)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(v: DateTime<Utc>) -> Self {
        CellValue::DateTime(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => CellValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => CellValue::String(s),
            other => CellValue::Json(other),
        }
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(v: &serde_json::Value) -> Self {
        CellValue::from(v.clone())
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_display_string())
    }
}
