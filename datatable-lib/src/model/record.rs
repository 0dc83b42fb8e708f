//! Dynamic table record

use std::collections::HashMap;

use super::CellValue;
use super::TableRow;

/// A dynamic row backed by a field map.
///
/// Useful when rows have no static type, for example when they are built
/// from a JSON response at runtime.
///
/// # Example
///
/// ```
/// use datatable_lib::model::{CellValue, Record, TableRow};
///
/// let record = Record::new()
///     .set("id", 1i64)
///     .set("name", "Ada");
///
/// assert_eq!(record.field("name"), CellValue::from("Ada"));
/// assert_eq!(record.field("missing"), CellValue::Null);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, CellValue>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Sets a field value in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields.get(field)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, CellValue> {
        &self.fields
    }

    /// Builds a record from a JSON object. Returns `None` for other JSON kinds.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            fields: object
                .iter()
                .map(|(k, v)| (k.clone(), CellValue::from(v)))
                .collect(),
        })
    }
}

impl TableRow for Record {
    fn field(&self, name: &str) -> CellValue {
        self.fields.get(name).cloned().unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
