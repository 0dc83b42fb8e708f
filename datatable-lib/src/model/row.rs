//! Named-field access for row types

use super::CellValue;

/// Row types whose fields can be read by name.
///
/// Implementing this is only needed for [`Accessor::field`](super::Accessor::field)
/// columns and field-based row keys; closure accessors work on any `T`.
pub trait TableRow {
    /// Returns the value of the named field, or `CellValue::Null` if absent.
    fn field(&self, name: &str) -> CellValue;
}

impl TableRow for serde_json::Value {
    fn field(&self, name: &str) -> CellValue {
        self.get(name).map(CellValue::from).unwrap_or_default()
    }
}

impl<T: TableRow> TableRow for std::sync::Arc<T> {
    fn field(&self, name: &str) -> CellValue {
        (**self).field(name)
    }
}
