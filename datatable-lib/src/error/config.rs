//! Table definition error types

/// Errors found while validating a declarative table definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The definition contains no columns.
    #[error("Table definition has no columns")]
    NoColumns,

    /// A column id is empty.
    #[error("Column at position {0} has an empty id")]
    EmptyColumnId(usize),

    /// Two columns share an id.
    #[error("Duplicate column id: {0}")]
    DuplicateColumn(String),

    /// The data path string could not be parsed.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// The rejected path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The pagination mode is not `none`, `client` or `server`.
    #[error("Unknown pagination mode: {0}")]
    UnknownPaginationMode(String),

    /// A sort or filter refers to a column that is not defined.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}
