//! Query error passed through from the data-fetching client

/// Error reported by the data-fetching client.
///
/// The engine does not interpret it; it is carried to the presentation
/// layer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct QueryError {
    /// Human-readable error message.
    pub message: String,
}

impl QueryError {
    /// Creates a new query error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
