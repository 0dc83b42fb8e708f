//! Bulk action error types

/// Errors returned by bulk action handlers.
///
/// The runner reports these through an [`ErrorReporter`](crate::table::ErrorReporter)
/// and never re-raises them.
#[derive(Debug, thiserror::Error)]
pub enum BulkActionError {
    /// The handler failed with a message.
    #[error("{0}")]
    Message(String),

    /// The handler failed with an underlying error.
    #[error(transparent)]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl BulkActionError {
    /// Creates a bulk action error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}
