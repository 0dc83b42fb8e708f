//! Transform error types

/// Errors raised while mapping connection nodes into rows.
///
/// These are never swallowed by the adapter: a failing transform means the
/// mapping logic is wrong, so the error goes straight back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The transform rejected a node.
    #[error("Transform failed: {0}")]
    Message(String),

    /// The node could not be deserialized into the requested type.
    #[error("Node deserialization failed: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl TransformError {
    /// Creates a transform error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}
