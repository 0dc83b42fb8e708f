//! Error types

mod action;
mod config;
mod query;
mod transform;

pub use action::*;
pub use config::*;
pub use query::*;
pub use transform::*;

/// Top-level error for fallible engine entry points.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A node-to-row transform failed.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// A table definition could not be turned into a working configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
