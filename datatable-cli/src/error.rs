//! CLI errors

use std::path::PathBuf;

use datatable_lib::error::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no --definition given and {} does not exist", .0.display())]
    MissingDefinition(PathBuf),

    #[error("no --definition given and no config directory is available")]
    NoConfigDir,

    #[error("invalid table definition: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Table(#[from] datatable_lib::Error),

    #[error("failed to render table: {0}")]
    Render(#[from] std::io::Error),

    #[error("failed to initialize logging: {0}")]
    Logger(#[from] log::SetLoggerError),
}
