use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DropError {
    #[error("package not found ({0})")]
    MissingDriver(&'static str),

    #[error("engine not supported ({0})")]
    UnsupportedEngine(String),

    #[error("database alias not configured ({0})")]
    MissingDatabase(String),

    #[error("could not locate app ({0})")]
    AppNotFound(String),

    #[error("no dbdrop.json found from {}", .0.display())]
    SettingsNotFound(PathBuf),

    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
