//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `UiStateService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UiStateServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while reading or writing the companies snapshot.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors emitted while walking a data directory for validation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidationRunError {
    #[error("data directory {path} is not readable: {source}")]
    DataDir {
        path: String,
        source: std::io::Error,
    },
}

/// Errors emitted by change detection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChangeDetectError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
