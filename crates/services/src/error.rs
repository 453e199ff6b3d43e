//! Shared error types for the services crate.

use thiserror::Error;

use onboarding_core::model::{Stage, TaskId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ChecklistService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChecklistError {
    #[error("task {id} does not exist in stage {stage}")]
    UnknownTask { stage: Stage, id: TaskId },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ChatService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while reading webhook settings.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WebhookConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("{var} must use http or https, got {scheme}")]
    UnsupportedScheme { var: &'static str, scheme: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Webhook(#[from] WebhookConfigError),
}
