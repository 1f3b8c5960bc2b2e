//! Shared error types for the services crate.

use thiserror::Error;

use form_core::Validation;
use form_core::model::{BlockError, FormError, FormId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the form definition store and response sink adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FormsApiError {
    #[error("form {0} was not found")]
    NotFound(FormId),
    #[error("forms api request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("form definition is invalid: {0}")]
    InvalidBlock(#[from] BlockError),
    #[error("form definition is invalid: {0}")]
    InvalidForm(#[from] FormError),
}

/// Errors emitted by `ResponseFlowService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResponseFlowError {
    #[error("no form is loaded in this session")]
    NotStarted,
    #[error("responses were already submitted")]
    AlreadySubmitted,
    #[error("the current answer is invalid: {}", .0.message.as_deref().unwrap_or("unknown reason"))]
    Invalid(Validation),
    #[error("could not load form: {0}")]
    Form(#[source] FormsApiError),
    #[error("submitting responses failed: {0}")]
    SubmissionFailed(#[source] FormsApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
