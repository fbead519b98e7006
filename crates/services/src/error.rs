//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use study_core::model::DocumentError;
use study_core::validate::FormError;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::notice::Notice;
use crate::quiz::QuizSessionError;

/// Errors emitted by the upload and query flows.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Please choose a file to upload")]
    NothingStaged,
    #[error("a request is already in progress")]
    Busy,
    #[error("request was cancelled")]
    Cancelled,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FlowError {
    /// Convert the error into the notice shown to the user.
    ///
    /// `action` names what failed, e.g. "Upload" or "Search".
    #[must_use]
    pub fn notice(&self, action: &str) -> Notice {
        match self {
            Self::Form(err) => Notice::validation(err.to_string()),
            Self::Document(err) => Notice::validation(err.to_string()),
            Self::NothingStaged => Notice::validation(self.to_string()),
            Self::Busy => Notice::info(format!("{action} already in progress")),
            Self::Cancelled => Notice::info(format!("{action} cancelled")),
            Self::Api(err) => Notice::from_api_error(err, action),
        }
    }
}

/// Errors emitted by `QuizFlow`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizFlowError {
    #[error("a quiz is already in progress")]
    QuizInProgress,
    #[error("a quiz is already being generated")]
    Busy,
    #[error("no quiz loaded")]
    NoQuiz,
    #[error("the quiz is already completed")]
    Completed,
    #[error("the quiz was replaced while the request was running")]
    Stale,
    #[error("request was cancelled")]
    Cancelled,
    #[error(transparent)]
    Session(#[from] QuizSessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QuizFlowError {
    /// Convert the error into the notice shown to the user.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Api(err) => Notice::from_api_error(err, "Quiz request"),
            Self::Session(QuizSessionError::Incomplete(blocked)) => {
                Notice::warning(blocked.message())
            }
            Self::Session(err) => Notice::validation(err.to_string()),
            Self::QuizInProgress => {
                Notice::warning("Finish or abandon the current quiz before generating a new one")
            }
            Self::Storage(err) => Notice::failure(format!("Could not save quiz result: {err}")),
            Self::Busy | Self::NoQuiz | Self::Completed | Self::Stale | Self::Cancelled => {
                Notice::info(self.to_string())
            }
        }
    }
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("Please sign in to view your progress")]
    SignedOut,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
