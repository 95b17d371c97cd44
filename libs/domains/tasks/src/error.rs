use query_filter::QueryError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TaskResult<T> = Result<T, TaskError>;

impl TaskError {
    /// Whether the caller's input caused the error
    pub fn is_client_error(&self) -> bool {
        match self {
            TaskError::NotFound(_) | TaskError::InvalidFilter(_) => true,
            TaskError::Query(err) => err.is_client_error(),
            TaskError::Database(_) | TaskError::Internal(_) => false,
        }
    }
}

/// Implement From for sea_orm::DbErr
impl From<sea_orm::DbErr> for TaskError {
    fn from(err: sea_orm::DbErr) -> Self {
        TaskError::Database(err.to_string())
    }
}
