use thiserror::Error;

/// Errors raised while building or running a filtered query
///
/// Construction-time problems (`Validation`, `InvalidCriterion`) surface
/// before any query is touched. `Execution` carries collaborator failures
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Invalid pagination: {0}")]
    Validation(String),

    #[error("Invalid criterion: {0}")]
    InvalidCriterion(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Query execution failed: {0}")]
    Execution(String),
}

pub type QueryResult<T> = Result<T, QueryError>;

impl QueryError {
    /// Whether the error was caused by caller input rather than the backend
    pub fn is_client_error(&self) -> bool {
        !matches!(self, QueryError::Execution(_))
    }
}

#[cfg(feature = "postgres")]
impl From<sea_orm::DbErr> for QueryError {
    fn from(err: sea_orm::DbErr) -> Self {
        QueryError::Execution(err.to_string())
    }
}
