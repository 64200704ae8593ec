//! Errors surfaced by the recommendation service.

use data_loader::{DataLoadError, MovieId};
use sources::SourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Unknown movie id in a lookup, seed or rating
    #[error("Movie {0} not found")]
    NotFound(MovieId),

    /// Rejected request parameter (rating value, mood tag on submission)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Status queried before any model was trained
    #[error("Model not ready: {0}")]
    ModelNotReady(String),

    #[error("Rating store error: {0}")]
    Store(#[source] DataLoadError),

    /// A blocking worker panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<DataLoadError> for ServiceError {
    fn from(err: DataLoadError) -> Self {
        match err {
            DataLoadError::MissingReference { id, .. } => ServiceError::NotFound(id),
            DataLoadError::InvalidValue { field, value } => {
                ServiceError::InvalidInput(format!("{}: {}", field, value))
            }
            other => ServiceError::Store(other),
        }
    }
}

impl From<SourceError> for ServiceError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::MovieNotFound(id) => ServiceError::NotFound(id),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_movie_maps_to_not_found() {
        let err: ServiceError = DataLoadError::MissingReference {
            entity: "Movie".to_string(),
            id: 12,
        }
        .into();
        assert!(matches!(err, ServiceError::NotFound(12)));

        let err: ServiceError = SourceError::MovieNotFound(7).into();
        assert!(matches!(err, ServiceError::NotFound(7)));
    }

    #[test]
    fn test_other_store_errors_are_wrapped() {
        let err: ServiceError = DataLoadError::LockPoisoned.into();
        assert!(matches!(err, ServiceError::Store(DataLoadError::LockPoisoned)));
        assert_eq!(err.to_string(), "Rating store error: Rating store lock poisoned");
    }

    #[test]
    fn test_invalid_value_is_invalid_input() {
        let err: ServiceError = DataLoadError::InvalidValue {
            field: "mood".to_string(),
            value: "omega".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Invalid input: mood: omega");
    }
}
