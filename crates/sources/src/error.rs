//! Errors raised by candidate sources.

use data_loader::MovieId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// The query movie is not part of the indexed catalog
    #[error("Movie {0} not found in catalog")]
    MovieNotFound(MovieId),
}

pub type Result<T> = std::result::Result<T, SourceError>;
