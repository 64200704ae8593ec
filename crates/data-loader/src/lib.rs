//! # Data Loader Crate
//!
//! The Rating Store: the movie catalog and the mood-tagged rating log that
//! every recommender reads from.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Rating, MoodTag, DataIndex)
//! - **parser**: Read and write `movies.json` / `ratings.dat`
//! - **index**: Load and validate a DataIndex from a data directory
//! - **store**: The `RatingStore` trait and the in-memory `MemoryStore`
//! - **synthetic**: Random ratings for bootstrapping an empty store
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{MemoryStore, RatingStore};
//! use std::path::Path;
//!
//! let store = MemoryStore::open(Path::new("data"))?;
//! let snapshot = store.snapshot()?;
//! println!("{} movies, {} ratings", snapshot.movies().len(), snapshot.ratings().len());
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod store;
pub mod synthetic;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use store::{MemoryStore, RatingStore, unix_timestamp};
pub use types::{
    // Type aliases
    UserId,
    MovieId,
    // Core types
    Movie,
    Rating,
    NewRating,
    DataIndex,
    // Enums
    Genre,
    MoodTag,
    // Rating scale
    MIN_RATING,
    MAX_RATING,
    is_valid_rating,
};
