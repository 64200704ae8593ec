//! # Sources Crate
//!
//! Candidate sources for movie recommendations.
//!
//! ## Components
//!
//! ### Content Source
//! TF-IDF similarity over each movie's genre labels and overview:
//! - "Movies that read like this one..."
//! - Full pairwise similarity matrix, rebuilt when the catalog changes
//!
//! ### Collaborative Source
//! Latent-factor matrix factorization over the rating log:
//! - Predicted rating for any user/movie pair
//! - Ranks the movies a user has not rated yet
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{CollaborativeConfig, CollaborativeModel, ContentIndex};
//!
//! let content = ContentIndex::build(snapshot.movies());
//! let model = CollaborativeModel::train(snapshot.ratings(), &CollaborativeConfig::default());
//!
//! let similar = content.similar(movie_id, 10)?;
//! let unrated = model.top_unrated(&snapshot, user_id, 10);
//! ```

pub mod collaborative;
pub mod content;
pub mod error;
pub mod text;
pub mod types;
pub mod user_context;

// Re-export commonly used types
pub use collaborative::{CollaborativeConfig, CollaborativeModel};
pub use content::{ContentIndex, catalog_fingerprint};
pub use error::SourceError;
pub use types::{Candidate, CandidateSource, UserContext};
