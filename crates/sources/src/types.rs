//! Shared candidate and context types.

use data_loader::{MovieId, UserId};
use std::collections::HashSet;

/// Which recommender produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSource {
    /// Text similarity to a seed movie
    Content,
    /// Latent-factor predicted rating
    Collaborative,
    /// Popularity among high ratings given in one mood
    Mood,
}

/// A ranked movie suggestion before it is resolved to a catalog record
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub movie_id: MovieId,
    pub source: CandidateSource,
    /// Source-specific score: cosine similarity, predicted rating or mood count
    pub score: f32,
}

impl Candidate {
    pub fn new(movie_id: MovieId, source: CandidateSource, score: f32) -> Self {
        Self {
            movie_id,
            source,
            score,
        }
    }
}

/// What we know about a user from the rating log
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub user_id: UserId,
    /// Every movie the user has rated at least once
    pub rated_movies: HashSet<MovieId>,
    /// Movies rated >= 4.0, in rating order
    pub highly_rated_movies: Vec<MovieId>,
    pub rating_count: usize,
    pub avg_rating: f32,
}

impl UserContext {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    pub fn has_rated(&self, movie_id: MovieId) -> bool {
        self.rated_movies.contains(&movie_id)
    }
}
