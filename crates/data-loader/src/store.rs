//! The Rating Store seam.
//!
//! Recommenders never touch files or locks directly: they ask a
//! `RatingStore` for the full catalog and rating log, and hand new ratings
//! back to it. `MemoryStore` is the in-process implementation, optionally
//! mirroring accepted ratings into an append-only ratings log.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Read/append access to movies and ratings
pub trait RatingStore: Send + Sync {
    /// Every movie, in catalog order
    fn all_movies(&self) -> Result<Vec<Movie>>;

    /// Every rating, in insertion order
    fn all_ratings(&self) -> Result<Vec<Rating>>;

    /// Append a rating with a store-assigned timestamp
    ///
    /// Fails with `MissingReference` when the movie is not in the catalog.
    fn add_rating(&self, rating: NewRating) -> Result<Rating>;

    /// Append fully-formed ratings (bulk generation)
    fn add_ratings(&self, ratings: Vec<Rating>) -> Result<usize>;

    /// Insert or replace movies by id
    fn upsert_movies(&self, movies: Vec<Movie>) -> Result<usize>;

    /// Load both halves into one snapshot
    fn snapshot(&self) -> Result<DataIndex> {
        Ok(DataIndex::from_parts(self.all_movies()?, self.all_ratings()?))
    }
}

/// In-memory store guarded by a reader/writer lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    index: RwLock<DataIndex>,
    ratings_log: Option<PathBuf>,
    catalog_file: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new(index: DataIndex) -> Self {
        Self {
            index: RwLock::new(index),
            ratings_log: None,
            catalog_file: None,
        }
    }

    /// Load `movies.json` and `ratings.dat` and keep both files current
    pub fn open(data_dir: &Path) -> Result<Self> {
        let index = DataIndex::load_from_files(data_dir)?;
        Ok(Self::new(index)
            .with_ratings_log(data_dir.join("ratings.dat"))
            .with_catalog_file(data_dir.join("movies.json")))
    }

    /// Mirror every appended rating into `path`
    pub fn with_ratings_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.ratings_log = Some(path.into());
        self
    }

    /// Rewrite `path` with the whole catalog after every upsert
    pub fn with_catalog_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_file = Some(path.into());
        self
    }

    fn log(&self, ratings: &[Rating]) -> Result<()> {
        if let Some(path) = &self.ratings_log {
            debug!("Appending {} ratings to {:?}", ratings.len(), path);
            parser::append_ratings(path, ratings)?;
        }
        Ok(())
    }
}

/// Seconds since the Unix epoch, used to stamp accepted ratings
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl RatingStore for MemoryStore {
    fn all_movies(&self) -> Result<Vec<Movie>> {
        let index = self.index.read().map_err(|_| DataLoadError::LockPoisoned)?;
        Ok(index.movies().to_vec())
    }

    fn all_ratings(&self) -> Result<Vec<Rating>> {
        let index = self.index.read().map_err(|_| DataLoadError::LockPoisoned)?;
        Ok(index.ratings().to_vec())
    }

    fn add_rating(&self, rating: NewRating) -> Result<Rating> {
        let mut index = self.index.write().map_err(|_| DataLoadError::LockPoisoned)?;
        if index.get_movie(rating.movie_id).is_none() {
            return Err(DataLoadError::MissingReference {
                entity: "Movie".to_string(),
                id: rating.movie_id,
            });
        }
        let rating = rating.at(unix_timestamp());
        self.log(&[rating])?;
        index.insert_rating(rating);
        Ok(rating)
    }

    fn add_ratings(&self, ratings: Vec<Rating>) -> Result<usize> {
        let mut index = self.index.write().map_err(|_| DataLoadError::LockPoisoned)?;
        self.log(&ratings)?;
        let count = ratings.len();
        for rating in ratings {
            index.insert_rating(rating);
        }
        Ok(count)
    }

    fn upsert_movies(&self, movies: Vec<Movie>) -> Result<usize> {
        let mut index = self.index.write().map_err(|_| DataLoadError::LockPoisoned)?;
        let count = movies.len();
        for movie in movies {
            index.insert_movie(movie);
        }
        if let Some(path) = &self.catalog_file {
            debug!("Writing {} movies to {:?}", index.movies().len(), path);
            parser::write_movies(path, index.movies())?;
        }
        Ok(count)
    }

    fn snapshot(&self) -> Result<DataIndex> {
        let index = self.index.read().map_err(|_| DataLoadError::LockPoisoned)?;
        Ok(index.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn movie(id: MovieId) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            overview: "overview".to_string(),
            release_date: None,
            vote_average: 6.5,
            vote_count: 3,
            genre_ids: vec![18],
            poster_path: None,
            popularity: 2.0,
        }
    }

    #[test]
    fn test_add_rating_assigns_timestamp() {
        let store = MemoryStore::new(DataIndex::from_parts(vec![movie(1)], vec![]));
        let before = unix_timestamp();
        let stored = store
            .add_rating(NewRating {
                user_id: 4,
                movie_id: 1,
                rating: 3.5,
                mood: MoodTag::Beta,
            })
            .unwrap();

        assert!(stored.timestamp >= before);
        assert!(stored.timestamp <= unix_timestamp());
        assert_eq!(store.all_ratings().unwrap(), vec![stored]);
    }

    #[test]
    fn test_duplicate_ratings_both_persist() {
        let store = MemoryStore::new(DataIndex::from_parts(vec![movie(1)], vec![]));
        let submission = NewRating {
            user_id: 4,
            movie_id: 1,
            rating: 3.5,
            mood: MoodTag::Beta,
        };
        store.add_rating(submission).unwrap();
        store.add_rating(submission).unwrap();

        assert_eq!(store.all_ratings().unwrap().len(), 2);
    }

    #[test]
    fn test_add_rating_for_unknown_movie() {
        let store = MemoryStore::new(DataIndex::new());
        let result = store.add_rating(NewRating {
            user_id: 1,
            movie_id: 99,
            rating: 4.0,
            mood: MoodTag::Alpha,
        });
        assert!(matches!(result, Err(DataLoadError::MissingReference { id: 99, .. })));
    }

    #[test]
    fn test_upsert_keeps_catalog_order() {
        let store = MemoryStore::new(DataIndex::from_parts(vec![movie(1), movie(2)], vec![]));
        let mut renamed = movie(1);
        renamed.title = "Renamed".to_string();
        store.upsert_movies(vec![renamed, movie(3)]).unwrap();

        let movies = store.all_movies().unwrap();
        let ids: Vec<MovieId> = movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(movies[0].title, "Renamed");
    }

    #[test]
    fn test_ratings_log_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        parser::write_movies(&dir.join("movies.json"), &[movie(1)]).unwrap();

        let store = MemoryStore::open(dir).unwrap();
        store
            .add_rating(NewRating {
                user_id: 2,
                movie_id: 1,
                rating: 4.5,
                mood: MoodTag::Delta,
            })
            .unwrap();

        let reopened = MemoryStore::open(dir).unwrap();
        let ratings = reopened.all_ratings().unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].mood, MoodTag::Delta);
    }

    #[test]
    fn test_upsert_rewrites_catalog_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        parser::write_movies(&dir.join("movies.json"), &[movie(1)]).unwrap();

        let store = MemoryStore::open(dir).unwrap();
        store.upsert_movies(vec![movie(2)]).unwrap();

        let reopened = MemoryStore::open(dir).unwrap();
        let ids: Vec<MovieId> = reopened.all_movies().unwrap().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
