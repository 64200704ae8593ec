//! Loading and validating a DataIndex from the on-disk store.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::{info, warn};

impl DataIndex {
    /// Load the catalog and the rating log from a data directory
    ///
    /// Expects `movies.json`; `ratings.dat` is optional since a fresh
    /// install has no ratings until they are submitted or generated.
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading store from {:?}", data_dir);

        let movies_path = data_dir.join("movies.json");
        let ratings_path = data_dir.join("ratings.dat");

        // Parse both files in parallel
        let (movies, ratings) = rayon::join(
            || parser::parse_movies(&movies_path),
            || match parser::parse_ratings(&ratings_path) {
                Err(DataLoadError::FileNotFound { path }) => {
                    warn!("No ratings log at {}, starting empty", path);
                    Ok(Vec::new())
                }
                other => other,
            },
        );
        let movies = movies?;
        let ratings = ratings?;

        info!("Loaded {} movies, {} ratings", movies.len(), ratings.len());

        let index = DataIndex::from_parts(movies, ratings);
        index.validate()?;
        Ok(index)
    }

    /// Validate data integrity
    ///
    /// Every rating must reference a catalog movie and sit on the
    /// 0.5..=5.0 half-point scale.
    pub fn validate(&self) -> Result<()> {
        for rating in &self.ratings {
            if !self.movie_positions.contains_key(&rating.movie_id) {
                return Err(DataLoadError::MissingReference {
                    entity: "Movie".to_string(),
                    id: rating.movie_id,
                });
            }
            if !is_valid_rating(rating.rating) {
                return Err(DataLoadError::InvalidValue {
                    field: "rating".to_string(),
                    value: rating.rating.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: MovieId) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            overview: String::new(),
            release_date: None,
            vote_average: 7.0,
            vote_count: 10,
            genre_ids: vec![],
            poster_path: None,
            popularity: 1.0,
        }
    }

    fn rating(movie_id: MovieId, value: f32) -> Rating {
        Rating {
            user_id: 1,
            movie_id,
            rating: value,
            timestamp: 0,
            mood: MoodTag::Alpha,
        }
    }

    #[test]
    fn test_validate_accepts_half_points() {
        let index = DataIndex::from_parts(vec![movie(1)], vec![rating(1, 0.5), rating(1, 5.0)]);
        assert!(index.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_off_scale_rating() {
        let index = DataIndex::from_parts(vec![movie(1)], vec![rating(1, 4.25)]);
        assert!(matches!(
            index.validate(),
            Err(DataLoadError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_movie() {
        let index = DataIndex::from_parts(vec![movie(1)], vec![rating(2, 3.0)]);
        assert!(matches!(
            index.validate(),
            Err(DataLoadError::MissingReference { id: 2, .. })
        ));
    }

    #[test]
    fn test_load_dataset() {
        // Runs only when a local dataset is present
        let data_dir = Path::new("../../data");

        if data_dir.join("movies.json").exists() {
            let index = DataIndex::load_from_files(data_dir).unwrap();
            let (movies, _, _) = index.counts();
            assert!(movies > 0);
        }
    }
}
