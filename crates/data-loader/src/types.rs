//! Core domain types for the movie catalog and the rating log.
//!
//! This module defines the fundamental data structures used throughout the system:
//! - Type aliases for domain clarity (UserId, MovieId)
//! - `Movie` as ingested from TMDB "popular" listings
//! - `Rating` rows, each tagged with the brain-wave mood it was given in
//! - `DataIndex`, the in-memory snapshot every recommender reads from

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user (users exist only through their ratings)
pub type UserId = u32;

/// Unique identifier for a movie (TMDB id)
pub type MovieId = u32;

/// Lowest rating a user can give
pub const MIN_RATING: f32 = 0.5;

/// Highest rating a user can give
pub const MAX_RATING: f32 = 5.0;

/// Returns true when `value` lies on the 0.5..=5.0 half-point scale
pub fn is_valid_rating(value: f32) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&value) && (value * 2.0).fract() == 0.0
}

// =============================================================================
// Movie-related Types
// =============================================================================

/// Represents a movie in the catalog
///
/// Field names follow the TMDB payload so catalog files deserialize directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: Option<String>,
    /// Average vote, typically 0-10
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: u32,
    /// TMDB genre ids; order carries no meaning
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub popularity: f32,
}

impl Movie {
    /// Known genres of this movie, skipping ids TMDB added after this table
    pub fn genres(&self) -> impl Iterator<Item = Genre> + '_ {
        self.genre_ids.iter().filter_map(|&id| Genre::from_tmdb_id(id))
    }

    /// Genre labels followed by the overview, the document the content index sees
    pub fn content_text(&self) -> String {
        let mut text = self
            .genres()
            .map(|g| g.label())
            .collect::<Vec<_>>()
            .join(" ");
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&self.overview);
        text
    }
}

/// TMDB movie genres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Family,
    Fantasy,
    History,
    Horror,
    Music,
    Mystery,
    Romance,
    ScienceFiction,
    TvMovie,
    Thriller,
    War,
    Western,
}

impl Genre {
    /// Map a TMDB genre id to a Genre
    pub fn from_tmdb_id(id: u32) -> Option<Genre> {
        let genre = match id {
            28 => Genre::Action,
            12 => Genre::Adventure,
            16 => Genre::Animation,
            35 => Genre::Comedy,
            80 => Genre::Crime,
            99 => Genre::Documentary,
            18 => Genre::Drama,
            10751 => Genre::Family,
            14 => Genre::Fantasy,
            36 => Genre::History,
            27 => Genre::Horror,
            10402 => Genre::Music,
            9648 => Genre::Mystery,
            10749 => Genre::Romance,
            878 => Genre::ScienceFiction,
            10770 => Genre::TvMovie,
            53 => Genre::Thriller,
            10752 => Genre::War,
            37 => Genre::Western,
            _ => return None,
        };
        Some(genre)
    }

    /// Human readable label, as used in the content-similarity documents
    pub fn label(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Family => "Family",
            Genre::Fantasy => "Fantasy",
            Genre::History => "History",
            Genre::Horror => "Horror",
            Genre::Music => "Music",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::ScienceFiction => "Science Fiction",
            Genre::TvMovie => "TV Movie",
            Genre::Thriller => "Thriller",
            Genre::War => "War",
            Genre::Western => "Western",
        }
    }
}

// =============================================================================
// Mood Tags
// =============================================================================

/// Brain-wave mood attached to every rating
///
/// A closed set of five values. Parsing anything else is an error; callers
/// that should tolerate unknown tags (mood queries) keep the raw string and
/// treat a failed parse as "no matches".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodTag {
    Alpha,
    Beta,
    Gamma,
    Delta,
    Theta,
}

impl MoodTag {
    pub const ALL: [MoodTag; 5] = [
        MoodTag::Alpha,
        MoodTag::Beta,
        MoodTag::Gamma,
        MoodTag::Delta,
        MoodTag::Theta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodTag::Alpha => "alpha",
            MoodTag::Beta => "beta",
            MoodTag::Gamma => "gamma",
            MoodTag::Delta => "delta",
            MoodTag::Theta => "theta",
        }
    }

    /// What the mood says about the viewer
    pub fn description(&self) -> &'static str {
        match self {
            MoodTag::Alpha => "You need a thought-provoking movie",
            MoodTag::Beta => "You want visually stunning cinema",
            MoodTag::Gamma => "You want emotional experience",
            MoodTag::Delta => "Music and sound matter to you",
            MoodTag::Theta => "You want something relaxing",
        }
    }
}

impl fmt::Display for MoodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodTag {
    type Err = DataLoadError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "alpha" => Ok(MoodTag::Alpha),
            "beta" => Ok(MoodTag::Beta),
            "gamma" => Ok(MoodTag::Gamma),
            "delta" => Ok(MoodTag::Delta),
            "theta" => Ok(MoodTag::Theta),
            _ => Err(DataLoadError::InvalidValue {
                field: "mood".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Rating Types
// =============================================================================

/// A single rating from a user for a movie
///
/// Ratings are append-only: rating the same movie twice keeps both rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value from 0.5 to 5.0 in half-point steps
    pub rating: f32,
    /// Unix timestamp when rating was made
    pub timestamp: i64,
    pub mood: MoodTag,
}

/// A rating submission, before the store assigns its timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewRating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: f32,
    pub mood: MoodTag,
}

impl NewRating {
    pub fn at(self, timestamp: i64) -> Rating {
        Rating {
            user_id: self.user_id,
            movie_id: self.movie_id,
            rating: self.rating,
            timestamp,
            mood: self.mood,
        }
    }
}

// =============================================================================
// DataIndex - The In-Memory Snapshot
// =============================================================================

/// A full snapshot of the catalog and the rating log.
///
/// Movies keep their catalog order (the order they were first inserted);
/// ranking code relies on it to break ties deterministically. Ratings are
/// additionally indexed per user for O(1) lookups.
#[derive(Debug, Clone, Default)]
pub struct DataIndex {
    pub(crate) movies: Vec<Movie>,
    pub(crate) movie_positions: HashMap<MovieId, usize>,

    /// Every rating in insertion order
    pub(crate) ratings: Vec<Rating>,
    pub(crate) user_ratings: HashMap<UserId, Vec<Rating>>,
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from the store's two read operations
    pub fn from_parts(movies: Vec<Movie>, ratings: Vec<Rating>) -> Self {
        let mut index = Self::new();
        for movie in movies {
            index.insert_movie(movie);
        }
        for rating in ratings {
            index.insert_rating(rating);
        }
        index
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movie_positions.get(&id).map(|&pos| &self.movies[pos])
    }

    /// Position of a movie in catalog order
    pub fn movie_position(&self, id: MovieId) -> Option<usize> {
        self.movie_positions.get(&id).copied()
    }

    /// All movies in catalog order
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// All ratings in insertion order
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// Get all ratings made by a user
    ///
    /// Returns an empty slice if user has no ratings
    pub fn get_user_ratings(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Insert a movie, replacing an existing one with the same id in place
    pub fn insert_movie(&mut self, movie: Movie) {
        match self.movie_positions.get(&movie.id) {
            Some(&pos) => self.movies[pos] = movie,
            None => {
                self.movie_positions.insert(movie.id, self.movies.len());
                self.movies.push(movie);
            }
        }
    }

    /// Insert a rating and update indices
    pub fn insert_rating(&mut self, rating: Rating) {
        self.ratings.push(rating);

        self.user_ratings
            .entry(rating.user_id)
            .or_default()
            .push(rating);
    }

    /// Get counts for debugging/validation: (movies, users, ratings)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.movies.len(), self.user_ratings.len(), self.ratings.len())
    }
}
