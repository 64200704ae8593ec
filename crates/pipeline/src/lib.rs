//! Ranking stages that combine candidate sources into final lists.
//!
//! This crate provides:
//! - `HybridRecommender` blending content and collaborative candidates
//! - `MoodRecommender` ranking movies by high ratings in a mood, with a
//!   collaborative fallback
//! - `BrainActivity` and `classify` mapping regional activity to a mood tag
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{HybridRecommender, MoodRecommender, classify, BrainActivity};
//!
//! let hybrid = HybridRecommender::new(&index, &content, &model);
//! let recs = hybrid.recommend(user_id, Some(movie_id), 10)?;
//!
//! let mood = classify(&BrainActivity::simulate(&mut rand::rng()));
//! let recs = MoodRecommender::new().recommend(&index, &model, user_id, Some(mood), 10);
//! ```

pub mod brain;
pub mod hybrid;
pub mod mood;

pub use brain::{BrainActivity, BrainRegion, UnknownRegion, classify, dominant_region, mood_for_region};
pub use hybrid::{HybridRecommender, blend};
pub use mood::{MOOD_RATING_THRESHOLD, MoodRecommender};
