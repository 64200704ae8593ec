//! Service configuration.

use data_loader::MoodTag;
use sources::CollaborativeConfig;
use std::path::PathBuf;

/// Settings for a `RecommendationOrchestrator`
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding `movies.json` and `ratings.dat`
    pub data_dir: PathBuf,
    pub collaborative: CollaborativeConfig,
    /// Users generated when the store starts without ratings
    pub synthetic_users: u32,
    pub ratings_per_user: usize,
    /// List size when the caller doesn't pick one
    pub default_limit: usize,
    /// Mood recorded for ratings submitted without one
    pub default_mood: MoodTag,
    /// Seed for synthetic data and brain simulation; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            collaborative: CollaborativeConfig::default(),
            synthetic_users: 50,
            ratings_per_user: 15,
            default_limit: 10,
            default_mood: MoodTag::Alpha,
            seed: None,
        }
    }
}

impl ServiceConfig {
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_collaborative(mut self, collaborative: CollaborativeConfig) -> Self {
        self.collaborative = collaborative;
        self
    }

    /// Configure synthetic bootstrapping (default: 50 users x 15 ratings)
    pub fn with_synthetic_ratings(mut self, users: u32, ratings_per_user: usize) -> Self {
        self.synthetic_users = users;
        self.ratings_per_user = ratings_per_user;
        self
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn with_default_mood(mut self, mood: MoodTag) -> Self {
        self.default_mood = mood;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.synthetic_users, 50);
        assert_eq!(config.ratings_per_user, 15);
        assert_eq!(config.default_limit, 10);
        assert_eq!(config.default_mood, MoodTag::Alpha);
        assert_eq!(config.collaborative, CollaborativeConfig::default());
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_builders() {
        let config = ServiceConfig::default()
            .with_data_dir("/tmp/recs")
            .with_synthetic_ratings(5, 3)
            .with_default_limit(4)
            .with_default_mood(MoodTag::Theta)
            .with_seed(9);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/recs"));
        assert_eq!((config.synthetic_users, config.ratings_per_user), (5, 3));
        assert_eq!(config.default_limit, 4);
        assert_eq!(config.default_mood, MoodTag::Theta);
        assert_eq!(config.seed, Some(9));
    }
}
