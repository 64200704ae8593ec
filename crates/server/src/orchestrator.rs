//! # Recommendation Orchestrator
//!
//! The service the request layer talks to. Every call:
//! 1. Loads a full snapshot from the rating store
//! 2. Gets the current collaborative model (training it on first use)
//! 3. Gets the content index (rebuilding it if the catalog changed)
//! 4. Runs the ranking on a blocking worker
//! 5. Resolves ranked ids to movie records
//!
//! ## Model ownership
//! Both models sit behind an async `RwLock<Option<Arc<_>>>`. A retrain or
//! rebuild happens outside the lock and only the finished model is swapped
//! in, so a reader holds either the previous complete model or the new one.
//! Two concurrent requests may both rebuild; the last one to finish wins.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::spawn_blocking;
use tracing::{debug, info, instrument, warn};

use data_loader::synthetic::generate_ratings;
use data_loader::{
    DataIndex, MAX_RATING, MIN_RATING, MoodTag, Movie, MovieId, NewRating, Rating, RatingStore,
    UserId, is_valid_rating, unix_timestamp,
};
use pipeline::{BrainActivity, BrainRegion, HybridRecommender, MoodRecommender, dominant_region};
use sources::user_context::build_user_context;
use sources::{Candidate, CollaborativeModel, ContentIndex, catalog_fingerprint};

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};

/// A ranked movie as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecommendation {
    #[serde(rename = "id")]
    pub movie_id: MovieId,
    pub title: String,
    /// Catalog average vote
    pub rating: f32,
}

impl MovieRecommendation {
    fn from_movie(movie: &Movie) -> Self {
        Self {
            movie_id: movie.id,
            title: movie.title.clone(),
            rating: movie.vote_average,
        }
    }
}

/// Mood recommendations plus the tag that was asked for
#[derive(Debug, Clone, Serialize)]
pub struct MoodRecommendations {
    pub recommendations: Vec<MovieRecommendation>,
    pub wave: String,
}

/// Simulated reaction of a user to a movie
#[derive(Debug, Clone, Serialize)]
pub struct BrainAnalysis {
    pub movie_id: MovieId,
    pub user_id: UserId,
    pub activity: BrainActivity,
    pub dominant_region: BrainRegion,
    pub mood: MoodTag,
    pub description: String,
}

/// Rating history summary for one user
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub rating_count: usize,
    pub average_rating: f32,
    /// Movies rated 4.0 or higher, in rating order
    pub top_rated: Vec<MovieRecommendation>,
    /// Ratings per mood tag, every tag listed
    pub moods: Vec<(MoodTag, usize)>,
}

/// Outcome of `initialize`
#[derive(Debug, Clone, Serialize)]
pub struct InitReport {
    pub movies: usize,
    pub users: usize,
    pub ratings: usize,
    /// Ratings generated because the store was empty
    pub synthetic_ratings: usize,
    pub holdout_rmse: Option<f32>,
}

/// State of the current collaborative model
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub training_ratings: usize,
    pub holdout_ratings: usize,
    pub holdout_rmse: Option<f32>,
    pub global_mean: f32,
}

/// Coordinates the store, the models and the ranking stages
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    store: Arc<dyn RatingStore>,
    config: Arc<ServiceConfig>,
    model: Arc<RwLock<Option<Arc<CollaborativeModel>>>>,
    content: Arc<RwLock<Option<Arc<ContentIndex>>>>,
    rng: Arc<Mutex<StdRng>>,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator over `store`; no model is trained yet
    pub fn new(store: Arc<dyn RatingStore>, config: ServiceConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            store,
            config: Arc::new(config),
            model: Arc::new(RwLock::new(None)),
            content: Arc::new(RwLock::new(None)),
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Seed ratings if the store has none, then train and index everything
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<InitReport> {
        let start_time = Instant::now();
        let mut snapshot = self.snapshot().await?;

        let mut synthetic_ratings = 0;
        if snapshot.ratings().is_empty() && !snapshot.movies().is_empty() {
            let ratings = {
                let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
                generate_ratings(
                    snapshot.movies(),
                    self.config.synthetic_users,
                    self.config.ratings_per_user,
                    unix_timestamp(),
                    &mut *rng,
                )
            };
            let store = self.store.clone();
            synthetic_ratings = spawn_blocking(move || store.add_ratings(ratings)).await??;
            info!("Store had no ratings, generated {}", synthetic_ratings);
            snapshot = self.snapshot().await?;
        }

        let model = self.train_and_swap(snapshot.clone()).await?;
        self.content_index(&snapshot).await?;

        let (movies, users, ratings) = snapshot.counts();
        info!(
            "Initialized with {} movies, {} users, {} ratings in {:.2?}",
            movies,
            users,
            ratings,
            start_time.elapsed()
        );
        Ok(InitReport {
            movies,
            users,
            ratings,
            synthetic_ratings,
            holdout_rmse: model.holdout_rmse(),
        })
    }

    /// Train a fresh collaborative model and replace the current one
    #[instrument(skip(self))]
    pub async fn retrain(&self) -> Result<ModelReport> {
        let snapshot = self.snapshot().await?;
        let model = self.train_and_swap(snapshot).await?;
        Ok(model_report(&model))
    }

    /// Report on the current model without training one
    pub async fn model_report(&self) -> Result<ModelReport> {
        let guard = self.model.read().await;
        let model = guard
            .as_ref()
            .ok_or_else(|| ServiceError::ModelNotReady("no model has been trained".to_string()))?;
        Ok(model_report(model))
    }

    /// Hybrid recommendations for a user, optionally seeded by a movie
    #[instrument(skip(self))]
    pub async fn get_recommendations(
        &self,
        user_id: UserId,
        movie_id: Option<MovieId>,
        limit: usize,
    ) -> Result<Vec<MovieRecommendation>> {
        let start_time = Instant::now();
        let snapshot = self.snapshot().await?;
        let model = self.model(&snapshot).await?;
        let content = match movie_id {
            Some(_) => Some(self.content_index(&snapshot).await?),
            None => None,
        };

        let index = snapshot.clone();
        let candidates = spawn_blocking(move || match content {
            Some(content) => {
                HybridRecommender::new(&index, &content, &model).recommend(user_id, movie_id, limit)
            }
            None => Ok(model.top_unrated(&index, user_id, limit)),
        })
        .await??;

        let recommendations = resolve(&snapshot, &candidates);
        info!(
            "Selected {} recommendations for user {} in {:.2?}",
            recommendations.len(),
            user_id,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Recommendations for a brain-wave mood
    ///
    /// An unrecognized `wave` is not an error: it matches nothing and the
    /// collaborative ranking is returned. The tag is echoed back as given.
    #[instrument(skip(self))]
    pub async fn get_mood_recommendations(
        &self,
        user_id: UserId,
        wave: &str,
        limit: usize,
    ) -> Result<MoodRecommendations> {
        let mood = wave.parse::<MoodTag>().ok();
        if mood.is_none() {
            warn!("Unrecognized mood tag {:?}, using collaborative ranking", wave);
        }

        let snapshot = self.snapshot().await?;
        let model = self.model(&snapshot).await?;

        let index = snapshot.clone();
        let candidates = spawn_blocking(move || {
            MoodRecommender::new().recommend(&index, &model, user_id, mood, limit)
        })
        .await?;

        Ok(MoodRecommendations {
            recommendations: resolve(&snapshot, &candidates),
            wave: wave.to_string(),
        })
    }

    /// Movies most similar in content to `movie_id`
    #[instrument(skip(self))]
    pub async fn similar_movies(
        &self,
        movie_id: MovieId,
        limit: usize,
    ) -> Result<Vec<MovieRecommendation>> {
        let snapshot = self.snapshot().await?;
        let content = self.content_index(&snapshot).await?;
        let candidates = content.similar(movie_id, limit)?;
        Ok(resolve(&snapshot, &candidates))
    }

    /// Most popular movies, ties in catalog order
    pub async fn popular_movies(&self, limit: usize) -> Result<Vec<MovieRecommendation>> {
        let snapshot = self.snapshot().await?;
        let mut movies: Vec<&Movie> = snapshot.movies().iter().collect();
        // Stable sort keeps catalog order among equal popularity
        movies.sort_by(|a, b| {
            b.popularity
                .partial_cmp(&a.popularity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(movies
            .into_iter()
            .take(limit)
            .map(MovieRecommendation::from_movie)
            .collect())
    }

    /// Simulate brain activity for a user watching a movie and classify it
    #[instrument(skip(self))]
    pub async fn analyze_brain(&self, movie_id: MovieId, user_id: UserId) -> Result<BrainAnalysis> {
        self.movie_details(movie_id).await?;

        let activity = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            BrainActivity::simulate(&mut *rng)
        };
        let region = dominant_region(&activity);
        let mood = region.mood();
        debug!("Dominant region {} maps to {}", region, mood);

        Ok(BrainAnalysis {
            movie_id,
            user_id,
            activity,
            dominant_region: region,
            mood,
            description: mood.description().to_string(),
        })
    }

    /// Validate and store a rating; the store assigns the timestamp
    ///
    /// A missing mood records the configured default.
    #[instrument(skip(self))]
    pub async fn rate_movie(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        rating: f32,
        mood: Option<&str>,
    ) -> Result<Rating> {
        if !is_valid_rating(rating) {
            return Err(ServiceError::InvalidInput(format!(
                "rating must be between {} and {} in half steps, got {}",
                MIN_RATING, MAX_RATING, rating
            )));
        }
        let mood = match mood {
            Some(tag) => tag.parse::<MoodTag>()?,
            None => self.config.default_mood,
        };

        let store = self.store.clone();
        let stored = spawn_blocking(move || {
            store.add_rating(NewRating {
                user_id,
                movie_id,
                rating,
                mood,
            })
        })
        .await??;

        info!("User {} rated movie {} with {} ({})", user_id, movie_id, rating, mood);
        Ok(stored)
    }

    /// Catalog record for `movie_id`
    pub async fn movie_details(&self, movie_id: MovieId) -> Result<Movie> {
        let snapshot = self.snapshot().await?;
        snapshot
            .get_movie(movie_id)
            .cloned()
            .ok_or(ServiceError::NotFound(movie_id))
    }

    /// Rating summary for `user_id`; unknown users get an empty profile
    pub async fn user_profile(&self, user_id: UserId) -> Result<UserProfile> {
        let snapshot = self.snapshot().await?;
        let context = build_user_context(&snapshot, user_id);

        let top_rated = context
            .highly_rated_movies
            .iter()
            .filter_map(|id| snapshot.get_movie(*id))
            .map(MovieRecommendation::from_movie)
            .collect();

        let ratings = snapshot.get_user_ratings(user_id);
        let moods = MoodTag::ALL
            .into_iter()
            .map(|tag| (tag, ratings.iter().filter(|r| r.mood == tag).count()))
            .collect();

        Ok(UserProfile {
            user_id,
            rating_count: context.rating_count,
            average_rating: context.avg_rating,
            top_rated,
            moods,
        })
    }

    async fn snapshot(&self) -> Result<Arc<DataIndex>> {
        let store = self.store.clone();
        let index = spawn_blocking(move || store.snapshot()).await??;
        Ok(Arc::new(index))
    }

    /// Current model, training one from `snapshot` if there is none
    async fn model(&self, snapshot: &Arc<DataIndex>) -> Result<Arc<CollaborativeModel>> {
        if let Some(model) = self.model.read().await.as_ref() {
            return Ok(model.clone());
        }
        debug!("No collaborative model yet, training on demand");
        self.train_and_swap(snapshot.clone()).await
    }

    async fn train_and_swap(&self, snapshot: Arc<DataIndex>) -> Result<Arc<CollaborativeModel>> {
        let config = self.config.collaborative.clone();
        let model = spawn_blocking(move || CollaborativeModel::train(snapshot.ratings(), &config)).await?;
        let model = Arc::new(model);
        *self.model.write().await = Some(model.clone());
        Ok(model)
    }

    /// Content index matching the snapshot's catalog
    async fn content_index(&self, snapshot: &Arc<DataIndex>) -> Result<Arc<ContentIndex>> {
        let fingerprint = catalog_fingerprint(snapshot.movies());
        if let Some(index) = self.content.read().await.as_ref() {
            if index.fingerprint() == fingerprint {
                return Ok(index.clone());
            }
            debug!("Catalog changed, rebuilding content index");
        }

        let movies = snapshot.clone();
        let index = spawn_blocking(move || ContentIndex::build(movies.movies())).await?;
        let index = Arc::new(index);
        *self.content.write().await = Some(index.clone());
        Ok(index)
    }
}

fn model_report(model: &CollaborativeModel) -> ModelReport {
    let (training_ratings, holdout_ratings) = model.partition_sizes();
    ModelReport {
        training_ratings,
        holdout_ratings,
        holdout_rmse: model.holdout_rmse(),
        global_mean: model.global_mean(),
    }
}

/// Ranked candidates to records; ids missing from the catalog are skipped
fn resolve(index: &DataIndex, candidates: &[Candidate]) -> Vec<MovieRecommendation> {
    candidates
        .iter()
        .filter_map(|c| index.get_movie(c.movie_id))
        .map(MovieRecommendation::from_movie)
        .collect()
}
