//! Simple test harness for the recommendation orchestrator.
//!
//! Loads the data directory (first argument, default `data`), initializes
//! the service and prints a few answers for user 1.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use data_loader::MemoryStore;
use server::{RecommendationOrchestrator, ServiceConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,sources=debug,pipeline=debug")),
        )
        .init();

    info!("Starting recommendation server test harness");

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| ServiceConfig::default().data_dir);
    let store = MemoryStore::open(&data_dir)
        .with_context(|| format!("Failed to load data from {}", data_dir.display()))?;

    let config = ServiceConfig::default().with_data_dir(data_dir.clone());
    let limit = config.default_limit;
    let orchestrator = RecommendationOrchestrator::new(Arc::new(store), config);

    let report = orchestrator.initialize().await.context("Initialization failed")?;
    info!(
        "Ready: {} movies, {} users, {} ratings (hold-out RMSE {:?})",
        report.movies, report.users, report.ratings, report.holdout_rmse
    );

    let user_id = 1;
    let recommendations = orchestrator.get_recommendations(user_id, None, limit).await?;
    info!("Received {} recommendations:", recommendations.len());
    for (i, rec) in recommendations.iter().enumerate() {
        info!("{}. {} [{}] - {:.1}", i + 1, rec.title, rec.movie_id, rec.rating);
    }

    if let Some(seed) = recommendations.first() {
        let analysis = orchestrator.analyze_brain(seed.movie_id, user_id).await?;
        info!(
            "Brain analysis for {}: {} -> {} ({})",
            seed.title, analysis.dominant_region, analysis.mood, analysis.description
        );

        let mood = orchestrator
            .get_mood_recommendations(user_id, analysis.mood.as_str(), limit)
            .await?;
        info!("{} picks for {} mood", mood.recommendations.len(), mood.wave);
        for rec in &mood.recommendations {
            info!("   {} [{}]", rec.title, rec.movie_id);
        }
    }

    Ok(())
}
