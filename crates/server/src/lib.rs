//! Server crate for the brainwave recommendation service.
//!
//! This crate contains the orchestrator that owns the trained models and
//! answers every request the API layer makes.

pub mod config;
pub mod error;
pub mod orchestrator;

pub use config::ServiceConfig;
pub use error::{Result, ServiceError};
pub use orchestrator::{
    BrainAnalysis, InitReport, ModelReport, MoodRecommendations, MovieRecommendation,
    RecommendationOrchestrator, UserProfile,
};
