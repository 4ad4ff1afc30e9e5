//! Coaching Platform Shared Library
//!
//! This crate contains shared types, models, and the pure scoring logic used
//! across the backend and WASM modules.

pub mod errors;
pub mod models;
pub mod prerequisites;
pub mod scoring;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::{MealType, ProgressStatus, Role};
pub use prerequisites::{evaluate_lock, is_locked, LockState};
pub use scoring::{
    rank_by_relevance, recommend_related, related_score, relevance_score, ArticleDocument,
    ArticleSnapshot, Scored,
};
