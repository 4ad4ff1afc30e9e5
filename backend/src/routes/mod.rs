//! Route definitions for the Coaching Platform API
//!
//! Every resource router is nested under `/api/v1`; health checks stay at the
//! root so orchestrators can reach them without the API prefix.

use crate::state::AppState;
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod articles;
mod auth;
mod categories;
mod clients;
mod dashboard;
mod faqs;
mod foods;
mod health;
mod learning_paths;
mod nutrition_plans;
mod recipes;
mod shopping_lists;
mod workouts;

#[cfg(test)]
mod router_tests;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .nest("/api/v1", api_routes())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "Coaching Platform API v1" }))
        .nest("/auth", auth::auth_routes())
        .nest("/clients", clients::client_routes())
        .nest("/categories", categories::category_routes())
        .nest("/articles", articles::article_routes())
        .nest("/learning-paths", learning_paths::learning_path_routes())
        .nest("/foods", foods::food_routes())
        .nest("/recipes", recipes::recipe_routes())
        .nest("/nutrition-plans", nutrition_plans::nutrition_plan_routes())
        .nest("/workouts", workouts::workout_routes())
        .nest("/faqs", faqs::faq_routes())
        .nest("/shopping-lists", shopping_lists::shopping_list_routes())
        .nest("/dashboard", dashboard::dashboard_routes())
}
