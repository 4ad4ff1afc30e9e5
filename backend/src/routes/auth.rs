//! Authentication routes: registration, login, token refresh

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use coaching_platform_shared::types::{
    AuthTokens, DataResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, UserProfile,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/me", get(get_profile))
}

/// POST /api/v1/auth/register
///
/// Coach accounts need the configured invite code. Password hashing is
/// offloaded to the blocking thread pool.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<AuthTokens>>)> {
    let invite_code = state.auth().coach_invite_code.as_deref();
    let tokens = UserService::register(state.db(), state.jwt(), invite_code, req).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(tokens))))
}

/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<DataResponse<AuthTokens>>> {
    let tokens = UserService::login(state.db(), state.jwt(), &req.email, &req.password).await?;
    Ok(Json(DataResponse::new(tokens)))
}

/// POST /api/v1/auth/refresh
async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> ApiResult<Json<DataResponse<AuthTokens>>> {
    let tokens = UserService::refresh_token(state.db(), state.jwt(), &req.refresh_token).await?;
    Ok(Json(DataResponse::new(tokens)))
}

/// GET /api/v1/auth/me
async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<DataResponse<UserProfile>>> {
    let profile = UserService::get_profile(state.db(), auth.user_id).await?;
    Ok(Json(DataResponse::new(profile)))
}
