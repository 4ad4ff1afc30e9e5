//! Learning path routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::LearningPathService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use coaching_platform_shared::types::{
    CreateLearningPathRequest, DataResponse, LearningPathDetailResponse, LearningPathListQuery,
    LearningPathResponse, SetPathArticlesRequest, UpdateLearningPathRequest,
};
use uuid::Uuid;

pub fn learning_path_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_paths).post(create_path))
        .route("/:id", get(get_path).patch(update_path).delete(delete_path))
        .route("/:id/articles", put(set_path_articles))
}

async fn list_paths(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LearningPathListQuery>,
) -> ApiResult<Json<DataResponse<Vec<LearningPathResponse>>>> {
    let paths = LearningPathService::list(state.db(), &auth, &query).await?;
    Ok(Json(DataResponse::new(paths)))
}

/// GET /api/v1/learning-paths/:id - articles with per-article completion and locks
async fn get_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DataResponse<LearningPathDetailResponse>>> {
    let path = LearningPathService::get(state.db(), &auth, id).await?;
    Ok(Json(DataResponse::new(path)))
}

async fn create_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateLearningPathRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<LearningPathDetailResponse>>)> {
    let path = LearningPathService::create(state.db(), &auth, req).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(path))))
}

async fn update_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLearningPathRequest>,
) -> ApiResult<Json<DataResponse<LearningPathDetailResponse>>> {
    let path = LearningPathService::update(state.db(), &auth, id, req).await?;
    Ok(Json(DataResponse::new(path)))
}

/// PUT /api/v1/learning-paths/:id/articles - replace the ordered article list
async fn set_path_articles(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SetPathArticlesRequest>,
) -> ApiResult<Json<DataResponse<LearningPathDetailResponse>>> {
    let path = LearningPathService::set_articles(state.db(), &auth, id, req.article_ids).await?;
    Ok(Json(DataResponse::new(path)))
}

async fn delete_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    LearningPathService::delete(state.db(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
