//! Article category routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::CategoryService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use coaching_platform_shared::types::{
    CategoryResponse, CreateCategoryRequest, DataResponse, UpdateCategoryRequest,
};
use uuid::Uuid;

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:id", patch(update_category).delete(delete_category))
}

async fn list_categories(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<DataResponse<Vec<CategoryResponse>>>> {
    let categories = CategoryService::list(state.db()).await?;
    Ok(Json(DataResponse::new(categories)))
}

async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<CategoryResponse>>)> {
    let category = CategoryService::create(state.db(), &auth, req).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(category))))
}

async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCategoryRequest>,
) -> ApiResult<Json<DataResponse<CategoryResponse>>> {
    let category = CategoryService::update(state.db(), &auth, id, req).await?;
    Ok(Json(DataResponse::new(category)))
}

async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    CategoryService::delete(state.db(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
