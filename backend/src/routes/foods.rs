//! Food catalog routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::FoodService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use coaching_platform_shared::types::{
    CreateFoodItemRequest, DataResponse, FoodItemResponse, FoodSearchQuery, UpdateFoodItemRequest,
};
use uuid::Uuid;

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search_foods).post(create_food))
        .route("/:id", get(get_food).patch(update_food).delete(delete_food))
}

/// GET /api/v1/foods?q= - search the catalog
async fn search_foods(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<FoodSearchQuery>,
) -> ApiResult<Json<DataResponse<Vec<FoodItemResponse>>>> {
    let items = FoodService::search(state.db(), &query).await?;
    Ok(Json(DataResponse::new(items)))
}

async fn get_food(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DataResponse<FoodItemResponse>>> {
    let item = FoodService::get(state.db(), id).await?;
    Ok(Json(DataResponse::new(item)))
}

async fn create_food(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateFoodItemRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<FoodItemResponse>>)> {
    let item = FoodService::create(state.db(), &auth, req).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(item))))
}

async fn update_food(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateFoodItemRequest>,
) -> ApiResult<Json<DataResponse<FoodItemResponse>>> {
    let item = FoodService::update(state.db(), &auth, id, req).await?;
    Ok(Json(DataResponse::new(item)))
}

async fn delete_food(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    FoodService::delete(state.db(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
