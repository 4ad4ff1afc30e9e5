//! Shopping list routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::ShoppingListService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use coaching_platform_shared::types::{
    CreateShoppingListRequest, DataResponse, GenerateShoppingListRequest, ShoppingItemRequest,
    ShoppingItemResponse, ShoppingListDetailResponse, ShoppingListQuery, ShoppingListResponse,
    UpdateShoppingItemRequest, UpdateShoppingListRequest,
};
use uuid::Uuid;

pub fn shopping_list_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_lists).post(create_list))
        .route("/from-plan/:plan_id", post(generate_from_plan))
        .route("/:id", get(get_list).patch(rename_list).delete(delete_list))
        .route("/:id/items", post(add_item))
        .route("/:id/items/:item_id", patch(update_item).delete(delete_item))
        .route("/:id/export", get(export_list))
}

async fn list_lists(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ShoppingListQuery>,
) -> ApiResult<Json<DataResponse<Vec<ShoppingListResponse>>>> {
    let lists = ShoppingListService::list(state.db(), &auth, &query).await?;
    Ok(Json(DataResponse::new(lists)))
}

async fn create_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateShoppingListRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<ShoppingListDetailResponse>>)> {
    let list = ShoppingListService::create(state.db(), &auth, req).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(list))))
}

/// POST /api/v1/shopping-lists/from-plan/:plan_id
///
/// The body is optional; without one the list is named after the plan.
async fn generate_from_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(plan_id): Path<Uuid>,
    req: Option<Json<GenerateShoppingListRequest>>,
) -> ApiResult<(StatusCode, Json<DataResponse<ShoppingListDetailResponse>>)> {
    let req = req.map(|Json(r)| r).unwrap_or_default();
    let list = ShoppingListService::generate_from_plan(state.db(), &auth, plan_id, req).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(list))))
}

async fn get_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DataResponse<ShoppingListDetailResponse>>> {
    let list = ShoppingListService::get(state.db(), &auth, id).await?;
    Ok(Json(DataResponse::new(list)))
}

async fn rename_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateShoppingListRequest>,
) -> ApiResult<Json<DataResponse<ShoppingListDetailResponse>>> {
    let list = ShoppingListService::rename(state.db(), &auth, id, req).await?;
    Ok(Json(DataResponse::new(list)))
}

async fn delete_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ShoppingListService::delete(state.db(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ShoppingItemRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<ShoppingItemResponse>>)> {
    let item = ShoppingListService::add_item(state.db(), &auth, id, req).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(item))))
}

async fn update_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateShoppingItemRequest>,
) -> ApiResult<Json<DataResponse<ShoppingItemResponse>>> {
    let item = ShoppingListService::update_item(state.db(), &auth, id, item_id, req).await?;
    Ok(Json(DataResponse::new(item)))
}

async fn delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    ShoppingListService::delete_item(state.db(), &auth, id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/shopping-lists/:id/export - CSV download
async fn export_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let csv = ShoppingListService::export_csv(state.db(), &auth, id).await?;
    let disposition = format!("attachment; filename=\"shopping-list-{}.csv\"", id);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
