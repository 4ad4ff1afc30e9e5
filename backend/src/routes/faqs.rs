//! FAQ routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::FaqService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use coaching_platform_shared::types::{
    CreateFaqRequest, DataResponse, FaqListQuery, FaqResponse, UpdateFaqRequest,
};
use uuid::Uuid;

pub fn faq_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_faqs).post(create_faq))
        .route("/:id", get(get_faq).patch(update_faq).delete(delete_faq))
}

async fn list_faqs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<FaqListQuery>,
) -> ApiResult<Json<DataResponse<Vec<FaqResponse>>>> {
    let faqs = FaqService::list(state.db(), &auth, &query).await?;
    Ok(Json(DataResponse::new(faqs)))
}

async fn get_faq(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DataResponse<FaqResponse>>> {
    let faq = FaqService::get(state.db(), &auth, id).await?;
    Ok(Json(DataResponse::new(faq)))
}

async fn create_faq(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateFaqRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<FaqResponse>>)> {
    let faq = FaqService::create(state.db(), &auth, req).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(faq))))
}

async fn update_faq(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateFaqRequest>,
) -> ApiResult<Json<DataResponse<FaqResponse>>> {
    let faq = FaqService::update(state.db(), &auth, id, req).await?;
    Ok(Json(DataResponse::new(faq)))
}

async fn delete_faq(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    FaqService::delete(state.db(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
