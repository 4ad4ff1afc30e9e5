//! Nutrition plan routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::NutritionPlanService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use coaching_platform_shared::types::{
    AssignmentListQuery, CreateNutritionPlanRequest, DataResponse, NutritionPlanDetailResponse,
    NutritionPlanResponse, NutritionPlanSummaryResponse, SetPlanMealsRequest,
    UpdateNutritionPlanRequest,
};
use uuid::Uuid;

pub fn nutrition_plan_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route("/:id", get(get_plan).patch(update_plan).delete(delete_plan))
        .route("/:id/meals", put(set_meals))
        .route("/:id/summary", get(plan_summary))
}

/// GET /api/v1/nutrition-plans - own plans for coaches, assigned plans for clients
async fn list_plans(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AssignmentListQuery>,
) -> ApiResult<Json<DataResponse<Vec<NutritionPlanResponse>>>> {
    let plans = NutritionPlanService::list(state.db(), &auth, &query).await?;
    Ok(Json(DataResponse::new(plans)))
}

async fn get_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DataResponse<NutritionPlanDetailResponse>>> {
    let plan = NutritionPlanService::get(state.db(), &auth, id).await?;
    Ok(Json(DataResponse::new(plan)))
}

async fn create_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateNutritionPlanRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<NutritionPlanDetailResponse>>)> {
    let plan = NutritionPlanService::create(state.db(), &auth, req).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(plan))))
}

async fn update_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNutritionPlanRequest>,
) -> ApiResult<Json<DataResponse<NutritionPlanDetailResponse>>> {
    let plan = NutritionPlanService::update(state.db(), &auth, id, req).await?;
    Ok(Json(DataResponse::new(plan)))
}

/// PUT /api/v1/nutrition-plans/:id/meals - replace the meal schedule
async fn set_meals(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SetPlanMealsRequest>,
) -> ApiResult<Json<DataResponse<NutritionPlanDetailResponse>>> {
    let plan = NutritionPlanService::set_meals(state.db(), &auth, id, req.meals).await?;
    Ok(Json(DataResponse::new(plan)))
}

/// GET /api/v1/nutrition-plans/:id/summary - daily totals against targets
async fn plan_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DataResponse<NutritionPlanSummaryResponse>>> {
    let summary = NutritionPlanService::summary(state.db(), &auth, id).await?;
    Ok(Json(DataResponse::new(summary)))
}

async fn delete_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    NutritionPlanService::delete(state.db(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
