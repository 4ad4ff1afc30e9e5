//! Workout program routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::WorkoutService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use coaching_platform_shared::types::{
    AssignmentListQuery, CreateWorkoutProgramRequest, DataResponse, SetExercisesRequest,
    UpdateWorkoutProgramRequest, WorkoutProgramDetailResponse, WorkoutProgramResponse,
};
use uuid::Uuid;

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_programs).post(create_program))
        .route(
            "/:id",
            get(get_program).patch(update_program).delete(delete_program),
        )
        .route("/:id/exercises", put(set_exercises))
}

async fn list_programs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AssignmentListQuery>,
) -> ApiResult<Json<DataResponse<Vec<WorkoutProgramResponse>>>> {
    let programs = WorkoutService::list(state.db(), &auth, &query).await?;
    Ok(Json(DataResponse::new(programs)))
}

async fn get_program(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DataResponse<WorkoutProgramDetailResponse>>> {
    let program = WorkoutService::get(state.db(), &auth, id).await?;
    Ok(Json(DataResponse::new(program)))
}

async fn create_program(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateWorkoutProgramRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<WorkoutProgramDetailResponse>>)> {
    let program = WorkoutService::create(state.db(), &auth, req).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(program))))
}

async fn update_program(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateWorkoutProgramRequest>,
) -> ApiResult<Json<DataResponse<WorkoutProgramDetailResponse>>> {
    let program = WorkoutService::update(state.db(), &auth, id, req).await?;
    Ok(Json(DataResponse::new(program)))
}

async fn set_exercises(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SetExercisesRequest>,
) -> ApiResult<Json<DataResponse<WorkoutProgramDetailResponse>>> {
    let program = WorkoutService::set_exercises(state.db(), &auth, id, req.exercises).await?;
    Ok(Json(DataResponse::new(program)))
}

async fn delete_program(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    WorkoutService::delete(state.db(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
