//! Dashboard route

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::DashboardService;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use coaching_platform_shared::types::{DataResponse, DashboardResponse};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

/// GET /api/v1/dashboard - body depends on the caller's role
async fn get_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<DataResponse<DashboardResponse>>> {
    let dashboard = DashboardService::get(state.db(), &auth).await?;
    Ok(Json(DataResponse::new(dashboard)))
}
