//! Client management routes (coach only)

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::ClientService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use coaching_platform_shared::types::{
    ClientListQuery, ClientResponse, CreateClientRequest, DataResponse, UpdateClientRequest,
};
use uuid::Uuid;

pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/:id",
            get(get_client).patch(update_client).delete(archive_client),
        )
}

/// GET /api/v1/clients
async fn list_clients(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ClientListQuery>,
) -> ApiResult<Json<DataResponse<Vec<ClientResponse>>>> {
    let clients = ClientService::list(state.db(), &auth, &query).await?;
    Ok(Json(DataResponse::new(clients)))
}

/// POST /api/v1/clients
async fn create_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<ClientResponse>>)> {
    let client = ClientService::create(state.db(), &auth, req).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(client))))
}

/// GET /api/v1/clients/:id
async fn get_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DataResponse<ClientResponse>>> {
    let client = ClientService::get(state.db(), &auth, id).await?;
    Ok(Json(DataResponse::new(client)))
}

/// PATCH /api/v1/clients/:id
async fn update_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateClientRequest>,
) -> ApiResult<Json<DataResponse<ClientResponse>>> {
    let client = ClientService::update(state.db(), &auth, id, req).await?;
    Ok(Json(DataResponse::new(client)))
}

/// DELETE /api/v1/clients/:id - archives the client
async fn archive_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ClientService::archive(state.db(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
