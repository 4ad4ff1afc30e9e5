//! Recipe routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::RecipeService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use coaching_platform_shared::types::{
    AddIngredientRequest, CreateRecipeRequest, DataResponse, RecipeDetailResponse,
    RecipeResponse, UpdateRecipeRequest,
};
use uuid::Uuid;

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route(
            "/:id",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/:id/ingredients", post(add_ingredient))
        .route("/:id/ingredients/:food_id", delete(remove_ingredient))
}

async fn list_recipes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<DataResponse<Vec<RecipeResponse>>>> {
    let recipes = RecipeService::list(state.db(), &auth).await?;
    Ok(Json(DataResponse::new(recipes)))
}

/// GET /api/v1/recipes/:id - recipe with ingredients and nutrition totals
async fn get_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DataResponse<RecipeDetailResponse>>> {
    let recipe = RecipeService::get(state.db(), &auth, id).await?;
    Ok(Json(DataResponse::new(recipe)))
}

async fn create_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateRecipeRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<RecipeDetailResponse>>)> {
    let recipe = RecipeService::create(state.db(), &auth, req).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(recipe))))
}

async fn update_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRecipeRequest>,
) -> ApiResult<Json<DataResponse<RecipeDetailResponse>>> {
    let recipe = RecipeService::update(state.db(), &auth, id, req).await?;
    Ok(Json(DataResponse::new(recipe)))
}

async fn delete_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    RecipeService::delete(state.db(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/recipes/:id/ingredients
async fn add_ingredient(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AddIngredientRequest>,
) -> ApiResult<Json<DataResponse<RecipeDetailResponse>>> {
    let recipe = RecipeService::add_ingredient(state.db(), &auth, id, req).await?;
    Ok(Json(DataResponse::new(recipe)))
}

/// DELETE /api/v1/recipes/:id/ingredients/:food_id
async fn remove_ingredient(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, food_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<DataResponse<RecipeDetailResponse>>> {
    let recipe = RecipeService::remove_ingredient(state.db(), &auth, id, food_id).await?;
    Ok(Json(DataResponse::new(recipe)))
}
