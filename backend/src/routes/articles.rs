//! Article routes: library, search, recommendations and reading progress

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::ArticleService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use coaching_platform_shared::types::{
    ArticleListQuery, ArticleResponse, ArticleSearchQuery, ArticleSearchResult,
    CreateArticleRequest, DataResponse, Page, ProgressResponse, RelatedArticle,
    RelatedArticlesQuery, UpdateArticleRequest, UpdateProgressRequest,
};
use uuid::Uuid;

pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_articles).post(create_article))
        .route("/search", get(search_articles))
        .route(
            "/:id",
            get(get_article).patch(update_article).delete(delete_article),
        )
        .route("/:id/related", get(related_articles))
        .route("/:id/progress", post(record_progress))
}

/// GET /api/v1/articles - paginated, filterable list
async fn list_articles(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ArticleListQuery>,
) -> ApiResult<Json<DataResponse<Page<ArticleResponse>>>> {
    let page = ArticleService::list(state.db(), &auth, &query).await?;
    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/articles/search?q= - ranked by relevance
async fn search_articles(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ArticleSearchQuery>,
) -> ApiResult<Json<DataResponse<Vec<ArticleSearchResult>>>> {
    let results = ArticleService::search(state.db(), state.content(), &auth, &query).await?;
    Ok(Json(DataResponse::new(results)))
}

async fn get_article(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DataResponse<ArticleResponse>>> {
    let article = ArticleService::get(state.db(), &auth, id).await?;
    Ok(Json(DataResponse::new(article)))
}

async fn create_article(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateArticleRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<ArticleResponse>>)> {
    let article = ArticleService::create(state.db(), &auth, req).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(article))))
}

async fn update_article(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateArticleRequest>,
) -> ApiResult<Json<DataResponse<ArticleResponse>>> {
    let article = ArticleService::update(state.db(), &auth, id, req).await?;
    Ok(Json(DataResponse::new(article)))
}

async fn delete_article(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ArticleService::delete(state.db(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/articles/:id/related?limit=
async fn related_articles(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<RelatedArticlesQuery>,
) -> ApiResult<Json<DataResponse<Vec<RelatedArticle>>>> {
    let related =
        ArticleService::related(state.db(), state.content(), &auth, id, query.limit).await?;
    Ok(Json(DataResponse::new(related)))
}

/// POST /api/v1/articles/:id/progress
///
/// Completing an article re-evaluates the learning paths that contain it.
async fn record_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProgressRequest>,
) -> ApiResult<Json<DataResponse<ProgressResponse>>> {
    let progress = ArticleService::record_progress(state.db(), &auth, id, req.status).await?;
    Ok(Json(DataResponse::new(progress)))
}
