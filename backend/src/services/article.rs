//! Article service - categories, article CRUD, search, related articles and progress

use super::learning_path::LearningPathService;
use crate::auth::access::{ensure_owner, require_coach};
use crate::auth::AuthUser;
use crate::config::ContentConfig;
use crate::error::ApiError;
use crate::repositories::{
    ArticleFilter, ArticleProgressRecord, ArticleProgressRepository, ArticleRecord,
    ArticleRepository, CategoryRecord, CategoryRepository, CreateArticle, UpdateArticle,
};
use coaching_platform_shared::types::{
    ArticleListQuery, ArticleResponse, ArticleSearchQuery, ArticleSearchResult, ArticleSummary,
    CategoryResponse, CreateArticleRequest, CreateCategoryRequest, Page, ProgressResponse,
    RelatedArticle, UpdateArticleRequest, UpdateCategoryRequest,
};
use coaching_platform_shared::validation::{validate_phase, validate_required_text, ValidationError};
use coaching_platform_shared::{
    evaluate_lock, rank_by_relevance, recommend_related, LockState, ProgressStatus,
};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

const MAX_TITLE_LEN: usize = 200;
const MAX_TAGS: usize = 20;

pub struct CategoryService;

impl CategoryService {
    pub async fn list(pool: &PgPool) -> Result<Vec<CategoryResponse>, ApiError> {
        let categories = CategoryRepository::list(pool)
            .await
            .map_err(ApiError::Internal)?;

        Ok(categories.into_iter().map(category_response).collect())
    }

    pub async fn create(
        pool: &PgPool,
        user: &AuthUser,
        request: CreateCategoryRequest,
    ) -> Result<CategoryResponse, ApiError> {
        require_coach(user)?;
        let name = request.name.trim();
        ValidationError::check("name", validate_required_text(name, 100))?;

        if CategoryRepository::name_exists(pool, name, None)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict("Category already exists".to_string()));
        }

        let category = CategoryRepository::create(pool, name, request.description.as_deref())
            .await
            .map_err(ApiError::Internal)?;

        Ok(category_response(category))
    }

    pub async fn update(
        pool: &PgPool,
        user: &AuthUser,
        id: Uuid,
        request: UpdateCategoryRequest,
    ) -> Result<CategoryResponse, ApiError> {
        require_coach(user)?;

        let name = request.name.as_deref().map(str::trim);
        if let Some(name) = name {
            ValidationError::check("name", validate_required_text(name, 100))?;
            if CategoryRepository::name_exists(pool, name, Some(id))
                .await
                .map_err(ApiError::Internal)?
            {
                return Err(ApiError::Conflict("Category already exists".to_string()));
            }
        }

        let updated = CategoryRepository::update(pool, id, name, request.description.as_deref())
            .await
            .map_err(ApiError::Internal)?;
        if !updated {
            return Err(ApiError::NotFound("Category not found".to_string()));
        }

        CategoryRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .map(category_response)
            .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))
    }

    pub async fn delete(pool: &PgPool, user: &AuthUser, id: Uuid) -> Result<(), ApiError> {
        require_coach(user)?;

        let deleted = CategoryRepository::delete(pool, id)
            .await
            .map_err(ApiError::Internal)?;
        if !deleted {
            return Err(ApiError::NotFound("Category not found".to_string()));
        }
        Ok(())
    }
}

fn category_response(category: CategoryRecord) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name,
        description: category.description,
        article_count: category.article_count,
    }
}

pub struct ArticleService;

impl ArticleService {
    /// Paginated listing of the articles visible to `user`
    pub async fn list(
        pool: &PgPool,
        user: &AuthUser,
        query: &ArticleListQuery,
    ) -> Result<Page<ArticleResponse>, ApiError> {
        let pagination = query.pagination();
        let filter = ArticleFilter {
            viewer_id: user.user_id,
            category_id: query.category_id,
            phase: query.phase,
            tag: query
                .tag
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        };

        let (articles, total, progress) = tokio::try_join!(
            ArticleRepository::list(pool, &filter, pagination.limit(), pagination.offset()),
            ArticleRepository::count(pool, &filter),
            ArticleProgressRepository::list_for_user(pool, user.user_id),
        )
        .map_err(ApiError::Internal)?;

        let progress = progress_map(&progress);
        let completed = completed_set(&progress);
        let items = articles
            .into_iter()
            .map(|article| view_article(article, user, &progress, &completed))
            .collect();

        Ok(Page::new(items, total, &pagination))
    }

    pub async fn get(pool: &PgPool, user: &AuthUser, id: Uuid) -> Result<ArticleResponse, ApiError> {
        let article = Self::find_visible(pool, user, id).await?;
        let progress = ArticleProgressRepository::list_for_user(pool, user.user_id)
            .await
            .map_err(ApiError::Internal)?;

        let progress = progress_map(&progress);
        let completed = completed_set(&progress);
        Ok(view_article(article, user, &progress, &completed))
    }

    pub async fn create(
        pool: &PgPool,
        user: &AuthUser,
        request: CreateArticleRequest,
    ) -> Result<ArticleResponse, ApiError> {
        require_coach(user)?;

        let title = request.title.trim().to_string();
        ValidationError::check("title", validate_required_text(&title, MAX_TITLE_LEN))?;
        if request.content.trim().is_empty() {
            return Err(ValidationError::new("content", "cannot be empty").into());
        }
        let phase = request.phase.unwrap_or(1);
        ValidationError::check("phase", validate_phase(phase))?;
        let tags = normalize_tags(request.tags)?;
        let prerequisite_ids = dedupe_ids(request.prerequisite_ids);

        if let Some(category_id) = request.category_id {
            ensure_category_exists(pool, category_id).await?;
        }
        ensure_articles_exist(pool, &prerequisite_ids).await?;

        let id = ArticleRepository::create(
            pool,
            CreateArticle {
                author_id: user.user_id,
                category_id: request.category_id,
                title,
                summary: request.summary,
                content: request.content,
                tags,
                phase,
                prerequisite_ids,
                published: request.published,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        tracing::info!(article_id = %id, author_id = %user.user_id, "Article created");
        Self::get(pool, user, id).await
    }

    pub async fn update(
        pool: &PgPool,
        user: &AuthUser,
        id: Uuid,
        request: UpdateArticleRequest,
    ) -> Result<ArticleResponse, ApiError> {
        let article = Self::find_existing(pool, id).await?;
        ensure_owner(article.author_id, user)?;

        let title = request.title.map(|t| t.trim().to_string());
        if let Some(title) = &title {
            ValidationError::check("title", validate_required_text(title, MAX_TITLE_LEN))?;
        }
        if request.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(ValidationError::new("content", "cannot be empty").into());
        }
        if let Some(phase) = request.phase {
            ValidationError::check("phase", validate_phase(phase))?;
        }
        let tags = request.tags.map(normalize_tags).transpose()?;
        let prerequisite_ids = request.prerequisite_ids.map(dedupe_ids);

        if let Some(category_id) = request.category_id {
            ensure_category_exists(pool, category_id).await?;
        }
        if let Some(ids) = &prerequisite_ids {
            if ids.contains(&id) {
                return Err(ValidationError::new(
                    "prerequisite_ids",
                    "an article cannot be its own prerequisite",
                )
                .into());
            }
            ensure_articles_exist(pool, ids).await?;
        }

        let updates = UpdateArticle {
            category_id: request.category_id,
            title,
            summary: request.summary,
            content: request.content,
            tags,
            phase: request.phase,
            prerequisite_ids,
            published: request.published,
        };
        ArticleRepository::update(pool, id, updates)
            .await
            .map_err(ApiError::Internal)?;

        Self::get(pool, user, id).await
    }

    pub async fn delete(pool: &PgPool, user: &AuthUser, id: Uuid) -> Result<(), ApiError> {
        let article = Self::find_existing(pool, id).await?;
        ensure_owner(article.author_id, user)?;

        ArticleRepository::delete(pool, id)
            .await
            .map_err(ApiError::Internal)?;

        tracing::info!(article_id = %id, "Article deleted");
        Ok(())
    }

    /// Keyword search ranked by relevance score
    ///
    /// A blank query returns no results.
    pub async fn search(
        pool: &PgPool,
        config: &ContentConfig,
        user: &AuthUser,
        query: &ArticleSearchQuery,
    ) -> Result<Vec<ArticleSearchResult>, ApiError> {
        let q = query.q.trim();
        if q.is_empty() {
            return Ok(Vec::new());
        }
        let limit = query.limit.unwrap_or(config.search_result_limit).clamp(1, 100);

        let candidates =
            ArticleRepository::search_candidates(pool, user.user_id, q, config.search_candidate_limit)
                .await
                .map_err(ApiError::Internal)?;

        let mut ranked = rank_by_relevance(q, candidates);
        ranked.truncate(limit);

        tracing::debug!(query = q, results = ranked.len(), "Article search");
        Ok(ranked
            .into_iter()
            .map(|scored| ArticleSearchResult {
                article: summarize(&scored.item),
                score: scored.score,
            })
            .collect())
    }

    /// Articles related to `id`, favouring ones the user has not read yet
    pub async fn related(
        pool: &PgPool,
        config: &ContentConfig,
        user: &AuthUser,
        id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<RelatedArticle>, ApiError> {
        let source = Self::find_visible(pool, user, id).await?;
        let limit = limit.unwrap_or(config.related_default_limit);

        let (candidates, progress) = tokio::try_join!(
            ArticleRepository::related_candidates(pool, &source),
            ArticleProgressRepository::list_for_user(pool, user.user_id),
        )
        .map_err(ApiError::Internal)?;

        let progress = progress_map(&progress);
        let recommended = recommend_related(&source, candidates, &progress, limit);

        Ok(recommended
            .into_iter()
            .map(|scored| RelatedArticle {
                article: summarize(&scored.item),
                progress: progress.get(&scored.item.id).copied(),
                score: scored.score,
            })
            .collect())
    }

    /// Record reading progress and update the learning paths containing the article
    pub async fn record_progress(
        pool: &PgPool,
        user: &AuthUser,
        id: Uuid,
        status: ProgressStatus,
    ) -> Result<ProgressResponse, ApiError> {
        let article = Self::find_visible(pool, user, id).await?;
        let records = ArticleProgressRepository::list_for_user(pool, user.user_id)
            .await
            .map_err(ApiError::Internal)?;
        let mut completed = completed_set(&progress_map(&records));

        if status.is_completed() {
            let lock = evaluate_lock(&article.prerequisite_ids, &completed);
            if lock.locked && article.author_id != user.user_id {
                return Err(ApiError::Forbidden(
                    "Complete the prerequisite articles first".to_string(),
                ));
            }
        }

        let record = ArticleProgressRepository::upsert(pool, user.user_id, id, status)
            .await
            .map_err(ApiError::Internal)?;
        if record.status().is_completed() {
            completed.insert(id);
        }

        let completed_paths =
            LearningPathService::sync_progress(pool, user.user_id, id, &completed).await?;

        tracing::info!(
            user_id = %user.user_id,
            article_id = %id,
            status = %record.status(),
            completed_paths = completed_paths.len(),
            "Article progress recorded"
        );

        Ok(ProgressResponse {
            article_id: id,
            status: record.status(),
            started_at: record.started_at,
            completed_at: record.completed_at,
            completed_paths,
        })
    }

    async fn find_existing(pool: &PgPool, id: Uuid) -> Result<ArticleRecord, ApiError> {
        ArticleRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))
    }

    /// Drafts are only visible to their author
    async fn find_visible(pool: &PgPool, user: &AuthUser, id: Uuid) -> Result<ArticleRecord, ApiError> {
        let article = Self::find_existing(pool, id).await?;
        if is_visible(&article, user) {
            Ok(article)
        } else {
            Err(ApiError::NotFound("Article not found".to_string()))
        }
    }
}

fn is_visible(article: &ArticleRecord, user: &AuthUser) -> bool {
    article.published || article.author_id == user.user_id
}

/// Build the response for `user`, hiding the body while the article is locked
///
/// Authors always see their own articles unlocked.
fn view_article(
    article: ArticleRecord,
    user: &AuthUser,
    progress: &HashMap<Uuid, ProgressStatus>,
    completed: &HashSet<Uuid>,
) -> ArticleResponse {
    let lock = if article.author_id == user.user_id {
        LockState::unlocked()
    } else {
        evaluate_lock(&article.prerequisite_ids, completed)
    };
    let status = progress.get(&article.id).copied();
    article_response(article, lock, status)
}

fn article_response(
    article: ArticleRecord,
    lock: LockState,
    progress: Option<ProgressStatus>,
) -> ArticleResponse {
    ArticleResponse {
        id: article.id,
        author_id: article.author_id,
        category_id: article.category_id,
        category_name: article.category_name,
        title: article.title,
        summary: article.summary,
        content: (!lock.locked).then_some(article.content),
        tags: article.tags,
        phase: article.phase,
        prerequisite_ids: article.prerequisite_ids,
        published: article.published,
        locked: lock.locked,
        missing_prerequisites: lock.missing,
        progress,
        created_at: article.created_at,
        updated_at: article.updated_at,
    }
}

/// Compact listing entry for an article
pub(crate) fn summarize(article: &ArticleRecord) -> ArticleSummary {
    ArticleSummary {
        id: article.id,
        title: article.title.clone(),
        summary: article.summary.clone(),
        category_name: article.category_name.clone(),
        tags: article.tags.clone(),
        phase: article.phase,
    }
}

pub(crate) fn progress_map(records: &[ArticleProgressRecord]) -> HashMap<Uuid, ProgressStatus> {
    records
        .iter()
        .map(|record| (record.article_id, record.status()))
        .collect()
}

pub(crate) fn completed_set(progress: &HashMap<Uuid, ProgressStatus>) -> HashSet<Uuid> {
    progress
        .iter()
        .filter(|(_, status)| status.is_completed())
        .map(|(id, _)| *id)
        .collect()
}

/// Trim tags, drop blanks and case-insensitive duplicates, keeping first spelling
pub(crate) fn normalize_tags(tags: Vec<String>) -> Result<Vec<String>, ApiError> {
    let mut seen = HashSet::new();
    let tags: Vec<String> = tags
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .collect();

    if tags.len() > MAX_TAGS {
        return Err(ValidationError::new("tags", &format!("at most {} tags allowed", MAX_TAGS)).into());
    }
    Ok(tags)
}

/// Remove repeated ids, keeping declaration order
pub(crate) fn dedupe_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

async fn ensure_category_exists(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
    CategoryRepository::find_by_id(pool, id)
        .await
        .map_err(ApiError::Internal)?
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("category_id", "unknown category").into())
}

/// Every id must name an existing article
pub(crate) async fn ensure_articles_exist(pool: &PgPool, ids: &[Uuid]) -> Result<(), ApiError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = ArticleRepository::find_many(pool, ids)
        .await
        .map_err(ApiError::Internal)?;

    if found.len() != ids.len() {
        return Err(ValidationError::new("article_ids", "references an unknown article").into());
    }
    Ok(())
}
