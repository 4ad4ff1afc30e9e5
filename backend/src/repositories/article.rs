//! Article repository - categories, articles and per-user reading progress

use anyhow::Result;
use chrono::{DateTime, Utc};
use coaching_platform_shared::{ArticleDocument, ProgressStatus};
use sqlx::PgPool;
use uuid::Uuid;

/// Article category with the number of articles filed under it
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub article_count: i64,
}

/// Article row joined with its category name
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRecord {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub title: String,
    pub summary: Option<String>,
    pub content: String,
    pub tags: Vec<String>,
    pub phase: i32,
    pub prerequisite_ids: Vec<Uuid>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArticleDocument for ArticleRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn category_id(&self) -> Option<Uuid> {
        self.category_id
    }

    fn category_name(&self) -> Option<&str> {
        self.category_name.as_deref()
    }

    fn phase(&self) -> i32 {
        self.phase
    }
}

/// A user's progress on one article
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleProgressRecord {
    pub user_id: Uuid,
    pub article_id: Uuid,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ArticleProgressRecord {
    pub fn status(&self) -> ProgressStatus {
        self.status.parse().unwrap_or(ProgressStatus::InProgress)
    }
}

/// A completed article with its completion time
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompletedArticle {
    pub id: Uuid,
    pub title: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateArticle {
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub summary: Option<String>,
    pub content: String,
    pub tags: Vec<String>,
    pub phase: i32,
    pub prerequisite_ids: Vec<Uuid>,
    pub published: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateArticle {
    pub category_id: Option<Uuid>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub phase: Option<i32>,
    pub prerequisite_ids: Option<Vec<Uuid>>,
    pub published: Option<bool>,
}

/// Listing filter; `viewer_id` sees published articles plus their own drafts
#[derive(Debug, Clone)]
pub struct ArticleFilter {
    pub viewer_id: Uuid,
    pub category_id: Option<Uuid>,
    pub phase: Option<i32>,
    pub tag: Option<String>,
}

const ARTICLE_SELECT: &str = r#"
    SELECT a.id, a.author_id, a.category_id, c.name AS category_name, a.title, a.summary,
           a.content, a.tags, a.phase, a.prerequisite_ids, a.published,
           a.created_at, a.updated_at
    FROM articles a
    LEFT JOIN article_categories c ON c.id = a.category_id
"#;

/// Category repository
pub struct CategoryRepository;

impl CategoryRepository {
    pub async fn list(db: &PgPool) -> Result<Vec<CategoryRecord>> {
        let categories = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT c.id, c.name, c.description, COUNT(a.id) AS article_count
            FROM article_categories c
            LEFT JOIN articles a ON a.category_id = c.id AND a.published
            GROUP BY c.id
            ORDER BY c.name ASC
            "#,
        )
        .fetch_all(db)
        .await?;

        Ok(categories)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<CategoryRecord>> {
        let category = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT c.id, c.name, c.description,
                   (SELECT COUNT(*) FROM articles a WHERE a.category_id = c.id AND a.published)
                       AS article_count
            FROM article_categories c
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(category)
    }

    pub async fn name_exists(db: &PgPool, name: &str, except: Option<Uuid>) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM article_categories
                WHERE LOWER(name) = LOWER($1) AND ($2::UUID IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(except)
        .fetch_one(db)
        .await?;

        Ok(exists)
    }

    pub async fn create(db: &PgPool, name: &str, description: Option<&str>) -> Result<CategoryRecord> {
        let category = sqlx::query_as::<_, CategoryRecord>(
            r#"
            INSERT INTO article_categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, 0::BIGINT AS article_count
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(db)
        .await?;

        Ok(category)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE article_categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a category; its articles become uncategorised
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM article_categories WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Article repository
pub struct ArticleRepository;

impl ArticleRepository {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<ArticleRecord>> {
        let article = sqlx::query_as::<_, ArticleRecord>(&format!("{ARTICLE_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?;

        Ok(article)
    }

    /// Fetch several articles, in no particular order
    pub async fn find_many(db: &PgPool, ids: &[Uuid]) -> Result<Vec<ArticleRecord>> {
        let articles =
            sqlx::query_as::<_, ArticleRecord>(&format!("{ARTICLE_SELECT} WHERE a.id = ANY($1)"))
                .bind(ids)
                .fetch_all(db)
                .await?;

        Ok(articles)
    }

    pub async fn list(
        db: &PgPool,
        filter: &ArticleFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ArticleRecord>> {
        let articles = sqlx::query_as::<_, ArticleRecord>(&format!(
            r#"
            {ARTICLE_SELECT}
            WHERE (a.published OR a.author_id = $1)
              AND ($2::UUID IS NULL OR a.category_id = $2)
              AND ($3::INT IS NULL OR a.phase = $3)
              AND ($4::TEXT IS NULL OR $4 ILIKE ANY(a.tags))
            ORDER BY a.phase ASC, a.created_at DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(filter.viewer_id)
        .bind(filter.category_id)
        .bind(filter.phase)
        .bind(&filter.tag)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(articles)
    }

    pub async fn count(db: &PgPool, filter: &ArticleFilter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM articles a
            WHERE (a.published OR a.author_id = $1)
              AND ($2::UUID IS NULL OR a.category_id = $2)
              AND ($3::INT IS NULL OR a.phase = $3)
              AND ($4::TEXT IS NULL OR $4 ILIKE ANY(a.tags))
            "#,
        )
        .bind(filter.viewer_id)
        .bind(filter.category_id)
        .bind(filter.phase)
        .bind(&filter.tag)
        .fetch_one(db)
        .await?;

        Ok(count)
    }

    /// Articles that could score against `query`; ranking happens in memory
    ///
    /// Title matches are kept ahead of body-only matches when `limit` cuts
    /// the candidate set.
    pub async fn search_candidates(
        db: &PgPool,
        viewer_id: Uuid,
        query: &str,
        limit: i64,
    ) -> Result<Vec<ArticleRecord>> {
        let pattern = format!("%{}%", escape_like(query));
        let articles = sqlx::query_as::<_, ArticleRecord>(&format!(
            r#"
            {ARTICLE_SELECT}
            WHERE (a.published OR a.author_id = $1)
              AND (a.title ILIKE $2
                   OR a.content ILIKE $2
                   OR c.name ILIKE $2
                   OR EXISTS (SELECT 1 FROM unnest(a.tags) AS t(tag) WHERE t.tag ILIKE $2))
            ORDER BY (a.title ILIKE $2) DESC,
                     EXISTS (SELECT 1 FROM unnest(a.tags) AS t(tag) WHERE t.tag ILIKE $2) DESC,
                     a.created_at DESC
            LIMIT $3
            "#
        ))
        .bind(viewer_id)
        .bind(pattern)
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(articles)
    }

    /// Published articles in the related pool of `source`
    pub async fn related_candidates(db: &PgPool, source: &ArticleRecord) -> Result<Vec<ArticleRecord>> {
        let articles = sqlx::query_as::<_, ArticleRecord>(&format!(
            r#"
            {ARTICLE_SELECT}
            WHERE a.published
              AND a.id <> $1
              AND (($2::UUID IS NOT NULL AND a.category_id = $2)
                   OR a.phase = $3
                   OR a.phase = $3 + 1)
            ORDER BY a.phase ASC, a.created_at ASC
            "#
        ))
        .bind(source.id)
        .bind(source.category_id)
        .bind(source.phase)
        .fetch_all(db)
        .await?;

        Ok(articles)
    }

    pub async fn create(db: &PgPool, input: CreateArticle) -> Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO articles (
                author_id, category_id, title, summary, content, tags, phase,
                prerequisite_ids, published
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(input.author_id)
        .bind(input.category_id)
        .bind(&input.title)
        .bind(&input.summary)
        .bind(&input.content)
        .bind(&input.tags)
        .bind(input.phase)
        .bind(&input.prerequisite_ids)
        .bind(input.published)
        .fetch_one(db)
        .await?;

        Ok(id)
    }

    pub async fn update(db: &PgPool, id: Uuid, updates: UpdateArticle) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE articles SET
                category_id = COALESCE($2, category_id),
                title = COALESCE($3, title),
                summary = COALESCE($4, summary),
                content = COALESCE($5, content),
                tags = COALESCE($6, tags),
                phase = COALESCE($7, phase),
                prerequisite_ids = COALESCE($8, prerequisite_ids),
                published = COALESCE($9, published)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(updates.category_id)
        .bind(updates.title)
        .bind(updates.summary)
        .bind(updates.content)
        .bind(updates.tags)
        .bind(updates.phase)
        .bind(updates.prerequisite_ids)
        .bind(updates.published)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool> {
        let mut tx = db.begin().await?;

        // Drop dangling prerequisite references before the row goes
        sqlx::query("UPDATE articles SET prerequisite_ids = array_remove(prerequisite_ids, $1)")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count articles authored by a coach, and how many of them are published
    pub async fn count_by_author(db: &PgPool, author_id: Uuid) -> Result<(i64, i64)> {
        let row = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE published)
            FROM articles
            WHERE author_id = $1
            "#,
        )
        .bind(author_id)
        .fetch_one(db)
        .await?;

        Ok(row)
    }
}

/// Per-user article progress
pub struct ArticleProgressRepository;

impl ArticleProgressRepository {
    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> Result<Vec<ArticleProgressRecord>> {
        let records = sqlx::query_as::<_, ArticleProgressRecord>(
            r#"
            SELECT user_id, article_id, status, started_at, completed_at
            FROM article_progress
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(records)
    }

    pub async fn find(
        db: &PgPool,
        user_id: Uuid,
        article_id: Uuid,
    ) -> Result<Option<ArticleProgressRecord>> {
        let record = sqlx::query_as::<_, ArticleProgressRecord>(
            r#"
            SELECT user_id, article_id, status, started_at, completed_at
            FROM article_progress
            WHERE user_id = $1 AND article_id = $2
            "#,
        )
        .bind(user_id)
        .bind(article_id)
        .fetch_optional(db)
        .await?;

        Ok(record)
    }

    /// Record progress; a completed article stays completed
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        article_id: Uuid,
        status: ProgressStatus,
    ) -> Result<ArticleProgressRecord> {
        let record = sqlx::query_as::<_, ArticleProgressRecord>(
            r#"
            INSERT INTO article_progress (user_id, article_id, status, completed_at)
            VALUES ($1, $2, $3, CASE WHEN $3 = 'completed' THEN NOW() END)
            ON CONFLICT (user_id, article_id) DO UPDATE SET
                status = CASE
                    WHEN article_progress.status = 'completed' THEN article_progress.status
                    ELSE EXCLUDED.status
                END,
                completed_at = COALESCE(article_progress.completed_at, EXCLUDED.completed_at)
            RETURNING user_id, article_id, status, started_at, completed_at
            "#,
        )
        .bind(user_id)
        .bind(article_id)
        .bind(status.as_str())
        .fetch_one(db)
        .await?;

        Ok(record)
    }

    pub async fn count_completed(db: &PgPool, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM article_progress WHERE user_id = $1 AND status = 'completed'",
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;

        Ok(count)
    }

    pub async fn recently_completed(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<CompletedArticle>> {
        let articles = sqlx::query_as::<_, CompletedArticle>(
            r#"
            SELECT a.id, a.title, p.completed_at
            FROM article_progress p
            JOIN articles a ON a.id = p.article_id
            WHERE p.user_id = $1 AND p.status = 'completed' AND p.completed_at IS NOT NULL
            ORDER BY p.completed_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(articles)
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside ILIKE
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
