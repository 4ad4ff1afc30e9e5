//! Learning path repository - ordered article sequences and path progress

use super::article::ArticleRecord;
use anyhow::Result;
use chrono::{DateTime, Utc};
use coaching_platform_shared::ProgressStatus;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LearningPathRecord {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub phase: i32,
    pub prerequisite_ids: Vec<Uuid>,
    pub published: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An article within a path, with its position
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PathArticleRecord {
    #[sqlx(flatten)]
    pub article: ArticleRecord,
    pub position: i32,
}

/// Membership row linking a path to one of its articles
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct PathMembership {
    pub path_id: Uuid,
    pub article_id: Uuid,
    pub author_id: Uuid,
    pub published: bool,
}

impl PathMembership {
    /// Drafts only count for their author
    pub fn is_visible_to(&self, viewer_id: Uuid) -> bool {
        self.published || self.author_id == viewer_id
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PathProgressRecord {
    pub user_id: Uuid,
    pub path_id: Uuid,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PathProgressRecord {
    pub fn status(&self) -> ProgressStatus {
        self.status.parse().unwrap_or(ProgressStatus::InProgress)
    }
}

#[derive(Debug, Clone)]
pub struct CreateLearningPath {
    pub coach_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub phase: i32,
    pub prerequisite_ids: Vec<Uuid>,
    pub published: bool,
    pub article_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateLearningPath {
    pub title: Option<String>,
    pub description: Option<String>,
    pub phase: Option<i32>,
    pub prerequisite_ids: Option<Vec<Uuid>>,
    pub published: Option<bool>,
    pub is_archived: Option<bool>,
}

const PATH_COLUMNS: &str = "id, coach_id, title, description, phase, prerequisite_ids, published, \
                            is_archived, created_at, updated_at";

pub struct LearningPathRepository;

impl LearningPathRepository {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<LearningPathRecord>> {
        let path = sqlx::query_as::<_, LearningPathRecord>(&format!(
            "SELECT {PATH_COLUMNS} FROM learning_paths WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(path)
    }

    /// Paths visible to `viewer_id`: their own, plus published active ones
    pub async fn list(
        db: &PgPool,
        viewer_id: Uuid,
        include_archived: bool,
        phase: Option<i32>,
    ) -> Result<Vec<LearningPathRecord>> {
        let paths = sqlx::query_as::<_, LearningPathRecord>(&format!(
            r#"
            SELECT {PATH_COLUMNS}
            FROM learning_paths
            WHERE (coach_id = $1 OR (published AND NOT is_archived))
              AND ($2 OR NOT is_archived)
              AND ($3::INT IS NULL OR phase = $3)
            ORDER BY phase ASC, title ASC
            "#
        ))
        .bind(viewer_id)
        .bind(include_archived)
        .bind(phase)
        .fetch_all(db)
        .await?;

        Ok(paths)
    }

    /// Article membership for a set of paths
    pub async fn memberships(db: &PgPool, path_ids: &[Uuid]) -> Result<Vec<PathMembership>> {
        let rows = sqlx::query_as::<_, PathMembership>(
            r#"
            SELECT lpa.path_id, lpa.article_id, a.author_id, a.published
            FROM learning_path_articles lpa
            JOIN articles a ON a.id = lpa.article_id
            WHERE lpa.path_id = ANY($1)
            ORDER BY lpa.path_id, lpa.position
            "#,
        )
        .bind(path_ids)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }

    pub async fn find_many(db: &PgPool, ids: &[Uuid]) -> Result<Vec<LearningPathRecord>> {
        let paths = sqlx::query_as::<_, LearningPathRecord>(&format!(
            "SELECT {PATH_COLUMNS} FROM learning_paths WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(db)
        .await?;

        Ok(paths)
    }

    /// Ids of every path that contains `article_id`
    pub async fn paths_containing(db: &PgPool, article_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT path_id FROM learning_path_articles WHERE article_id = $1",
        )
        .bind(article_id)
        .fetch_all(db)
        .await?;

        Ok(ids)
    }

    /// Articles of a path in position order
    pub async fn articles(db: &PgPool, path_id: Uuid) -> Result<Vec<PathArticleRecord>> {
        let rows = sqlx::query_as::<_, PathArticleRecord>(
            r#"
            SELECT a.id, a.author_id, a.category_id, c.name AS category_name, a.title, a.summary,
                   a.content, a.tags, a.phase, a.prerequisite_ids, a.published,
                   a.created_at, a.updated_at, lpa.position
            FROM learning_path_articles lpa
            JOIN articles a ON a.id = lpa.article_id
            LEFT JOIN article_categories c ON c.id = a.category_id
            WHERE lpa.path_id = $1
            ORDER BY lpa.position ASC
            "#,
        )
        .bind(path_id)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }

    /// Create a path together with its article list
    pub async fn create(db: &PgPool, input: CreateLearningPath) -> Result<Uuid> {
        let mut tx = db.begin().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO learning_paths (coach_id, title, description, phase, prerequisite_ids, published)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(input.coach_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.phase)
        .bind(&input.prerequisite_ids)
        .bind(input.published)
        .fetch_one(&mut *tx)
        .await?;

        insert_articles(&mut tx, id, &input.article_ids).await?;

        tx.commit().await?;
        Ok(id)
    }

    pub async fn update(db: &PgPool, id: Uuid, updates: UpdateLearningPath) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE learning_paths SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                phase = COALESCE($4, phase),
                prerequisite_ids = COALESCE($5, prerequisite_ids),
                published = COALESCE($6, published),
                is_archived = COALESCE($7, is_archived)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(updates.title)
        .bind(updates.description)
        .bind(updates.phase)
        .bind(updates.prerequisite_ids)
        .bind(updates.published)
        .bind(updates.is_archived)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace the article list of a path
    pub async fn set_articles(db: &PgPool, path_id: Uuid, article_ids: &[Uuid]) -> Result<()> {
        let mut tx = db.begin().await?;

        sqlx::query("DELETE FROM learning_path_articles WHERE path_id = $1")
            .bind(path_id)
            .execute(&mut *tx)
            .await?;
        insert_articles(&mut tx, path_id, article_ids).await?;

        sqlx::query("UPDATE learning_paths SET updated_at = NOW() WHERE id = $1")
            .bind(path_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool> {
        let mut tx = db.begin().await?;

        sqlx::query(
            "UPDATE learning_paths SET prerequisite_ids = array_remove(prerequisite_ids, $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM learning_paths WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_coach(db: &PgPool, coach_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM learning_paths WHERE coach_id = $1 AND NOT is_archived",
        )
        .bind(coach_id)
        .fetch_one(db)
        .await?;

        Ok(count)
    }
}

async fn insert_articles(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    path_id: Uuid,
    article_ids: &[Uuid],
) -> Result<()> {
    let positions: Vec<i32> = (1..=article_ids.len() as i32).collect();

    sqlx::query(
        r#"
        INSERT INTO learning_path_articles (path_id, article_id, position)
        SELECT $1, article_id, position
        FROM unnest($2::UUID[], $3::INT[]) AS t(article_id, position)
        "#,
    )
    .bind(path_id)
    .bind(article_ids)
    .bind(&positions)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Per-user learning path progress
pub struct PathProgressRepository;

impl PathProgressRepository {
    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> Result<Vec<PathProgressRecord>> {
        let records = sqlx::query_as::<_, PathProgressRecord>(
            r#"
            SELECT user_id, path_id, status, started_at, completed_at
            FROM learning_path_progress
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(records)
    }

    /// Record path progress; a completed path stays completed
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        path_id: Uuid,
        status: ProgressStatus,
    ) -> Result<PathProgressRecord> {
        let record = sqlx::query_as::<_, PathProgressRecord>(
            r#"
            INSERT INTO learning_path_progress (user_id, path_id, status, completed_at)
            VALUES ($1, $2, $3, CASE WHEN $3 = 'completed' THEN NOW() END)
            ON CONFLICT (user_id, path_id) DO UPDATE SET
                status = CASE
                    WHEN learning_path_progress.status = 'completed' THEN learning_path_progress.status
                    ELSE EXCLUDED.status
                END,
                completed_at = COALESCE(learning_path_progress.completed_at, EXCLUDED.completed_at)
            RETURNING user_id, path_id, status, started_at, completed_at
            "#,
        )
        .bind(user_id)
        .bind(path_id)
        .bind(status.as_str())
        .fetch_one(db)
        .await?;

        Ok(record)
    }
}
