//! FAQ repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Faq {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
    pub sort_order: i32,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateFaq {
    pub coach_id: Uuid,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
    pub sort_order: i32,
    pub published: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateFaq {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub sort_order: Option<i32>,
    pub published: Option<bool>,
}

const FAQ_COLUMNS: &str =
    "id, coach_id, question, answer, category, sort_order, published, created_at, updated_at";

pub struct FaqRepository;

impl FaqRepository {
    /// FAQs visible to `viewer_id`: published ones plus their own drafts
    pub async fn list(db: &PgPool, viewer_id: Uuid, category: Option<&str>) -> Result<Vec<Faq>> {
        let faqs = sqlx::query_as::<_, Faq>(&format!(
            r#"
            SELECT {FAQ_COLUMNS}
            FROM faqs
            WHERE (published OR coach_id = $1)
              AND ($2::TEXT IS NULL OR LOWER(category) = LOWER($2))
            ORDER BY category ASC NULLS LAST, sort_order ASC, created_at ASC
            "#
        ))
        .bind(viewer_id)
        .bind(category)
        .fetch_all(db)
        .await?;

        Ok(faqs)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Faq>> {
        let faq = sqlx::query_as::<_, Faq>(&format!("SELECT {FAQ_COLUMNS} FROM faqs WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?;

        Ok(faq)
    }

    pub async fn create(db: &PgPool, input: CreateFaq) -> Result<Faq> {
        let faq = sqlx::query_as::<_, Faq>(&format!(
            r#"
            INSERT INTO faqs (coach_id, question, answer, category, sort_order, published)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {FAQ_COLUMNS}
            "#
        ))
        .bind(input.coach_id)
        .bind(&input.question)
        .bind(&input.answer)
        .bind(&input.category)
        .bind(input.sort_order)
        .bind(input.published)
        .fetch_one(db)
        .await?;

        Ok(faq)
    }

    pub async fn update(db: &PgPool, id: Uuid, updates: UpdateFaq) -> Result<Option<Faq>> {
        let faq = sqlx::query_as::<_, Faq>(&format!(
            r#"
            UPDATE faqs SET
                question = COALESCE($2, question),
                answer = COALESCE($3, answer),
                category = COALESCE($4, category),
                sort_order = COALESCE($5, sort_order),
                published = COALESCE($6, published)
            WHERE id = $1
            RETURNING {FAQ_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(updates.question)
        .bind(updates.answer)
        .bind(updates.category)
        .bind(updates.sort_order)
        .bind(updates.published)
        .fetch_optional(db)
        .await?;

        Ok(faq)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_coach(db: &PgPool, coach_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM faqs WHERE coach_id = $1")
            .bind(coach_id)
            .fetch_one(db)
            .await?;

        Ok(count)
    }
}
