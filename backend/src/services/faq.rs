//! FAQ service

use crate::auth::access::{ensure_owner, require_coach};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::repositories::{CreateFaq, Faq, FaqRepository, UpdateFaq};
use coaching_platform_shared::types::{
    CreateFaqRequest, FaqListQuery, FaqResponse, UpdateFaqRequest,
};
use coaching_platform_shared::validation::{validate_required_text, ValidationError};
use sqlx::PgPool;
use uuid::Uuid;

pub struct FaqService;

impl FaqService {
    /// Published FAQs, plus the caller's own drafts
    pub async fn list(
        pool: &PgPool,
        user: &AuthUser,
        query: &FaqListQuery,
    ) -> Result<Vec<FaqResponse>, ApiError> {
        let category = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let faqs = FaqRepository::list(pool, user.user_id, category)
            .await
            .map_err(ApiError::Internal)?;

        Ok(faqs.into_iter().map(to_response).collect())
    }

    pub async fn get(pool: &PgPool, user: &AuthUser, id: Uuid) -> Result<FaqResponse, ApiError> {
        let faq = Self::find(pool, id).await?;
        if !faq.published && faq.coach_id != user.user_id {
            return Err(ApiError::NotFound("FAQ not found".to_string()));
        }
        Ok(to_response(faq))
    }

    pub async fn create(
        pool: &PgPool,
        user: &AuthUser,
        request: CreateFaqRequest,
    ) -> Result<FaqResponse, ApiError> {
        require_coach(user)?;

        ValidationError::check("question", validate_required_text(&request.question, 500))?;
        ValidationError::check("answer", validate_required_text(&request.answer, 10_000))?;

        let faq = FaqRepository::create(
            pool,
            CreateFaq {
                coach_id: user.user_id,
                question: request.question.trim().to_string(),
                answer: request.answer,
                category: request.category.map(|c| c.trim().to_string()),
                sort_order: request.sort_order.unwrap_or(0),
                published: request.published,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        Ok(to_response(faq))
    }

    pub async fn update(
        pool: &PgPool,
        user: &AuthUser,
        id: Uuid,
        request: UpdateFaqRequest,
    ) -> Result<FaqResponse, ApiError> {
        let faq = Self::find(pool, id).await?;
        ensure_owner(faq.coach_id, user)?;

        if let Some(question) = &request.question {
            ValidationError::check("question", validate_required_text(question, 500))?;
        }
        if let Some(answer) = &request.answer {
            ValidationError::check("answer", validate_required_text(answer, 10_000))?;
        }

        let updates = UpdateFaq {
            question: request.question.map(|q| q.trim().to_string()),
            answer: request.answer,
            category: request.category.map(|c| c.trim().to_string()),
            sort_order: request.sort_order,
            published: request.published,
        };

        FaqRepository::update(pool, id, updates)
            .await
            .map_err(ApiError::Internal)?
            .map(to_response)
            .ok_or_else(|| ApiError::NotFound("FAQ not found".to_string()))
    }

    pub async fn delete(pool: &PgPool, user: &AuthUser, id: Uuid) -> Result<(), ApiError> {
        let faq = Self::find(pool, id).await?;
        ensure_owner(faq.coach_id, user)?;

        FaqRepository::delete(pool, id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(())
    }

    async fn find(pool: &PgPool, id: Uuid) -> Result<Faq, ApiError> {
        FaqRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("FAQ not found".to_string()))
    }
}

fn to_response(faq: Faq) -> FaqResponse {
    FaqResponse {
        id: faq.id,
        question: faq.question,
        answer: faq.answer,
        category: faq.category,
        sort_order: faq.sort_order,
        published: faq.published,
        updated_at: faq.updated_at,
    }
}
