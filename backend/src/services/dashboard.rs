//! Dashboard service - role-specific overview built from concurrent reads

use super::nutrition_plan;
use super::workout;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::repositories::{
    ArticleProgressRepository, ArticleRepository, AssignmentFilter, FaqRepository,
    LearningPathRepository,
    NutritionPlanRepository, PathProgressRecord, PathProgressRepository, RecipeRepository,
    ShoppingListRepository, UserRepository, WorkoutRepository,
};
use coaching_platform_shared::types::{
    ClientDashboard, CoachDashboard, DashboardResponse, LearningSummary, RecentArticle,
};
use coaching_platform_shared::ProgressStatus;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

const RECENT_ARTICLES: i64 = 5;

pub struct DashboardService;

impl DashboardService {
    pub async fn get(pool: &PgPool, user: &AuthUser) -> Result<DashboardResponse, ApiError> {
        if user.is_coach() {
            Self::coach(pool, user.user_id).await.map(DashboardResponse::Coach)
        } else {
            Self::client(pool, user.user_id).await.map(DashboardResponse::Client)
        }
    }

    async fn coach(pool: &PgPool, coach_id: Uuid) -> Result<CoachDashboard, ApiError> {
        let (
            client_count,
            (article_count, published_article_count),
            learning_path_count,
            recipe_count,
            nutrition_plan_count,
            workout_program_count,
            faq_count,
        ) = tokio::try_join!(
            UserRepository::count_clients(pool, coach_id),
            ArticleRepository::count_by_author(pool, coach_id),
            LearningPathRepository::count_by_coach(pool, coach_id),
            RecipeRepository::count_by_coach(pool, coach_id),
            NutritionPlanRepository::count_by_coach(pool, coach_id),
            WorkoutRepository::count_by_coach(pool, coach_id),
            FaqRepository::count_by_coach(pool, coach_id),
        )
        .map_err(ApiError::Internal)?;

        Ok(CoachDashboard {
            client_count,
            article_count,
            published_article_count,
            learning_path_count,
            recipe_count,
            nutrition_plan_count,
            workout_program_count,
            faq_count,
        })
    }

    async fn client(pool: &PgPool, client_id: Uuid) -> Result<ClientDashboard, ApiError> {
        let active = AssignmentFilter {
            coach_id: None,
            client_id: Some(client_id),
            include_archived: false,
        };

        let (plans, programs, paths, path_progress, completed_articles, recent, shopping_list_count) =
            tokio::try_join!(
                NutritionPlanRepository::list(pool, active),
                WorkoutRepository::list(pool, active),
                LearningPathRepository::list(pool, client_id, false, None),
                PathProgressRepository::list_for_user(pool, client_id),
                ArticleProgressRepository::count_completed(pool, client_id),
                ArticleProgressRepository::recently_completed(pool, client_id, RECENT_ARTICLES),
                ShoppingListRepository::count_for_client(pool, client_id),
            )
            .map_err(ApiError::Internal)?;

        let visible: HashSet<Uuid> = paths.iter().map(|p| p.id).collect();
        let mut learning = learning_summary(&visible, &path_progress);
        learning.completed_articles = completed_articles;

        Ok(ClientDashboard {
            nutrition_plans: plans.into_iter().map(nutrition_plan::to_response).collect(),
            workout_programs: programs.into_iter().map(workout::to_response).collect(),
            learning,
            recent_articles: recent
                .into_iter()
                .map(|a| RecentArticle {
                    id: a.id,
                    title: a.title,
                    completed_at: a.completed_at,
                })
                .collect(),
            shopping_list_count,
        })
    }
}

/// Path counts over the paths the client can currently see
fn learning_summary(visible: &HashSet<Uuid>, progress: &[PathProgressRecord]) -> LearningSummary {
    let mut summary = LearningSummary {
        total_paths: visible.len(),
        ..Default::default()
    };
    for record in progress.iter().filter(|p| visible.contains(&p.path_id)) {
        match record.status() {
            ProgressStatus::Completed => summary.completed_paths += 1,
            ProgressStatus::InProgress => summary.in_progress_paths += 1,
        }
    }
    summary
}
