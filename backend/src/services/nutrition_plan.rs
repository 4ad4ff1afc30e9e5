//! Nutrition plan service - weekly meal schedules and their daily summaries

use super::nutrition::macro_totals;
use super::{dec_to_f64, f64_to_dec, round2};
use crate::auth::access::{ensure_can_view_assignment, ensure_coach_of, ensure_owner, require_coach};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::repositories::{
    AssignmentFilter, CreateNutritionPlan, NewPlanMeal, NutritionPlan, NutritionPlanRepository,
    PlanMeal, RecipeRepository, UpdateNutritionPlan,
};
use coaching_platform_shared::types::{
    AssignmentListQuery, CreateNutritionPlanRequest, DayNutritionSummary, MacroTotals,
    NutritionPlanDetailResponse, NutritionPlanResponse, NutritionPlanSummaryResponse,
    PlanMealRequest, PlanMealResponse, UpdateNutritionPlanRequest,
};
use coaching_platform_shared::validation::{
    validate_day, validate_quantity, validate_required_text, ValidationError,
};
use coaching_platform_shared::MealType;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

pub struct NutritionPlanService;

impl NutritionPlanService {
    /// Coaches list their own plans, optionally for one client; clients list
    /// the plans assigned to them
    pub async fn list(
        pool: &PgPool,
        user: &AuthUser,
        query: &AssignmentListQuery,
    ) -> Result<Vec<NutritionPlanResponse>, ApiError> {
        let filter = assignment_filter(user, query);
        let plans = NutritionPlanRepository::list(pool, filter)
            .await
            .map_err(ApiError::Internal)?;

        Ok(plans.into_iter().map(to_response).collect())
    }

    pub async fn get(
        pool: &PgPool,
        user: &AuthUser,
        plan_id: Uuid,
    ) -> Result<NutritionPlanDetailResponse, ApiError> {
        let plan = Self::find(pool, plan_id).await?;
        ensure_can_view_assignment(plan.coach_id, plan.client_id, user, "Nutrition plan")?;

        Self::detail(pool, plan).await
    }

    pub async fn create(
        pool: &PgPool,
        user: &AuthUser,
        request: CreateNutritionPlanRequest,
    ) -> Result<NutritionPlanDetailResponse, ApiError> {
        require_coach(user)?;

        ValidationError::check("name", validate_required_text(&request.name, 200))?;
        validate_targets(
            request.target_calories,
            request.target_protein_g,
            request.target_carbohydrates_g,
            request.target_fat_g,
        )?;
        validate_dates(request.start_date, request.end_date)?;
        if let Some(client_id) = request.client_id {
            ensure_coach_of(pool, user, client_id).await?;
        }
        let meals = prepare_meals(pool, user, &request.meals).await?;

        let plan_id = NutritionPlanRepository::create(
            pool,
            CreateNutritionPlan {
                coach_id: user.user_id,
                client_id: request.client_id,
                name: request.name.trim().to_string(),
                description: request.description,
                target_calories: request.target_calories,
                target_protein_g: request.target_protein_g,
                target_carbohydrates_g: request.target_carbohydrates_g,
                target_fat_g: request.target_fat_g,
                start_date: request.start_date,
                end_date: request.end_date,
                meals,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        tracing::info!(%plan_id, coach_id = %user.user_id, "Nutrition plan created");
        let plan = Self::find(pool, plan_id).await?;
        Self::detail(pool, plan).await
    }

    pub async fn update(
        pool: &PgPool,
        user: &AuthUser,
        plan_id: Uuid,
        request: UpdateNutritionPlanRequest,
    ) -> Result<NutritionPlanDetailResponse, ApiError> {
        let plan = Self::find(pool, plan_id).await?;
        ensure_owner(plan.coach_id, user)?;

        if let Some(name) = &request.name {
            ValidationError::check("name", validate_required_text(name, 200))?;
        }
        validate_targets(
            request.target_calories,
            request.target_protein_g,
            request.target_carbohydrates_g,
            request.target_fat_g,
        )?;
        validate_dates(
            request.start_date.or(plan.start_date),
            request.end_date.or(plan.end_date),
        )?;
        if let Some(client_id) = request.client_id {
            ensure_coach_of(pool, user, client_id).await?;
        }

        let updates = UpdateNutritionPlan {
            name: request.name.map(|n| n.trim().to_string()),
            description: request.description,
            client_id: request.client_id,
            target_calories: request.target_calories,
            target_protein_g: request.target_protein_g,
            target_carbohydrates_g: request.target_carbohydrates_g,
            target_fat_g: request.target_fat_g,
            start_date: request.start_date,
            end_date: request.end_date,
            is_archived: request.is_archived,
        };
        NutritionPlanRepository::update(pool, plan_id, updates)
            .await
            .map_err(ApiError::Internal)?;

        let plan = Self::find(pool, plan_id).await?;
        Self::detail(pool, plan).await
    }

    /// Replace the plan's whole meal schedule
    pub async fn set_meals(
        pool: &PgPool,
        user: &AuthUser,
        plan_id: Uuid,
        meals: Vec<PlanMealRequest>,
    ) -> Result<NutritionPlanDetailResponse, ApiError> {
        let plan = Self::find(pool, plan_id).await?;
        ensure_owner(plan.coach_id, user)?;

        let meals = prepare_meals(pool, user, &meals).await?;
        NutritionPlanRepository::set_meals(pool, plan_id, &meals)
            .await
            .map_err(ApiError::Internal)?;

        Self::detail(pool, plan).await
    }

    pub async fn delete(pool: &PgPool, user: &AuthUser, plan_id: Uuid) -> Result<(), ApiError> {
        let plan = Self::find(pool, plan_id).await?;
        ensure_owner(plan.coach_id, user)?;

        NutritionPlanRepository::delete(pool, plan_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(())
    }

    /// Per-day macro totals compared with the plan's daily targets
    pub async fn summary(
        pool: &PgPool,
        user: &AuthUser,
        plan_id: Uuid,
    ) -> Result<NutritionPlanSummaryResponse, ApiError> {
        let plan = Self::find(pool, plan_id).await?;
        ensure_can_view_assignment(plan.coach_id, plan.client_id, user, "Nutrition plan")?;

        let meals = NutritionPlanRepository::meals(pool, plan_id)
            .await
            .map_err(ApiError::Internal)?;

        let days = summarize_plan_days(&meals, &PlanTargets::from(&plan));
        let average = daily_average(&days);

        Ok(NutritionPlanSummaryResponse {
            plan_id,
            days,
            daily_average: average,
        })
    }

    async fn find(pool: &PgPool, plan_id: Uuid) -> Result<NutritionPlan, ApiError> {
        NutritionPlanRepository::find_by_id(pool, plan_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Nutrition plan not found".to_string()))
    }

    async fn detail(
        pool: &PgPool,
        plan: NutritionPlan,
    ) -> Result<NutritionPlanDetailResponse, ApiError> {
        let meals = NutritionPlanRepository::meals(pool, plan.id)
            .await
            .map_err(ApiError::Internal)?;

        Ok(NutritionPlanDetailResponse {
            plan: to_response(plan),
            meals: meals.into_iter().map(meal_response).collect(),
        })
    }
}

pub(crate) fn assignment_filter(user: &AuthUser, query: &AssignmentListQuery) -> AssignmentFilter {
    if user.is_coach() {
        AssignmentFilter {
            coach_id: Some(user.user_id),
            client_id: query.client_id,
            include_archived: query.include_archived,
        }
    } else {
        AssignmentFilter {
            coach_id: None,
            client_id: Some(user.user_id),
            include_archived: query.include_archived,
        }
    }
}

/// Validate meal rows and check that every recipe is usable by the coach
async fn prepare_meals(
    pool: &PgPool,
    user: &AuthUser,
    meals: &[PlanMealRequest],
) -> Result<Vec<NewPlanMeal>, ApiError> {
    for meal in meals {
        ValidationError::check("day", validate_day(meal.day))?;
        ValidationError::check("servings", validate_quantity(meal.servings))?;
    }

    let recipe_ids: Vec<Uuid> = meals
        .iter()
        .map(|m| m.recipe_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    if !recipe_ids.is_empty() {
        let recipes = RecipeRepository::find_many(pool, &recipe_ids)
            .await
            .map_err(ApiError::Internal)?;
        let usable: HashSet<Uuid> = recipes
            .iter()
            .filter(|r| r.is_public || r.coach_id == user.user_id)
            .map(|r| r.id)
            .collect();
        if let Some(missing) = recipe_ids.iter().find(|id| !usable.contains(id)) {
            return Err(ValidationError::new("recipe_id", &format!("unknown recipe {}", missing)).into());
        }
    }

    Ok(meals
        .iter()
        .enumerate()
        .map(|(index, meal)| NewPlanMeal {
            day: meal.day,
            meal_type: meal.meal_type.as_str().to_string(),
            recipe_id: meal.recipe_id,
            servings: f64_to_dec(meal.servings),
            sort_order: meal.sort_order.unwrap_or(index as i32),
        })
        .collect())
}

fn validate_targets(
    calories: Option<i32>,
    protein: Option<i32>,
    carbs: Option<i32>,
    fat: Option<i32>,
) -> Result<(), ApiError> {
    let fields = [
        ("target_calories", calories),
        ("target_protein_g", protein),
        ("target_carbohydrates_g", carbs),
        ("target_fat_g", fat),
    ];
    for (field, value) in fields {
        if matches!(value, Some(v) if v < 0) {
            return Err(ValidationError::new(field, "cannot be negative").into());
        }
    }
    Ok(())
}

fn validate_dates(
    start: Option<chrono::NaiveDate>,
    end: Option<chrono::NaiveDate>,
) -> Result<(), ApiError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(ValidationError::new("end_date", "must not be before start_date").into())
        }
        _ => Ok(()),
    }
}

/// Macros for one scheduled meal: servings × the recipe's cached per-serving values
fn meal_macros(meal: &PlanMeal) -> [Decimal; 5] {
    [
        meal.calories_per_serving * meal.servings,
        meal.protein_per_serving * meal.servings,
        meal.carbs_per_serving * meal.servings,
        meal.fat_per_serving * meal.servings,
        meal.fiber_per_serving * meal.servings,
    ]
}

/// Daily targets of a plan; a target of zero or less is treated as unset
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanTargets {
    pub calories: Option<i32>,
    pub protein_g: Option<i32>,
    pub carbohydrates_g: Option<i32>,
    pub fat_g: Option<i32>,
}

impl From<&NutritionPlan> for PlanTargets {
    fn from(plan: &NutritionPlan) -> Self {
        Self {
            calories: plan.target_calories,
            protein_g: plan.target_protein_g,
            carbohydrates_g: plan.target_carbohydrates_g,
            fat_g: plan.target_fat_g,
        }
    }
}

fn percent_of_target(value: f64, target: Option<i32>) -> Option<f64> {
    target
        .filter(|target| *target > 0)
        .map(|target| round2(value / target as f64 * 100.0))
}

/// Sum meals per day, in day order; days without meals are omitted
pub fn summarize_plan_days(meals: &[PlanMeal], targets: &PlanTargets) -> Vec<DayNutritionSummary> {
    let mut days: BTreeMap<i32, (usize, [Decimal; 5])> = BTreeMap::new();
    for meal in meals {
        let entry = days.entry(meal.day).or_insert((0, [Decimal::ZERO; 5]));
        entry.0 += 1;
        for (total, value) in entry.1.iter_mut().zip(meal_macros(meal)) {
            *total += value;
        }
    }

    days.into_iter()
        .map(|(day, (meal_count, [cal, pro, carb, fat, fib]))| {
            let totals = macro_totals(cal, pro, carb, fat, fib);
            DayNutritionSummary {
                day,
                meal_count,
                calories_percent_of_target: percent_of_target(totals.calories, targets.calories),
                protein_percent_of_target: percent_of_target(totals.protein_g, targets.protein_g),
                carbohydrates_percent_of_target: percent_of_target(
                    totals.carbohydrates_g,
                    targets.carbohydrates_g,
                ),
                fat_percent_of_target: percent_of_target(totals.fat_g, targets.fat_g),
                totals,
            }
        })
        .collect()
}

/// Average over the summarized days
pub fn daily_average(days: &[DayNutritionSummary]) -> MacroTotals {
    if days.is_empty() {
        return MacroTotals::default();
    }
    let n = days.len() as f64;
    let sum = |f: fn(&MacroTotals) -> f64| round2(days.iter().map(|d| f(&d.totals)).sum::<f64>() / n);

    MacroTotals {
        calories: sum(|t| t.calories),
        protein_g: sum(|t| t.protein_g),
        carbohydrates_g: sum(|t| t.carbohydrates_g),
        fat_g: sum(|t| t.fat_g),
        fiber_g: sum(|t| t.fiber_g),
    }
}

pub(crate) fn to_response(plan: NutritionPlan) -> NutritionPlanResponse {
    NutritionPlanResponse {
        id: plan.id,
        coach_id: plan.coach_id,
        client_id: plan.client_id,
        name: plan.name,
        description: plan.description,
        target_calories: plan.target_calories,
        target_protein_g: plan.target_protein_g,
        target_carbohydrates_g: plan.target_carbohydrates_g,
        target_fat_g: plan.target_fat_g,
        start_date: plan.start_date,
        end_date: plan.end_date,
        is_archived: plan.is_archived,
        created_at: plan.created_at,
        updated_at: plan.updated_at,
    }
}

fn meal_response(meal: PlanMeal) -> PlanMealResponse {
    let [cal, pro, carb, fat, fib] = meal_macros(&meal);
    PlanMealResponse {
        id: meal.id,
        day: meal.day,
        // Stored values come from MealType::as_str
        meal_type: meal.meal_type.parse().unwrap_or(MealType::Snack),
        recipe_id: meal.recipe_id,
        recipe_name: meal.recipe_name,
        servings: dec_to_f64(meal.servings),
        sort_order: meal.sort_order,
        nutrition: macro_totals(cal, pro, carb, fat, fib),
    }
}
