//! Nutrition plan repository - weekly meal schedules assigned to clients

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NutritionPlan {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub client_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub target_calories: Option<i32>,
    pub target_protein_g: Option<i32>,
    pub target_carbohydrates_g: Option<i32>,
    pub target_fat_g: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A scheduled meal joined with its recipe's cached per-serving macros
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlanMeal {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub day: i32,
    pub meal_type: String,
    pub recipe_id: Uuid,
    pub recipe_name: String,
    pub servings: Decimal,
    pub sort_order: i32,
    pub calories_per_serving: Decimal,
    pub protein_per_serving: Decimal,
    pub carbs_per_serving: Decimal,
    pub fat_per_serving: Decimal,
    pub fiber_per_serving: Decimal,
}

/// One ingredient occurrence across a plan's meals
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlanIngredient {
    pub food_item_id: Uuid,
    pub food_name: String,
    pub serving_size: Decimal,
    pub serving_unit: String,
    pub ingredient_servings: Decimal,
    pub recipe_servings: Decimal,
    pub meal_servings: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewPlanMeal {
    pub day: i32,
    pub meal_type: String,
    pub recipe_id: Uuid,
    pub servings: Decimal,
    pub sort_order: i32,
}

#[derive(Debug, Clone)]
pub struct CreateNutritionPlan {
    pub coach_id: Uuid,
    pub client_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub target_calories: Option<i32>,
    pub target_protein_g: Option<i32>,
    pub target_carbohydrates_g: Option<i32>,
    pub target_fat_g: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub meals: Vec<NewPlanMeal>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateNutritionPlan {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client_id: Option<Uuid>,
    pub target_calories: Option<i32>,
    pub target_protein_g: Option<i32>,
    pub target_carbohydrates_g: Option<i32>,
    pub target_fat_g: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_archived: Option<bool>,
}

/// Which plans to list: a coach's own, or those assigned to a client
#[derive(Debug, Clone, Copy)]
pub struct AssignmentFilter {
    pub coach_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub include_archived: bool,
}

const PLAN_COLUMNS: &str = "id, coach_id, client_id, name, description, target_calories, \
                            target_protein_g, target_carbohydrates_g, target_fat_g, start_date, \
                            end_date, is_archived, created_at, updated_at";

pub struct NutritionPlanRepository;

impl NutritionPlanRepository {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<NutritionPlan>> {
        let plan = sqlx::query_as::<_, NutritionPlan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM nutrition_plans WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(plan)
    }

    pub async fn list(db: &PgPool, filter: AssignmentFilter) -> Result<Vec<NutritionPlan>> {
        let plans = sqlx::query_as::<_, NutritionPlan>(&format!(
            r#"
            SELECT {PLAN_COLUMNS}
            FROM nutrition_plans
            WHERE ($1::UUID IS NULL OR coach_id = $1)
              AND ($2::UUID IS NULL OR client_id = $2)
              AND ($3 OR NOT is_archived)
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.coach_id)
        .bind(filter.client_id)
        .bind(filter.include_archived)
        .fetch_all(db)
        .await?;

        Ok(plans)
    }

    pub async fn create(db: &PgPool, input: CreateNutritionPlan) -> Result<Uuid> {
        let mut tx = db.begin().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO nutrition_plans (
                coach_id, client_id, name, description, target_calories, target_protein_g,
                target_carbohydrates_g, target_fat_g, start_date, end_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(input.coach_id)
        .bind(input.client_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.target_calories)
        .bind(input.target_protein_g)
        .bind(input.target_carbohydrates_g)
        .bind(input.target_fat_g)
        .bind(input.start_date)
        .bind(input.end_date)
        .fetch_one(&mut *tx)
        .await?;

        insert_meals(&mut tx, id, &input.meals).await?;

        tx.commit().await?;
        Ok(id)
    }

    pub async fn update(db: &PgPool, id: Uuid, updates: UpdateNutritionPlan) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE nutrition_plans SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                client_id = COALESCE($4, client_id),
                target_calories = COALESCE($5, target_calories),
                target_protein_g = COALESCE($6, target_protein_g),
                target_carbohydrates_g = COALESCE($7, target_carbohydrates_g),
                target_fat_g = COALESCE($8, target_fat_g),
                start_date = COALESCE($9, start_date),
                end_date = COALESCE($10, end_date),
                is_archived = COALESCE($11, is_archived)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(updates.name)
        .bind(updates.description)
        .bind(updates.client_id)
        .bind(updates.target_calories)
        .bind(updates.target_protein_g)
        .bind(updates.target_carbohydrates_g)
        .bind(updates.target_fat_g)
        .bind(updates.start_date)
        .bind(updates.end_date)
        .bind(updates.is_archived)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace the whole meal schedule of a plan
    pub async fn set_meals(db: &PgPool, plan_id: Uuid, meals: &[NewPlanMeal]) -> Result<()> {
        let mut tx = db.begin().await?;

        sqlx::query("DELETE FROM nutrition_plan_meals WHERE plan_id = $1")
            .bind(plan_id)
            .execute(&mut *tx)
            .await?;
        insert_meals(&mut tx, plan_id, meals).await?;

        sqlx::query("UPDATE nutrition_plans SET updated_at = NOW() WHERE id = $1")
            .bind(plan_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Meals of a plan ordered by day, then sort order
    pub async fn meals(db: &PgPool, plan_id: Uuid) -> Result<Vec<PlanMeal>> {
        let meals = sqlx::query_as::<_, PlanMeal>(
            r#"
            SELECT m.id, m.plan_id, m.day, m.meal_type, m.recipe_id, r.name AS recipe_name,
                   m.servings, m.sort_order,
                   r.calories_per_serving, r.protein_per_serving, r.carbs_per_serving,
                   r.fat_per_serving, r.fiber_per_serving
            FROM nutrition_plan_meals m
            JOIN recipes r ON r.id = m.recipe_id
            WHERE m.plan_id = $1
            ORDER BY m.day ASC, m.sort_order ASC
            "#,
        )
        .bind(plan_id)
        .fetch_all(db)
        .await?;

        Ok(meals)
    }

    /// Every ingredient of every scheduled meal, for shopping list generation
    pub async fn ingredients(db: &PgPool, plan_id: Uuid) -> Result<Vec<PlanIngredient>> {
        let rows = sqlx::query_as::<_, PlanIngredient>(
            r#"
            SELECT f.id AS food_item_id, f.name AS food_name, f.serving_size, f.serving_unit,
                   ri.servings AS ingredient_servings, r.servings AS recipe_servings,
                   m.servings AS meal_servings
            FROM nutrition_plan_meals m
            JOIN recipes r ON r.id = m.recipe_id
            JOIN recipe_ingredients ri ON ri.recipe_id = r.id
            JOIN food_items f ON f.id = ri.food_item_id
            WHERE m.plan_id = $1
            "#,
        )
        .bind(plan_id)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM nutrition_plans WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_coach(db: &PgPool, coach_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM nutrition_plans WHERE coach_id = $1 AND NOT is_archived",
        )
        .bind(coach_id)
        .fetch_one(db)
        .await?;

        Ok(count)
    }
}

async fn insert_meals(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    plan_id: Uuid,
    meals: &[NewPlanMeal],
) -> Result<()> {
    for meal in meals {
        sqlx::query(
            r#"
            INSERT INTO nutrition_plan_meals (plan_id, day, meal_type, recipe_id, servings, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(plan_id)
        .bind(meal.day)
        .bind(&meal.meal_type)
        .bind(meal.recipe_id)
        .bind(meal.servings)
        .bind(meal.sort_order)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
