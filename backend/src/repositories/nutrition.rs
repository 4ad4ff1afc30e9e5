//! Nutrition repository - food catalog, recipes and recipe ingredients

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Food item from the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FoodItem {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: Decimal,
    pub serving_unit: String,
    pub calories: Decimal,
    pub protein_g: Decimal,
    pub carbohydrates_g: Decimal,
    pub fat_g: Decimal,
    pub fiber_g: Decimal,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new food item
#[derive(Debug, Clone)]
pub struct CreateFoodItem {
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: Decimal,
    pub serving_unit: String,
    pub calories: Decimal,
    pub protein_g: Decimal,
    pub carbohydrates_g: Decimal,
    pub fat_g: Decimal,
    pub fiber_g: Decimal,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateFoodItem {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub serving_size: Option<Decimal>,
    pub serving_unit: Option<String>,
    pub calories: Option<Decimal>,
    pub protein_g: Option<Decimal>,
    pub carbohydrates_g: Option<Decimal>,
    pub fat_g: Option<Decimal>,
    pub fiber_g: Option<Decimal>,
}

const FOOD_COLUMNS: &str = "id, name, brand, serving_size, serving_unit, calories, protein_g, \
                            carbohydrates_g, fat_g, fiber_g, created_by, created_at, updated_at";

/// Food item repository
pub struct FoodItemRepository;

impl FoodItemRepository {
    /// Search food items using full-text search with a substring fallback
    pub async fn search(db: &PgPool, query: &str, limit: i64) -> Result<Vec<FoodItem>> {
        let items = sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            SELECT {FOOD_COLUMNS}
            FROM food_items
            WHERE to_tsvector('english', name || ' ' || COALESCE(brand, ''))
                  @@ plainto_tsquery('english', $1)
               OR name ILIKE $2
            ORDER BY
                ts_rank(to_tsvector('english', name || ' ' || COALESCE(brand, '')),
                        plainto_tsquery('english', $1)) DESC,
                name ASC
            LIMIT $3
            "#
        ))
        .bind(query)
        .bind(format!("%{}%", super::article::escape_like(query)))
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(items)
    }

    /// List food items alphabetically
    pub async fn list(db: &PgPool, limit: i64) -> Result<Vec<FoodItem>> {
        let items = sqlx::query_as::<_, FoodItem>(&format!(
            "SELECT {FOOD_COLUMNS} FROM food_items ORDER BY name ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(items)
    }

    /// Find food item by ID
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<FoodItem>> {
        let item = sqlx::query_as::<_, FoodItem>(&format!(
            "SELECT {FOOD_COLUMNS} FROM food_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(item)
    }

    /// Create a new food item
    pub async fn create(db: &PgPool, input: CreateFoodItem) -> Result<FoodItem> {
        let item = sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            INSERT INTO food_items (
                name, brand, serving_size, serving_unit,
                calories, protein_g, carbohydrates_g, fat_g, fiber_g, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {FOOD_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.brand)
        .bind(input.serving_size)
        .bind(&input.serving_unit)
        .bind(input.calories)
        .bind(input.protein_g)
        .bind(input.carbohydrates_g)
        .bind(input.fat_g)
        .bind(input.fiber_g)
        .bind(input.created_by)
        .fetch_one(db)
        .await?;

        Ok(item)
    }

    pub async fn update(db: &PgPool, id: Uuid, updates: UpdateFoodItem) -> Result<Option<FoodItem>> {
        let item = sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            UPDATE food_items SET
                name = COALESCE($2, name),
                brand = COALESCE($3, brand),
                serving_size = COALESCE($4, serving_size),
                serving_unit = COALESCE($5, serving_unit),
                calories = COALESCE($6, calories),
                protein_g = COALESCE($7, protein_g),
                carbohydrates_g = COALESCE($8, carbohydrates_g),
                fat_g = COALESCE($9, fat_g),
                fiber_g = COALESCE($10, fiber_g)
            WHERE id = $1
            RETURNING {FOOD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(updates.name)
        .bind(updates.brand)
        .bind(updates.serving_size)
        .bind(updates.serving_unit)
        .bind(updates.calories)
        .bind(updates.protein_g)
        .bind(updates.carbohydrates_g)
        .bind(updates.fat_g)
        .bind(updates.fiber_g)
        .fetch_optional(db)
        .await?;

        Ok(item)
    }

    /// Ids of recipes that use a food item
    pub async fn recipes_using(db: &PgPool, food_item_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT DISTINCT recipe_id FROM recipe_ingredients WHERE food_item_id = $1",
        )
        .bind(food_item_id)
        .fetch_all(db)
        .await?;

        Ok(ids)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM food_items WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Recipe from the database, including the cached per-serving macros
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub servings: Decimal,
    pub prep_minutes: Option<i32>,
    pub cook_minutes: Option<i32>,
    pub tags: Vec<String>,
    pub calories_per_serving: Decimal,
    pub protein_per_serving: Decimal,
    pub carbs_per_serving: Decimal,
    pub fat_per_serving: Decimal,
    pub fiber_per_serving: Decimal,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recipe ingredient joined with its food item's nutrition
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeIngredient {
    pub recipe_id: Uuid,
    pub food_item_id: Uuid,
    pub servings: Decimal,
    pub sort_order: i32,
    pub food_name: String,
    pub serving_size: Decimal,
    pub serving_unit: String,
    pub calories: Decimal,
    pub protein_g: Decimal,
    pub carbohydrates_g: Decimal,
    pub fat_g: Decimal,
    pub fiber_g: Decimal,
}

/// Input for creating a new recipe
#[derive(Debug, Clone)]
pub struct CreateRecipe {
    pub coach_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub servings: Decimal,
    pub prep_minutes: Option<i32>,
    pub cook_minutes: Option<i32>,
    pub tags: Vec<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRecipe {
    pub name: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub servings: Option<Decimal>,
    pub prep_minutes: Option<i32>,
    pub cook_minutes: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

/// Input for adding an ingredient to a recipe
#[derive(Debug, Clone)]
pub struct AddRecipeIngredient {
    pub recipe_id: Uuid,
    pub food_item_id: Uuid,
    pub servings: Decimal,
    pub sort_order: i32,
}

/// Per-serving macro values written to the recipe row
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecipeMacroCache {
    pub calories: Decimal,
    pub protein: Decimal,
    pub carbs: Decimal,
    pub fat: Decimal,
    pub fiber: Decimal,
}

const RECIPE_COLUMNS: &str = "id, coach_id, name, description, instructions, servings, \
                              prep_minutes, cook_minutes, tags, calories_per_serving, \
                              protein_per_serving, carbs_per_serving, fat_per_serving, \
                              fiber_per_serving, is_public, created_at, updated_at";

/// Visible to a user: own recipes, public ones, and those in plans assigned to them
const RECIPE_VISIBLE: &str = r#"
    (r.coach_id = $1
     OR r.is_public
     OR EXISTS (
         SELECT 1 FROM nutrition_plan_meals m
         JOIN nutrition_plans p ON p.id = m.plan_id
         WHERE m.recipe_id = r.id AND p.client_id = $1
     ))
"#;

/// Recipe repository
pub struct RecipeRepository;

impl RecipeRepository {
    /// Create a new recipe
    pub async fn create<'e, E: PgExecutor<'e>>(db: E, input: CreateRecipe) -> Result<Recipe> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            INSERT INTO recipes (
                coach_id, name, description, instructions, servings,
                prep_minutes, cook_minutes, tags, is_public
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(input.coach_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.instructions)
        .bind(input.servings)
        .bind(input.prep_minutes)
        .bind(input.cook_minutes)
        .bind(&input.tags)
        .bind(input.is_public)
        .fetch_one(db)
        .await?;

        Ok(recipe)
    }

    /// Find recipe by ID
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(db: E, id: Uuid) -> Result<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(recipe)
    }

    /// Whether `viewer_id` may read a recipe
    pub async fn is_visible_to(db: &PgPool, id: Uuid, viewer_id: Uuid) -> Result<bool> {
        let visible = sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS(SELECT 1 FROM recipes r WHERE r.id = $2 AND {RECIPE_VISIBLE})"
        ))
        .bind(viewer_id)
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(visible)
    }

    /// Recipes visible to a user, alphabetically
    pub async fn list_visible(db: &PgPool, viewer_id: Uuid) -> Result<Vec<Recipe>> {
        let recipes = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            SELECT {RECIPE_COLUMNS}
            FROM recipes r
            WHERE {RECIPE_VISIBLE}
            ORDER BY r.name ASC
            "#
        ))
        .bind(viewer_id)
        .fetch_all(db)
        .await?;

        Ok(recipes)
    }

    pub async fn find_many(db: &PgPool, ids: &[Uuid]) -> Result<Vec<Recipe>> {
        let recipes = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(db)
        .await?;

        Ok(recipes)
    }

    pub async fn update<'e, E: PgExecutor<'e>>(
        db: E,
        id: Uuid,
        updates: UpdateRecipe,
    ) -> Result<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            UPDATE recipes SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                instructions = COALESCE($4, instructions),
                servings = COALESCE($5, servings),
                prep_minutes = COALESCE($6, prep_minutes),
                cook_minutes = COALESCE($7, cook_minutes),
                tags = COALESCE($8, tags),
                is_public = COALESCE($9, is_public)
            WHERE id = $1
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(updates.name)
        .bind(updates.description)
        .bind(updates.instructions)
        .bind(updates.servings)
        .bind(updates.prep_minutes)
        .bind(updates.cook_minutes)
        .bind(updates.tags)
        .bind(updates.is_public)
        .fetch_optional(db)
        .await?;

        Ok(recipe)
    }

    /// Add ingredient to recipe, replacing the servings if already present
    pub async fn add_ingredient<'e, E: PgExecutor<'e>>(db: E, input: AddRecipeIngredient) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, food_item_id, servings, sort_order)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (recipe_id, food_item_id)
            DO UPDATE SET servings = EXCLUDED.servings, sort_order = EXCLUDED.sort_order
            "#,
        )
        .bind(input.recipe_id)
        .bind(input.food_item_id)
        .bind(input.servings)
        .bind(input.sort_order)
        .execute(db)
        .await?;

        Ok(())
    }

    /// Get ingredients for a recipe with their food nutrition
    pub async fn get_ingredients<'e, E: PgExecutor<'e>>(
        db: E,
        recipe_id: Uuid,
    ) -> Result<Vec<RecipeIngredient>> {
        let ingredients = sqlx::query_as::<_, RecipeIngredient>(
            r#"
            SELECT ri.recipe_id, ri.food_item_id, ri.servings, ri.sort_order,
                   f.name AS food_name, f.serving_size, f.serving_unit,
                   f.calories, f.protein_g, f.carbohydrates_g, f.fat_g, f.fiber_g
            FROM recipe_ingredients ri
            JOIN food_items f ON f.id = ri.food_item_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.sort_order ASC, f.name ASC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(db)
        .await?;

        Ok(ingredients)
    }

    /// Remove ingredient from recipe
    pub async fn remove_ingredient<'e, E: PgExecutor<'e>>(
        db: E,
        recipe_id: Uuid,
        food_item_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM recipe_ingredients WHERE recipe_id = $1 AND food_item_id = $2",
        )
        .bind(recipe_id)
        .bind(food_item_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the cached per-serving macros
    pub async fn save_macro_cache<'e, E: PgExecutor<'e>>(
        db: E,
        recipe_id: Uuid,
        cache: RecipeMacroCache,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE recipes SET
                calories_per_serving = $2,
                protein_per_serving = $3,
                carbs_per_serving = $4,
                fat_per_serving = $5,
                fiber_per_serving = $6
            WHERE id = $1
            "#,
        )
        .bind(recipe_id)
        .bind(cache.calories.round_dp(2))
        .bind(cache.protein.round_dp(2))
        .bind(cache.carbs.round_dp(2))
        .bind(cache.fat.round_dp(2))
        .bind(cache.fiber.round_dp(2))
        .execute(db)
        .await?;

        Ok(())
    }

    /// Whether any nutrition plan schedules this recipe
    pub async fn is_scheduled(db: &PgPool, recipe_id: Uuid) -> Result<bool> {
        let used = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM nutrition_plan_meals WHERE recipe_id = $1)",
        )
        .bind(recipe_id)
        .fetch_one(db)
        .await?;

        Ok(used)
    }

    pub async fn delete(db: &PgPool, recipe_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_coach(db: &PgPool, coach_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipes WHERE coach_id = $1")
            .bind(coach_id)
            .fetch_one(db)
            .await?;

        Ok(count)
    }
}
