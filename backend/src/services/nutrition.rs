//! Recipe service - recipes, their ingredients and cached nutrition

use super::article::normalize_tags;
use super::{dec_to_f64, f64_to_dec};
use crate::auth::access::{ensure_owner, require_coach};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::repositories::{
    AddRecipeIngredient, CreateRecipe, FoodItemRepository, Recipe, RecipeIngredient,
    RecipeMacroCache, RecipeRepository, UpdateRecipe,
};
use coaching_platform_shared::types::{
    AddIngredientRequest, CreateRecipeRequest, MacroTotals, RecipeDetailResponse,
    RecipeIngredientResponse, RecipeResponse, UpdateRecipeRequest,
};
use coaching_platform_shared::validation::{
    validate_minutes, validate_quantity, validate_required_text, ValidationError,
};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Recipe service
pub struct RecipeService;

impl RecipeService {
    /// Recipes the user can see: own, public, and those in plans assigned to them
    pub async fn list(pool: &PgPool, user: &AuthUser) -> Result<Vec<RecipeResponse>, ApiError> {
        let recipes = RecipeRepository::list_visible(pool, user.user_id)
            .await
            .map_err(ApiError::Internal)?;

        Ok(recipes.into_iter().map(to_response).collect())
    }

    pub async fn get(
        pool: &PgPool,
        user: &AuthUser,
        recipe_id: Uuid,
    ) -> Result<RecipeDetailResponse, ApiError> {
        let visible = RecipeRepository::is_visible_to(pool, recipe_id, user.user_id)
            .await
            .map_err(ApiError::Internal)?;
        if !visible {
            return Err(ApiError::NotFound("Recipe not found".to_string()));
        }

        Self::detail(pool, recipe_id).await
    }

    /// Create a recipe with its ingredients and cached nutrition in one transaction
    pub async fn create(
        pool: &PgPool,
        user: &AuthUser,
        request: CreateRecipeRequest,
    ) -> Result<RecipeDetailResponse, ApiError> {
        require_coach(user)?;

        ValidationError::check("name", validate_required_text(&request.name, 200))?;
        ValidationError::check("servings", validate_quantity(request.servings))?;
        validate_times(request.prep_minutes, request.cook_minutes)?;
        let tags = normalize_tags(request.tags)?;
        for ingredient in &request.ingredients {
            ValidationError::check("servings", validate_quantity(ingredient.servings))?;
            ensure_food_exists(pool, ingredient.food_item_id).await?;
        }

        let mut tx = pool.begin().await.map_err(ApiError::Database)?;

        let recipe = RecipeRepository::create(
            &mut *tx,
            CreateRecipe {
                coach_id: user.user_id,
                name: request.name.trim().to_string(),
                description: request.description,
                instructions: request.instructions,
                servings: f64_to_dec(request.servings),
                prep_minutes: request.prep_minutes,
                cook_minutes: request.cook_minutes,
                tags,
                is_public: request.is_public,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        for (index, ingredient) in request.ingredients.iter().enumerate() {
            RecipeRepository::add_ingredient(
                &mut *tx,
                AddRecipeIngredient {
                    recipe_id: recipe.id,
                    food_item_id: ingredient.food_item_id,
                    servings: f64_to_dec(ingredient.servings),
                    sort_order: ingredient.sort_order.unwrap_or(index as i32),
                },
            )
            .await
            .map_err(ApiError::Internal)?;
        }
        refresh_in(&mut tx, recipe.id, recipe.servings).await?;

        tx.commit().await.map_err(ApiError::Database)?;

        tracing::info!(recipe_id = %recipe.id, coach_id = %user.user_id, "Recipe created");
        Self::detail(pool, recipe.id).await
    }

    pub async fn update(
        pool: &PgPool,
        user: &AuthUser,
        recipe_id: Uuid,
        request: UpdateRecipeRequest,
    ) -> Result<RecipeDetailResponse, ApiError> {
        let recipe = Self::find(pool, recipe_id).await?;
        ensure_owner(recipe.coach_id, user)?;

        if let Some(name) = &request.name {
            ValidationError::check("name", validate_required_text(name, 200))?;
        }
        if let Some(servings) = request.servings {
            ValidationError::check("servings", validate_quantity(servings))?;
        }
        validate_times(request.prep_minutes, request.cook_minutes)?;
        let tags = request.tags.map(normalize_tags).transpose()?;

        let updates = UpdateRecipe {
            name: request.name.map(|n| n.trim().to_string()),
            description: request.description,
            instructions: request.instructions,
            servings: request.servings.map(f64_to_dec),
            prep_minutes: request.prep_minutes,
            cook_minutes: request.cook_minutes,
            tags,
            is_public: request.is_public,
        };

        let mut tx = pool.begin().await.map_err(ApiError::Database)?;
        let updated = RecipeRepository::update(&mut *tx, recipe_id, updates)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;
        if updated.servings != recipe.servings {
            refresh_in(&mut tx, recipe_id, updated.servings).await?;
        }
        tx.commit().await.map_err(ApiError::Database)?;

        Self::detail(pool, recipe_id).await
    }

    /// Add an ingredient, or replace its servings if the food is already listed
    pub async fn add_ingredient(
        pool: &PgPool,
        user: &AuthUser,
        recipe_id: Uuid,
        request: AddIngredientRequest,
    ) -> Result<RecipeDetailResponse, ApiError> {
        let recipe = Self::find(pool, recipe_id).await?;
        ensure_owner(recipe.coach_id, user)?;

        ValidationError::check("servings", validate_quantity(request.servings))?;
        ensure_food_exists(pool, request.food_item_id).await?;

        let mut tx = pool.begin().await.map_err(ApiError::Database)?;
        let existing = RecipeRepository::get_ingredients(&mut *tx, recipe_id)
            .await
            .map_err(ApiError::Internal)?;
        let sort_order = request.sort_order.unwrap_or(existing.len() as i32);

        RecipeRepository::add_ingredient(
            &mut *tx,
            AddRecipeIngredient {
                recipe_id,
                food_item_id: request.food_item_id,
                servings: f64_to_dec(request.servings),
                sort_order,
            },
        )
        .await
        .map_err(ApiError::Internal)?;
        refresh_in(&mut tx, recipe_id, recipe.servings).await?;
        tx.commit().await.map_err(ApiError::Database)?;

        Self::detail(pool, recipe_id).await
    }

    pub async fn remove_ingredient(
        pool: &PgPool,
        user: &AuthUser,
        recipe_id: Uuid,
        food_item_id: Uuid,
    ) -> Result<RecipeDetailResponse, ApiError> {
        let recipe = Self::find(pool, recipe_id).await?;
        ensure_owner(recipe.coach_id, user)?;

        let mut tx = pool.begin().await.map_err(ApiError::Database)?;
        let removed = RecipeRepository::remove_ingredient(&mut *tx, recipe_id, food_item_id)
            .await
            .map_err(ApiError::Internal)?;
        if !removed {
            return Err(ApiError::NotFound("Ingredient not found in recipe".to_string()));
        }
        refresh_in(&mut tx, recipe_id, recipe.servings).await?;
        tx.commit().await.map_err(ApiError::Database)?;

        Self::detail(pool, recipe_id).await
    }

    /// Delete a recipe that no nutrition plan schedules
    pub async fn delete(pool: &PgPool, user: &AuthUser, recipe_id: Uuid) -> Result<(), ApiError> {
        let recipe = Self::find(pool, recipe_id).await?;
        ensure_owner(recipe.coach_id, user)?;

        let scheduled = RecipeRepository::is_scheduled(pool, recipe_id)
            .await
            .map_err(ApiError::Internal)?;
        if scheduled {
            return Err(ApiError::Conflict(
                "Recipe is scheduled in a nutrition plan".to_string(),
            ));
        }

        RecipeRepository::delete(pool, recipe_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(())
    }

    /// Recompute and store a recipe's cached per-serving macros
    pub async fn refresh_nutrition(pool: &PgPool, recipe_id: Uuid) -> Result<(), ApiError> {
        let mut tx = pool.begin().await.map_err(ApiError::Database)?;
        let recipe = RecipeRepository::find_by_id(&mut *tx, recipe_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;
        refresh_in(&mut tx, recipe_id, recipe.servings).await?;
        tx.commit().await.map_err(ApiError::Database)?;
        Ok(())
    }

    async fn find(pool: &PgPool, recipe_id: Uuid) -> Result<Recipe, ApiError> {
        RecipeRepository::find_by_id(pool, recipe_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))
    }

    async fn detail(pool: &PgPool, recipe_id: Uuid) -> Result<RecipeDetailResponse, ApiError> {
        let recipe = Self::find(pool, recipe_id).await?;
        let ingredients = RecipeRepository::get_ingredients(pool, recipe_id)
            .await
            .map_err(ApiError::Internal)?;

        let nutrition = calculate_recipe_nutrition(
            &ingredients.iter().map(IngredientNutrition::from).collect::<Vec<_>>(),
            recipe.servings,
        );

        Ok(RecipeDetailResponse {
            ingredients: ingredients.into_iter().map(ingredient_response).collect(),
            totals: macro_totals(
                nutrition.total_calories,
                nutrition.total_protein,
                nutrition.total_carbs,
                nutrition.total_fat,
                nutrition.total_fiber,
            ),
            recipe: to_response(recipe),
        })
    }
}

async fn refresh_in(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    servings: Decimal,
) -> Result<RecipeNutrition, ApiError> {
    let ingredients = RecipeRepository::get_ingredients(&mut **tx, recipe_id)
        .await
        .map_err(ApiError::Internal)?;

    let nutrition = calculate_recipe_nutrition(
        &ingredients.iter().map(IngredientNutrition::from).collect::<Vec<_>>(),
        servings,
    );
    RecipeRepository::save_macro_cache(&mut **tx, recipe_id, nutrition.per_serving_cache())
        .await
        .map_err(ApiError::Internal)?;

    Ok(nutrition)
}

async fn ensure_food_exists(pool: &PgPool, food_item_id: Uuid) -> Result<(), ApiError> {
    FoodItemRepository::find_by_id(pool, food_item_id)
        .await
        .map_err(ApiError::Internal)?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Food item not found".to_string()))
}

fn validate_times(prep: Option<i32>, cook: Option<i32>) -> Result<(), ApiError> {
    if let Some(minutes) = prep {
        ValidationError::check("prep_minutes", validate_minutes(minutes))?;
    }
    if let Some(minutes) = cook {
        ValidationError::check("cook_minutes", validate_minutes(minutes))?;
    }
    Ok(())
}

/// Macro totals rounded to two decimals
pub(crate) fn macro_totals(
    calories: Decimal,
    protein: Decimal,
    carbs: Decimal,
    fat: Decimal,
    fiber: Decimal,
) -> MacroTotals {
    MacroTotals {
        calories: dec_to_f64(calories.round_dp(2)),
        protein_g: dec_to_f64(protein.round_dp(2)),
        carbohydrates_g: dec_to_f64(carbs.round_dp(2)),
        fat_g: dec_to_f64(fat.round_dp(2)),
        fiber_g: dec_to_f64(fiber.round_dp(2)),
    }
}

pub(crate) fn to_response(recipe: Recipe) -> RecipeResponse {
    RecipeResponse {
        per_serving: macro_totals(
            recipe.calories_per_serving,
            recipe.protein_per_serving,
            recipe.carbs_per_serving,
            recipe.fat_per_serving,
            recipe.fiber_per_serving,
        ),
        id: recipe.id,
        coach_id: recipe.coach_id,
        name: recipe.name,
        description: recipe.description,
        instructions: recipe.instructions,
        servings: dec_to_f64(recipe.servings),
        prep_minutes: recipe.prep_minutes,
        cook_minutes: recipe.cook_minutes,
        tags: recipe.tags,
        is_public: recipe.is_public,
    }
}

fn ingredient_response(ingredient: RecipeIngredient) -> RecipeIngredientResponse {
    let servings = ingredient.servings;
    RecipeIngredientResponse {
        nutrition: macro_totals(
            ingredient.calories * servings,
            ingredient.protein_g * servings,
            ingredient.carbohydrates_g * servings,
            ingredient.fat_g * servings,
            ingredient.fiber_g * servings,
        ),
        food_item_id: ingredient.food_item_id,
        name: ingredient.food_name,
        servings: dec_to_f64(servings),
        serving_size: dec_to_f64(ingredient.serving_size),
        serving_unit: ingredient.serving_unit,
        sort_order: ingredient.sort_order,
    }
}

/// Ingredient with its nutritional information for recipe calculation
#[derive(Debug, Clone)]
pub struct IngredientNutrition {
    pub servings: Decimal,
    pub calories_per_serving: Decimal,
    pub protein_per_serving: Decimal,
    pub carbs_per_serving: Decimal,
    pub fat_per_serving: Decimal,
    pub fiber_per_serving: Decimal,
}

impl From<&RecipeIngredient> for IngredientNutrition {
    fn from(ingredient: &RecipeIngredient) -> Self {
        Self {
            servings: ingredient.servings,
            calories_per_serving: ingredient.calories,
            protein_per_serving: ingredient.protein_g,
            carbs_per_serving: ingredient.carbohydrates_g,
            fat_per_serving: ingredient.fat_g,
            fiber_per_serving: ingredient.fiber_g,
        }
    }
}

/// Calculated recipe nutrition totals
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeNutrition {
    pub total_calories: Decimal,
    pub total_protein: Decimal,
    pub total_carbs: Decimal,
    pub total_fat: Decimal,
    pub total_fiber: Decimal,
    pub calories_per_serving: Decimal,
    pub protein_per_serving: Decimal,
    pub carbs_per_serving: Decimal,
    pub fat_per_serving: Decimal,
    pub fiber_per_serving: Decimal,
}

impl RecipeNutrition {
    fn per_serving_cache(&self) -> RecipeMacroCache {
        RecipeMacroCache {
            calories: self.calories_per_serving,
            protein: self.protein_per_serving,
            carbs: self.carbs_per_serving,
            fat: self.fat_per_serving,
            fiber: self.fiber_per_serving,
        }
    }
}

/// Calculates recipe nutrition from ingredients
///
/// For each ingredient: nutrition = ingredient_servings * food_item_nutrition_per_serving
/// Total recipe nutrition = sum of all ingredient nutritions
/// Per-serving = total / recipe_servings
pub fn calculate_recipe_nutrition(
    ingredients: &[IngredientNutrition],
    recipe_servings: Decimal,
) -> RecipeNutrition {
    let (total_cal, total_pro, total_carb, total_fat, total_fib) = ingredients.iter().fold(
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        |(cal, pro, carb, fat, fib), ing| {
            (
                cal + ing.calories_per_serving * ing.servings,
                pro + ing.protein_per_serving * ing.servings,
                carb + ing.carbs_per_serving * ing.servings,
                fat + ing.fat_per_serving * ing.servings,
                fib + ing.fiber_per_serving * ing.servings,
            )
        },
    );

    // Non-positive servings count as one
    let servings = if recipe_servings <= Decimal::ZERO {
        Decimal::ONE
    } else {
        recipe_servings
    };

    RecipeNutrition {
        total_calories: total_cal,
        total_protein: total_pro,
        total_carbs: total_carb,
        total_fat: total_fat,
        total_fiber: total_fib,
        calories_per_serving: total_cal / servings,
        protein_per_serving: total_pro / servings,
        carbs_per_serving: total_carb / servings,
        fat_per_serving: total_fat / servings,
        fiber_per_serving: total_fib / servings,
    }
}

#[cfg(test)]
mod recipe_tests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy to generate valid positive nutrition values
    fn positive_nutrition_strategy() -> impl Strategy<Value = Decimal> {
        (1u32..1000u32).prop_map(|v| Decimal::new(v as i64, 1)) // 0.1 to 99.9
    }

    /// Strategy to generate valid servings (positive)
    fn servings_strategy() -> impl Strategy<Value = Decimal> {
        (1u32..100u32).prop_map(|v| Decimal::new(v as i64, 1)) // 0.1 to 9.9
    }

    fn ingredient_strategy() -> impl Strategy<Value = IngredientNutrition> {
        (
            servings_strategy(),
            positive_nutrition_strategy(),
            positive_nutrition_strategy(),
            positive_nutrition_strategy(),
            positive_nutrition_strategy(),
            positive_nutrition_strategy(),
        )
            .prop_map(|(servings, cal, pro, carb, fat, fib)| IngredientNutrition {
                servings,
                calories_per_serving: cal,
                protein_per_serving: pro,
                carbs_per_serving: carb,
                fat_per_serving: fat,
                fiber_per_serving: fib,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Totals are the servings-weighted sum of ingredient macros and
        /// per-serving values divide them by the recipe's servings.
        #[test]
        fn prop_recipe_nutrition_calculation(
            ingredients in proptest::collection::vec(ingredient_strategy(), 1..10),
            recipe_servings in servings_strategy()
        ) {
            let expected_total_cal: Decimal = ingredients.iter()
                .map(|i| i.calories_per_serving * i.servings)
                .sum();
            let expected_total_pro: Decimal = ingredients.iter()
                .map(|i| i.protein_per_serving * i.servings)
                .sum();
            let expected_total_fib: Decimal = ingredients.iter()
                .map(|i| i.fiber_per_serving * i.servings)
                .sum();

            let result = calculate_recipe_nutrition(&ingredients, recipe_servings);

            prop_assert_eq!(result.total_calories, expected_total_cal);
            prop_assert_eq!(result.total_protein, expected_total_pro);
            prop_assert_eq!(result.total_fiber, expected_total_fib);
            prop_assert_eq!(result.calories_per_serving, expected_total_cal / recipe_servings);
            prop_assert_eq!(result.protein_per_serving, expected_total_pro / recipe_servings);
        }

        #[test]
        fn prop_recipe_empty(recipe_servings in servings_strategy()) {
            let result = calculate_recipe_nutrition(&[], recipe_servings);

            prop_assert_eq!(result.total_calories, Decimal::ZERO);
            prop_assert_eq!(result.total_protein, Decimal::ZERO);
            prop_assert_eq!(result.total_carbs, Decimal::ZERO);
            prop_assert_eq!(result.total_fat, Decimal::ZERO);
            prop_assert_eq!(result.total_fiber, Decimal::ZERO);
        }

        /// Doubling recipe servings halves per-serving nutrition
        #[test]
        fn prop_recipe_servings_scaling(
            ingredients in proptest::collection::vec(ingredient_strategy(), 1..5),
            base_servings in (1u32..50u32).prop_map(|v| Decimal::new(v as i64, 0))
        ) {
            let result1 = calculate_recipe_nutrition(&ingredients, base_servings);
            let result2 = calculate_recipe_nutrition(&ingredients, base_servings * Decimal::new(2, 0));

            prop_assert_eq!(result1.total_calories, result2.total_calories);

            let expected_per_serving = result1.calories_per_serving / Decimal::new(2, 0);
            let diff = (result2.calories_per_serving - expected_per_serving).abs();
            prop_assert!(diff < Decimal::new(1, 10));
        }
    }

    #[test]
    fn test_recipe_calculation_basic() {
        let ingredients = vec![
            IngredientNutrition {
                servings: Decimal::new(2, 0),
                calories_per_serving: Decimal::new(100, 0),
                protein_per_serving: Decimal::new(10, 0),
                carbs_per_serving: Decimal::new(20, 0),
                fat_per_serving: Decimal::new(5, 0),
                fiber_per_serving: Decimal::new(2, 0),
            },
            IngredientNutrition {
                servings: Decimal::new(1, 0),
                calories_per_serving: Decimal::new(50, 0),
                protein_per_serving: Decimal::new(5, 0),
                carbs_per_serving: Decimal::new(10, 0),
                fat_per_serving: Decimal::new(2, 0),
                fiber_per_serving: Decimal::new(1, 0),
            },
        ];

        // 2*100 + 1*50 = 250 calories over 2 servings
        let result = calculate_recipe_nutrition(&ingredients, Decimal::new(2, 0));

        assert_eq!(result.total_calories, Decimal::new(250, 0));
        assert_eq!(result.calories_per_serving, Decimal::new(125, 0));
        assert_eq!(result.total_protein, Decimal::new(25, 0));
        assert_eq!(result.protein_per_serving, Decimal::new(125, 1));

        let cache = result.per_serving_cache();
        assert_eq!(cache.calories, Decimal::new(125, 0));
        assert_eq!(cache.fiber, Decimal::new(25, 1));
    }

    #[test]
    fn test_recipe_zero_servings_defaults_to_one() {
        let ingredients = vec![IngredientNutrition {
            servings: Decimal::ONE,
            calories_per_serving: Decimal::new(100, 0),
            protein_per_serving: Decimal::new(10, 0),
            carbs_per_serving: Decimal::new(20, 0),
            fat_per_serving: Decimal::new(5, 0),
            fiber_per_serving: Decimal::new(2, 0),
        }];

        let result = calculate_recipe_nutrition(&ingredients, Decimal::ZERO);

        assert_eq!(result.total_calories, Decimal::new(100, 0));
        assert_eq!(result.calories_per_serving, Decimal::new(100, 0));
    }

    #[test]
    fn test_ingredient_response_scales_by_servings() {
        let response = ingredient_response(RecipeIngredient {
            recipe_id: Uuid::new_v4(),
            food_item_id: Uuid::new_v4(),
            servings: Decimal::new(15, 1),
            sort_order: 0,
            food_name: "Rice".to_string(),
            serving_size: Decimal::new(100, 0),
            serving_unit: "g".to_string(),
            calories: Decimal::new(130, 0),
            protein_g: Decimal::new(27, 1),
            carbohydrates_g: Decimal::new(28, 0),
            fat_g: Decimal::new(3, 1),
            fiber_g: Decimal::new(4, 1),
        });

        assert_eq!(response.servings, 1.5);
        assert_eq!(response.nutrition.calories, 195.0);
        assert_eq!(response.nutrition.protein_g, 4.05);
    }

    #[test]
    fn test_validate_times() {
        assert!(validate_times(Some(10), None).is_ok());
        let err = validate_times(None, Some(-5)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidField(ref e) if e.field == "cook_minutes"));
    }
}
