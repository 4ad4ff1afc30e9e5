//! Food catalog service

use super::{dec_to_f64, f64_to_dec, RecipeService};
use crate::auth::access::{ensure_owner, require_coach};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::repositories::{CreateFoodItem, FoodItem, FoodItemRepository, UpdateFoodItem};
use coaching_platform_shared::types::{
    CreateFoodItemRequest, FoodItemResponse, FoodSearchQuery, UpdateFoodItemRequest,
};
use coaching_platform_shared::validation::{
    validate_nutrient, validate_quantity, validate_required_text, ValidationError,
};
use sqlx::PgPool;
use uuid::Uuid;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

pub struct FoodService;

impl FoodService {
    /// Search the catalog, or list it alphabetically when no query is given
    pub async fn search(pool: &PgPool, query: &FoodSearchQuery) -> Result<Vec<FoodItemResponse>, ApiError> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        let items = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => FoodItemRepository::search(pool, q, limit).await,
            None => FoodItemRepository::list(pool, limit).await,
        }
        .map_err(ApiError::Internal)?;

        Ok(items.into_iter().map(to_response).collect())
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<FoodItemResponse, ApiError> {
        Self::find(pool, id).await.map(to_response)
    }

    pub async fn create(
        pool: &PgPool,
        user: &AuthUser,
        request: CreateFoodItemRequest,
    ) -> Result<FoodItemResponse, ApiError> {
        require_coach(user)?;

        ValidationError::check("name", validate_required_text(&request.name, 200))?;
        ValidationError::check("serving_unit", validate_required_text(&request.serving_unit, 50))?;
        ValidationError::check("serving_size", validate_quantity(request.serving_size))?;
        validate_macros(
            Some(request.calories),
            Some(request.protein_g),
            Some(request.carbohydrates_g),
            Some(request.fat_g),
            Some(request.fiber_g),
        )?;

        let item = FoodItemRepository::create(
            pool,
            CreateFoodItem {
                name: request.name.trim().to_string(),
                brand: request.brand,
                serving_size: f64_to_dec(request.serving_size),
                serving_unit: request.serving_unit.trim().to_string(),
                calories: f64_to_dec(request.calories),
                protein_g: f64_to_dec(request.protein_g),
                carbohydrates_g: f64_to_dec(request.carbohydrates_g),
                fat_g: f64_to_dec(request.fat_g),
                fiber_g: f64_to_dec(request.fiber_g),
                created_by: Some(user.user_id),
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        Ok(to_response(item))
    }

    pub async fn update(
        pool: &PgPool,
        user: &AuthUser,
        id: Uuid,
        request: UpdateFoodItemRequest,
    ) -> Result<FoodItemResponse, ApiError> {
        let item = Self::find(pool, id).await?;
        ensure_editable(&item, user)?;

        if let Some(name) = &request.name {
            ValidationError::check("name", validate_required_text(name, 200))?;
        }
        if let Some(unit) = &request.serving_unit {
            ValidationError::check("serving_unit", validate_required_text(unit, 50))?;
        }
        if let Some(size) = request.serving_size {
            ValidationError::check("serving_size", validate_quantity(size))?;
        }
        validate_macros(
            request.calories,
            request.protein_g,
            request.carbohydrates_g,
            request.fat_g,
            request.fiber_g,
        )?;

        let updates = UpdateFoodItem {
            name: request.name.map(|n| n.trim().to_string()),
            brand: request.brand,
            serving_size: request.serving_size.map(f64_to_dec),
            serving_unit: request.serving_unit.map(|u| u.trim().to_string()),
            calories: request.calories.map(f64_to_dec),
            protein_g: request.protein_g.map(f64_to_dec),
            carbohydrates_g: request.carbohydrates_g.map(f64_to_dec),
            fat_g: request.fat_g.map(f64_to_dec),
            fiber_g: request.fiber_g.map(f64_to_dec),
        };

        let item = FoodItemRepository::update(pool, id, updates)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Food item not found".to_string()))?;

        // Recipes cache per-serving macros computed from this food
        let recipes = FoodItemRepository::recipes_using(pool, id)
            .await
            .map_err(ApiError::Internal)?;
        for recipe_id in recipes {
            RecipeService::refresh_nutrition(pool, recipe_id).await?;
        }

        Ok(to_response(item))
    }

    /// Delete a food item that no recipe uses
    pub async fn delete(pool: &PgPool, user: &AuthUser, id: Uuid) -> Result<(), ApiError> {
        let item = Self::find(pool, id).await?;
        ensure_editable(&item, user)?;

        let used_by = FoodItemRepository::recipes_using(pool, id)
            .await
            .map_err(ApiError::Internal)?;
        if !used_by.is_empty() {
            return Err(ApiError::Conflict(format!(
                "Food item is used by {} recipe(s)",
                used_by.len()
            )));
        }

        FoodItemRepository::delete(pool, id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(())
    }

    async fn find(pool: &PgPool, id: Uuid) -> Result<FoodItem, ApiError> {
        FoodItemRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Food item not found".to_string()))
    }
}

/// Catalog entries without a creator are shared reference data and read-only
fn ensure_editable(item: &FoodItem, user: &AuthUser) -> Result<(), ApiError> {
    match item.created_by {
        Some(owner) => ensure_owner(owner, user),
        None => Err(ApiError::Forbidden(
            "Reference food items cannot be modified".to_string(),
        )),
    }
}

fn validate_macros(
    calories: Option<f64>,
    protein_g: Option<f64>,
    carbohydrates_g: Option<f64>,
    fat_g: Option<f64>,
    fiber_g: Option<f64>,
) -> Result<(), ApiError> {
    let fields = [
        ("calories", calories),
        ("protein_g", protein_g),
        ("carbohydrates_g", carbohydrates_g),
        ("fat_g", fat_g),
        ("fiber_g", fiber_g),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            ValidationError::check(field, validate_nutrient(value))?;
        }
    }
    Ok(())
}

pub(crate) fn to_response(item: FoodItem) -> FoodItemResponse {
    FoodItemResponse {
        id: item.id,
        name: item.name,
        brand: item.brand,
        serving_size: dec_to_f64(item.serving_size),
        serving_unit: item.serving_unit,
        calories: dec_to_f64(item.calories),
        protein_g: dec_to_f64(item.protein_g),
        carbohydrates_g: dec_to_f64(item.carbohydrates_g),
        fat_g: dec_to_f64(item.fat_g),
        fiber_g: dec_to_f64(item.fiber_g),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coaching_platform_shared::Role;
    use rust_decimal::Decimal;

    fn food(created_by: Option<Uuid>) -> FoodItem {
        FoodItem {
            id: Uuid::new_v4(),
            name: "Oats".to_string(),
            brand: None,
            serving_size: Decimal::new(40, 0),
            serving_unit: "g".to_string(),
            calories: Decimal::new(150, 0),
            protein_g: Decimal::new(5, 0),
            carbohydrates_g: Decimal::new(27, 0),
            fat_g: Decimal::new(3, 0),
            fiber_g: Decimal::new(4, 0),
            created_by,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_validate_macros_names_the_field() {
        assert!(validate_macros(Some(100.0), None, None, None, None).is_ok());

        let err = validate_macros(None, None, Some(-1.0), None, None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidField(ref e) if e.field == "carbohydrates_g"));
    }

    #[test]
    fn test_reference_foods_are_read_only() {
        let coach = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Coach,
        };
        assert!(ensure_editable(&food(Some(coach.user_id)), &coach).is_ok());
        assert!(matches!(
            ensure_editable(&food(None), &coach),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_editable(&food(Some(Uuid::new_v4())), &coach),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_to_response_converts_decimals() {
        let response = to_response(food(None));
        assert_eq!(response.serving_size, 40.0);
        assert_eq!(response.carbohydrates_g, 27.0);
    }
}
