//! Shopping list service
//!
//! Lists belong to a client and can be managed by the client or their coach.
//! A list can be generated from a nutrition plan, in which case every food
//! used by the plan's recipes becomes one item with the summed quantity.

use super::{dec_to_f64, f64_to_dec};
use crate::auth::access::{ensure_can_view_assignment, ensure_client_access, ensure_coach_of};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::repositories::{
    CreateShoppingList, NewShoppingItem, NutritionPlanRepository, PlanIngredient, ShoppingItem,
    ShoppingList, ShoppingListRepository, UpdateShoppingItem,
};
use coaching_platform_shared::types::{
    CreateShoppingListRequest, GenerateShoppingListRequest, ShoppingItemRequest,
    ShoppingItemResponse, ShoppingListDetailResponse, ShoppingListQuery, ShoppingListResponse,
    UpdateShoppingItemRequest, UpdateShoppingListRequest,
};
use coaching_platform_shared::validation::{
    validate_quantity, validate_required_text, ValidationError,
};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const DEFAULT_UNIT: &str = "item";

pub struct ShoppingListService;

impl ShoppingListService {
    /// Clients see their own lists; coaches see one client's lists or all of
    /// their clients' lists
    pub async fn list(
        pool: &PgPool,
        user: &AuthUser,
        query: &ShoppingListQuery,
    ) -> Result<Vec<ShoppingListResponse>, ApiError> {
        let lists = if !user.is_coach() {
            ShoppingListRepository::list_for_client(pool, user.user_id).await
        } else if let Some(client_id) = query.client_id {
            ensure_coach_of(pool, user, client_id).await?;
            ShoppingListRepository::list_for_client(pool, client_id).await
        } else {
            ShoppingListRepository::list_for_coach(pool, user.user_id).await
        }
        .map_err(ApiError::Internal)?;

        Ok(lists.into_iter().map(to_response).collect())
    }

    pub async fn create(
        pool: &PgPool,
        user: &AuthUser,
        request: CreateShoppingListRequest,
    ) -> Result<ShoppingListDetailResponse, ApiError> {
        ValidationError::check("name", validate_required_text(&request.name, 200))?;
        let client_id = resolve_client(pool, user, request.client_id).await?;
        let items = request
            .items
            .into_iter()
            .map(new_item)
            .collect::<Result<Vec<_>, _>>()?;

        let list_id = ShoppingListRepository::create(
            pool,
            CreateShoppingList {
                client_id,
                created_by: user.user_id,
                name: request.name.trim().to_string(),
                nutrition_plan_id: None,
                items,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        Self::detail(pool, Self::find(pool, list_id).await?).await
    }

    /// Build a list from every ingredient scheduled in a nutrition plan
    pub async fn generate_from_plan(
        pool: &PgPool,
        user: &AuthUser,
        plan_id: Uuid,
        request: GenerateShoppingListRequest,
    ) -> Result<ShoppingListDetailResponse, ApiError> {
        let plan = NutritionPlanRepository::find_by_id(pool, plan_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Nutrition plan not found".to_string()))?;
        ensure_can_view_assignment(plan.coach_id, plan.client_id, user, "Nutrition plan")?;

        let client_id = plan.client_id.ok_or_else(|| {
            ApiError::BadRequest("Nutrition plan is not assigned to a client".to_string())
        })?;

        let name = match request.name {
            Some(name) => {
                ValidationError::check("name", validate_required_text(&name, 200))?;
                name.trim().to_string()
            }
            None => format!("{} - shopping list", plan.name),
        };

        let ingredients = NutritionPlanRepository::ingredients(pool, plan_id)
            .await
            .map_err(ApiError::Internal)?;
        let items = aggregate_shopping_items(&ingredients);

        let list_id = ShoppingListRepository::create(
            pool,
            CreateShoppingList {
                client_id,
                created_by: user.user_id,
                name,
                nutrition_plan_id: Some(plan_id),
                items,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        tracing::info!(%plan_id, %list_id, "Shopping list generated from nutrition plan");
        Self::detail(pool, Self::find(pool, list_id).await?).await
    }

    pub async fn get(
        pool: &PgPool,
        user: &AuthUser,
        list_id: Uuid,
    ) -> Result<ShoppingListDetailResponse, ApiError> {
        let list = Self::find_accessible(pool, user, list_id).await?;
        Self::detail(pool, list).await
    }

    pub async fn rename(
        pool: &PgPool,
        user: &AuthUser,
        list_id: Uuid,
        request: UpdateShoppingListRequest,
    ) -> Result<ShoppingListDetailResponse, ApiError> {
        Self::find_accessible(pool, user, list_id).await?;

        if let Some(name) = request.name {
            ValidationError::check("name", validate_required_text(&name, 200))?;
            ShoppingListRepository::rename(pool, list_id, name.trim())
                .await
                .map_err(ApiError::Internal)?;
        }

        Self::detail(pool, Self::find(pool, list_id).await?).await
    }

    pub async fn delete(pool: &PgPool, user: &AuthUser, list_id: Uuid) -> Result<(), ApiError> {
        Self::find_accessible(pool, user, list_id).await?;

        ShoppingListRepository::delete(pool, list_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(())
    }

    pub async fn add_item(
        pool: &PgPool,
        user: &AuthUser,
        list_id: Uuid,
        request: ShoppingItemRequest,
    ) -> Result<ShoppingItemResponse, ApiError> {
        Self::find_accessible(pool, user, list_id).await?;

        let item = ShoppingListRepository::add_item(pool, list_id, new_item(request)?)
            .await
            .map_err(ApiError::Internal)?;
        Ok(item_response(item))
    }

    pub async fn update_item(
        pool: &PgPool,
        user: &AuthUser,
        list_id: Uuid,
        item_id: Uuid,
        request: UpdateShoppingItemRequest,
    ) -> Result<ShoppingItemResponse, ApiError> {
        Self::find_accessible(pool, user, list_id).await?;

        if let Some(name) = &request.name {
            ValidationError::check("name", validate_required_text(name, 200))?;
        }
        if let Some(quantity) = request.quantity {
            ValidationError::check("quantity", validate_quantity(quantity))?;
        }

        let updates = UpdateShoppingItem {
            name: request.name.map(|n| n.trim().to_string()),
            quantity: request.quantity.map(f64_to_dec),
            unit: request.unit.map(|u| u.trim().to_string()),
            checked: request.checked,
        };

        ShoppingListRepository::update_item(pool, list_id, item_id, updates)
            .await
            .map_err(ApiError::Internal)?
            .map(item_response)
            .ok_or_else(|| ApiError::NotFound("Shopping list item not found".to_string()))
    }

    pub async fn delete_item(
        pool: &PgPool,
        user: &AuthUser,
        list_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), ApiError> {
        Self::find_accessible(pool, user, list_id).await?;

        let deleted = ShoppingListRepository::delete_item(pool, list_id, item_id)
            .await
            .map_err(ApiError::Internal)?;
        if !deleted {
            return Err(ApiError::NotFound("Shopping list item not found".to_string()));
        }
        Ok(())
    }

    /// Export the list's items as CSV (name, quantity, unit, checked)
    pub async fn export_csv(
        pool: &PgPool,
        user: &AuthUser,
        list_id: Uuid,
    ) -> Result<String, ApiError> {
        Self::find_accessible(pool, user, list_id).await?;

        let items = ShoppingListRepository::items(pool, list_id)
            .await
            .map_err(ApiError::Internal)?;
        to_csv(&items)
    }

    async fn find(pool: &PgPool, list_id: Uuid) -> Result<ShoppingList, ApiError> {
        ShoppingListRepository::find_by_id(pool, list_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Shopping list not found".to_string()))
    }

    /// Load a list the caller may manage; other users' lists read as missing
    async fn find_accessible(
        pool: &PgPool,
        user: &AuthUser,
        list_id: Uuid,
    ) -> Result<ShoppingList, ApiError> {
        let list = Self::find(pool, list_id).await?;
        match ensure_client_access(pool, user, list.client_id).await {
            Ok(_) => Ok(list),
            Err(ApiError::Forbidden(_)) => {
                Err(ApiError::NotFound("Shopping list not found".to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn detail(
        pool: &PgPool,
        list: ShoppingList,
    ) -> Result<ShoppingListDetailResponse, ApiError> {
        let items = ShoppingListRepository::items(pool, list.id)
            .await
            .map_err(ApiError::Internal)?;

        Ok(ShoppingListDetailResponse {
            list: to_response(list),
            items: items.into_iter().map(item_response).collect(),
        })
    }
}

/// Which client a new list belongs to: clients always get their own, coaches
/// must name one of their clients
async fn resolve_client(
    pool: &PgPool,
    user: &AuthUser,
    requested: Option<Uuid>,
) -> Result<Uuid, ApiError> {
    if !user.is_coach() {
        return match requested {
            Some(id) if id != user.user_id => Err(ApiError::Forbidden(
                "Clients can only create their own shopping lists".to_string(),
            )),
            _ => Ok(user.user_id),
        };
    }

    let client_id =
        requested.ok_or_else(|| ValidationError::new("client_id", "is required for coaches"))?;
    ensure_coach_of(pool, user, client_id).await?;
    Ok(client_id)
}

fn new_item(request: ShoppingItemRequest) -> Result<NewShoppingItem, ApiError> {
    ValidationError::check("name", validate_required_text(&request.name, 200))?;
    ValidationError::check("quantity", validate_quantity(request.quantity))?;

    let unit = request
        .unit
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_UNIT.to_string());

    Ok(NewShoppingItem {
        name: request.name.trim().to_string(),
        quantity: f64_to_dec(request.quantity),
        unit,
        food_item_id: request.food_item_id,
    })
}

/// Sum each food's quantity across a plan's meals
///
/// A meal eating `meal_servings` of a recipe that yields `recipe_servings`
/// uses `ingredient_servings * meal_servings / recipe_servings` servings of
/// each ingredient. Quantities are expressed in the food's own unit and
/// items are sorted by name.
pub fn aggregate_shopping_items(ingredients: &[PlanIngredient]) -> Vec<NewShoppingItem> {
    let mut by_food: HashMap<Uuid, (&PlanIngredient, Decimal)> = HashMap::new();

    for ingredient in ingredients {
        let recipe_servings = if ingredient.recipe_servings <= Decimal::ZERO {
            Decimal::ONE
        } else {
            ingredient.recipe_servings
        };
        let servings = ingredient.ingredient_servings * ingredient.meal_servings / recipe_servings;

        by_food
            .entry(ingredient.food_item_id)
            .or_insert((ingredient, Decimal::ZERO))
            .1 += servings;
    }

    let mut items: Vec<NewShoppingItem> = by_food
        .into_values()
        .map(|(food, servings)| NewShoppingItem {
            name: food.food_name.clone(),
            quantity: (servings * food.serving_size).round_dp(2),
            unit: food.serving_unit.clone(),
            food_item_id: Some(food.food_item_id),
        })
        .collect();

    items.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.unit.cmp(&b.unit))
    });
    items
}

#[derive(Serialize)]
struct ShoppingItemCsvRow<'a> {
    name: &'a str,
    quantity: f64,
    unit: &'a str,
    checked: bool,
}

const CSV_HEADER: [&str; 4] = ["name", "quantity", "unit", "checked"];

/// Render items as CSV; the header row is written even for an empty list
fn to_csv(items: &[ShoppingItem]) -> Result<String, ApiError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(CSV_HEADER)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV serialization error: {}", e)))?;
    for item in items {
        wtr.serialize(ShoppingItemCsvRow {
            name: &item.name,
            quantity: dec_to_f64(item.quantity),
            unit: &item.unit,
            checked: item.checked,
        })
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV serialization error: {}", e)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV flush error: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV encoding error: {}", e)))
}

fn to_response(list: ShoppingList) -> ShoppingListResponse {
    ShoppingListResponse {
        id: list.id,
        client_id: list.client_id,
        created_by: list.created_by,
        name: list.name,
        nutrition_plan_id: list.nutrition_plan_id,
        item_count: list.item_count,
        checked_count: list.checked_count,
        created_at: list.created_at,
        updated_at: list.updated_at,
    }
}

fn item_response(item: ShoppingItem) -> ShoppingItemResponse {
    ShoppingItemResponse {
        id: item.id,
        name: item.name,
        quantity: dec_to_f64(item.quantity),
        unit: item.unit,
        food_item_id: item.food_item_id,
        checked: item.checked,
        sort_order: item.sort_order,
    }
}
