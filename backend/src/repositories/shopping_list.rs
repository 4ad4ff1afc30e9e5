//! Shopping list repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// A shopping list with its item counters
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShoppingList {
    pub id: Uuid,
    pub client_id: Uuid,
    pub created_by: Uuid,
    pub name: String,
    pub nutrition_plan_id: Option<Uuid>,
    pub item_count: i64,
    pub checked_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShoppingItem {
    pub id: Uuid,
    pub list_id: Uuid,
    pub food_item_id: Option<Uuid>,
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub checked: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone)]
pub struct NewShoppingItem {
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub food_item_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct CreateShoppingList {
    pub client_id: Uuid,
    pub created_by: Uuid,
    pub name: String,
    pub nutrition_plan_id: Option<Uuid>,
    pub items: Vec<NewShoppingItem>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateShoppingItem {
    pub name: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub checked: Option<bool>,
}

const LIST_SELECT: &str = r#"
    SELECT l.id, l.client_id, l.created_by, l.name, l.nutrition_plan_id,
           COUNT(i.id) AS item_count,
           COUNT(i.id) FILTER (WHERE i.checked) AS checked_count,
           l.created_at, l.updated_at
    FROM shopping_lists l
    LEFT JOIN shopping_list_items i ON i.list_id = l.id
"#;

const ITEM_COLUMNS: &str = "id, list_id, food_item_id, name, quantity, unit, checked, sort_order";

pub struct ShoppingListRepository;

impl ShoppingListRepository {
    pub async fn list_for_client(db: &PgPool, client_id: Uuid) -> Result<Vec<ShoppingList>> {
        let lists = sqlx::query_as::<_, ShoppingList>(&format!(
            "{LIST_SELECT} WHERE l.client_id = $1 GROUP BY l.id ORDER BY l.created_at DESC"
        ))
        .bind(client_id)
        .fetch_all(db)
        .await?;

        Ok(lists)
    }

    /// Lists for every client of a coach
    pub async fn list_for_coach(db: &PgPool, coach_id: Uuid) -> Result<Vec<ShoppingList>> {
        let lists = sqlx::query_as::<_, ShoppingList>(&format!(
            r#"{LIST_SELECT}
            JOIN users u ON u.id = l.client_id
            WHERE u.coach_id = $1
            GROUP BY l.id
            ORDER BY l.created_at DESC"#
        ))
        .bind(coach_id)
        .fetch_all(db)
        .await?;

        Ok(lists)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<ShoppingList>> {
        let list = sqlx::query_as::<_, ShoppingList>(&format!(
            "{LIST_SELECT} WHERE l.id = $1 GROUP BY l.id"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(list)
    }

    pub async fn items(db: &PgPool, list_id: Uuid) -> Result<Vec<ShoppingItem>> {
        let items = sqlx::query_as::<_, ShoppingItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM shopping_list_items WHERE list_id = $1 \
             ORDER BY sort_order ASC, name ASC"
        ))
        .bind(list_id)
        .fetch_all(db)
        .await?;

        Ok(items)
    }

    /// Create a list and its items in one transaction
    pub async fn create(db: &PgPool, input: CreateShoppingList) -> Result<Uuid> {
        let mut tx = db.begin().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO shopping_lists (client_id, created_by, name, nutrition_plan_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(input.client_id)
        .bind(input.created_by)
        .bind(&input.name)
        .bind(input.nutrition_plan_id)
        .fetch_one(&mut *tx)
        .await?;

        for (index, item) in input.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO shopping_list_items (list_id, food_item_id, name, quantity, unit, sort_order)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(id)
            .bind(item.food_item_id)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(&item.unit)
            .bind(index as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    pub async fn rename(db: &PgPool, id: Uuid, name: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE shopping_lists SET name = $2 WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM shopping_lists WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Append an item at the end of the list
    pub async fn add_item(db: &PgPool, list_id: Uuid, item: NewShoppingItem) -> Result<ShoppingItem> {
        let item = sqlx::query_as::<_, ShoppingItem>(&format!(
            r#"
            INSERT INTO shopping_list_items (list_id, food_item_id, name, quantity, unit, sort_order)
            VALUES (
                $1, $2, $3, $4, $5,
                (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM shopping_list_items WHERE list_id = $1)
            )
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(list_id)
        .bind(item.food_item_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .fetch_one(db)
        .await?;

        Ok(item)
    }

    pub async fn update_item(
        db: &PgPool,
        list_id: Uuid,
        item_id: Uuid,
        updates: UpdateShoppingItem,
    ) -> Result<Option<ShoppingItem>> {
        let item = sqlx::query_as::<_, ShoppingItem>(&format!(
            r#"
            UPDATE shopping_list_items SET
                name = COALESCE($3, name),
                quantity = COALESCE($4, quantity),
                unit = COALESCE($5, unit),
                checked = COALESCE($6, checked)
            WHERE list_id = $1 AND id = $2
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(list_id)
        .bind(item_id)
        .bind(updates.name)
        .bind(updates.quantity)
        .bind(updates.unit)
        .bind(updates.checked)
        .fetch_optional(db)
        .await?;

        Ok(item)
    }

    pub async fn delete_item(db: &PgPool, list_id: Uuid, item_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM shopping_list_items WHERE list_id = $1 AND id = $2")
            .bind(list_id)
            .bind(item_id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_for_client(db: &PgPool, client_id: Uuid) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM shopping_lists WHERE client_id = $1")
                .bind(client_id)
                .fetch_one(db)
                .await?;

        Ok(count)
    }
}
