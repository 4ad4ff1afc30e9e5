//! User repository for database operations
//!
//! Coaches and clients share the `users` table; a client row points at its
//! coach through `coach_id`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use coaching_platform_shared::Role;
use sqlx::PgPool;
use uuid::Uuid;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub coach_id: Option<Uuid>,
    pub notes: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Parsed role; the column is CHECK-constrained to the known values
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_default()
    }
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub coach_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Input for updating a client
#[derive(Debug, Clone, Default)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub is_archived: Option<bool>,
}

const USER_COLUMNS: &str = "id, email, password_hash, name, role, coach_id, notes, is_archived, \
                            created_at, updated_at";

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user
    pub async fn create(pool: &PgPool, input: CreateUser) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, role, coach_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.name)
        .bind(input.role.as_str())
        .bind(input.coach_id)
        .bind(&input.notes)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Check if email exists
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// List a coach's clients, optionally filtered by a name/email fragment
    pub async fn list_clients(
        pool: &PgPool,
        coach_id: Uuid,
        include_archived: bool,
        query: Option<&str>,
    ) -> Result<Vec<UserRecord>> {
        let pattern = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q));

        let clients = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE coach_id = $1
              AND role = 'client'
              AND ($2 OR NOT is_archived)
              AND ($3::TEXT IS NULL OR name ILIKE $3 OR email ILIKE $3)
            ORDER BY name ASC
            "#
        ))
        .bind(coach_id)
        .bind(include_archived)
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Ok(clients)
    }

    /// Count a coach's active clients
    pub async fn count_clients(pool: &PgPool, coach_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE coach_id = $1 AND role = 'client' AND NOT is_archived",
        )
        .bind(coach_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Update a client's coach-editable fields
    pub async fn update_client(
        pool: &PgPool,
        client_id: Uuid,
        updates: UpdateClient,
    ) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                notes = COALESCE($3, notes),
                is_archived = COALESCE($4, is_archived)
            WHERE id = $1 AND role = 'client'
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(client_id)
        .bind(updates.name)
        .bind(updates.notes)
        .bind(updates.is_archived)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(role: &str) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            email: "a@b.co".to_string(),
            password_hash: String::new(),
            name: "A".to_string(),
            role: role.to_string(),
            coach_id: None,
            notes: None,
            is_archived: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_parses_column() {
        assert_eq!(record("coach").role(), Role::Coach);
        assert_eq!(record("client").role(), Role::Client);
    }
}
