//! Client management for coaches

use super::user::{normalize_email, validate_credentials};
use crate::auth::access::{ensure_client_access, ensure_coach_of, require_coach};
use crate::auth::{AuthUser, PasswordService};
use crate::error::ApiError;
use crate::repositories::{CreateUser, UpdateClient, UserRecord, UserRepository};
use coaching_platform_shared::types::{
    ClientListQuery, ClientResponse, CreateClientRequest, UpdateClientRequest,
};
use coaching_platform_shared::validation::{validate_required_text, ValidationError};
use coaching_platform_shared::Role;
use sqlx::PgPool;
use uuid::Uuid;

pub struct ClientService;

impl ClientService {
    pub async fn list(
        pool: &PgPool,
        coach: &AuthUser,
        query: &ClientListQuery,
    ) -> Result<Vec<ClientResponse>, ApiError> {
        require_coach(coach)?;

        let clients = UserRepository::list_clients(
            pool,
            coach.user_id,
            query.include_archived,
            query.q.as_deref(),
        )
        .await
        .map_err(ApiError::Internal)?;

        Ok(clients.into_iter().map(to_response).collect())
    }

    /// Create a client account linked to the calling coach
    pub async fn create(
        pool: &PgPool,
        coach: &AuthUser,
        request: CreateClientRequest,
    ) -> Result<ClientResponse, ApiError> {
        require_coach(coach)?;

        let email = normalize_email(&request.email);
        validate_credentials(&email, &request.password)?;
        ValidationError::check("name", validate_required_text(&request.name, 200))?;

        if UserRepository::email_exists(pool, &email)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = PasswordService::hash_async(request.password)
            .await
            .map_err(ApiError::Internal)?;

        let client = UserRepository::create(
            pool,
            CreateUser {
                email,
                password_hash,
                name: request.name.trim().to_string(),
                role: Role::Client,
                coach_id: Some(coach.user_id),
                notes: request.notes,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        tracing::info!(coach_id = %coach.user_id, client_id = %client.id, "Client created");
        Ok(to_response(client))
    }

    /// Get a client; allowed for the client themselves and their coach
    pub async fn get(pool: &PgPool, user: &AuthUser, client_id: Uuid) -> Result<ClientResponse, ApiError> {
        let client = ensure_client_access(pool, user, client_id).await?;
        Ok(to_response(client))
    }

    pub async fn update(
        pool: &PgPool,
        coach: &AuthUser,
        client_id: Uuid,
        request: UpdateClientRequest,
    ) -> Result<ClientResponse, ApiError> {
        ensure_coach_of(pool, coach, client_id).await?;

        if let Some(name) = &request.name {
            ValidationError::check("name", validate_required_text(name, 200))?;
        }

        let updates = UpdateClient {
            name: request.name.map(|n| n.trim().to_string()),
            notes: request.notes,
            is_archived: request.is_archived,
        };

        let client = UserRepository::update_client(pool, client_id, updates)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

        Ok(to_response(client))
    }

    /// Archive a client; their data is kept
    pub async fn archive(pool: &PgPool, coach: &AuthUser, client_id: Uuid) -> Result<(), ApiError> {
        ensure_coach_of(pool, coach, client_id).await?;

        let updates = UpdateClient {
            is_archived: Some(true),
            ..Default::default()
        };
        UserRepository::update_client(pool, client_id, updates)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

        tracing::info!(coach_id = %coach.user_id, %client_id, "Client archived");
        Ok(())
    }
}

fn to_response(user: UserRecord) -> ClientResponse {
    ClientResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        notes: user.notes,
        is_archived: user.is_archived,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}
