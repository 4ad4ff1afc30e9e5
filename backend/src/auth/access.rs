//! Authorization checks shared by every handler
//!
//! Coaches own the content they create and the clients linked to them.
//! Clients see published content plus whatever is assigned to them.

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::repositories::user::{UserRecord, UserRepository};
use coaching_platform_shared::Role;
use sqlx::PgPool;
use uuid::Uuid;

/// Reject callers without the coach role
pub fn require_coach(user: &AuthUser) -> Result<(), ApiError> {
    if user.is_coach() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Coach role required".to_string()))
    }
}

/// Reject writes to a coach-owned resource by anyone but its owner
pub fn ensure_owner(owner_id: Uuid, user: &AuthUser) -> Result<(), ApiError> {
    require_coach(user)?;
    if owner_id == user.user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Only the owning coach can modify this resource".to_string(),
        ))
    }
}

/// Whether `user` may read something owned by `coach_id` and assigned to `client_id`
pub fn can_view_assignment(coach_id: Uuid, client_id: Option<Uuid>, user: &AuthUser) -> bool {
    match user.role {
        Role::Coach => coach_id == user.user_id,
        Role::Client => client_id == Some(user.user_id),
    }
}

/// Read-side counterpart of [`can_view_assignment`]
///
/// Hidden resources are reported as missing so their ids do not leak.
pub fn ensure_can_view_assignment(
    coach_id: Uuid,
    client_id: Option<Uuid>,
    user: &AuthUser,
    what: &str,
) -> Result<(), ApiError> {
    if can_view_assignment(coach_id, client_id, user) {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("{} not found", what)))
    }
}

/// Whether `user` is the client themselves or the client's coach
pub fn check_client_access(user: &AuthUser, client: &UserRecord) -> Result<(), ApiError> {
    let allowed = match user.role {
        Role::Client => client.id == user.user_id,
        Role::Coach => client.coach_id == Some(user.user_id),
    };

    if allowed {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Not allowed to access this client".to_string(),
        ))
    }
}

/// Load a client and check that `user` may act on their behalf
pub async fn ensure_client_access(
    pool: &PgPool,
    user: &AuthUser,
    client_id: Uuid,
) -> Result<UserRecord, ApiError> {
    let client = load_client(pool, client_id).await?;
    check_client_access(user, &client)?;
    Ok(client)
}

/// Load a client and check that `coach` is their coach
pub async fn ensure_coach_of(
    pool: &PgPool,
    coach: &AuthUser,
    client_id: Uuid,
) -> Result<UserRecord, ApiError> {
    require_coach(coach)?;
    ensure_client_access(pool, coach, client_id).await
}

async fn load_client(pool: &PgPool, client_id: Uuid) -> Result<UserRecord, ApiError> {
    UserRepository::find_by_id(pool, client_id)
        .await
        .map_err(ApiError::Internal)?
        .filter(|user| user.role() == Role::Client)
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn coach() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Coach,
        }
    }

    fn client() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Client,
        }
    }

    fn client_record(id: Uuid, coach_id: Option<Uuid>) -> UserRecord {
        UserRecord {
            id,
            email: "client@example.com".to_string(),
            password_hash: String::new(),
            name: "Client".to_string(),
            role: "client".to_string(),
            coach_id,
            notes: None,
            is_archived: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_coach() {
        assert!(require_coach(&coach()).is_ok());
        assert!(matches!(require_coach(&client()), Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_ensure_owner() {
        let owner = coach();
        assert!(ensure_owner(owner.user_id, &owner).is_ok());
        assert!(matches!(
            ensure_owner(owner.user_id, &coach()),
            Err(ApiError::Forbidden(_))
        ));

        // A client never owns coach content, even with a matching id
        let c = client();
        assert!(ensure_owner(c.user_id, &c).is_err());
    }

    #[rstest]
    #[case::owning_coach("owner", true)]
    #[case::other_coach("coach", false)]
    #[case::assigned_client("assignee", true)]
    #[case::other_client("client", false)]
    fn test_can_view_assignment(#[case] viewer: &str, #[case] expected: bool) {
        let owner = coach();
        let assignee = client();

        let viewer = match viewer {
            "owner" => owner,
            "assignee" => assignee,
            "coach" => coach(),
            _ => client(),
        };

        assert_eq!(
            can_view_assignment(owner.user_id, Some(assignee.user_id), &viewer),
            expected
        );
    }

    #[test]
    fn test_unassigned_resource_hidden_from_clients() {
        let owner = coach();
        assert!(!can_view_assignment(owner.user_id, None, &client()));
        assert!(matches!(
            ensure_can_view_assignment(owner.user_id, None, &client(), "Nutrition plan"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_check_client_access() {
        let c = coach();
        let me = client();
        let record = client_record(me.user_id, Some(c.user_id));

        assert!(check_client_access(&me, &record).is_ok());
        assert!(check_client_access(&c, &record).is_ok());
        assert!(check_client_access(&coach(), &record).is_err());
        assert!(check_client_access(&client(), &record).is_err());
    }
}
