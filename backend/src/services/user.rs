//! User service for authentication and the current user's profile
//!
//! Password hashing and verification run on the blocking thread pool.

use crate::auth::{JwtService, PasswordService};
use crate::error::ApiError;
use crate::repositories::{CreateUser, UserRecord, UserRepository};
use coaching_platform_shared::types::{AuthTokens, RegisterRequest, UserProfile};
use coaching_platform_shared::validation::{validate_password, validate_required_text, ValidationError};
use coaching_platform_shared::Role;
use sqlx::PgPool;
use uuid::Uuid;
use validator::ValidateEmail;

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new account
    ///
    /// Accounts default to the client role. A coach account needs
    /// `coach_invite_code`, and none can be created while it is unset.
    /// Clients registering themselves have no coach until one links them.
    pub async fn register(
        pool: &PgPool,
        jwt_service: &JwtService,
        coach_invite_code: Option<&str>,
        request: RegisterRequest,
    ) -> Result<AuthTokens, ApiError> {
        let email = normalize_email(&request.email);
        validate_credentials(&email, &request.password)?;
        ValidationError::check("name", validate_required_text(&request.name, 200))?;
        let role = registration_role(
            request.role,
            request.invite_code.as_deref(),
            coach_invite_code,
        )?;

        if UserRepository::email_exists(pool, &email)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = PasswordService::hash_async(request.password)
            .await
            .map_err(ApiError::Internal)?;

        let user = UserRepository::create(
            pool,
            CreateUser {
                email,
                password_hash,
                name: request.name.trim().to_string(),
                role,
                coach_id: None,
                notes: None,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        tracing::info!(user_id = %user.id, role = %user.role(), "User registered");
        issue_tokens(jwt_service, &user)
    }

    /// Login with email and password
    pub async fn login(
        pool: &PgPool,
        jwt_service: &JwtService,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, ApiError> {
        let user = UserRepository::find_by_email(pool, &normalize_email(email))
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

        let valid = PasswordService::verify_async(password.to_string(), user.password_hash.clone())
            .await
            .map_err(ApiError::Internal)?;

        if !valid {
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }
        if user.is_archived {
            return Err(ApiError::Unauthorized("Account is archived".to_string()));
        }

        issue_tokens(jwt_service, &user)
    }

    /// Exchange a refresh token for a new token pair
    ///
    /// The role is re-read from the database so role changes take effect.
    pub async fn refresh_token(
        pool: &PgPool,
        jwt_service: &JwtService,
        refresh_token: &str,
    ) -> Result<AuthTokens, ApiError> {
        let claims = jwt_service
            .validate_refresh_token(refresh_token)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid refresh token: {}", e)))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .filter(|user| !user.is_archived)
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

        issue_tokens(jwt_service, &user)
    }

    /// Get user profile
    pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<UserProfile, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(UserProfile {
            id: user.id,
            role: user.role(),
            email: user.email,
            name: user.name,
            coach_id: user.coach_id,
            created_at: user.created_at,
        })
    }
}

/// Lowercase and trim an email so lookups are case-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check email format and password strength
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if !email.validate_email() {
        return Err(ApiError::InvalidField(ValidationError::new(
            "email",
            "Invalid email format",
        )));
    }
    ValidationError::check("password", validate_password(password))?;
    Ok(())
}

/// Role for a new account; coach needs an invite code matching the configured one
pub fn registration_role(
    requested: Option<Role>,
    presented: Option<&str>,
    configured: Option<&str>,
) -> Result<Role, ApiError> {
    match requested.unwrap_or_default() {
        Role::Client => Ok(Role::Client),
        Role::Coach => match (presented, configured) {
            (Some(presented), Some(configured)) if presented == configured => Ok(Role::Coach),
            _ => Err(ApiError::Forbidden(
                "Coach registration requires a valid invite code".to_string(),
            )),
        },
    }
}

fn issue_tokens(jwt_service: &JwtService, user: &UserRecord) -> Result<AuthTokens, ApiError> {
    let role: Role = user.role();
    let access_token = jwt_service
        .generate_access_token(user.id, role)
        .map_err(ApiError::Internal)?;
    let refresh_token = jwt_service
        .generate_refresh_token(user.id, role)
        .map_err(ApiError::Internal)?;

    Ok(AuthTokens {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt_service.access_token_expiry_secs(),
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Coach@Example.COM "), "coach@example.com");
    }

    #[test]
    fn test_validate_credentials() {
        assert!(validate_credentials("coach@example.com", "long-enough").is_ok());

        let err = validate_credentials("not-an-email", "long-enough").unwrap_err();
        assert!(matches!(err, ApiError::InvalidField(ref e) if e.field == "email"));

        let err = validate_credentials("coach@example.com", "short").unwrap_err();
        assert!(matches!(err, ApiError::InvalidField(ref e) if e.field == "password"));
    }

    #[rstest]
    #[case::default_is_client(None, None, Some("invite-code-for-coaches"), Ok(Role::Client))]
    #[case::client_needs_no_code(Some(Role::Client), None, None, Ok(Role::Client))]
    #[case::matching_code(
        Some(Role::Coach),
        Some("invite-code-for-coaches"),
        Some("invite-code-for-coaches"),
        Ok(Role::Coach)
    )]
    #[case::missing_code(Some(Role::Coach), None, Some("invite-code-for-coaches"), Err(()))]
    #[case::wrong_code(Some(Role::Coach), Some("guess"), Some("invite-code-for-coaches"), Err(()))]
    #[case::signup_disabled(Some(Role::Coach), Some("anything"), None, Err(()))]
    fn test_registration_role(
        #[case] requested: Option<Role>,
        #[case] presented: Option<&str>,
        #[case] configured: Option<&str>,
        #[case] expected: Result<Role, ()>,
    ) {
        let result = registration_role(requested, presented, configured);
        match expected {
            Ok(role) => assert_eq!(result.unwrap(), role),
            Err(()) => assert!(matches!(result, Err(ApiError::Forbidden(_)))),
        }
    }

    #[test]
    fn test_issue_tokens_carries_role() {
        let jwt = JwtService::new("test-secret-key-for-user-service", 900, 3600);
        let now = chrono::Utc::now();
        let user = UserRecord {
            id: Uuid::new_v4(),
            email: "coach@example.com".to_string(),
            password_hash: String::new(),
            name: "Coach".to_string(),
            role: "coach".to_string(),
            coach_id: None,
            notes: None,
            is_archived: false,
            created_at: now,
            updated_at: now,
        };

        let tokens = issue_tokens(&jwt, &user).unwrap();
        assert_eq!(tokens.role, Role::Coach);
        assert_eq!(tokens.expires_in, 900);

        let claims = jwt.validate_access_token(&tokens.access_token).unwrap();
        assert_eq!(claims.role, Role::Coach);
        assert_eq!(claims.sub, user.id.to_string());
    }
}
