use axum::{extract::FromRequestParts, http::request::Parts};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::entity::profile;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Role recorded on a user's profile row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Parse a stored role. Unknown values grant no privileges.
    pub fn from_profile(value: &str) -> Self {
        match value {
            "admin" => Role::Admin,
            "super_admin" => Role::SuperAdmin,
            _ => Role::User,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
/// Role checks happen via `require_admin()` / `require_super_admin()` in the handler body.
#[derive(Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: Role,
}

impl AuthUser {
    /// Returns `Ok(())` for `admin` and `super_admin` profiles.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Admin access required".into()))
        }
    }

    pub fn require_super_admin(&self) -> Result<(), AppError> {
        if self.role == Role::SuperAdmin {
            Ok(())
        } else {
            Err(AppError::Authorization("Super admin access required".into()))
        }
    }
}

/// Pull the bearer token out of the request headers.
pub fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Authentication required".into()))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Authentication("Invalid authorization header".into()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let auth = &state.config.auth;

        let claims = jwt::verify(token, &auth.jwt_secret, auth.audience.as_deref()).map_err(|e| {
            tracing::debug!("Token rejected: {e}");
            AppError::Authentication("Invalid or expired token".into())
        })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Authentication("Invalid or expired token".into()))?;

        let profile = profile::Entity::find_by_id(user_id).one(&state.db).await?;

        Ok(match profile {
            Some(p) => AuthUser {
                user_id,
                email: Some(p.email),
                role: Role::from_profile(&p.role),
            },
            None => AuthUser {
                user_id,
                email: claims.email,
                role: Role::User,
            },
        })
    }
}
