use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::profile;
use crate::error::AppError;

/// Legacy admin credential login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@example.com")]
    pub email: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    if payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    #[schema(example = "admin")]
    pub role: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<profile::Model> for MeResponse {
    fn from(m: profile::Model) -> Self {
        Self {
            id: m.id,
            email: Some(m.email),
            full_name: m.full_name,
            role: m.role,
            created_at: Some(m.created_at),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    #[schema(example = "Login successful")]
    pub message: String,
    /// HS256 bearer token.
    pub token: String,
    pub user: MeResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MeEnvelope {
    pub message: String,
    pub user: MeResponse,
}
