use axum::{Json, extract::State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{admin, profile};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    LoginRequest, LoginResponse, MeEnvelope, MeResponse, validate_login_request,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

fn invalid_credentials() -> AppError {
    AppError::Authentication("Invalid email or password".into())
}

/// Handle legacy admin login.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in with admin credentials",
    description = "Checks an email and password against the admin table and returns a bearer token usable on every protected route. Rate-limited per client.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid credentials (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 429, description = "Too many requests (RATE_LIMIT_EXCEEDED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let email = payload.email.trim().to_lowercase();

    let admin = admin::Entity::find()
        .filter(admin::Column::Email.eq(&email))
        .one(&state.db)
        .await?;
    let Some(admin) = admin else {
        hash::verify_dummy(&payload.password);
        tracing::warn!(email = %email, "Failed admin login");
        return Err(invalid_credentials());
    };

    let is_valid = hash::verify_password(&payload.password, &admin.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        tracing::warn!(email = %email, "Failed admin login");
        return Err(invalid_credentials());
    }

    let user = match profile::Entity::find_by_id(admin.id).one(&state.db).await? {
        Some(p) => MeResponse::from(p),
        None => MeResponse {
            id: admin.id,
            email: Some(admin.email.clone()),
            full_name: None,
            role: profile::DEFAULT_ROLE.to_string(),
            created_at: Some(admin.created_at),
        },
    };

    let auth = &state.config.auth;
    let token = jwt::sign(
        &admin.id.to_string(),
        &admin.email,
        &user.role,
        &auth.jwt_secret,
        auth.token_ttl_hours,
        auth.audience.as_deref(),
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    tracing::info!(admin_id = %admin.id, "Admin logged in");

    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        token,
        user,
    }))
}

/// Return the current authenticated user's profile.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Current user",
    description = "Profile of the token's subject. Users without a profile row are reported with role `user`.",
    responses(
        (status = 200, description = "Current user", body = MeEnvelope),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MeEnvelope>, AppError> {
    let user = match profile::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
    {
        Some(p) => MeResponse::from(p),
        None => MeResponse {
            id: auth_user.user_id,
            email: auth_user.email,
            full_name: None,
            role: auth_user.role.as_str().to_string(),
            created_at: None,
        },
    };

    Ok(Json(MeEnvelope {
        message: "User retrieved successfully".into(),
        user,
    }))
}
