use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    /// `up` or `down`.
    #[schema(example = "up")]
    pub database: &'static str,
    #[schema(example = "filesystem")]
    pub storage_backend: &'static str,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    operation_id = "health",
    summary = "Liveness and dependency status",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db.ping().await {
        Ok(()) => "up",
        Err(e) => {
            tracing::warn!("Database ping failed: {e}");
            "down"
        }
    };
    Json(HealthResponse {
        status: "ok",
        database,
        storage_backend: state.store.backend_name(),
    })
}
