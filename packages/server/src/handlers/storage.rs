use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::storage::ObjectKey;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/storage/{key}",
    tag = "Storage",
    operation_id = "getObject",
    summary = "Download a stored file",
    description = "Serves an uploaded object for backends without public URLs of their own (filesystem, memory). Raster images are served inline, everything else as an attachment.",
    params(("key" = String, Path, description = "Object key, e.g. `applications/temp/passports/<uuid>-scan.pdf`")),
    responses(
        (status = 200, description = "File contents"),
        (status = 400, description = "Invalid key (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(key = %key))]
pub async fn get_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let key = ObjectKey::parse(&key)?;
    let object = state.store.get(&key).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, object.content_type.as_str())
        .header(header::CONTENT_LENGTH, object.data.len().to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&object.content_type, key.file_name()),
        )
        .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from(object.data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// Raster images render inline; everything else downloads.
fn content_disposition(content_type: &str, file_name: &str) -> String {
    let disposition = match content_type {
        "image/jpeg" | "image/png" | "image/gif" | "image/webp" => "inline",
        _ => "attachment",
    };
    format!("{disposition}; filename=\"{file_name}\"")
}
