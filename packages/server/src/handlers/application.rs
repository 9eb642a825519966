use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{ApplicationStatus, DocumentType};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::application;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::application::*;
use crate::models::shared::{contains_ci, page_offset, page_params};
use crate::models::upload::{UploadResponse, UploadedFile};
use crate::state::AppState;
use crate::utils::upload::{UploadPolicy, read_file_field, store_all};

#[utoipa::path(
    post,
    path = "/api/applications",
    tag = "Applications",
    operation_id = "createApplication",
    summary = "Submit an application",
    description = "Public admissions form submission. Document URLs come from `upload-temp`. `certificate_urls` must contain at least one URL. Rate-limited per client.",
    request_body = CreateApplicationRequest,
    responses(
        (status = 201, description = "Application created", body = ApplicationEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 429, description = "Too many requests (RATE_LIMIT_EXCEEDED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(program = %payload.program))]
pub async fn create_application(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateApplicationRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_application(&payload)?;

    let now = chrono::Utc::now();
    let mut model = application::ActiveModel {
        id: Set(Uuid::now_v7()),
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        email: Set(payload.email.trim().to_lowercase()),
        phone: Set(payload.phone.trim().to_string()),
        date_of_birth: Set(payload.date_of_birth),
        nationality: Set(clean_optional(payload.nationality)),
        country: Set(payload.country.trim().to_string()),
        program: Set(payload.program.trim().to_string()),
        study_level: Set(clean_optional(payload.study_level)),
        intake: Set(clean_optional(payload.intake)),
        personal_statement: Set(clean_optional(payload.personal_statement)),
        status: Set(ApplicationStatus::default()),
        admin_notes: Set(None),
        reviewed_at: Set(None),
        reviewed_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.set_documents(DocumentType::Passport, payload.passport_urls);
    model.set_documents(
        DocumentType::Certificate,
        payload.certificate_urls.unwrap_or_default(),
    );
    model.set_documents(DocumentType::Transcript, payload.transcript_urls);
    model.set_documents(DocumentType::Photo, payload.photo_urls);
    model.set_documents(DocumentType::Recommendation, payload.recommendation_urls);
    model.set_documents(DocumentType::Other, payload.other_urls);

    let created = model.insert(&state.db).await?;
    tracing::info!(application_id = %created.id, "Application submitted");

    Ok((
        StatusCode::CREATED,
        Json(ApplicationEnvelope {
            message: "Application submitted successfully".into(),
            application: created.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/applications/upload-temp",
    tag = "Applications",
    operation_id = "uploadApplicationDocuments",
    summary = "Upload application documents",
    description = "Multipart upload of one or more documents (`files`, repeatable, or `file`) with an optional `document_type` field. Every file is checked against the size and MIME limits before anything is stored. Files are stored independently: when one fails, the others stay stored and the request fails.",
    request_body(content_type = "multipart/form-data", description = "`files`/`file` parts plus optional `document_type`"),
    responses(
        (status = 201, description = "Files stored", body = UploadResponse),
        (status = 400, description = "Rejected file (FILE_UPLOAD_ERROR) or bad field (VALIDATION_ERROR)", body = ErrorBody),
        (status = 429, description = "Too many requests (RATE_LIMIT_EXCEEDED)", body = ErrorBody),
        (status = 502, description = "Storage failed (EXTERNAL_SERVICE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_temp_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let limits = &state.config.uploads;
    let policy = UploadPolicy::documents(limits.document_max_bytes, limits.document_max_files);

    let mut pending = Vec::new();
    let mut document_type: Option<DocumentType> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("files") | Some("file") => {
                if pending.len() >= policy.max_files {
                    return Err(AppError::FileUpload(format!(
                        "At most {} files may be uploaded at once",
                        policy.max_files
                    )));
                }
                pending.push(read_file_field(field, &policy).await?);
            }
            Some("document_type") => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read document_type: {e}"))
                })?;
                let text = text.trim();
                if !text.is_empty() {
                    document_type = Some(
                        text.parse::<DocumentType>()
                            .map_err(|e| AppError::Validation(e.to_string()))?,
                    );
                }
            }
            _ => {} // Ignore unknown fields.
        }
    }

    if pending.is_empty() {
        return Err(AppError::FileUpload("No files provided".into()));
    }

    let prefix = match document_type {
        Some(dt) => format!("applications/temp/{}", dt.folder()),
        None => "applications/temp".to_string(),
    };

    let files: Vec<UploadedFile> = store_all(&*state.store, &prefix, pending)
        .await?
        .into_iter()
        .map(|file| UploadedFile {
            document_type,
            ..file
        })
        .collect();

    tracing::info!(count = files.len(), prefix = %prefix, "Stored application documents");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Files uploaded successfully".into(),
            files,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    tag = "Applications",
    operation_id = "getApplication",
    summary = "Get an application by ID",
    description = "Public lookup used by the confirmation page. Deleted applications are reported as not found.",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application", body = ApplicationEnvelope),
        (status = 404, description = "Application not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApplicationEnvelope>, AppError> {
    let id = parse_id(&id)?;
    let model = find_application(&state.db, id).await?;
    if model.status.is_deleted() {
        return Err(not_found());
    }
    Ok(Json(ApplicationEnvelope {
        message: "Application retrieved successfully".into(),
        application: model.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/applications/admin",
    tag = "Applications",
    operation_id = "listApplications",
    summary = "List applications",
    description = "Paginated list for the admin dashboard. Deleted applications are hidden unless `include_deleted=true` or `status=deleted`. Search matches first name, last name and email case-insensitively.",
    params(ApplicationListQuery),
    responses(
        (status = 200, description = "List of applications", body = ApplicationListResponse),
        (status = 400, description = "Invalid filter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_applications(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ApplicationListQuery>,
) -> Result<Json<ApplicationListResponse>, AppError> {
    auth_user.require_admin()?;

    let (page, per_page) = page_params(query.page, query.per_page);
    let mut select = application::Entity::find();

    match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            let status = raw
                .parse::<ApplicationStatus>()
                .map_err(|e| AppError::Validation(e.to_string()))?;
            select = select.filter(application::Column::Status.eq(status));
        }
        None if !query.include_deleted.unwrap_or(false) => {
            select = select.filter(application::Column::Status.ne(ApplicationStatus::Deleted));
        }
        None => {}
    }

    if let Some(program) = query.program.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        select = select.filter(application::Column::Program.eq(program));
    }
    if let Some(country) = query.country.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        select = select.filter(application::Column::Country.eq(country));
    }

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Condition::any()
                    .add(contains_ci(application::Column::FirstName, &term))
                    .add(contains_ci(application::Column::LastName, &term))
                    .add(contains_ci(application::Column::Email, &term)),
            );
        }
    }

    let sort_column = match query.sort_by.as_deref().unwrap_or("created_at") {
        "created_at" => application::Column::CreatedAt,
        "updated_at" => application::Column::UpdatedAt,
        "last_name" => application::Column::LastName,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: created_at, updated_at, last_name".into(),
            ));
        }
    };
    let sort_order = match query.sort_order.as_deref().unwrap_or("desc") {
        "asc" => Order::Asc,
        "desc" => Order::Desc,
        _ => {
            return Err(AppError::Validation(
                "sort_order must be one of: asc, desc".into(),
            ));
        }
    };

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let applications = select
        .order_by(sort_column, sort_order)
        .order_by_desc(application::Column::Id)
        .offset(Some(page_offset(page, per_page)))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(ApplicationResponse::from)
        .collect();

    Ok(Json(ApplicationListResponse {
        message: "Applications retrieved successfully".into(),
        applications,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/api/applications/admin/stats",
    tag = "Applications",
    operation_id = "applicationStats",
    summary = "Application counts",
    description = "Counts per status (including `deleted`), the number of non-deleted applications and how many of those were submitted in the last seven days.",
    responses(
        (status = 200, description = "Statistics", body = ApplicationStatsResponse),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn application_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApplicationStatsResponse>, AppError> {
    auth_user.require_admin()?;

    let rows: Vec<(ApplicationStatus, i64)> = application::Entity::find()
        .select_only()
        .column(application::Column::Status)
        .column_as(application::Column::Id.count(), "count")
        .group_by(application::Column::Status)
        .into_tuple()
        .all(&state.db)
        .await?;

    let since = chrono::Utc::now() - chrono::Duration::days(7);
    let last_7_days = application::Entity::find()
        .filter(application::Column::Status.ne(ApplicationStatus::Deleted))
        .filter(application::Column::CreatedAt.gte(since))
        .count(&state.db)
        .await?;

    let by_status: Vec<StatusCount> = ApplicationStatus::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            count: rows
                .iter()
                .find(|(s, _)| *s == status)
                .map_or(0, |(_, c)| u64::try_from(*c).unwrap_or(0)),
        })
        .collect();
    let total = by_status
        .iter()
        .filter(|c| !c.status.is_deleted())
        .map(|c| c.count)
        .sum();

    Ok(Json(ApplicationStatsResponse {
        message: "Statistics retrieved successfully".into(),
        stats: ApplicationStats {
            by_status,
            total,
            last_7_days,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/applications/admin/{id}",
    tag = "Applications",
    operation_id = "getApplicationAdmin",
    summary = "Get any application by ID",
    description = "Admin lookup. Returns deleted applications too.",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application", body = ApplicationEnvelope),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Application not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_application_admin(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApplicationEnvelope>, AppError> {
    auth_user.require_admin()?;
    let id = parse_id(&id)?;
    let model = find_application(&state.db, id).await?;
    Ok(Json(ApplicationEnvelope {
        message: "Application retrieved successfully".into(),
        application: model.into(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/applications/admin/{id}/status",
    tag = "Applications",
    operation_id = "updateApplicationStatus",
    summary = "Change an application's status",
    description = "Sets the review status and optional notes, recording the reviewer and time. `deleted` is not accepted here. `admin_notes` is left unchanged when omitted.",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApplicationEnvelope),
        (status = 400, description = "Invalid status (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Application not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id, status = %payload.status))]
pub async fn update_application_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> Result<Json<ApplicationEnvelope>, AppError> {
    auth_user.require_admin()?;
    let status = validate_update_status(&payload)?;
    let id = parse_id(&id)?;

    let existing = find_application(&state.db, id).await?;
    if existing.status.is_deleted() {
        return Err(not_found());
    }
    let previous = existing.status;

    let now = chrono::Utc::now();
    let mut active: application::ActiveModel = existing.into();
    active.status = Set(status);
    if let Some(notes) = payload.admin_notes {
        active.admin_notes = Set(clean_optional(Some(notes)));
    }
    active.reviewed_at = Set(Some(now));
    active.reviewed_by = Set(Some(auth_user.user_id));
    active.updated_at = Set(now);

    let updated = active.update(&state.db).await?;
    tracing::info!(
        application_id = %updated.id,
        from = %previous,
        to = %status,
        reviewer = %auth_user.user_id,
        "Application status changed"
    );

    Ok(Json(ApplicationEnvelope {
        message: "Application status updated successfully".into(),
        application: updated.into(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/applications/admin/{id}/documents",
    tag = "Applications",
    operation_id = "replaceApplicationDocuments",
    summary = "Replace one document category",
    description = "Replaces the URL array for one document type. Certificates cannot be emptied.",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = ReplaceDocumentsRequest,
    responses(
        (status = 200, description = "Documents replaced", body = ApplicationEnvelope),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Application not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id, document_type = %payload.document_type))]
pub async fn replace_application_documents(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ReplaceDocumentsRequest>,
) -> Result<Json<ApplicationEnvelope>, AppError> {
    auth_user.require_admin()?;
    let doc_type = validate_replace_documents(&payload)?;
    let id = parse_id(&id)?;

    let existing = find_application(&state.db, id).await?;
    if existing.status.is_deleted() {
        return Err(not_found());
    }

    let urls = payload
        .urls
        .into_iter()
        .map(|u| u.trim().to_string())
        .collect();
    let mut active: application::ActiveModel = existing.into();
    active.set_documents(doc_type, urls);
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(&state.db).await?;

    Ok(Json(ApplicationEnvelope {
        message: "Application documents updated successfully".into(),
        application: updated.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/applications/admin/{id}",
    tag = "Applications",
    operation_id = "deleteApplication",
    summary = "Delete an application",
    description = "Marks the application `deleted`. The row and its documents are kept.",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application deleted", body = ApplicationEnvelope),
        (status = 401, description = "Unauthorized (AUTHENTICATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (AUTHORIZATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Application not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_application(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApplicationEnvelope>, AppError> {
    auth_user.require_admin()?;
    let id = parse_id(&id)?;

    let existing = find_application(&state.db, id).await?;
    if existing.status.is_deleted() {
        return Err(not_found());
    }

    let mut active: application::ActiveModel = existing.into();
    active.status = Set(ApplicationStatus::Deleted);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await?;

    tracing::info!(application_id = %updated.id, by = %auth_user.user_id, "Application deleted");

    Ok(Json(ApplicationEnvelope {
        message: "Application deleted successfully".into(),
        application: updated.into(),
    }))
}

fn not_found() -> AppError {
    AppError::NotFound("Application not found".into())
}

/// Parse a path ID. Malformed IDs cannot match any row.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| not_found())
}

async fn find_application<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<application::Model, AppError> {
    application::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}
