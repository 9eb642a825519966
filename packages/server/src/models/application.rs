use chrono::{DateTime, NaiveDate, Utc};
use common::{ApplicationStatus, DocumentType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::application;
use crate::error::AppError;

pub use super::shared::{Pagination, clean_optional, escape_like};
use super::shared::{validate_email, validate_optional, validate_required, validate_urls};

/// Maximum number of URLs stored per document category.
pub const MAX_URLS_PER_CATEGORY: usize = 20;

/// Public application form submission.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateApplicationRequest {
    #[schema(example = "Amara")]
    pub first_name: String,
    #[schema(example = "Okafor")]
    pub last_name: String,
    #[schema(example = "amara.okafor@example.com")]
    pub email: String,
    #[schema(example = "+234 801 234 5678")]
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    /// Destination country of interest.
    #[schema(example = "Canada")]
    pub country: String,
    #[schema(example = "MSc Computer Science")]
    pub program: String,
    pub study_level: Option<String>,
    pub intake: Option<String>,
    pub personal_statement: Option<String>,

    #[serde(default)]
    pub passport_urls: Vec<String>,
    /// Required: at least one academic certificate.
    #[serde(default)]
    pub certificate_urls: Option<Vec<String>>,
    #[serde(default)]
    pub transcript_urls: Vec<String>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(default)]
    pub recommendation_urls: Vec<String>,
    #[serde(default)]
    pub other_urls: Vec<String>,
}

pub fn validate_create_application(payload: &CreateApplicationRequest) -> Result<(), AppError> {
    validate_required(&payload.first_name, "first_name", 100)?;
    validate_required(&payload.last_name, "last_name", 100)?;
    validate_email(&payload.email)?;
    validate_required(&payload.phone, "phone", 32)?;
    validate_required(&payload.country, "country", 200)?;
    validate_required(&payload.program, "program", 200)?;
    validate_optional(payload.nationality.as_deref(), "nationality", 100)?;
    validate_optional(payload.study_level.as_deref(), "study_level", 100)?;
    validate_optional(payload.intake.as_deref(), "intake", 100)?;
    validate_optional(
        payload.personal_statement.as_deref(),
        "personal_statement",
        10_000,
    )?;

    match payload.certificate_urls.as_deref() {
        Some(urls) if !urls.is_empty() => {
            validate_urls(urls, "certificate_urls", MAX_URLS_PER_CATEGORY)?
        }
        _ => {
            return Err(AppError::Validation(
                "certificate_urls must contain at least one document".into(),
            ));
        }
    }

    for (urls, field) in [
        (&payload.passport_urls, "passport_urls"),
        (&payload.transcript_urls, "transcript_urls"),
        (&payload.photo_urls, "photo_urls"),
        (&payload.recommendation_urls, "recommendation_urls"),
        (&payload.other_urls, "other_urls"),
    ] {
        validate_urls(urls, field, MAX_URLS_PER_CATEGORY)?;
    }

    if let Some(dob) = payload.date_of_birth
        && dob >= Utc::now().date_naive()
    {
        return Err(AppError::Validation(
            "date_of_birth must be in the past".into(),
        ));
    }
    Ok(())
}

/// Admin status change.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateStatusRequest {
    /// One of `submitted`, `under_review`, `approved`, `rejected`, `pending_documents`.
    #[schema(example = "under_review")]
    pub status: String,
    pub admin_notes: Option<String>,
}

pub fn validate_update_status(payload: &UpdateStatusRequest) -> Result<ApplicationStatus, AppError> {
    let status = payload
        .status
        .trim()
        .parse::<ApplicationStatus>()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if !ApplicationStatus::REVIEWABLE.contains(&status) {
        return Err(AppError::Validation(
            "Use the delete endpoint to delete an application".into(),
        ));
    }
    validate_optional(payload.admin_notes.as_deref(), "admin_notes", 5_000)?;
    Ok(status)
}

/// Replace one document category's URL array.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReplaceDocumentsRequest {
    #[schema(example = "transcript")]
    pub document_type: String,
    pub urls: Vec<String>,
}

pub fn validate_replace_documents(
    payload: &ReplaceDocumentsRequest,
) -> Result<DocumentType, AppError> {
    let doc_type = payload
        .document_type
        .trim()
        .parse::<DocumentType>()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let field = format!("{}_urls", doc_type.as_str());
    if doc_type == DocumentType::Certificate && payload.urls.is_empty() {
        return Err(AppError::Validation(
            "certificate_urls must contain at least one document".into(),
        ));
    }
    validate_urls(&payload.urls, &field, MAX_URLS_PER_CATEGORY)?;
    Ok(doc_type)
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApplicationListQuery {
    /// Filter by status.
    pub status: Option<String>,
    pub program: Option<String>,
    pub country: Option<String>,
    /// Case-insensitive match on first name, last name or email.
    pub search: Option<String>,
    /// Include applications with status `deleted`. Default false.
    pub include_deleted: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// `created_at` (default), `updated_at` or `last_name`.
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default).
    pub sort_order: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub country: String,
    pub program: String,
    pub study_level: Option<String>,
    pub intake: Option<String>,
    pub personal_statement: Option<String>,
    pub passport_urls: Vec<String>,
    pub certificate_urls: Vec<String>,
    pub transcript_urls: Vec<String>,
    pub photo_urls: Vec<String>,
    pub recommendation_urls: Vec<String>,
    pub other_urls: Vec<String>,
    pub status: ApplicationStatus,
    pub admin_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<application::Model> for ApplicationResponse {
    fn from(m: application::Model) -> Self {
        Self {
            passport_urls: m.documents(DocumentType::Passport),
            certificate_urls: m.documents(DocumentType::Certificate),
            transcript_urls: m.documents(DocumentType::Transcript),
            photo_urls: m.documents(DocumentType::Photo),
            recommendation_urls: m.documents(DocumentType::Recommendation),
            other_urls: m.documents(DocumentType::Other),
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            phone: m.phone,
            date_of_birth: m.date_of_birth,
            nationality: m.nationality,
            country: m.country,
            program: m.program,
            study_level: m.study_level,
            intake: m.intake,
            personal_statement: m.personal_statement,
            status: m.status,
            admin_notes: m.admin_notes,
            reviewed_at: m.reviewed_at,
            reviewed_by: m.reviewed_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ApplicationEnvelope {
    #[schema(example = "Application submitted successfully")]
    pub message: String,
    pub application: ApplicationResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ApplicationListResponse {
    pub message: String,
    pub applications: Vec<ApplicationResponse>,
    pub pagination: Pagination,
}

/// Number of applications in one status.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ApplicationStats {
    pub by_status: Vec<StatusCount>,
    /// Applications not marked deleted.
    pub total: u64,
    /// Non-deleted applications created in the last seven days.
    pub last_7_days: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ApplicationStatsResponse {
    pub message: String,
    pub stats: ApplicationStats,
}
