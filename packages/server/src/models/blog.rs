use chrono::{DateTime, Utc};
use common::PostStatus;
use common::slug::slugify;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::blog_post;
use crate::error::AppError;

pub use super::shared::{Pagination, clean_optional, escape_like};
use super::shared::{double_option, validate_optional, validate_required, validate_url};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_CONTENT_BYTES: usize = 1024 * 1024;
pub const MAX_EXCERPT_LEN: usize = 500;
pub const MAX_META_TITLE_LEN: usize = 70;
pub const MAX_META_DESCRIPTION_LEN: usize = 160;
pub const MAX_KEYWORDS: usize = 20;
pub const MAX_KEYWORD_LEN: usize = 50;
pub const MAX_SLUG_LEN: usize = 200;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreatePostRequest {
    #[schema(example = "Studying in Canada: a 2027 guide")]
    pub title: String,
    /// Derived from the title when omitted.
    pub slug: Option<String>,
    /// Markdown or HTML body.
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// `draft` (default) or `published`.
    pub status: Option<String>,
}

/// PATCH body. Nullable fields accept `null` to clear them.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    /// Regenerates the slug. The slug is kept when only the title changes.
    pub slug: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub excerpt: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub featured_image: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub meta_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub meta_description: Option<Option<String>>,
    pub keywords: Option<Vec<String>>,
}

fn validate_title(title: &str) -> Result<(), AppError> {
    validate_required(title, "title", MAX_TITLE_LEN)
}

fn validate_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("content must not be empty".into()));
    }
    if content.len() > MAX_CONTENT_BYTES {
        return Err(AppError::Validation(format!(
            "content must be at most {MAX_CONTENT_BYTES} bytes"
        )));
    }
    Ok(())
}

fn validate_keywords(keywords: &[String]) -> Result<(), AppError> {
    if keywords.len() > MAX_KEYWORDS {
        return Err(AppError::Validation(format!(
            "At most {MAX_KEYWORDS} keywords are allowed"
        )));
    }
    if keywords
        .iter()
        .any(|k| k.trim().is_empty() || k.trim().chars().count() > MAX_KEYWORD_LEN)
    {
        return Err(AppError::Validation(format!(
            "Each keyword must be 1-{MAX_KEYWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_metadata(
    excerpt: Option<&str>,
    featured_image: Option<&str>,
    meta_title: Option<&str>,
    meta_description: Option<&str>,
) -> Result<(), AppError> {
    validate_optional(excerpt, "excerpt", MAX_EXCERPT_LEN)?;
    validate_optional(meta_title, "meta_title", MAX_META_TITLE_LEN)?;
    validate_optional(meta_description, "meta_description", MAX_META_DESCRIPTION_LEN)?;
    if let Some(url) = featured_image.map(str::trim).filter(|u| !u.is_empty()) {
        validate_url(url, "featured_image")?;
    }
    Ok(())
}

/// Validate a create request and return the requested initial status.
pub fn validate_create_post(payload: &CreatePostRequest) -> Result<PostStatus, AppError> {
    validate_title(&payload.title)?;
    validate_content(&payload.content)?;
    validate_metadata(
        payload.excerpt.as_deref(),
        payload.featured_image.as_deref(),
        payload.meta_title.as_deref(),
        payload.meta_description.as_deref(),
    )?;
    validate_keywords(&payload.keywords)?;
    parse_status(payload.status.as_deref())
}

pub fn validate_update_post(payload: &UpdatePostRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title {
        validate_title(title)?;
    }
    if let Some(ref content) = payload.content {
        validate_content(content)?;
    }
    validate_metadata(
        payload.excerpt.as_ref().and_then(Option::as_deref),
        payload.featured_image.as_ref().and_then(Option::as_deref),
        payload.meta_title.as_ref().and_then(Option::as_deref),
        payload.meta_description.as_ref().and_then(Option::as_deref),
    )?;
    if let Some(ref keywords) = payload.keywords {
        validate_keywords(keywords)?;
    }
    Ok(())
}

fn parse_status(status: Option<&str>) -> Result<PostStatus, AppError> {
    match status.map(str::trim) {
        None | Some("") => Ok(PostStatus::default()),
        Some(s) => s
            .parse::<PostStatus>()
            .map_err(|e| AppError::Validation(e.to_string())),
    }
}

/// Slug for a post: the explicit slug when given, else the title, slugified.
pub fn resolve_slug(explicit: Option<&str>, title: &str) -> Result<String, AppError> {
    let source = explicit
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(title);
    let slug = slugify(source);
    if slug.is_empty() {
        return Err(AppError::Validation(
            "slug must contain at least one letter or digit".into(),
        ));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(AppError::Validation(format!(
            "slug must be at most {MAX_SLUG_LEN} characters"
        )));
    }
    Ok(slug)
}

/// Trimmed, non-empty keywords.
pub fn clean_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PublicPostListQuery {
    /// Case-insensitive match on title or excerpt.
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminPostListQuery {
    /// `draft` or `published`.
    pub status: Option<String>,
    pub search: Option<String>,
    /// Include soft-deleted posts. Default false.
    pub include_deleted: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl AdminPostListQuery {
    pub fn status_filter(&self) -> Result<Option<PostStatus>, AppError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_status(Some(s)).map(Some),
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CheckSlugQuery {
    /// Candidate slug or title; it is slugified before the check.
    pub slug: String,
    /// Post to ignore, used while editing.
    pub exclude_id: Option<Uuid>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SlugAvailability {
    #[schema(example = "studying-in-canada-a-2027-guide")]
    pub slug: String,
    pub available: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub status: PostStatus,
    pub author_id: Uuid,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<blog_post::Model> for PostResponse {
    fn from(m: blog_post::Model) -> Self {
        Self {
            keywords: m.keyword_list(),
            id: m.id,
            title: m.title,
            slug: m.slug,
            content: m.content,
            excerpt: m.excerpt,
            featured_image: m.featured_image,
            meta_title: m.meta_title,
            meta_description: m.meta_description,
            status: m.status,
            author_id: m.author_id,
            published_at: m.published_at,
            view_count: m.view_count,
            created_at: m.created_at,
            updated_at: m.updated_at,
            deleted_at: m.deleted_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PostEnvelope {
    #[schema(example = "Post created successfully")]
    pub message: String,
    pub post: PostResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PostListResponse {
    pub message: String,
    pub posts: Vec<PostResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PostStats {
    /// Posts not soft-deleted.
    pub total: u64,
    pub published: u64,
    pub draft: u64,
    pub deleted: u64,
    pub total_views: i64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PostStatsResponse {
    pub message: String,
    pub stats: PostStats,
}
