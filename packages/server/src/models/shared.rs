use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Envelope for operations that return nothing but a confirmation.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Post permanently deleted")]
    pub message: String,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Highest page number a list query will address.
pub const MAX_PAGE: u64 = 1_000_000;

/// Normalize `page`/`per_page` query values: page in 1..=MAX_PAGE, per_page in 1..=100 (default 20).
pub fn page_params(page: Option<u64>, per_page: Option<u64>) -> (u64, u64) {
    (
        page.unwrap_or(1).clamp(1, MAX_PAGE),
        per_page.unwrap_or(20).clamp(1, 100),
    )
}

/// Row offset of the first item on `page`.
pub fn page_offset(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(per_page)
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Case-insensitive substring match on `col`. `term` must already be escaped.
pub fn contains_ci<C: ColumnTrait>(col: C, term: &str) -> Condition {
    Condition::all().add(
        Expr::expr(Func::lower(Expr::col(col)))
            .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
    )
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Require a trimmed, non-empty string of at most `max` characters.
pub fn validate_required(value: &str, field: &str, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(())
}

/// Limit an optional string to `max` characters.
pub fn validate_optional(value: Option<&str>, field: &str, max: usize) -> Result<(), AppError> {
    if let Some(value) = value
        && value.trim().chars().count() > max
    {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Loose shape check: `local@domain.tld`, no whitespace, at most 254 characters.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = email.len() <= 254
        && !email.chars().any(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };
    if valid {
        Ok(())
    } else {
        Err(AppError::Validation("email must be a valid email address".into()))
    }
}

pub const MAX_URL_LEN: usize = 2048;

/// Validate a list of document/image URLs: each `http(s)://`, at most 2048 chars.
pub fn validate_urls(urls: &[String], field: &str, max_items: usize) -> Result<(), AppError> {
    if urls.len() > max_items {
        return Err(AppError::Validation(format!(
            "{field} must contain at most {max_items} entries"
        )));
    }
    for url in urls {
        validate_url(url, field)?;
    }
    Ok(())
}

pub fn validate_url(url: &str, field: &str) -> Result<(), AppError> {
    let url = url.trim();
    let has_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_scheme || url.len() > MAX_URL_LEN || url.chars().any(char::is_whitespace) {
        return Err(AppError::Validation(format!(
            "{field} entries must be http(s) URLs of at most {MAX_URL_LEN} characters"
        )));
    }
    Ok(())
}

/// Trim and drop empty optional strings.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
