#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review status of an admissions application.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")
)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Received from the public form, not yet looked at.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "submitted"))]
    Submitted,
    /// An admin has started reviewing it.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "under_review"))]
    UnderReview,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "approved"))]
    Approved,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "rejected"))]
    Rejected,
    /// Waiting on the applicant to supply more documents.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "pending_documents"))]
    PendingDocuments,
    /// Hidden from every listing. The row is kept.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "deleted"))]
    Deleted,
}

impl ApplicationStatus {
    /// All possible status values.
    pub const ALL: &'static [ApplicationStatus] = &[
        Self::Submitted,
        Self::UnderReview,
        Self::Approved,
        Self::Rejected,
        Self::PendingDocuments,
        Self::Deleted,
    ];

    /// Statuses an admin may set through a status update.
    ///
    /// `Deleted` is only reachable through the delete operation.
    pub const REVIEWABLE: &'static [ApplicationStatus] = &[
        Self::Submitted,
        Self::UnderReview,
        Self::Approved,
        Self::Rejected,
        Self::PendingDocuments,
    ];

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Returns the wire representation (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::PendingDocuments => "pending_documents",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        Self::Submitted
    }
}

/// Error when parsing an invalid application status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseApplicationStatusError {
    invalid: String,
}

impl fmt::Display for ParseApplicationStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Valid values: {}",
            self.invalid,
            ApplicationStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseApplicationStatusError {}

impl FromStr for ApplicationStatus {
    type Err = ParseApplicationStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "under_review" => Ok(Self::UnderReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "pending_documents" => Ok(Self::PendingDocuments),
            "deleted" => Ok(Self::Deleted),
            _ => Err(ParseApplicationStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}
