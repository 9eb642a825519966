use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a supporting document attached to an application.
///
/// Each category is stored as its own array of URLs on the application row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Passport,
    Certificate,
    Transcript,
    Photo,
    Recommendation,
    Other,
}

impl DocumentType {
    pub const ALL: &'static [DocumentType] = &[
        Self::Passport,
        Self::Certificate,
        Self::Transcript,
        Self::Photo,
        Self::Recommendation,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::Certificate => "certificate",
            Self::Transcript => "transcript",
            Self::Photo => "photo",
            Self::Recommendation => "recommendation",
            Self::Other => "other",
        }
    }

    /// Storage folder used for uploads of this category.
    pub fn folder(&self) -> &'static str {
        match self {
            Self::Passport => "passports",
            Self::Certificate => "certificates",
            Self::Transcript => "transcripts",
            Self::Photo => "photos",
            Self::Recommendation => "recommendations",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDocumentTypeError {
    invalid: String,
}

impl fmt::Display for ParseDocumentTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid document type '{}'. Valid values: {}",
            self.invalid,
            DocumentType::ALL
                .iter()
                .map(|d| d.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseDocumentTypeError {}

impl FromStr for DocumentType {
    type Err = ParseDocumentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentType::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ParseDocumentTypeError {
                invalid: s.to_string(),
            })
    }
}
