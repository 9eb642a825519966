use common::{ApplicationStatus, DocumentType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An admissions application submitted through the public form.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "application")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub first_name: String,
    pub last_name: String,
    #[sea_orm(indexed)]
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<Date>,
    pub nationality: Option<String>,

    /// Destination country the applicant is interested in.
    #[sea_orm(indexed)]
    pub country: String,
    #[sea_orm(indexed)]
    pub program: String,
    pub study_level: Option<String>,
    pub intake: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub personal_statement: Option<String>,

    /// Document URLs, one JSON string array per document category.
    #[sea_orm(column_type = "JsonBinary")]
    pub passport_urls: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub certificate_urls: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub transcript_urls: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub photo_urls: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub recommendation_urls: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub other_urls: Json,

    #[sea_orm(indexed)]
    pub status: ApplicationStatus,

    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,
    pub reviewed_at: Option<DateTimeUtc>,
    /// Profile id of the admin who last changed the status.
    pub reviewed_by: Option<Uuid>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// URL array stored for `doc_type`.
    pub fn documents(&self, doc_type: DocumentType) -> Vec<String> {
        let value = match doc_type {
            DocumentType::Passport => &self.passport_urls,
            DocumentType::Certificate => &self.certificate_urls,
            DocumentType::Transcript => &self.transcript_urls,
            DocumentType::Photo => &self.photo_urls,
            DocumentType::Recommendation => &self.recommendation_urls,
            DocumentType::Other => &self.other_urls,
        };
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

impl ActiveModel {
    /// Replace the URL array stored for `doc_type`.
    pub fn set_documents(&mut self, doc_type: DocumentType, urls: Vec<String>) {
        let value = sea_orm::Set(Json::from(urls));
        match doc_type {
            DocumentType::Passport => self.passport_urls = value,
            DocumentType::Certificate => self.certificate_urls = value,
            DocumentType::Transcript => self.transcript_urls = value,
            DocumentType::Photo => self.photo_urls = value,
            DocumentType::Recommendation => self.recommendation_urls = value,
            DocumentType::Other => self.other_urls = value,
        }
    }
}
