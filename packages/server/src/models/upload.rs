use common::DocumentType;
use serde::Serialize;

/// A file written to object storage.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UploadedFile {
    /// Public URL to store on the application or post.
    #[schema(example = "https://files.example.com/applications/temp/passports/0e6f-passport.pdf")]
    pub url: String,
    /// Object key inside the store.
    pub key: String,
    /// Original filename as sent by the client.
    pub filename: String,
    pub size: u64,
    #[schema(example = "application/pdf")]
    pub content_type: String,
    pub document_type: Option<DocumentType>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    #[schema(example = "Files uploaded successfully")]
    pub message: String,
    pub files: Vec<UploadedFile>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageUploadResponse {
    #[schema(example = "Image uploaded successfully")]
    pub message: String,
    pub file: UploadedFile,
}
