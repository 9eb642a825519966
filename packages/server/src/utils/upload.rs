use axum::extract::DefaultBodyLimit;
use axum::extract::multipart::Field;
use common::storage::{ObjectKey, ObjectStore};
use futures::future::join_all;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::upload::UploadedFile;
use crate::utils::filename::{sanitize_for_key, validate_flat_filename};

/// MIME types accepted for application documents.
pub const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/webp",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// MIME types accepted for blog images.
pub const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Size, count and type limits applied to one kind of upload.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub allowed_mime_types: &'static [&'static str],
    pub max_bytes: u64,
    pub max_files: usize,
}

impl UploadPolicy {
    pub fn documents(max_bytes: u64, max_files: usize) -> Self {
        Self {
            allowed_mime_types: DOCUMENT_MIME_TYPES,
            max_bytes,
            max_files,
        }
    }

    pub fn images(max_bytes: u64) -> Self {
        Self {
            allowed_mime_types: IMAGE_MIME_TYPES,
            max_bytes,
            max_files: 1,
        }
    }

    /// Request body limit large enough for a full request under this policy.
    pub fn body_limit(&self) -> DefaultBodyLimit {
        let per_file = usize::try_from(self.max_bytes).unwrap_or(usize::MAX);
        // Allow for multipart framing and small text fields.
        DefaultBodyLimit::max(
            per_file
                .saturating_mul(self.max_files)
                .saturating_add(64 * 1024),
        )
    }

    pub fn check_content_type(&self, content_type: &str) -> Result<(), AppError> {
        if self.allowed_mime_types.contains(&content_type) {
            Ok(())
        } else {
            Err(AppError::FileUpload(format!(
                "File type '{content_type}' is not allowed. Allowed types: {}",
                self.allowed_mime_types.join(", ")
            )))
        }
    }

    pub fn check_size(&self, size: u64) -> Result<(), AppError> {
        if size > self.max_bytes {
            Err(AppError::FileUpload(format!(
                "File exceeds maximum size of {} bytes",
                self.max_bytes
            )))
        } else {
            Ok(())
        }
    }
}

/// A file read from the request and checked against its policy, not yet stored.
#[derive(Debug)]
pub struct PendingUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Resolve the MIME type of a part: the declared type, else a guess from the filename.
pub fn resolve_content_type(declared: Option<&str>, filename: &str) -> String {
    match declared.map(|d| d.trim().to_ascii_lowercase()) {
        Some(d) if !d.is_empty() && d != "application/octet-stream" => d,
        _ => mime_guess::from_path(filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}

/// Read one multipart file field, failing as soon as it breaks the policy.
pub async fn read_file_field(
    mut field: Field<'_>,
    policy: &UploadPolicy,
) -> Result<PendingUpload, AppError> {
    let raw_name = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| AppError::FileUpload("File field must have a filename".into()))?;
    let filename = validate_flat_filename(&raw_name)
        .map_err(|e| AppError::FileUpload(e.message().into()))?
        .to_string();

    let content_type = resolve_content_type(field.content_type(), &filename);
    policy.check_content_type(&content_type)?;

    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::FileUpload(format!("Upload read error: {e}")))?
    {
        policy.check_size((data.len() + chunk.len()) as u64)?;
        data.extend_from_slice(&chunk);
    }

    if data.is_empty() {
        return Err(AppError::FileUpload(format!("File '{filename}' is empty")));
    }

    Ok(PendingUpload {
        filename,
        content_type,
        data,
    })
}

/// Extension written for an accepted MIME type.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "application/pdf" => Some("pdf"),
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "application/msword" => Some("doc"),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => Some("docx"),
        other => mime_guess::get_mime_extensions_str(other).and_then(|exts| exts.first().copied()),
    }
}

/// Key-safe filename whose extension maps back to `content_type`.
///
/// Backends that infer the type from the key must serve the checked type,
/// so a mismatched or missing extension is replaced.
pub fn key_filename(filename: &str, content_type: &str) -> String {
    let sanitized = sanitize_for_key(filename);
    if mime_guess::from_path(&sanitized)
        .iter()
        .any(|m| m.essence_str() == content_type)
    {
        return sanitized;
    }

    let stem = match sanitized.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => sanitized.as_str(),
    };
    match extension_for(content_type) {
        Some(ext) => sanitize_for_key(&format!("{stem}.{ext}")),
        None => stem.to_string(),
    }
}

/// Build the object key `<prefix>/<uuid>-<sanitized filename>`.
pub fn object_key_for(
    prefix: &str,
    filename: &str,
    content_type: &str,
) -> Result<ObjectKey, AppError> {
    let key = format!(
        "{prefix}/{}-{}",
        Uuid::new_v4(),
        key_filename(filename, content_type)
    );
    Ok(ObjectKey::parse(&key)?)
}

/// Store every pending upload concurrently.
///
/// The puts are independent: a failure does not undo the others, and any
/// objects already written stay in the store.
pub async fn store_all(
    store: &dyn ObjectStore,
    prefix: &str,
    uploads: Vec<PendingUpload>,
) -> Result<Vec<UploadedFile>, AppError> {
    let mut prepared = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let key = object_key_for(prefix, &upload.filename, &upload.content_type)?;
        prepared.push((key, upload));
    }

    let results = join_all(prepared.into_iter().map(|(key, upload)| async move {
        let size = upload.data.len() as u64;
        store
            .put(&key, upload.data, &upload.content_type)
            .await
            .map(|()| UploadedFile {
                url: store.public_url(&key),
                key: key.to_string(),
                filename: upload.filename,
                size,
                content_type: upload.content_type,
                document_type: None,
            })
    }))
    .await;

    let total = results.len();
    let mut stored = Vec::with_capacity(total);
    let mut first_error = None;
    for result in results {
        match result {
            Ok(file) => stored.push(file),
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        None => Ok(stored),
        Some(e) => {
            let orphaned: Vec<&str> = stored.iter().map(|f| f.key.as_str()).collect();
            tracing::warn!(
                stored = stored.len(),
                failed = total - stored.len(),
                orphaned_keys = ?orphaned,
                "Upload fan-out partially failed; stored objects were kept"
            );
            Err(e.into())
        }
    }
}
