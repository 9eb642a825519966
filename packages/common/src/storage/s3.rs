use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use serde::Deserialize;

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::{ObjectStore, StoredObject, guess_content_type, join_url};

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Service endpoint, e.g. `https://<project>.supabase.co/storage/v1/s3`.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    /// Base URL objects are publicly served from.
    pub public_base_url: String,
}

/// Object store backed by an S3-compatible service.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl S3ObjectStore {
    pub fn new(config: &S3Config) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid S3 credentials: {e}")))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .with_path_style();

        Ok(Self {
            bucket,
            public_base_url: config.public_base_url.clone(),
        })
    }

    fn remote_path(key: &ObjectKey) -> String {
        format!("/{}", key.as_str())
    }
}

fn check_status(key: &ObjectKey, status: u16) -> Result<(), StorageError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::NotFound(key.to_string())),
        other => Err(StorageError::Backend(format!(
            "unexpected status {other} for {key}"
        ))),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &ObjectKey,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let response = self
            .bucket
            .put_object_with_content_type(Self::remote_path(key), &data, content_type)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        check_status(key, response.status_code())
    }

    async fn get(&self, key: &ObjectKey) -> Result<StoredObject, StorageError> {
        let response = self
            .bucket
            .get_object(Self::remote_path(key))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        check_status(key, response.status_code())?;

        let content_type = response
            .headers()
            .get("content-type")
            .cloned()
            .unwrap_or_else(|| guess_content_type(key));

        Ok(StoredObject {
            data: response.bytes().to_vec(),
            content_type,
        })
    }

    async fn exists(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        let (_, status) = self
            .bucket
            .head_object(Self::remote_path(key))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        match check_status(key, status) {
            Ok(()) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        // S3 deletes are idempotent and do not report whether the key existed.
        if !self.exists(key).await? {
            return Ok(false);
        }
        let response = self
            .bucket
            .delete_object(Self::remote_path(key))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        check_status(key, response.status_code())?;
        Ok(true)
    }

    fn public_url(&self, key: &ObjectKey) -> String {
        join_url(&self.public_base_url, key)
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
