use async_trait::async_trait;

use super::error::StorageError;
use super::key::ObjectKey;

/// An object read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Path-addressed object storage with public URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, replacing any previous object.
    async fn put(
        &self,
        key: &ObjectKey,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Retrieve an object and its content type.
    async fn get(&self, key: &ObjectKey) -> Result<StoredObject, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, key: &ObjectKey) -> Result<bool, StorageError>;

    /// Delete an object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError>;

    /// Publicly reachable URL for `key`.
    fn public_url(&self, key: &ObjectKey) -> String;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}

/// Join a base URL and a key with exactly one slash between them.
pub(crate) fn join_url(base: &str, key: &ObjectKey) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.as_str())
}

/// Content type guessed from the key's extension.
pub(crate) fn guess_content_type(key: &ObjectKey) -> String {
    mime_guess::from_path(key.as_str())
        .first_or_octet_stream()
        .to_string()
}
