use std::fmt;

use super::error::StorageError;

const MAX_KEY_LEN: usize = 512;

/// A validated object key: a relative, slash-separated path inside a store.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Validate and normalize a key.
    ///
    /// Rejects empty keys, absolute paths, trailing or doubled slashes, `..`
    /// and hidden (`.`-prefixed) segments, and anything outside
    /// `a-zA-Z0-9/-_.`.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(invalid("key cannot be empty"));
        }
        if trimmed.len() > MAX_KEY_LEN {
            return Err(invalid("key exceeds maximum length of 512 characters"));
        }
        if trimmed.starts_with('/') {
            return Err(invalid("key must not start with '/'"));
        }
        if trimmed.ends_with('/') {
            return Err(invalid("key must not end with '/'"));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
        {
            return Err(invalid(
                "key contains invalid characters (allowed: a-zA-Z0-9, /, -, _, .)",
            ));
        }

        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(invalid("key must not contain empty segments"));
            }
            if segment == ".." {
                return Err(invalid("key must not contain '..' traversal"));
            }
            if segment.starts_with('.') {
                return Err(invalid("key segments must not start with '.'"));
            }
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn invalid(msg: &str) -> StorageError {
    StorageError::InvalidKey(msg.to_string())
}
