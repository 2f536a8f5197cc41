//! Filesystem-backed object store for uploaded note files.
//!
//! Objects are addressed by a slash-separated key such as
//! `pdfs/1717171717171-dbms_unit_1.pdf` and are never overwritten: storing
//! under an existing key fails with [`ServerError::BlobExists`]. Every object
//! is publicly readable through `{public_base_url}/files/{key}`.

use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::ServerError;

/// Verify that a resolved path stays within the expected base directory.
fn ensure_within(base: &Path, target: &Path) -> Result<PathBuf, ServerError> {
    let canonical_base = base.canonicalize().unwrap_or_else(|_| base.to_path_buf());
    let mut resolved = canonical_base.clone();
    for component in target.strip_prefix(base).unwrap_or(target).components() {
        match component {
            Component::Normal(c) => resolved.push(c),
            Component::ParentDir => {
                return Err(ServerError::BadRequest("Path traversal detected".to_string()));
            }
            _ => {} // RootDir, CurDir, Prefix
        }
    }
    if !resolved.starts_with(&canonical_base) {
        return Err(ServerError::BadRequest("Path traversal detected".to_string()));
    }
    Ok(resolved)
}

/// Build the storage key for an upload: `{prefix}/{millis}-{name}`.
pub fn object_key(prefix: &str, original_name: &str, millis: i64) -> String {
    format!(
        "{}/{}-{}",
        prefix.trim_matches('/'),
        millis,
        sanitize_file_name(original_name)
    )
}

/// Reduce a client-supplied file name to a safe single path segment.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// MIME type served for a stored object, derived from its extension.
pub fn content_type_for(key: &str) -> &'static str {
    let ext = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain; charset=utf-8",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone)]
pub struct BlobStore {
    base_path: PathBuf,
    max_size: usize,
    public_base_url: String,
}

impl BlobStore {
    pub async fn new(
        base_path: PathBuf,
        max_size: usize,
        public_base_url: impl Into<String>,
    ) -> Result<Self, ServerError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ServerError::BlobStorage(format!(
                "Failed to create blob directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Blob store initialized");

        Ok(Self {
            base_path,
            max_size,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Write `data` under `key`. Fails if the key is already taken.
    pub async fn store_blob(&self, key: &str, data: &[u8]) -> Result<(), ServerError> {
        if data.is_empty() {
            return Err(ServerError::BlobStorage("Empty blob".to_string()));
        }
        if data.len() > self.max_size {
            return Err(ServerError::BlobTooLarge {
                size: data.len(),
                max: self.max_size,
            });
        }

        let path = self.safe_key_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ServerError::BlobStorage(format!("Failed to create directory for {key}: {e}"))
            })?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => ServerError::BlobExists(key.to_string()),
                _ => ServerError::BlobStorage(format!("Failed to open blob {key}: {e}")),
            })?;

        file.write_all(data)
            .await
            .map_err(|e| ServerError::BlobStorage(format!("Failed to write blob {key}: {e}")))?;
        file.flush()
            .await
            .map_err(|e| ServerError::BlobStorage(format!("Failed to flush blob {key}: {e}")))?;

        debug!(key = %key, size = data.len(), "Stored blob");
        Ok(())
    }

    pub async fn get_blob(&self, key: &str) -> Result<Vec<u8>, ServerError> {
        let path = self.safe_key_path(key)?;

        if !path.is_file() {
            return Err(ServerError::NotFound(format!("file {key}")));
        }

        let data = fs::read(&path)
            .await
            .map_err(|e| ServerError::BlobStorage(format!("Failed to read blob {key}: {e}")))?;

        debug!(key = %key, size = data.len(), "Retrieved blob");
        Ok(data)
    }

    /// Public retrieval URL for `key`.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/files/{}", self.public_base_url, key)
    }

    /// Path for a key, rejecting anything that is not plain segments.
    fn safe_key_path(&self, key: &str) -> Result<PathBuf, ServerError> {
        let valid = !key.is_empty()
            && !key.contains('\\')
            && key
                .split('/')
                .all(|seg| !seg.is_empty() && seg != "." && seg != "..");
        if !valid {
            return Err(ServerError::BadRequest(format!("Invalid file key: {key}")));
        }
        let raw = self.base_path.join(key);
        ensure_within(&self.base_path, &raw)
    }
}
