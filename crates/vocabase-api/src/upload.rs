//! Multipart upload handling and content-addressed file storage.

use axum::extract::Multipart;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::info;

use vocabase_core::defaults::MAX_FILE_NAME_LEN;
use vocabase_core::{Error, Result};

use crate::error::ApiError;

/// A file read out of a multipart `file` field.
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// SHA-256 hex digest of a byte slice.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Strip any path components a client may have smuggled into the file name.
fn sanitize_file_name(raw: &str) -> String {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(raw)
        .trim()
        .to_string();
    if base.len() > MAX_FILE_NAME_LEN {
        base[..MAX_FILE_NAME_LEN].to_string()
    } else {
        base
    }
}

/// Read the `file` field from a multipart body, enforcing size and
/// content-type limits.
pub async fn read_file_field(
    mut multipart: Multipart,
    max_bytes: usize,
    allowed_types: &[String],
) -> std::result::Result<UploadedFile, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = sanitize_file_name(field.file_name().unwrap_or("upload.pdf"));
        if file_name.is_empty() {
            return Err(ApiError::validation("File name must not be empty"));
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !allowed_types.iter().any(|t| t == &content_type) {
            return Err(ApiError::validation(format!(
                "Unsupported content type: {content_type}"
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?;
        if bytes.is_empty() {
            return Err(ApiError::validation("Uploaded file is empty"));
        }
        if bytes.len() > max_bytes {
            return Err(ApiError::validation(format!(
                "File exceeds the {max_bytes} byte limit"
            )));
        }

        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::validation("Missing multipart field 'file'"))
}

/// Content-addressed path for a digest: `<dir>/<first two hex chars>/<digest>.pdf`.
pub fn storage_path(upload_dir: &str, file_hash: &str) -> PathBuf {
    let shard = &file_hash[..2.min(file_hash.len())];
    Path::new(upload_dir).join(shard).join(format!("{file_hash}.pdf"))
}

/// Persist bytes at their content-addressed path. Re-uploads of known
/// content are a no-op.
pub async fn persist(upload_dir: &str, file_hash: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = storage_path(upload_dir, file_hash);
    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Ok(path);
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(Error::Io)?;
    }
    tokio::fs::write(&path, bytes).await.map_err(Error::Io)?;

    info!(
        subsystem = "api",
        component = "upload",
        op = "persist",
        file_hash,
        upload_bytes = bytes.len(),
        path = %path.display(),
        "Upload persisted"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_vector() {
        // sha256("abc")
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\paper.pdf"), "paper.pdf");
        assert_eq!(sanitize_file_name("plain.pdf"), "plain.pdf");
    }

    #[test]
    fn test_storage_path_is_sharded_by_prefix() {
        let path = storage_path("/data", "abcdef");
        assert_eq!(path, Path::new("/data/ab/abcdef.pdf"));
    }

    #[tokio::test]
    async fn test_persist_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_str().unwrap();
        let hash = sha256_hex(b"content");

        let first = persist(dir_str, &hash, b"content").await.unwrap();
        assert_eq!(tokio::fs::read(&first).await.unwrap(), b"content");

        // Second call leaves the existing file untouched.
        let second = persist(dir_str, &hash, b"different").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(tokio::fs::read(&second).await.unwrap(), b"content");
    }
}
