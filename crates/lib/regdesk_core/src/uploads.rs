//! File intake: validates uploads and writes them to object storage.
//!
//! Objects are written once under a fresh `uploads/<uuid>.<ext>` key and are
//! never overwritten or deleted by this crate. Deleting a client record
//! leaves its file in place.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// Maximum accepted upload size: 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Declared content types accepted for upload.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Key prefix for all uploaded objects.
pub const UPLOAD_PREFIX: &str = "uploads";

/// Upload errors.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File is required")]
    Missing,

    #[error("File must be at most 10MB (got {size} bytes)")]
    TooLarge { size: usize },

    #[error("File type not allowed: {0}. Use JPG, PNG, PDF or DOC")]
    UnsupportedType(String),

    #[error("Failed to upload file: {0}")]
    Storage(String),
}

impl UploadError {
    /// Whether the caller can fix the problem by sending a different file.
    pub fn is_invalid_file(&self) -> bool {
        !matches!(self, UploadError::Storage(_))
    }
}

/// An uploaded file held in memory.
#[derive(Clone)]
pub struct Upload {
    /// Original filename as sent by the client.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    pub bytes: Bytes,
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Where an upload ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    pub url: String,
}

/// Check presence, size, and declared type. Performs no I/O.
pub fn validate(upload: Option<&Upload>) -> Result<&Upload, UploadError> {
    let upload = upload.ok_or(UploadError::Missing)?;
    if upload.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            size: upload.bytes.len(),
        });
    }
    let content_type = upload.content_type.trim().to_ascii_lowercase();
    if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(UploadError::UnsupportedType(upload.content_type.clone()));
    }
    Ok(upload)
}

/// Public URL base for an AWS S3 bucket.
pub fn s3_public_base(bucket: &str, region: &str) -> String {
    format!("https://{bucket}.s3.{region}.amazonaws.com")
}

/// Build a fresh object key, keeping the original file extension.
pub fn object_key(file_name: &str) -> String {
    let id = Uuid::new_v4();
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase);
    match ext {
        Some(ext) => format!("{UPLOAD_PREFIX}/{id}.{ext}"),
        None => format!("{UPLOAD_PREFIX}/{id}"),
    }
}

/// Validates uploads and writes them to an object store.
#[derive(Clone)]
pub struct FileIntake {
    store: Arc<dyn ObjectStore>,
    public_base: String,
}

impl fmt::Debug for FileIntake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileIntake")
            .field("store", &self.store.to_string())
            .field("public_base", &self.public_base)
            .finish()
    }
}

impl FileIntake {
    /// `public_base` is the URL under which stored keys are publicly
    /// reachable, e.g. the output of [`s3_public_base`].
    pub fn new(store: Arc<dyn ObjectStore>, public_base: impl Into<String>) -> Self {
        Self {
            store,
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Public URL for a stored key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base)
    }

    /// Validate `upload` and write it under a new key.
    ///
    /// Nothing is written if validation fails. A failed write is reported as
    /// `UploadError::Storage` and leaves no record of the upload.
    pub async fn store(&self, upload: Option<Upload>) -> Result<StoredFile, UploadError> {
        validate(upload.as_ref())?;
        let Some(upload) = upload else {
            return Err(UploadError::Missing);
        };

        let key = object_key(&upload.file_name);
        let path = ObjectPath::from(key.as_str());

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, upload.content_type.clone().into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let size = upload.bytes.len();
        self.store
            .put_opts(&path, PutPayload::from(upload.bytes), opts)
            .await
            .map_err(|e| {
                error!(key = %key, "object store write failed: {e}");
                UploadError::Storage(e.to_string())
            })?;

        info!(key = %key, size, content_type = %upload.content_type, "stored upload");
        Ok(StoredFile {
            url: self.public_url(&key),
            key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn upload(name: &str, content_type: &str, len: usize) -> Upload {
        Upload {
            file_name: name.into(),
            content_type: content_type.into(),
            bytes: Bytes::from(vec![7u8; len]),
        }
    }

    fn intake() -> (Arc<InMemory>, FileIntake) {
        let store = Arc::new(InMemory::new());
        let intake = FileIntake::new(store.clone(), s3_public_base("bucket", "sa-east-1"));
        (store, intake)
    }

    #[test]
    fn validate_rejects_missing_large_and_unsupported() {
        assert!(matches!(validate(None), Err(UploadError::Missing)));

        let too_big = upload("a.pdf", "application/pdf", 11 * 1024 * 1024);
        assert!(matches!(
            validate(Some(&too_big)),
            Err(UploadError::TooLarge { .. })
        ));

        let text = upload("a.txt", "text/plain", 10);
        assert!(matches!(
            validate(Some(&text)),
            Err(UploadError::UnsupportedType(_))
        ));
    }

    #[test]
    fn size_limit_is_inclusive() {
        let at_limit = upload("a.png", "image/png", MAX_UPLOAD_BYTES);
        assert!(validate(Some(&at_limit)).is_ok());
        let over = upload("a.png", "image/png", MAX_UPLOAD_BYTES + 1);
        assert!(validate(Some(&over)).is_err());
    }

    #[test]
    fn every_allowed_type_passes() {
        for ct in ALLOWED_CONTENT_TYPES {
            assert!(validate(Some(&upload("f", ct, 1))).is_ok(), "{ct}");
        }
    }

    #[test]
    fn object_key_keeps_extension() {
        let key = object_key("Contract.Final.PDF");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with(".pdf"));
        assert_ne!(object_key("a.pdf"), object_key("a.pdf"));
        assert!(!object_key("noext").contains('.'));
    }

    #[tokio::test]
    async fn store_writes_bytes_with_content_type() {
        let (store, intake) = intake();
        let stored = intake
            .store(Some(upload("scan.jpeg", "image/jpeg", 64)))
            .await
            .unwrap();

        assert_eq!(
            stored.url,
            format!("https://bucket.s3.sa-east-1.amazonaws.com/{}", stored.key)
        );

        let got = store.get(&ObjectPath::from(stored.key.as_str())).await.unwrap();
        assert_eq!(
            got.attributes.get(&Attribute::ContentType).map(|v| v.as_ref()),
            Some("image/jpeg")
        );
        assert_eq!(got.bytes().await.unwrap().len(), 64);
    }

    #[tokio::test]
    async fn store_produces_distinct_urls() {
        let (_, intake) = intake();
        let a = intake.store(Some(upload("a.pdf", "application/pdf", 1))).await.unwrap();
        let b = intake.store(Some(upload("a.pdf", "application/pdf", 1))).await.unwrap();
        assert_ne!(a.url, b.url);
    }

    #[tokio::test]
    async fn invalid_upload_writes_nothing() {
        let (store, intake) = intake();
        let err = intake
            .store(Some(upload("a.txt", "text/plain", 1)))
            .await
            .unwrap_err();
        assert!(err.is_invalid_file());

        let listed = store.list_with_delimiter(None).await.unwrap();
        assert!(listed.objects.is_empty());
        assert!(listed.common_prefixes.is_empty());
    }

    #[test]
    fn public_base_trailing_slash_is_ignored() {
        let intake = FileIntake::new(Arc::new(InMemory::new()), "https://cdn.example.com/");
        assert_eq!(
            intake.public_url("uploads/x.pdf"),
            "https://cdn.example.com/uploads/x.pdf"
        );
    }
}
