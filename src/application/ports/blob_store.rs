use std::io;
use std::path::Path;

use crate::domain::BlobLocation;

/// Bucket-addressed object storage.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Object names under `prefix`, in the order the store returns them.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, BlobStoreError>;

    /// Copies the object to `destination`, returning the number of bytes written.
    async fn download(
        &self,
        location: &BlobLocation,
        destination: &Path,
    ) -> Result<u64, BlobStoreError>;

    /// Uploads the contents of `source`, returning the number of bytes sent.
    async fn upload(&self, source: &Path, location: &BlobLocation) -> Result<u64, BlobStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid bucket name: {0}")]
    InvalidBucket(String),
    #[error("invalid object path: {0}")]
    InvalidPath(String),
    #[error("listing failed: {0}")]
    ListFailed(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
