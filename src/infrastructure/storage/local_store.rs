use std::path::{Path, PathBuf};

use object_store::local::LocalFileSystem;

use crate::application::ports::{BlobStore, BlobStoreError};
use crate::domain::BlobLocation;

use super::object_store_ops::{download_to, list_names, upload_from};

/// Buckets are subdirectories of `root`.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf) -> Result<Self, BlobStoreError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn bucket(&self, name: &str, create: bool) -> Result<LocalFileSystem, BlobStoreError> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(BlobStoreError::InvalidBucket(name.to_string()));
        }

        let dir = self.root.join(name);
        if create {
            std::fs::create_dir_all(&dir)?;
        } else if !dir.is_dir() {
            return Err(BlobStoreError::NotFound(format!("bucket {name}")));
        }

        LocalFileSystem::new_with_prefix(dir)
            .map_err(|e| BlobStoreError::InvalidBucket(format!("{name}: {e}")))
    }
}

#[async_trait::async_trait]
impl BlobStore for LocalBlobStore {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, BlobStoreError> {
        let store = self.bucket(bucket, false)?;
        list_names(&store, prefix).await
    }

    async fn download(
        &self,
        location: &BlobLocation,
        destination: &Path,
    ) -> Result<u64, BlobStoreError> {
        let store = self.bucket(location.bucket(), false)?;
        download_to(&store, location, destination).await
    }

    async fn upload(&self, source: &Path, location: &BlobLocation) -> Result<u64, BlobStoreError> {
        let store = self.bucket(location.bucket(), true)?;
        upload_from(&store, source, location).await
    }
}
