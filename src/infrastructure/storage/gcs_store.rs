use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use object_store::ObjectStore;
use object_store::gcp::GoogleCloudStorageBuilder;

use crate::application::ports::{BlobStore, BlobStoreError};
use crate::domain::BlobLocation;

use super::object_store_ops::{download_to, list_names, upload_from};

/// Google Cloud Storage, credentials taken from the environment
/// (`GOOGLE_SERVICE_ACCOUNT`, `GOOGLE_APPLICATION_CREDENTIALS`, or instance metadata).
#[derive(Default)]
pub struct GcsBlobStore {
    buckets: Mutex<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl GcsBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket(&self, name: &str) -> Result<Arc<dyn ObjectStore>, BlobStoreError> {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = buckets.get(name) {
            return Ok(Arc::clone(store));
        }

        let store: Arc<dyn ObjectStore> = Arc::new(
            GoogleCloudStorageBuilder::from_env()
                .with_bucket_name(name)
                .build()
                .map_err(|e| BlobStoreError::InvalidBucket(format!("{name}: {e}")))?,
        );
        buckets.insert(name.to_string(), Arc::clone(&store));

        Ok(store)
    }
}

#[async_trait::async_trait]
impl BlobStore for GcsBlobStore {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, BlobStoreError> {
        let store = self.bucket(bucket)?;
        list_names(store.as_ref(), prefix).await
    }

    async fn download(
        &self,
        location: &BlobLocation,
        destination: &Path,
    ) -> Result<u64, BlobStoreError> {
        let store = self.bucket(location.bucket())?;
        download_to(store.as_ref(), location, destination).await
    }

    async fn upload(&self, source: &Path, location: &BlobLocation) -> Result<u64, BlobStoreError> {
        let store = self.bucket(location.bucket())?;
        upload_from(store.as_ref(), source, location).await
    }
}
