use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{BlobStore, BlobStoreError};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::gcs_store::GcsBlobStore;
use super::local_store::LocalBlobStore;

pub struct BlobStoreFactory;

impl BlobStoreFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn BlobStore>, BlobStoreError> {
        match settings.provider {
            StorageProviderSetting::Gcs => Ok(Arc::new(GcsBlobStore::new())),
            StorageProviderSetting::Local => {
                let store = LocalBlobStore::new(PathBuf::from(&settings.local_root))?;
                Ok(Arc::new(store))
            }
        }
    }
}
