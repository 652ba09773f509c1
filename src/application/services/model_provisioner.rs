use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{BlobStore, BlobStoreError, ModelLoader, TranscriptionError};
use crate::domain::{ArtifactSelection, BlobLocation, SelectionPolicy, select_artifact};

use super::model_handle::ModelHandle;

#[derive(Debug, Clone)]
pub struct ProvisionSettings {
    pub bucket: String,
    pub folder: String,
    pub artifact_suffix: String,
    pub selection: SelectionPolicy,
    pub scratch_dir: PathBuf,
}

/// Finds, downloads and loads the model once at startup.
pub struct ModelProvisioner {
    store: Arc<dyn BlobStore>,
    loader: Arc<dyn ModelLoader>,
    settings: ProvisionSettings,
}

impl ModelProvisioner {
    pub fn new(
        store: Arc<dyn BlobStore>,
        loader: Arc<dyn ModelLoader>,
        settings: ProvisionSettings,
    ) -> Self {
        Self {
            store,
            loader,
            settings,
        }
    }

    pub async fn provision(&self) -> Result<ModelHandle, ProvisionError> {
        let settings = &self.settings;

        tokio::fs::create_dir_all(&settings.scratch_dir)
            .await
            .map_err(ProvisionError::Scratch)?;

        tracing::info!(
            bucket = %settings.bucket,
            folder = %settings.folder,
            suffix = %settings.artifact_suffix,
            policy = %settings.selection,
            "Searching for model artifact"
        );

        let names = self
            .store
            .list(&settings.bucket, &settings.folder)
            .await
            .map_err(ProvisionError::Listing)?;

        let name = match select_artifact(&names, &settings.artifact_suffix, settings.selection) {
            ArtifactSelection::Selected(name) => name,
            ArtifactSelection::NoMatch => {
                return Err(ProvisionError::NotFound {
                    bucket: settings.bucket.clone(),
                    folder: settings.folder.clone(),
                    suffix: settings.artifact_suffix.clone(),
                });
            }
            ArtifactSelection::Ambiguous(candidates) => {
                return Err(ProvisionError::Ambiguous {
                    bucket: settings.bucket.clone(),
                    folder: settings.folder.clone(),
                    candidates,
                });
            }
        };

        let location = BlobLocation::new(settings.bucket.clone(), name);
        let local_path = settings.scratch_dir.join(location.file_name());

        tracing::info!(artifact = %location, listed = names.len(), "Found model, downloading");

        let bytes = self
            .store
            .download(&location, &local_path)
            .await
            .map_err(ProvisionError::Download)?;

        tracing::info!(path = %local_path.display(), bytes, "Model downloaded, loading");

        let engine = self
            .loader
            .load(&local_path)
            .await
            .map_err(ProvisionError::Load)?;

        tracing::info!(artifact = %location, "Model ready");

        Ok(ModelHandle::new(engine, location.file_name()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionErrorKind {
    NotFound,
    IoFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("no model file with '{suffix}' suffix found in bucket '{bucket}/{folder}'")]
    NotFound {
        bucket: String,
        folder: String,
        suffix: String,
    },
    #[error("expected exactly one model in bucket '{bucket}/{folder}', found: {}", .candidates.join(", "))]
    Ambiguous {
        bucket: String,
        folder: String,
        candidates: Vec<String>,
    },
    #[error("scratch directory unavailable: {0}")]
    Scratch(io::Error),
    #[error("listing model folder: {0}")]
    Listing(BlobStoreError),
    #[error("downloading model: {0}")]
    Download(BlobStoreError),
    #[error("loading model: {0}")]
    Load(TranscriptionError),
}

impl ProvisionError {
    pub fn kind(&self) -> ProvisionErrorKind {
        match self {
            ProvisionError::NotFound { .. } | ProvisionError::Ambiguous { .. } => {
                ProvisionErrorKind::NotFound
            }
            ProvisionError::Scratch(_)
            | ProvisionError::Listing(_)
            | ProvisionError::Download(_)
            | ProvisionError::Load(_) => ProvisionErrorKind::IoFailure,
        }
    }
}
