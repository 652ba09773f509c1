#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vosyn_transcriber::application::ports::{
    BlobStore, BlobStoreError, ModelLoader, TranscriptionEngine, TranscriptionError,
};
use vosyn_transcriber::application::services::{ModelHandle, TranscriptionService};
use vosyn_transcriber::domain::BlobLocation;
use vosyn_transcriber::presentation::{AppState, create_router};

/// Blob store held in memory, counting every call.
#[derive(Default)]
pub struct InMemoryBlobStore {
    objects: Mutex<Vec<(BlobLocation, Vec<u8>)>>,
    pub list_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    fail_uploads: bool,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn with_object(self, bucket: &str, path: &str, data: &[u8]) -> Self {
        self.put(BlobLocation::new(bucket, path), data.to_vec());
        self
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        let wanted = BlobLocation::new(bucket, path);
        self.objects
            .lock()
            .unwrap()
            .iter()
            .find(|(location, _)| *location == wanted)
            .map(|(_, data)| data.clone())
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
            + self.download_calls.load(Ordering::SeqCst)
            + self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    fn put(&self, location: BlobLocation, data: Vec<u8>) {
        let mut objects = self.objects.lock().unwrap();
        objects.retain(|(existing, _)| *existing != location);
        objects.push((location, data));
    }
}

#[async_trait::async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, BlobStoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(location, _)| location.bucket() == bucket)
            .filter(|(location, _)| location.path().starts_with(prefix))
            .map(|(location, _)| location.path().to_string())
            .collect())
    }

    async fn download(
        &self,
        location: &BlobLocation,
        destination: &Path,
    ) -> Result<u64, BlobStoreError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        let data = self
            .object(location.bucket(), location.path())
            .ok_or_else(|| BlobStoreError::NotFound(location.to_string()))?;
        tokio::fs::write(destination, &data).await?;
        Ok(data.len() as u64)
    }

    async fn upload(&self, source: &Path, location: &BlobLocation) -> Result<u64, BlobStoreError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads {
            return Err(BlobStoreError::UploadFailed(format!("{location}: denied")));
        }
        let data = tokio::fs::read(source).await?;
        let size = data.len() as u64;
        self.put(location.clone(), data);
        Ok(size)
    }
}

/// Engine whose transcript is the staged file's text. Reads the file again after
/// `delay` and fails if another request overwrote it in between.
pub struct EchoEngine {
    pub delay: Duration,
}

impl EchoEngine {
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait::async_trait]
impl TranscriptionEngine for EchoEngine {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        let first = tokio::fs::read_to_string(audio_path).await?;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let second = tokio::fs::read_to_string(audio_path).await?;
        if first != second {
            return Err(TranscriptionError::TranscriptionFailed(
                "staged audio changed during inference".to_string(),
            ));
        }
        Ok(format!("heard: {first}"))
    }
}

pub struct FailingEngine;

#[async_trait::async_trait]
impl TranscriptionEngine for FailingEngine {
    async fn transcribe(&self, _audio_path: &Path) -> Result<String, TranscriptionError> {
        Err(TranscriptionError::DecodingFailed("corrupt audio".to_string()))
    }
}

pub struct PanickingEngine;

#[async_trait::async_trait]
impl TranscriptionEngine for PanickingEngine {
    async fn transcribe(&self, _audio_path: &Path) -> Result<String, TranscriptionError> {
        panic!("inference exploded");
    }
}

/// Loader that records the artifact path and hands back an [`EchoEngine`].
#[derive(Default)]
pub struct RecordingLoader {
    pub loaded: Mutex<Vec<PathBuf>>,
    pub fail: bool,
}

#[async_trait::async_trait]
impl ModelLoader for RecordingLoader {
    async fn load(
        &self,
        artifact_path: &Path,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        self.loaded.lock().unwrap().push(artifact_path.to_path_buf());
        if self.fail {
            return Err(TranscriptionError::ModelLoadFailed(
                "bad checkpoint".to_string(),
            ));
        }
        Ok(Arc::new(EchoEngine::new()))
    }
}

pub fn service(
    store: Arc<InMemoryBlobStore>,
    engine: Arc<dyn TranscriptionEngine>,
    scratch: &Path,
) -> TranscriptionService {
    TranscriptionService::new(
        store,
        ModelHandle::new(engine, "model.pt"),
        scratch.to_path_buf(),
    )
}

pub fn app(
    store: Arc<InMemoryBlobStore>,
    engine: Arc<dyn TranscriptionEngine>,
    scratch: &Path,
) -> axum::Router {
    create_router(AppState::new(Arc::new(service(store, engine, scratch))))
}

pub fn predict_body(
    input_bucket: &str,
    output_bucket: &str,
    input_path: &str,
    output_folder: &str,
) -> String {
    serde_json::json!({
        "input_bucket_name": input_bucket,
        "output_bucket_name": output_bucket,
        "input_audio_file_path": input_path,
        "output_folder": output_folder,
    })
    .to_string()
}

pub fn scratch_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Number of entries directly under `dir`.
pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|e| e.count()).unwrap_or(0)
}
