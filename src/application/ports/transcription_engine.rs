use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

/// A loaded speech-to-text model.
///
/// Implementations must tolerate concurrent calls; engines whose inference state is
/// mutable serialize access internally.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError>;
}

/// Turns a model artifact on local disk into a ready engine.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(
        &self,
        artifact_path: &Path,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
