use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};

/// The process-wide loaded model. Cloning shares the same engine.
#[derive(Clone)]
pub struct ModelHandle {
    engine: Arc<dyn TranscriptionEngine>,
    artifact: Arc<str>,
}

impl ModelHandle {
    pub fn new(engine: Arc<dyn TranscriptionEngine>, artifact: impl Into<Arc<str>>) -> Self {
        Self {
            engine,
            artifact: artifact.into(),
        }
    }

    /// File name of the artifact the model was loaded from.
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        self.engine.transcribe(audio_path).await
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("artifact", &self.artifact)
            .finish_non_exhaustive()
    }
}
