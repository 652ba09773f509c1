use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{BlobStore, BlobStoreError, TranscriptionError};
use crate::domain::{TranscriptionJob, TranscriptionResult};

use super::model_handle::ModelHandle;
use super::staging_area::StagingArea;

/// Fetch, transcribe, persist, report.
pub struct TranscriptionService {
    store: Arc<dyn BlobStore>,
    model: ModelHandle,
    scratch_dir: PathBuf,
}

impl TranscriptionService {
    pub fn new(store: Arc<dyn BlobStore>, model: ModelHandle, scratch_dir: PathBuf) -> Self {
        Self {
            store,
            model,
            scratch_dir,
        }
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub async fn transcribe(
        &self,
        job: &TranscriptionJob,
    ) -> Result<TranscriptionResult, PipelineError> {
        let staging = StagingArea::create(&self.scratch_dir)
            .await
            .map_err(PipelineError::Staging)?;
        let input = job.input();
        let audio_path = staging.audio_path(input);

        tracing::info!(source = %input, "Downloading audio file");
        let bytes = self
            .store
            .download(input, &audio_path)
            .await
            .map_err(PipelineError::Fetch)?;
        tracing::debug!(path = %audio_path.display(), bytes, "Audio staged");

        let transcript = self
            .model
            .transcribe(&audio_path)
            .await
            .map_err(PipelineError::Inference)?;
        tracing::info!(chars = transcript.len(), "Transcription completed");

        let output = job.output_location();
        let transcript_path = staging.transcript_path(output.file_name());

        tokio::fs::write(&transcript_path, transcript.as_bytes())
            .await
            .map_err(PersistError::Write)?;

        tracing::info!(destination = %output, "Uploading transcription");
        self.store
            .upload(&transcript_path, &output)
            .await
            .map_err(PersistError::Upload)?;

        Ok(TranscriptionResult { output })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Staging,
    Fetch,
    Inference,
    Persist,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("staging area unavailable: {0}")]
    Staging(io::Error),
    #[error("fetching audio: {0}")]
    Fetch(BlobStoreError),
    #[error("transcribing audio: {0}")]
    Inference(TranscriptionError),
    #[error("persisting transcript: {0}")]
    Persist(#[from] PersistError),
}

impl PipelineError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Staging(_) => PipelineStage::Staging,
            PipelineError::Fetch(_) => PipelineStage::Fetch,
            PipelineError::Inference(_) => PipelineStage::Inference,
            PipelineError::Persist(_) => PipelineStage::Persist,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("writing local transcript: {0}")]
    Write(io::Error),
    #[error("{0}")]
    Upload(BlobStoreError),
}
