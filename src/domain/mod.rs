mod blob_location;
mod model_artifact;
mod output_name;
mod transcription_job;

pub use blob_location::BlobLocation;
pub use model_artifact::{ArtifactSelection, SelectionPolicy, select_artifact};
pub use output_name::{
    TRANSCRIPT_EXTENSION, TRANSCRIPT_SUFFIX, extension, transcript_file_name,
    transcript_object_path,
};
pub use transcription_job::{TranscriptionJob, TranscriptionResult, ValidationError};
