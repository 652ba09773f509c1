mod model_handle;
mod model_provisioner;
mod staging_area;
mod transcription_service;

pub use model_handle::ModelHandle;
pub use model_provisioner::{
    ModelProvisioner, ProvisionError, ProvisionErrorKind, ProvisionSettings,
};
pub use staging_area::StagingArea;
pub use transcription_service::{
    PersistError, PipelineError, PipelineStage, TranscriptionService,
};
