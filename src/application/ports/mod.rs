mod blob_store;
mod transcription_engine;

pub use blob_store::{BlobStore, BlobStoreError};
pub use transcription_engine::{ModelLoader, TranscriptionEngine, TranscriptionError};
