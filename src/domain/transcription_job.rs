use super::blob_location::BlobLocation;
use super::output_name::transcript_object_path;

/// A request whose four coordinates are known to be present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionJob {
    input: BlobLocation,
    output_bucket: String,
    output_folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required fields: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

impl TranscriptionJob {
    pub fn new(
        input_bucket_name: Option<&str>,
        output_bucket_name: Option<&str>,
        input_audio_file_path: Option<&str>,
        output_folder: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let mut missing = Vec::new();
        let mut require = |name: &'static str, value: Option<&str>| match value {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let input_bucket = require("input_bucket_name", input_bucket_name);
        let output_bucket = require("output_bucket_name", output_bucket_name);
        let input_path = require("input_audio_file_path", input_audio_file_path);
        let output_folder = require("output_folder", output_folder);

        if !missing.is_empty() {
            return Err(ValidationError { missing });
        }

        Ok(Self {
            input: BlobLocation::new(input_bucket, input_path),
            output_bucket,
            output_folder,
        })
    }

    pub fn input(&self) -> &BlobLocation {
        &self.input
    }

    pub fn output_bucket(&self) -> &str {
        &self.output_bucket
    }

    pub fn output_folder(&self) -> &str {
        &self.output_folder
    }

    /// Where the transcript for this job is written.
    pub fn output_location(&self) -> BlobLocation {
        BlobLocation::new(
            self.output_bucket.clone(),
            transcript_object_path(&self.output_folder, self.input.path()),
        )
    }
}

/// Location of a transcript that was uploaded successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionResult {
    pub output: BlobLocation,
}
