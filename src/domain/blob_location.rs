use std::fmt;

/// A blob coordinate: bucket plus object path inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobLocation {
    bucket: String,
    path: String,
}

impl BlobLocation {
    pub fn new(bucket: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            path: path.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last segment of the object path.
    pub fn file_name(&self) -> &str {
        base_name(&self.path)
    }
}

impl fmt::Display for BlobLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.path)
    }
}

pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
