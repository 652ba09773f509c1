use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::domain::{BlobLocation, extension};

const DEFAULT_AUDIO_EXTENSION: &str = "wav";

/// Request-scoped scratch directory, removed when dropped.
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Creates `root` if needed and a fresh `request-*` directory inside it.
    pub async fn create(root: &Path) -> io::Result<Self> {
        tokio::fs::create_dir_all(root).await?;

        let root = root.to_path_buf();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new().prefix("request-").tempdir_in(root)
        })
        .await
        .map_err(io::Error::other)??;

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Keeps the source extension so decoders can probe the container.
    pub fn audio_path(&self, input: &BlobLocation) -> PathBuf {
        let ext = extension(input.path()).unwrap_or(DEFAULT_AUDIO_EXTENSION);
        self.dir.path().join(format!("input_audio.{ext}"))
    }

    pub fn transcript_path(&self, file_name: &str) -> PathBuf {
        self.dir.path().join(file_name)
    }
}
