use std::path::Path;

use futures::StreamExt;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};
use tokio::io::AsyncWriteExt;

use crate::application::ports::BlobStoreError;
use crate::domain::BlobLocation;

pub(super) async fn list_names(
    store: &dyn ObjectStore,
    prefix: &str,
) -> Result<Vec<String>, BlobStoreError> {
    let prefix = if prefix.is_empty() {
        None
    } else {
        Some(
            StorePath::parse(prefix)
                .map_err(|e| BlobStoreError::InvalidPath(format!("{prefix}: {e}")))?,
        )
    };
    let mut listing = store.list(prefix.as_ref());

    let mut names = Vec::new();
    while let Some(meta) = listing.next().await {
        let meta = meta.map_err(|e| BlobStoreError::ListFailed(e.to_string()))?;
        names.push(meta.location.to_string());
    }

    Ok(names)
}

pub(super) async fn download_to(
    store: &dyn ObjectStore,
    location: &BlobLocation,
    destination: &Path,
) -> Result<u64, BlobStoreError> {
    let store_path = object_key(location)?;
    let result = store.get(&store_path).await.map_err(|e| match e {
        object_store::Error::NotFound { .. } => BlobStoreError::NotFound(location.to_string()),
        other => BlobStoreError::DownloadFailed(other.to_string()),
    })?;

    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::File::create(destination).await?;

    let mut stream = result.into_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(|e| BlobStoreError::DownloadFailed(e.to_string()))?;
        file.write_all(&bytes).await?;
        total_bytes += bytes.len() as u64;
    }
    file.flush().await?;

    Ok(total_bytes)
}

pub(super) async fn upload_from(
    store: &dyn ObjectStore,
    source: &Path,
    location: &BlobLocation,
) -> Result<u64, BlobStoreError> {
    let store_path = object_key(location)?;
    let data = tokio::fs::read(source).await?;
    let size = data.len() as u64;

    store
        .put(&store_path, PutPayload::from(data))
        .await
        .map_err(|e| BlobStoreError::UploadFailed(format!("{location}: {e}")))?;

    Ok(size)
}

/// The object key for `location`, used verbatim. Paths the store would rewrite
/// (empty segments, a leading or trailing `/`, `.` or `..`) are rejected so the
/// key written is always the path reported.
fn object_key(location: &BlobLocation) -> Result<StorePath, BlobStoreError> {
    let key = StorePath::parse(location.path())
        .map_err(|e| BlobStoreError::InvalidPath(format!("{location}: {e}")))?;
    if key.as_ref() != location.path() {
        return Err(BlobStoreError::InvalidPath(format!(
            "{location}: not a canonical object key"
        )));
    }
    Ok(key)
}
