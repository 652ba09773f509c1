use std::sync::Arc;

use vosyn_transcriber::application::ports::{BlobStore, BlobStoreError};
use vosyn_transcriber::application::services::{
    ModelHandle, PersistError, PipelineError, PipelineStage, TranscriptionService,
};
use vosyn_transcriber::domain::{BlobLocation, TranscriptionJob};
use vosyn_transcriber::infrastructure::storage::LocalBlobStore;

use crate::helpers::EchoEngine;

fn create_test_store() -> (tempfile::TempDir, LocalBlobStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = LocalBlobStore::new(dir.path().join("buckets")).unwrap();
    (dir, store)
}

#[tokio::test]
async fn given_local_file_when_uploading_then_download_returns_same_bytes() {
    let (dir, store) = create_test_store();
    let source = dir.path().join("transcript.txt");
    std::fs::write(&source, "hello world").unwrap();
    let location = BlobLocation::new("out-bkt", "results/2024/a_transcribed.txt");

    let sent = store.upload(&source, &location).await.unwrap();
    let destination = dir.path().join("copy.txt");
    let received = store.download(&location, &destination).await.unwrap();

    assert_eq!(sent, 11);
    assert_eq!(received, 11);
    assert_eq!(std::fs::read_to_string(destination).unwrap(), "hello world");
}

#[tokio::test]
async fn given_objects_under_prefix_when_listing_then_returns_only_that_folder() {
    let (dir, store) = create_test_store();
    let source = dir.path().join("blob");
    std::fs::write(&source, "x").unwrap();
    for path in ["whisper-model/base.pt", "whisper-model/notes.txt", "other/large.pt"] {
        store
            .upload(&source, &BlobLocation::new("models", path))
            .await
            .unwrap();
    }

    let mut names = store.list("models", "whisper-model").await.unwrap();
    names.sort();

    assert_eq!(names, vec!["whisper-model/base.pt", "whisper-model/notes.txt"]);
}

#[tokio::test]
async fn given_missing_object_when_downloading_then_returns_not_found() {
    let (dir, store) = create_test_store();
    let source = dir.path().join("blob");
    std::fs::write(&source, "x").unwrap();
    store
        .upload(&source, &BlobLocation::new("in-bkt", "present.wav"))
        .await
        .unwrap();

    let result = store
        .download(
            &BlobLocation::new("in-bkt", "absent.wav"),
            &dir.path().join("out.wav"),
        )
        .await;

    assert!(matches!(result, Err(BlobStoreError::NotFound(_))));
}

#[tokio::test]
async fn given_unknown_bucket_when_listing_then_returns_not_found() {
    let (_dir, store) = create_test_store();

    let result = store.list("nope", "").await;

    assert!(matches!(result, Err(BlobStoreError::NotFound(_))));
}

#[tokio::test]
async fn given_traversing_bucket_name_when_uploading_then_rejected() {
    let (dir, store) = create_test_store();
    let source = dir.path().join("blob");
    std::fs::write(&source, "x").unwrap();

    let result = store
        .upload(&source, &BlobLocation::new("../escape", "a.txt"))
        .await;

    assert!(matches!(result, Err(BlobStoreError::InvalidBucket(_))));
}

fn local_service(store: Arc<LocalBlobStore>, scratch: &std::path::Path) -> TranscriptionService {
    TranscriptionService::new(
        store,
        ModelHandle::new(Arc::new(EchoEngine::new()), "model.pt"),
        scratch.to_path_buf(),
    )
}

fn job(input_path: &str, folder: &str) -> TranscriptionJob {
    TranscriptionJob::new(
        Some("in-bkt"),
        Some("out-bkt"),
        Some(input_path),
        Some(folder),
    )
    .unwrap()
}

#[tokio::test]
async fn given_reserved_characters_in_input_name_when_transcribing_then_written_key_matches_reported() {
    let (dir, store) = create_test_store();
    let source = dir.path().join("take.wav");
    std::fs::write(&source, "take one").unwrap();
    store
        .upload(&source, &BlobLocation::new("in-bkt", "takes/take#1.wav"))
        .await
        .unwrap();
    let store = Arc::new(store);
    let service = local_service(Arc::clone(&store), dir.path());

    let result = service
        .transcribe(&job("takes/take#1.wav", "results/2024"))
        .await
        .unwrap();

    assert_eq!(
        result.output.to_string(),
        "gs://out-bkt/results/2024/take#1_transcribed.txt"
    );
    assert_eq!(
        store.list("out-bkt", "results").await.unwrap(),
        vec!["results/2024/take#1_transcribed.txt"]
    );
    let copy = dir.path().join("copy.txt");
    store.download(&result.output, &copy).await.unwrap();
    assert_eq!(std::fs::read_to_string(copy).unwrap(), "heard: take one");
}

#[tokio::test]
async fn given_empty_segment_in_output_folder_when_transcribing_then_fails_without_writing() {
    let (dir, store) = create_test_store();
    let source = dir.path().join("a.wav");
    std::fs::write(&source, "x").unwrap();
    store
        .upload(&source, &BlobLocation::new("in-bkt", "a.wav"))
        .await
        .unwrap();
    let store = Arc::new(store);
    let service = local_service(Arc::clone(&store), dir.path());

    for folder in ["results//2024", "/results"] {
        let err = service.transcribe(&job("a.wav", folder)).await.unwrap_err();

        assert_eq!(err.stage(), PipelineStage::Persist, "folder: {folder}");
        assert!(matches!(
            err,
            PipelineError::Persist(PersistError::Upload(BlobStoreError::InvalidPath(_)))
        ));
    }
    assert!(!dir.path().join("buckets/out-bkt/results").exists());
}

#[tokio::test]
async fn given_non_canonical_input_path_when_downloading_then_rejected_as_invalid_path() {
    let (dir, store) = create_test_store();
    let source = dir.path().join("blob");
    std::fs::write(&source, "x").unwrap();
    store
        .upload(&source, &BlobLocation::new("in-bkt", "clips/a.wav"))
        .await
        .unwrap();
    for path in ["clips//a.wav", "/clips/a.wav", "clips/../clips/a.wav"] {
        let result = store
            .download(
                &BlobLocation::new("in-bkt", path),
                &dir.path().join("out.wav"),
            )
            .await;

        assert!(
            matches!(result, Err(BlobStoreError::InvalidPath(_))),
            "path: {path}"
        );
    }
}
