
use std::collections::HashSet;

use actix_multipart::Multipart;
use actix_web::error::PayloadError;
use actix_web::http::header::{self, HeaderMap, HeaderValue};
use actix_web::web::Bytes;
use futures_util::stream;
use tokio::io::AsyncWriteExt;

use blue_api::constants::{
    LIMIT_FILE_COUNT, LIMIT_FILE_SIZE, LIMIT_UNEXPECTED_FILE, MAX_UPLOAD_BYTES, MAX_UPLOAD_FILES,
};
use blue_api::entities::image::{ImageSource, Owner};
use blue_api::errors::AppError;
use blue_api::repositories::image::ImageRepository;
use blue_api::storage::disk::DiskStorage;
use blue_api::use_cases::ingest::{StoredUpload, UploadIngestor};

use test_utils::{InMemoryImageRepo, InMemoryOwnerRepo};

async fn storage_in(dir: &tempfile::TempDir) -> DiskStorage {
    let storage = DiskStorage::new(dir.path());
    storage.init().await.unwrap();
    storage
}

async fn store_file(storage: &DiskStorage, name_hint: &str, bytes: &[u8]) -> StoredUpload {
    let stored_name = storage.unique_name(Some(name_hint));
    let mut file = storage.create(&stored_name).await.unwrap();
    file.write_all(bytes).await.unwrap();
    file.flush().await.unwrap();
    StoredUpload { stored_name }
}

fn files_in(dir: &tempfile::TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

#[tokio::test]
async fn ingest_registers_rows_and_keeps_files() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir).await;
    let owner = Owner::article(1);

    let uploads = vec![
        store_file(&storage, "a.png", b"pngbytes").await,
        store_file(&storage, "b.jpg", b"jpgbytes").await,
    ];

    let ingestor = UploadIngestor::new(
        InMemoryImageRepo::new(),
        InMemoryOwnerRepo::with_owner(owner),
        storage.clone(),
    );

    let images = ingestor
        .ingest(owner, uploads.clone(), "http://localhost:3000")
        .await
        .unwrap();

    assert_eq!(images.len(), 2);
    for image in &images {
        assert_eq!(image.source, ImageSource::DeviceUpload);
        assert_eq!(image.owner, owner);
        assert!(image.url.starts_with("http://localhost:3000/uploads/img-"));
    }
    for upload in &uploads {
        assert!(storage.exists(&upload.stored_name).await);
    }
}

#[tokio::test]
async fn ingest_for_missing_owner_leaves_no_files_behind() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir).await;

    let uploads = vec![
        store_file(&storage, "a.png", b"pngbytes").await,
        store_file(&storage, "b.png", b"morebytes").await,
    ];
    assert_eq!(files_in(&dir), 2);

    let ingestor = UploadIngestor::new(
        InMemoryImageRepo::new(),
        InMemoryOwnerRepo::new(),
        storage,
    );

    let result = ingestor
        .ingest(Owner::article(404), uploads, "http://localhost:3000")
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(files_in(&dir), 0);
    assert_eq!(ingestor.image_repo.row_count(), 0);
}

#[tokio::test]
async fn failed_insert_removes_the_stored_file() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir).await;
    let owner = Owner::article(2);

    let uploads = vec![store_file(&storage, "a.gif", b"gifbytes").await];

    let image_repo = InMemoryImageRepo::new();
    image_repo.fail_next_creates();

    let ingestor = UploadIngestor::new(
        image_repo,
        InMemoryOwnerRepo::with_owner(owner),
        storage,
    );

    let result = ingestor
        .ingest(owner, uploads, "http://localhost:3000")
        .await;

    assert!(result.is_err());
    assert_eq!(files_in(&dir), 0);
    assert_eq!(ingestor.image_repo.row_count(), 0);
}

#[tokio::test]
async fn successful_rows_survive_a_mid_batch_failure() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir).await;
    let owner = Owner::article(3);

    // First file registers, then creates start failing.
    let first = store_file(&storage, "ok.png", b"okbytes").await;
    let second = store_file(&storage, "bad.png", b"badbytes").await;

    let ingestor = UploadIngestor::new(
        InMemoryImageRepo::new(),
        InMemoryOwnerRepo::with_owner(owner),
        storage.clone(),
    );

    let created = ingestor
        .ingest(owner, vec![first.clone()], "http://host")
        .await
        .unwrap();
    assert_eq!(created.len(), 1);

    ingestor.image_repo.fail_next_creates();
    let result = ingestor.ingest(owner, vec![second.clone()], "http://host").await;
    assert!(result.is_err());

    // The registered image and its file are intact; the failed one is gone.
    assert!(storage.exists(&first.stored_name).await);
    assert!(!storage.exists(&second.stored_name).await);
    assert_eq!(
        ingestor.image_repo.find_by_owner(&owner).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn unique_names_do_not_collide() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir).await;

    let mut seen = HashSet::new();
    for _ in 0..500 {
        assert!(seen.insert(storage.unique_name(Some("photo.jpg"))));
    }
}

#[tokio::test]
async fn unique_name_keeps_a_lowercased_extension() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir).await;

    let name = storage.unique_name(Some("Holiday.JPG"));
    assert!(name.starts_with("img-"));
    assert!(name.ends_with(".jpg"));

    let bare = storage.unique_name(None);
    assert!(!bare.contains('.'));
}

const BOUNDARY: &str = "f8a2c04dd41e4bb893afbc13f9a27e55";

/// Builds a multipart payload the way a client would encode it: one part
/// per (filename, content type, bytes) triple under the `images` field.
fn multipart_of(parts: Vec<(&str, &str, Vec<u8>)>) -> Multipart {
    let mut body: Vec<u8> = Vec::new();
    for (filename, content_type, bytes) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"images\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(&bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&format!("multipart/form-data; boundary={}", BOUNDARY)).unwrap(),
    );

    Multipart::new(
        &headers,
        stream::once(async move { Ok::<Bytes, PayloadError>(Bytes::from(body)) }),
    )
}

fn png_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len.max(8)];
    bytes[..8].copy_from_slice(b"\x89PNG\r\n\x1a\n");
    bytes
}

fn ingestor_with(
    storage: DiskStorage,
) -> UploadIngestor<InMemoryImageRepo, InMemoryOwnerRepo> {
    UploadIngestor::new(InMemoryImageRepo::new(), InMemoryOwnerRepo::new(), storage)
}

#[tokio::test]
async fn collect_stores_every_valid_part() {
    let dir = tempfile::tempdir().unwrap();
    let ingestor = ingestor_with(storage_in(&dir).await);

    let mut payload = multipart_of(vec![
        ("a.png", "image/png", png_bytes(64)),
        ("b.gif", "image/gif", b"GIF89a trailer".to_vec()),
    ]);

    let stored = ingestor.collect(&mut payload).await.unwrap();

    assert_eq!(stored.len(), 2);
    assert_eq!(files_in(&dir), 2);
    assert!(stored.iter().all(|s| s.stored_name.starts_with("img-")));
}

#[tokio::test]
async fn oversized_file_is_rejected_with_no_leftover_files() {
    let dir = tempfile::tempdir().unwrap();
    let ingestor = ingestor_with(storage_in(&dir).await);

    let mut payload = multipart_of(vec![
        ("ok.png", "image/png", png_bytes(64)),
        ("big.png", "image/png", png_bytes(MAX_UPLOAD_BYTES + 1)),
    ]);

    let result = ingestor.collect(&mut payload).await;

    match result {
        Err(AppError::UploadConstraint { code, .. }) => assert_eq!(code, LIMIT_FILE_SIZE),
        other => panic!("expected a size rejection, got {:?}", other.map(|s| s.len())),
    }
    assert_eq!(files_in(&dir), 0);
}

#[tokio::test]
async fn too_many_files_are_rejected_with_no_leftover_files() {
    let dir = tempfile::tempdir().unwrap();
    let ingestor = ingestor_with(storage_in(&dir).await);

    let parts = (0..MAX_UPLOAD_FILES + 1)
        .map(|_| ("n.png", "image/png", png_bytes(16)))
        .collect();
    let mut payload = multipart_of(parts);

    let result = ingestor.collect(&mut payload).await;

    match result {
        Err(AppError::UploadConstraint { code, .. }) => assert_eq!(code, LIMIT_FILE_COUNT),
        other => panic!("expected a count rejection, got {:?}", other.map(|s| s.len())),
    }
    assert_eq!(files_in(&dir), 0);
}

#[tokio::test]
async fn disallowed_declared_type_is_rejected_with_no_leftover_files() {
    let dir = tempfile::tempdir().unwrap();
    let ingestor = ingestor_with(storage_in(&dir).await);

    let mut payload = multipart_of(vec![
        ("ok.png", "image/png", png_bytes(16)),
        ("notes.txt", "text/plain", b"plain text".to_vec()),
    ]);

    let result = ingestor.collect(&mut payload).await;

    match result {
        Err(AppError::UploadConstraint { code, .. }) => assert_eq!(code, LIMIT_UNEXPECTED_FILE),
        other => panic!("expected a type rejection, got {:?}", other.map(|s| s.len())),
    }
    assert_eq!(files_in(&dir), 0);
}

#[tokio::test]
async fn content_contradicting_the_declared_type_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let ingestor = ingestor_with(storage_in(&dir).await);

    // Declares image/png but the bytes are a PDF.
    let mut payload = multipart_of(vec![(
        "fake.png",
        "image/png",
        b"%PDF-1.5 not an image at all".to_vec(),
    )]);

    let result = ingestor.collect(&mut payload).await;

    match result {
        Err(AppError::UploadConstraint { code, .. }) => assert_eq!(code, LIMIT_UNEXPECTED_FILE),
        other => panic!("expected a type rejection, got {:?}", other.map(|s| s.len())),
    }
    assert_eq!(files_in(&dir), 0);
}

#[tokio::test]
async fn empty_payload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let ingestor = ingestor_with(storage_in(&dir).await);

    let mut payload = multipart_of(Vec::new());
    let result = ingestor.collect(&mut payload).await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    assert_eq!(files_in(&dir), 0);
}

#[tokio::test]
async fn remove_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir).await;

    let upload = store_file(&storage, "a.png", b"bytes").await;
    storage.remove(&upload.stored_name).await.unwrap();
    // Second delete of the same file is still success.
    storage.remove(&upload.stored_name).await.unwrap();
    assert!(!storage.exists(&upload.stored_name).await);
}
