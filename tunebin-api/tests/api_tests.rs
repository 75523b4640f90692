//! Integration tests for tunebin-api endpoints
//!
//! Tests cover:
//! - Upload (multipart) and its validation
//! - Active listing and recycle bin listing
//! - Soft delete, restore and purge transitions, including unknown ids
//! - Static serving of stored files
//! - Health endpoint

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;
use tunebin_api::files::FileStore;
use tunebin_api::genre::{GenreClassifier, StubGenreClassifier};
use tunebin_api::{build_router, AppState};
use tunebin_common::config::RootFolder;
use tunebin_common::CatalogStore;

const BOUNDARY: &str = "tunebin-test-boundary";
const MAX_UPLOAD: u64 = 64 * 1024;

struct TestApp {
    app: Router,
    store: CatalogStore,
    root: RootFolder,
    _dir: TempDir,
}

/// Test helper: app over a temporary root folder
async fn setup_app() -> TestApp {
    setup_app_with(Arc::new(StubGenreClassifier::default())).await
}

async fn setup_app_with(classifier: Arc<dyn GenreClassifier>) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = RootFolder::new(dir.path());
    root.ensure_exists().unwrap();

    let store = CatalogStore::open(&root.database_path()).await.unwrap();
    let files = FileStore::new(root.uploads_dir(), MAX_UPLOAD);
    files.init().await.unwrap();

    let state = AppState::new(store.clone(), files, classifier);

    TestApp {
        app: build_router(state),
        store,
        root,
        _dir: dir,
    }
}

/// Classifier whose backing service is unreachable
struct FailingClassifier;

#[async_trait]
impl GenreClassifier for FailingClassifier {
    async fn classify(&self, _file_path: &std::path::Path) -> anyhow::Result<String> {
        anyhow::bail!("classifier unavailable")
    }
}

fn stored_files_ending_with(root: &RootFolder, suffix: &str) -> usize {
    std::fs::read_dir(root.uploads_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(suffix))
        .count()
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a [u8]),
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(filename, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                         Content-Type: audio/mpeg\r\n\r\n",
                        filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(parts: &[Part]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/songs")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    let json = serde_json::from_slice(&body).expect("Should parse JSON");
    (status, json)
}

/// Upload "Song A" by "Artist A" and return the created record
async fn upload_song_a(app: &Router) -> Value {
    let request = upload_request(&[
        Part::Text("title", "Song A"),
        Part::Text("artist", "Artist A"),
        Part::File("song-a.mp3", b"ID3 fake mp3 data"),
    ]);
    let (status, json) = send_json(app, request).await;
    assert_eq!(status, StatusCode::CREATED, "upload failed: {}", json);
    json
}

async fn list(app: &Router, uri: &str) -> Vec<Value> {
    let (status, json) = send_json(app, test_request("GET", uri)).await;
    assert_eq!(status, StatusCode::OK);
    json.as_array().expect("array body").clone()
}

fn ids(songs: &[Value]) -> Vec<String> {
    songs
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let t = setup_app().await;

    let (status, json) = send_json(&t.app, test_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "tunebin-api");
    assert!(json["uptime_seconds"].is_number());
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_upload_creates_active_record() {
    let t = setup_app().await;

    let song = upload_song_a(&t.app).await;

    assert_eq!(song["title"], "Song A");
    assert_eq!(song["artist"], "Artist A");
    assert_eq!(song["genre"], "Jazz");
    assert_eq!(song["isDeleted"], false);
    assert!(song["id"].is_string());

    let file_path = song["filePath"].as_str().unwrap();
    assert!(file_path.starts_with("uploads/"), "unexpected filePath {}", file_path);
    assert!(file_path.ends_with("-song-a.mp3"));

    let on_disk = t.root.path().join(file_path);
    assert_eq!(std::fs::read(on_disk).unwrap(), b"ID3 fake mp3 data");

    let active = list(&t.app, "/api/songs").await;
    assert_eq!(active, vec![song]);
    assert!(list(&t.app, "/api/recycle-bin").await.is_empty());
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let t = setup_app().await;

    let request = upload_request(&[Part::Text("title", "Song A"), Part::Text("artist", "Artist A")]);
    let (status, json) = send_json(&t.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("No file"));
    assert!(list(&t.app, "/api/songs").await.is_empty());
}

#[tokio::test]
async fn test_upload_with_two_files_is_rejected() {
    let t = setup_app().await;

    let request = upload_request(&[
        Part::File("a.mp3", b"one"),
        Part::File("b.mp3", b"two"),
    ]);
    let (status, json) = send_json(&t.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());
    assert!(list(&t.app, "/api/songs").await.is_empty());
}

#[tokio::test]
async fn test_upload_empty_file_is_rejected() {
    let t = setup_app().await;

    let request = upload_request(&[Part::Text("title", "Silence"), Part::File("a.mp3", b"")]);
    let (status, _) = send_json(&t.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let t = setup_app().await;

    let big = vec![0u8; MAX_UPLOAD as usize + 1];
    let request = upload_request(&[Part::File("big.mp3", &big)]);
    let (status, json) = send_json(&t.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("too large"));
}

#[tokio::test]
async fn test_upload_without_metadata_uses_empty_strings() {
    let t = setup_app().await;

    let (status, json) = send_json(&t.app, upload_request(&[Part::File("x.mp3", b"x")])).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["title"], "");
    assert_eq!(json["artist"], "");
}

#[tokio::test]
async fn test_upload_record_failure_leaves_orphan_file() {
    let t = setup_app().await;
    t.store.close().await;

    let request = upload_request(&[Part::Text("title", "Song A"), Part::File("orphan.mp3", b"data")]);
    let (status, json) = send_json(&t.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());

    assert_eq!(stored_files_ending_with(&t.root, "-orphan.mp3"), 1);
}

#[tokio::test]
async fn test_upload_classification_failure_is_400_and_keeps_file() {
    let t = setup_app_with(Arc::new(FailingClassifier)).await;

    let request = upload_request(&[Part::Text("title", "Song A"), Part::File("unsorted.mp3", b"data")]);
    let (status, json) = send_json(&t.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("classifier unavailable"));
    assert_eq!(stored_files_ending_with(&t.root, "-unsorted.mp3"), 1);
    assert!(list(&t.app, "/api/songs").await.is_empty());
}

#[tokio::test]
async fn test_upload_file_store_failure_is_500() {
    let dir = tempfile::tempdir().unwrap();
    let root = RootFolder::new(dir.path());
    root.ensure_exists().unwrap();

    // A plain file where the uploads directory should be
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, b"not a directory").unwrap();

    let store = CatalogStore::open(&root.database_path()).await.unwrap();
    let state = AppState::new(
        store.clone(),
        FileStore::new(blocked.clone(), MAX_UPLOAD),
        Arc::new(StubGenreClassifier::default()),
    );
    let app = build_router(state);

    let (status, json) = send_json(&app, upload_request(&[Part::File("a.mp3", b"data")])).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["message"].is_string());
    assert!(store.list_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_with_overlong_filename_is_400() {
    let t = setup_app().await;

    let name = format!("{}.mp3", "a".repeat(300));
    let (status, json) = send_json(&t.app, upload_request(&[Part::File(&name, b"data")])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("Invalid filename"));
    assert_eq!(std::fs::read_dir(t.root.uploads_dir()).unwrap().count(), 0);
}

// =============================================================================
// Listing failures
// =============================================================================

#[tokio::test]
async fn test_list_storage_error_is_500() {
    let t = setup_app().await;
    t.store.close().await;

    for uri in ["/api/songs", "/api/recycle-bin"] {
        let (status, json) = send_json(&t.app, test_request("GET", uri)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["message"].is_string());
    }
}

// =============================================================================
// Soft delete / restore / purge
// =============================================================================

#[tokio::test]
async fn test_soft_delete_moves_song_to_recycle_bin() {
    let t = setup_app().await;
    let song = upload_song_a(&t.app).await;
    let id = song["id"].as_str().unwrap();

    let (status, json) =
        send_json(&t.app, test_request("DELETE", &format!("/api/songs/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Song moved to recycle bin");

    assert!(list(&t.app, "/api/songs").await.is_empty());
    let recycled = list(&t.app, "/api/recycle-bin").await;
    assert_eq!(ids(&recycled), vec![id.to_string()]);
    assert_eq!(recycled[0]["isDeleted"], true);

    // Deleting again is a success and changes nothing
    let (status, _) = send_json(&t.app, test_request("DELETE", &format!("/api/songs/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list(&t.app, "/api/recycle-bin").await.len(), 1);
}

#[tokio::test]
async fn test_restore_round_trip_is_indistinguishable() {
    let t = setup_app().await;
    let song = upload_song_a(&t.app).await;
    let id = song["id"].as_str().unwrap();

    send_json(&t.app, test_request("DELETE", &format!("/api/songs/{}", id))).await;
    let (status, json) = send_json(
        &t.app,
        test_request("POST", &format!("/api/recycle-bin/{}/restore", id)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Song restored");
    assert_eq!(list(&t.app, "/api/songs").await, vec![song]);
    assert!(list(&t.app, "/api/recycle-bin").await.is_empty());
}

#[tokio::test]
async fn test_restore_active_song_is_noop() {
    let t = setup_app().await;
    let song = upload_song_a(&t.app).await;
    let id = song["id"].as_str().unwrap();

    let (status, _) = send_json(
        &t.app,
        test_request("POST", &format!("/api/recycle-bin/{}/restore", id)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(list(&t.app, "/api/songs").await, vec![song]);
}

#[tokio::test]
async fn test_purge_removes_record_but_keeps_file() {
    let t = setup_app().await;
    let song = upload_song_a(&t.app).await;
    let id = song["id"].as_str().unwrap();
    let file_path = song["filePath"].as_str().unwrap().to_string();

    send_json(&t.app, test_request("DELETE", &format!("/api/songs/{}", id))).await;
    let (status, json) =
        send_json(&t.app, test_request("DELETE", &format!("/api/recycle-bin/{}", id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Song permanently deleted");
    assert!(list(&t.app, "/api/recycle-bin").await.is_empty());
    assert!(list(&t.app, "/api/songs").await.is_empty());

    // The stored file is not cleaned up by purge
    assert!(t.root.path().join(&file_path).exists());
    let (status, bytes) = send(&t.app, test_request("GET", &format!("/{}", file_path))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"ID3 fake mp3 data");

    // Purged ids are gone for good
    let (status, json) = send_json(
        &t.app,
        test_request("POST", &format!("/api/recycle-bin/{}/restore", id)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Song not found");

    let (status, _) =
        send_json(&t.app, test_request("DELETE", &format!("/api/recycle-bin/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_purge_active_song_is_allowed() {
    let t = setup_app().await;
    let song = upload_song_a(&t.app).await;
    let id = song["id"].as_str().unwrap();

    let (status, _) =
        send_json(&t.app, test_request("DELETE", &format!("/api/recycle-bin/{}", id))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(list(&t.app, "/api/songs").await.is_empty());
}

#[tokio::test]
async fn test_unknown_ids_are_404() {
    let t = setup_app().await;
    let unknown = uuid::Uuid::new_v4().to_string();

    for id in [unknown.as_str(), "not-a-uuid", "507f1f77bcf86cd799439011"] {
        let requests = [
            test_request("DELETE", &format!("/api/songs/{}", id)),
            test_request("POST", &format!("/api/recycle-bin/{}/restore", id)),
            test_request("DELETE", &format!("/api/recycle-bin/{}", id)),
        ];
        for request in requests {
            let (status, json) = send_json(&t.app, request).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(json, serde_json::json!({ "message": "Song not found" }));
        }
    }
}

#[tokio::test]
async fn test_only_addressed_song_changes() {
    let t = setup_app().await;
    let first = upload_song_a(&t.app).await;
    let second = upload_song_a(&t.app).await;
    assert_ne!(first["id"], second["id"]);
    assert_ne!(first["filePath"], second["filePath"]);

    let id = first["id"].as_str().unwrap();
    send_json(&t.app, test_request("DELETE", &format!("/api/songs/{}", id))).await;

    assert_eq!(list(&t.app, "/api/songs").await, vec![second]);
    assert_eq!(ids(&list(&t.app, "/api/recycle-bin").await), vec![id.to_string()]);
}

// =============================================================================
// Static file serving
// =============================================================================

#[tokio::test]
async fn test_uploaded_file_is_served() {
    let t = setup_app().await;
    let song = upload_song_a(&t.app).await;
    let file_path = song["filePath"].as_str().unwrap();

    let (status, bytes) = send(&t.app, test_request("GET", &format!("/{}", file_path))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"ID3 fake mp3 data");
}

#[tokio::test]
async fn test_missing_upload_is_404() {
    let t = setup_app().await;

    let (status, _) = send(&t.app, test_request("GET", "/uploads/0-missing.mp3")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_serving_stays_inside_uploads() {
    let t = setup_app().await;
    assert!(t.root.database_path().exists());

    let (status, _) = send(&t.app, test_request("GET", "/uploads/../catalog.db")).await;
    assert_ne!(status, StatusCode::OK);
}
