//! Web viewer routes, driven through the axum router without a socket

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use datatext::viewer::{router, NOT_FOUND_MESSAGE};
use datatext::DtxArchive;
use tempfile::TempDir;
use tower::ServiceExt;

async fn get(archive: &DtxArchive, uri: &str) -> (StatusCode, String, String) {
    let response = router(archive.path())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

fn sample_archive() -> (TempDir, DtxArchive) {
    let dir = tempfile::tempdir().unwrap();
    let archive = DtxArchive::open_or_create(dir.path().join("data.dtx")).unwrap();
    archive.add_bytes("notes.txt", b"hello").unwrap();
    archive
        .add_bytes("main.rs", b"fn main() { if 1 < 2 {} }")
        .unwrap();
    (dir, archive)
}

#[tokio::test]
async fn test_index_lists_ids_and_names() {
    let (_dir, archive) = sample_archive();

    let (status, content_type, body) = get(&archive, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(body.contains("<a href=\"/code?id=1\">1: notes.txt</a>"));
    assert!(body.contains("<a href=\"/code?id=2\">2: main.rs</a>"));
}

#[tokio::test]
async fn test_code_view_returns_stored_text() {
    let (_dir, archive) = sample_archive();

    let (status, content_type, body) = get(&archive, "/code?id=1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(body.contains("<pre><code>hello</code></pre>"));

    let (_, _, body) = get(&archive, "/code?id=2").await;
    assert!(body.contains("fn main() { if 1 &lt; 2 {} }"));
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let (_dir, archive) = sample_archive();

    for uri in ["/code?id=99", "/code?id=abc", "/code?id=0", "/code?id=", "/code"] {
        let (status, content_type, body) = get(&archive, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert!(content_type.starts_with("text/plain"));
        assert_eq!(body, NOT_FOUND_MESSAGE);
    }
    assert_eq!(NOT_FOUND_MESSAGE, "Code snippet not found.");
}

#[tokio::test]
async fn test_reflects_changes_between_requests() {
    let (_dir, archive) = sample_archive();

    let (_, _, body) = get(&archive, "/code?id=1").await;
    assert!(body.contains("hello"));

    archive.remove("notes.txt").unwrap();

    let (_, _, body) = get(&archive, "/code?id=1").await;
    assert!(body.contains("fn main()"));

    let (status, _, _) = get(&archive, "/code?id=2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_archive_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let archive = DtxArchive::new(dir.path().join("data.dtx"));

    let (status, _, body) = get(&archive, "/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Archive not found"));
}

#[tokio::test]
async fn test_binary_entry_is_server_error() {
    let (_dir, archive) = sample_archive();
    archive.add_bytes("image.bin", &[0x89, 0x50, 0xff, 0x00]).unwrap();

    let (status, _, body) = get(&archive, "/code?id=1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("not valid UTF-8"));
}

#[tokio::test]
async fn test_id_must_match_manifest_text() {
    let (_dir, archive) = sample_archive();

    for uri in ["/code?id=01", "/code?id=%2B1", "/code?id=%201", "/code?id=1%20"] {
        let (status, _, body) = get(&archive, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body, NOT_FOUND_MESSAGE);
    }

    let (status, _, _) = get(&archive, "/code?id=1").await;
    assert_eq!(status, StatusCode::OK);
}
