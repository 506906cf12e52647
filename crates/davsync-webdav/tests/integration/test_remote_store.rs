//! Integration tests for WebDavRemoteStore (the IRemoteStore port)

use wiremock::matchers::{body_bytes, method, path};
use wiremock::{Mock, ResponseTemplate};

use davsync_core::ports::IRemoteStore;

use crate::common::{self, remote, DAV_PREFIX};

#[tokio::test]
async fn test_connect_ok() {
    let (server, store) = common::setup_store_mock().await;
    common::mount_propfind_ok(&server, &format!("{DAV_PREFIX}/")).await;

    store.connect().await.expect("connect should succeed");
}

#[tokio::test]
async fn test_connect_wrong_password() {
    let (server, store) = common::setup_store_mock().await;
    // Only the right credentials match; anything else falls through to 404
    common::mount_propfind_ok(&server, &format!("{DAV_PREFIX}/")).await;
    let other = davsync_webdav::client::WebDavClient::new(
        &format!("{}{}", server.uri(), DAV_PREFIX),
        "alice",
        "wrong",
    )
    .unwrap();
    let bad = davsync_webdav::provider::WebDavRemoteStore::new(other);

    store.connect().await.expect("right credentials connect");
    assert!(bad.connect().await.is_err());
}

#[tokio::test]
async fn test_ensure_directory_creates_each_ancestor() {
    let (server, store) = common::setup_store_mock().await;
    for (dir, status) in [("/backup/", 405), ("/backup/a/", 201), ("/backup/a/b/", 201)] {
        Mock::given(method("MKCOL"))
            .and(path(format!("{DAV_PREFIX}{dir}")))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&server)
            .await;
    }

    store
        .ensure_directory(&remote("/backup/a/b"))
        .await
        .expect("ensure_directory should succeed");

    let received = server.received_requests().await.unwrap();
    let order: Vec<String> = received.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(
        order,
        vec![
            format!("{DAV_PREFIX}/backup/"),
            format!("{DAV_PREFIX}/backup/a/"),
            format!("{DAV_PREFIX}/backup/a/b/"),
        ]
    );
}

#[tokio::test]
async fn test_ensure_directory_stops_on_failure() {
    let (server, store) = common::setup_store_mock().await;
    common::mount_mkcol(&server, &format!("{DAV_PREFIX}/backup/"), 403).await;
    Mock::given(method("MKCOL"))
        .and(path(format!("{DAV_PREFIX}/backup/a/")))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    assert!(store.ensure_directory(&remote("/backup/a")).await.is_err());
}

#[tokio::test]
async fn test_write_stream_uploads_file_contents() {
    let (server, store) = common::setup_store_mock().await;
    let content = b"line one\nline two\n".to_vec();
    Mock::given(method("PUT"))
        .and(path(format!("{DAV_PREFIX}/backup/notes.txt")))
        .and(body_bytes(content.clone()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let size = content.len() as u64;
    let source = Box::new(std::io::Cursor::new(content));
    store
        .write_stream(&remote("/backup/notes.txt"), source, size)
        .await
        .expect("write_stream should succeed");
}

#[tokio::test]
async fn test_write_stream_conflict_creates_parent_and_fails() {
    let (server, store) = common::setup_store_mock().await;
    common::mount_put(&server, &format!("{DAV_PREFIX}/backup/x/f.txt"), 409, 1).await;
    Mock::given(method("MKCOL"))
        .and(path(format!("{DAV_PREFIX}/backup/")))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("MKCOL"))
        .and(path(format!("{DAV_PREFIX}/backup/x/")))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let source = Box::new(std::io::Cursor::new(b"f".to_vec()));
    let err = store
        .write_stream(&remote("/backup/x/f.txt"), source, 1)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("retry on next run"));
}

#[tokio::test]
async fn test_write_stream_server_error() {
    let (server, store) = common::setup_store_mock().await;
    common::mount_put(&server, &format!("{DAV_PREFIX}/full.bin"), 507, 1).await;

    let source = Box::new(std::io::Cursor::new(vec![0u8; 16]));
    let err = store
        .write_stream(&remote("/full.bin"), source, 16)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("Insufficient storage"));
}
