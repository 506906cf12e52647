//! Integration tests for the low-level WebDAV client

use reqwest::Body;
use wiremock::matchers::{body_bytes, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use davsync_core::domain::RemotePath;
use davsync_webdav::WebDavError;

use crate::common::{self, remote, DAV_PREFIX};

#[tokio::test]
async fn test_propfind_accepts_multistatus() {
    let (server, client) = common::setup_dav_mock().await;
    common::mount_propfind_ok(&server, &format!("{DAV_PREFIX}/")).await;

    client
        .propfind(&RemotePath::root())
        .await
        .expect("PROPFIND should succeed");
}

#[tokio::test]
async fn test_propfind_unauthorized() {
    let (server, client) = common::setup_dav_mock().await;
    Mock::given(method("PROPFIND"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.propfind(&RemotePath::root()).await.unwrap_err();
    assert!(matches!(err, WebDavError::Unauthorized(_)));
}

#[tokio::test]
async fn test_mkcol_created_and_existing() {
    let (server, client) = common::setup_dav_mock().await;
    common::mount_mkcol(&server, &format!("{DAV_PREFIX}/new/"), 201).await;
    common::mount_mkcol(&server, &format!("{DAV_PREFIX}/old/"), 405).await;

    assert!(client.mkcol(&remote("/new")).await.unwrap());
    assert!(!client.mkcol(&remote("/old")).await.unwrap());
}

#[tokio::test]
async fn test_mkcol_forbidden() {
    let (server, client) = common::setup_dav_mock().await;
    common::mount_mkcol(&server, &format!("{DAV_PREFIX}/locked/"), 403).await;

    let err = client.mkcol(&remote("/locked")).await.unwrap_err();
    assert!(matches!(err, WebDavError::Forbidden(_)));
}

#[tokio::test]
async fn test_put_sends_body_and_length() {
    let (server, client) = common::setup_dav_mock().await;
    Mock::given(method("PUT"))
        .and(path(format!("{DAV_PREFIX}/backup/a.txt")))
        .and(header("Content-Length", "5"))
        .and(body_bytes(b"hello".to_vec()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client
        .put(&remote("/backup/a.txt"), Body::from("hello"), 5)
        .await
        .expect("PUT should succeed");
}

#[tokio::test]
async fn test_put_encodes_path_segments() {
    let (server, client) = common::setup_dav_mock().await;
    common::mount_put(&server, &format!("{DAV_PREFIX}/my%20docs/r%C3%A9sum%C3%A9.txt"), 204, 1)
        .await;

    client
        .put(&remote("/my docs/résumé.txt"), Body::from("x"), 1)
        .await
        .expect("PUT should succeed");
}

#[tokio::test]
async fn test_put_rejects_unexpected_success_code() {
    let (server, client) = common::setup_dav_mock().await;
    common::mount_put(&server, &format!("{DAV_PREFIX}/a.txt"), 202, 1).await;

    let err = client
        .put(&remote("/a.txt"), Body::from("x"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, WebDavError::UnexpectedStatus { .. }));
}

#[tokio::test]
async fn test_network_error() {
    let client =
        davsync_webdav::client::WebDavClient::new("http://127.0.0.1:1/dav", "u", "p").unwrap();
    let err = client.propfind(&RemotePath::root()).await.unwrap_err();
    assert!(matches!(err, WebDavError::NetworkError(_)));
}
