//! Shared test helpers for WebDAV integration tests
//!
//! Each helper mounts mock endpoints on a wiremock server and returns
//! adapters pointing at it.

use wiremock::matchers::{basic_auth, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use davsync_core::domain::RemotePath;
use davsync_webdav::client::WebDavClient;
use davsync_webdav::provider::WebDavRemoteStore;

pub const USER: &str = "alice";
pub const PASSWORD: &str = "s3cret";

/// Path prefix the mock server exposes WebDAV under
pub const DAV_PREFIX: &str = "/remote.php/webdav";

/// Starts a mock server and returns a client rooted at [`DAV_PREFIX`]
pub async fn setup_dav_mock() -> (MockServer, WebDavClient) {
    let server = MockServer::start().await;
    let client = WebDavClient::new(&format!("{}{}", server.uri(), DAV_PREFIX), USER, PASSWORD)
        .expect("mock server URL is valid");
    (server, client)
}

/// Same as [`setup_dav_mock`] but wrapped in the port implementation
pub async fn setup_store_mock() -> (MockServer, WebDavRemoteStore) {
    let (server, client) = setup_dav_mock().await;
    (server, WebDavRemoteStore::new(client))
}

pub fn remote(p: &str) -> RemotePath {
    RemotePath::new(p.to_string()).expect("valid remote path")
}

/// Mounts a PROPFIND answering 207 Multi-Status for authenticated requests
pub async fn mount_propfind_ok(server: &MockServer, dav_path: &str) {
    Mock::given(method("PROPFIND"))
        .and(path(dav_path))
        .and(header("Depth", "0"))
        .and(basic_auth(USER, PASSWORD))
        .respond_with(
            ResponseTemplate::new(207)
                .insert_header("Content-Type", "application/xml; charset=utf-8")
                .set_body_string(
                    r#"<?xml version="1.0"?><d:multistatus xmlns:d="DAV:"><d:response><d:href>/</d:href></d:response></d:multistatus>"#,
                ),
        )
        .mount(server)
        .await;
}

/// Mounts a MKCOL on `dav_path` answering `status`
pub async fn mount_mkcol(server: &MockServer, dav_path: &str, status: u16) {
    Mock::given(method("MKCOL"))
        .and(path(dav_path))
        .and(basic_auth(USER, PASSWORD))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mounts a PUT on `dav_path` answering `status`, expected exactly `times`
pub async fn mount_put(server: &MockServer, dav_path: &str, status: u16, times: u64) {
    Mock::given(method("PUT"))
        .and(path(dav_path))
        .and(basic_auth(USER, PASSWORD))
        .respond_with(ResponseTemplate::new(status))
        .expect(times)
        .mount(server)
        .await;
}
