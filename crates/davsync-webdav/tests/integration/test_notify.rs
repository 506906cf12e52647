//! Integration tests for the HTTP completion notifier

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use davsync_core::ports::ICompletionNotifier;
use davsync_webdav::notify::HttpCompletionNotifier;

async fn mount_callback(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/reboot"))
        .respond_with(ResponseTemplate::new(status).set_body_string("whatever"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_notify_ok() {
    let server = MockServer::start().await;
    mount_callback(&server, 200).await;

    let notifier = HttpCompletionNotifier::new(format!("{}/reboot", server.uri()));
    notifier
        .notify_completion()
        .await
        .expect("200 should be accepted");
}

#[tokio::test]
async fn test_notify_other_success_codes_fail() {
    let server = MockServer::start().await;
    mount_callback(&server, 204).await;

    let notifier = HttpCompletionNotifier::new(format!("{}/reboot", server.uri()));
    let err = notifier.notify_completion().await.unwrap_err();
    assert!(err.to_string().contains("204"));
}

#[tokio::test]
async fn test_notify_server_error() {
    let server = MockServer::start().await;
    mount_callback(&server, 500).await;

    let notifier = HttpCompletionNotifier::new(format!("{}/reboot", server.uri()));
    assert!(notifier.notify_completion().await.is_err());
}

#[tokio::test]
async fn test_notify_unreachable() {
    let notifier = HttpCompletionNotifier::new("http://127.0.0.1:1/reboot");
    assert!(notifier.notify_completion().await.is_err());
}
