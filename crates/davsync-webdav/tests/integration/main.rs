//! Integration tests for davsync-webdav
//!
//! Uses wiremock to simulate a WebDAV server and a notification endpoint,
//! and verifies the requests the adapters send and how they interpret
//! the responses.

mod common;

mod test_client;
mod test_notify;
mod test_remote_store;
