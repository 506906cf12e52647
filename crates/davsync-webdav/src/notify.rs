//! HTTP completion notifier
//!
//! Issues a single `GET` to the configured callback URL once a run has
//! finished cleanly. Only `200 OK` counts as acknowledged; the response
//! body is ignored.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use davsync_core::config::DavConfig;
use davsync_core::ports::ICompletionNotifier;

/// [`ICompletionNotifier`] that calls a URL with `GET`
#[derive(Debug, Clone)]
pub struct HttpCompletionNotifier {
    client: Client,
    url: String,
}

impl HttpCompletionNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Builds a notifier from the `Reboot` field, if one is configured
    pub fn from_config(config: &DavConfig) -> Option<Self> {
        config.notify_url().map(Self::new)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ICompletionNotifier for HttpCompletionNotifier {
    async fn notify_completion(&self) -> Result<()> {
        debug!(url = %self.url, "Sending completion notification");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.url))?;

        let status = response.status();
        if status != StatusCode::OK {
            anyhow::bail!("GET {} returned HTTP {}", self.url, status.as_u16());
        }
        Ok(())
    }
}
