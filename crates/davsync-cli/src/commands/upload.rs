//! Upload command - Push a folder's new and modified files to WebDAV
//!
//! Provides the `davsync upload` CLI command which:
//! 1. Resolves and loads `<folder>/.tk.webdav[.<sub-mode>]`
//! 2. Creates the WebDAV remote store and the optional completion notifier
//! 3. Runs the SyncEngine and displays the run report

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use davsync_core::config::{ConfigError, ConfigLocation, DavConfig, USAGE};
use davsync_sync::engine::SyncEngine;
use davsync_webdav::client::WebDavClient;
use davsync_webdav::notify::HttpCompletionNotifier;
use davsync_webdav::provider::WebDavRemoteStore;

use crate::output::{get_formatter, run_succeeded, OutputFormat, OutputFormatter};

/// Upload command with clap options
#[derive(Debug, Args)]
pub struct UploadCommand {
    /// Local folder to upload
    pub folder: PathBuf,

    /// Read `.tk.webdav.<NAME>` instead of `.tk.webdav`
    #[arg(long, value_name = "NAME")]
    pub sub_mode: Option<String>,
}

impl UploadCommand {
    /// Execute the upload command
    ///
    /// Exits with a failure code when the configuration is missing or
    /// invalid, the server can't be reached, or the run failed.
    pub async fn execute(&self, format: OutputFormat) -> Result<ExitCode> {
        let formatter = get_formatter(format);
        let ok = self.upload(formatter.as_ref()).await?;
        Ok(if ok {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    async fn upload(&self, formatter: &dyn OutputFormatter) -> Result<bool> {
        let location = ConfigLocation::new(&self.folder, self.sub_mode.as_deref());

        // Step 1: Load config
        let Some(config) = load_config(&location, formatter) else {
            return Ok(false);
        };
        info!(config_path = %location.config_path().display(), "Loaded configuration");

        // Step 2: Create adapters
        let client = WebDavClient::from_config(&config).context("Failed to create WebDAV client")?;
        let remote = Arc::new(WebDavRemoteStore::new(client));
        let mut engine = SyncEngine::new(remote, &config)?;
        if let Some(notifier) = HttpCompletionNotifier::from_config(&config) {
            engine = engine.with_notifier(Arc::new(notifier));
        }

        formatter.info(&format!(
            "Uploading {} to {} ({})",
            self.folder.display(),
            config.server,
            engine.remote_root()
        ));

        // Step 3: Run
        let report = match engine.run(&location).await {
            Ok(report) => report,
            Err(err) => {
                formatter.error(&err.to_string());
                return Ok(false);
            }
        };

        // Step 4: Display results
        formatter.report(&report);

        Ok(run_succeeded(&report))
    }
}

/// Loads and validates the config, reporting problems through `formatter`
fn load_config(location: &ConfigLocation, formatter: &dyn OutputFormatter) -> Option<DavConfig> {
    match DavConfig::load_validated(location.config_path()) {
        Ok(config) => Some(config),
        Err(err @ ConfigError::Missing(_)) => {
            formatter.error(&err.to_string());
            formatter.guidance(USAGE);
            None
        }
        Err(ConfigError::Invalid(errors)) => {
            formatter.error(&format!(
                "Invalid configuration in {}",
                location.config_path().display()
            ));
            for err in &errors {
                formatter.info(&format!("  - {}", err));
            }
            None
        }
        Err(err) => {
            formatter.error(&err.to_string());
            None
        }
    }
}
