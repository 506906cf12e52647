//! Configuration module for davsync.
//!
//! Each synchronized folder carries its own JSON configuration file at
//! `<folder>/.tk.webdav` (or `<folder>/.tk.webdav.<sub mode>`). The sync
//! record lives next to it with a `.result` suffix. This module provides the
//! typed config, its loading and validation, a builder for programmatic
//! use, and [`ConfigLocation`] to resolve both paths.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DomainError, RemotePath};

/// File name prefix shared by config and state files
///
/// Entries starting with it are never uploaded.
pub const CONFIG_FILE_PREFIX: &str = ".tk.webdav";

/// Suffix appended to the config path to obtain the state file path
pub const STATE_FILE_SUFFIX: &str = ".result";

/// Guidance printed when the config file cannot be found
pub const USAGE: &str = "\
Use `davsync upload <folder> [--sub-mode <name>]` to upload a folder.
When no sub mode is given, the uploader reads <folder>/.tk.webdav as its
configuration; otherwise <folder>/.tk.webdav.<name> is used.";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while locating or loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file at the expected location
    #[error("Can't find the config file \"{}\"", .0.display())]
    Missing(PathBuf),

    /// The file exists but could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for [`DavConfig`]
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration parsed but is not usable
    #[error("Invalid configuration: {}", format_validation_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// DavConfig
// ---------------------------------------------------------------------------

/// Per-folder upload configuration
///
/// Keys use the PascalCase names of the on-disk format. Absent keys
/// default to empty values. Immutable for the duration of a run.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DavConfig {
    /// Server base URL, e.g. `https://dav.example.com/remote.php/dav`
    #[serde(rename = "Server")]
    pub server: String,
    /// Remote directory that mirrors the local folder
    #[serde(rename = "RootPath")]
    pub root_path: String,
    #[serde(rename = "Uid")]
    pub user: String,
    #[serde(rename = "Pwd")]
    pub password: String,
    /// Regular expressions matched against bare file names
    #[serde(rename = "Exclude")]
    pub exclude: Vec<String>,
    /// URL requested with GET after a successful run; empty means none
    #[serde(rename = "Reboot")]
    pub notify_url: String,
}

impl fmt::Debug for DavConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DavConfig")
            .field("server", &self.server)
            .field("root_path", &self.root_path)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("exclude", &self.exclude)
            .field("notify_url", &self.notify_url)
            .finish()
    }
}

impl DavConfig {
    /// Load configuration from the JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ConfigError::Missing(path.to_path_buf())
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_json(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Load and validate in one step.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// The notification URL, if one is configured
    pub fn notify_url(&self) -> Option<&str> {
        let url = self.notify_url.trim();
        (!url.is_empty()).then_some(url)
    }

    /// The remote root as a normalized [`RemotePath`]
    pub fn remote_root(&self) -> Result<RemotePath, DomainError> {
        RemotePath::from_root(&self.root_path)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the offending key, e.g. `"Server"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl DavConfig {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. Exclude patterns
    /// are not validated here: a malformed pattern is inert, not an error.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.server.trim().is_empty() {
            errors.push(ValidationError {
                field: "Server".into(),
                message: "must not be empty".into(),
            });
        } else {
            match url::Url::parse(self.server.trim()) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => errors.push(ValidationError {
                    field: "Server".into(),
                    message: format!("unsupported scheme '{}'", url.scheme()),
                }),
                Err(err) => errors.push(ValidationError {
                    field: "Server".into(),
                    message: format!("not a valid URL: {err}"),
                }),
            }
        }

        if let Err(err) = self.remote_root() {
            errors.push(ValidationError {
                field: "RootPath".into(),
                message: err.to_string(),
            });
        }

        if let Some(notify) = self.notify_url() {
            if let Err(err) = url::Url::parse(notify) {
                errors.push(ValidationError {
                    field: "Reboot".into(),
                    message: format!("not a valid URL: {err}"),
                });
            }
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigLocation
// ---------------------------------------------------------------------------

/// Where the config and state files of a local folder live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    local_root: PathBuf,
    config_path: PathBuf,
}

impl ConfigLocation {
    /// Resolve the files for `local_root`, optionally for a named sub mode
    pub fn new(local_root: impl Into<PathBuf>, sub_mode: Option<&str>) -> Self {
        let local_root = local_root.into();
        let file_name = match sub_mode.map(str::trim).filter(|s| !s.is_empty()) {
            Some(mode) => format!("{CONFIG_FILE_PREFIX}.{mode}"),
            None => CONFIG_FILE_PREFIX.to_string(),
        };
        let config_path = local_root.join(file_name);
        Self {
            local_root,
            config_path,
        }
    }

    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// `<config path>.result`
    pub fn state_path(&self) -> PathBuf {
        let mut os = self.config_path.clone().into_os_string();
        os.push(STATE_FILE_SUFFIX);
        PathBuf::from(os)
    }

    /// True for the tool's own bookkeeping files
    pub fn is_bookkeeping(name: &str) -> bool {
        name.starts_with(CONFIG_FILE_PREFIX)
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`DavConfig`] programmatically.
///
/// # Example
///
/// ```rust
/// use davsync_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .server("https://dav.example.com")
///     .root_path("/backup")
///     .exclude(r"\.log$")
///     .build();
/// assert_eq!(config.exclude.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: DavConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.config.server = server.into();
        self
    }

    pub fn root_path(mut self, root: impl Into<String>) -> Self {
        self.config.root_path = root.into();
        self
    }

    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.user = user.into();
        self.config.password = password.into();
        self
    }

    /// Append one exclude pattern
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.config.exclude.push(pattern.into());
        self
    }

    pub fn notify_url(mut self, url: impl Into<String>) -> Self {
        self.config.notify_url = url.into();
        self
    }

    /// Consume the builder and return the finished [`DavConfig`].
    pub fn build(self) -> DavConfig {
        self.config
    }

    /// Build and validate in one step.
    pub fn build_validated(self) -> Result<DavConfig, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}
