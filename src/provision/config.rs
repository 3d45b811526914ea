//! Settings for the shell provisioner.
//!
//! Resolves the extension root from environment variables with XDG-compliant
//! fallback paths and describes where the shell archive comes from.

use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::eyre::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigResult;

/// Subdirectory path within the XDG data home.
const DATA_SUBDIR: &str = "mongosh-setup";

/// Directory under the extension root holding versioned archives.
pub const ARCHIVE_SUBDIR: &str = "resources/mongoshell";

/// Directory under the extension root receiving the extracted shell.
pub const INSTALL_DIR_NAME: &str = "mongoshellexecutable";

/// Shell version bundled with the extension.
pub const DEFAULT_SHELL_VERSION: &str = "1.1.9";

/// Declarative options for the download-based install.
///
/// Field names follow the camel-case keys used by the host settings file.
///
/// # Examples
/// ```
/// use mongosh_setup::InstallConfig;
///
/// let cfg = InstallConfig::from_json(r#"{ "proxy": "http://proxy:3128", "strictSSL": false }"#)
///     .expect("valid json");
/// assert_eq!(cfg.proxy.as_deref(), Some("http://proxy:3128"));
/// assert!(!cfg.strict_ssl);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallConfig {
    /// Overrides the directory receiving the extracted executable.
    #[serde(default)]
    pub install_directory: Option<Utf8PathBuf>,
    /// HTTP proxy used for the archive download.
    #[serde(default)]
    pub proxy: Option<String>,
    /// Verifies TLS certificates when `true`.
    #[serde(default = "strict_ssl_default", rename = "strictSSL")]
    pub strict_ssl: bool,
}

const fn strict_ssl_default() -> bool {
    true
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            install_directory: None,
            proxy: None,
            strict_ssl: true,
        }
    }
}

impl InstallConfig {
    /// Parses the install options from a JSON document.
    ///
    /// # Errors
    /// Returns a [`crate::error::ConfigError`] when the document is malformed.
    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        let cfg = serde_json::from_str(raw).context("invalid install configuration")?;
        Ok(cfg)
    }
}

/// Where the platform archive comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveSource {
    /// The archive ships pre-bundled under the extension root.
    Bundled,
    /// The archive is fetched from `base_url` when missing locally.
    Remote {
        /// Location the archive file name is appended to.
        base_url: String,
        /// Proxy, TLS and target-directory options for the download.
        install: InstallConfig,
    },
}

/// Fully resolved provisioner settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSettings {
    /// Base directory holding archives and the install directory.
    pub extension_root: Utf8PathBuf,
    /// Shell version selecting the archive subdirectory.
    pub shell_version: String,
    /// Overrides `<root>/mongoshellexecutable` when set.
    pub install_dir: Option<Utf8PathBuf>,
    /// Archive origin.
    pub source: ArchiveSource,
}

impl ProvisionSettings {
    /// Creates settings for the bundled archive under `extension_root`.
    #[must_use]
    pub fn bundled(extension_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            extension_root: extension_root.into(),
            shell_version: DEFAULT_SHELL_VERSION.to_owned(),
            install_dir: None,
            source: ArchiveSource::Bundled,
        }
    }

    /// Switches the settings to download missing archives from `base_url`.
    #[must_use]
    pub fn with_remote(mut self, base_url: impl Into<String>, install: InstallConfig) -> Self {
        self.source = ArchiveSource::Remote {
            base_url: base_url.into(),
            install,
        };
        self
    }

    /// Directory containing the archives for the configured version.
    #[must_use]
    pub fn archive_dir(&self) -> Utf8PathBuf {
        self.extension_root
            .join(ARCHIVE_SUBDIR)
            .join(&self.shell_version)
    }

    /// Directory the executable is extracted into.
    ///
    /// An explicit `install_dir` wins over the remote `installDirectory`
    /// option, which wins over the default under the extension root.
    #[must_use]
    pub fn install_dir(&self) -> Utf8PathBuf {
        if let Some(dir) = &self.install_dir {
            return dir.clone();
        }
        if let ArchiveSource::Remote {
            install:
                InstallConfig {
                    install_directory: Some(dir),
                    ..
                },
            ..
        } = &self.source
        {
            return dir.clone();
        }
        self.extension_root.join(INSTALL_DIR_NAME)
    }

    /// Returns the extension root.
    #[must_use]
    pub fn extension_root(&self) -> &Utf8Path {
        &self.extension_root
    }
}

/// Resolves the extension root from environment and XDG conventions.
///
/// The resolution order is:
///
/// 1. `MONGOSH_EXTENSION_ROOT` environment variable if set and valid UTF-8
/// 2. `$XDG_DATA_HOME/mongosh-setup` if `XDG_DATA_HOME` is set
/// 3. `~/.local/share/mongosh-setup` as fallback
/// 4. `/tmp/mongosh-setup` as last resort
///
/// # Examples
///
/// ```
/// use mongosh_setup::resolve_extension_root;
///
/// let root = resolve_extension_root();
/// assert!(!root.as_str().is_empty());
/// ```
#[must_use]
pub fn resolve_extension_root() -> Utf8PathBuf {
    resolve_from_env()
        .or_else(resolve_from_xdg_data)
        .or_else(resolve_from_home)
        .unwrap_or_else(|| Utf8PathBuf::from("/tmp").join(DATA_SUBDIR))
}

fn non_empty_env_path(key: &str) -> Option<Utf8PathBuf> {
    let raw = std::env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Utf8PathBuf::from_path_buf(PathBuf::from(trimmed)).ok()
}

fn resolve_from_env() -> Option<Utf8PathBuf> {
    non_empty_env_path("MONGOSH_EXTENSION_ROOT")
}

fn resolve_from_xdg_data() -> Option<Utf8PathBuf> {
    non_empty_env_path("XDG_DATA_HOME").map(|dir| dir.join(DATA_SUBDIR))
}

fn resolve_from_home() -> Option<Utf8PathBuf> {
    let home = dirs::home_dir()?;
    let path = Utf8PathBuf::from_path_buf(home).ok()?;
    Some(path.join(".local/share").join(DATA_SUBDIR))
}
