//! Provisions the MongoDB shell binary and caches driver connections per
//! server.
//!
//! Two independent components make up the crate:
//!
//! - [`ShellProvisioner`] makes sure a specific shell version exists on disk for
//!   the running platform, extracting or downloading its archive only once.
//! - [`ConnectionCache`] keeps at most one live driver connection per server
//!   identifier, opening connections lazily and closing them on demand.
//!
//! Neither component depends on the other or on any user-interface layer.

mod connection;
mod error;
mod fs;
pub mod naming;
mod observability;
mod platform;
mod provision;
mod shell_options;
#[doc(hidden)]
pub mod test_support;
mod throughput;

pub use connection::{
    CollectionInfo, ConnectionCache, Connector, DatabaseInfo, DriverConnection, DriverError,
};
pub use error::{
    ConfigError, ConfigResult, ConnectionError, ConnectionResult, MongoshSetupError,
    ProvisionError, ProvisionErrorKind, ProvisionResult, Result,
};
pub use platform::{BinaryArchiveEntry, CpuArch, OsFamily, PlatformDescriptor, SUPPORTED_PLATFORMS};
pub use provision::{
    ARCHIVE_SUBDIR, ArchiveSource, DEFAULT_SHELL_VERSION, INSTALL_DIR_NAME, InstallConfig,
    InstalledBinary, NoopObserver, ProgressObserver, ProvisionEvent, ProvisionSettings,
    ShellProvisioner, ensure_installed, resolve_extension_root,
};
pub use shell_options::MongoShellOptions;
pub use throughput::ThroughputSetting;

use camino::Utf8PathBuf;
use color_eyre::eyre::{Context, eyre};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use tracing::info;

use crate::observability::LOG_TARGET;

/// Captures provisioning settings supplied via environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, OrthoConfig, Default)]
#[ortho_config(prefix = "MONGOSH")]
///
/// # Examples
/// ```
/// use mongosh_setup::ShellEnvCfg;
///
/// let cfg = ShellEnvCfg::default();
/// assert!(cfg.download_base_url.is_none());
/// ```
pub struct ShellEnvCfg {
    /// Base directory holding the archives and the install directory.
    pub extension_root: Option<Utf8PathBuf>,
    /// Directory receiving the extracted executable.
    pub install_dir: Option<Utf8PathBuf>,
    /// Shell version selecting the archive subdirectory.
    pub shell_version: Option<String>,
    /// Location archives are downloaded from when missing locally.
    pub download_base_url: Option<String>,
    /// HTTP proxy used for downloads.
    pub proxy: Option<String>,
    /// Verifies TLS certificates for downloads; defaults to `true`.
    pub strict_ssl: Option<bool>,
}

impl ShellEnvCfg {
    /// Loads configuration from environment variables without parsing CLI arguments.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] when a variable cannot be parsed.
    pub fn load() -> ConfigResult<Self> {
        let args = [OsString::from("mongosh-setup")];
        Self::load_from_iter(args).map_err(|err| ConfigError::from(eyre!(err)))
    }

    /// Converts the configuration into [`ProvisionSettings`].
    ///
    /// Unset values fall back to [`resolve_extension_root`] and
    /// [`DEFAULT_SHELL_VERSION`]. Setting `download_base_url` selects the
    /// download-based archive source.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] when the shell version is blank or the
    /// download URL is not a valid URL.
    pub fn to_settings(&self) -> ConfigResult<ProvisionSettings> {
        let root = self
            .extension_root
            .clone()
            .unwrap_or_else(resolve_extension_root);
        let mut settings = ProvisionSettings::bundled(root);

        self.apply_version(&mut settings)?;
        settings.install_dir.clone_from(&self.install_dir);
        self.apply_source(&mut settings)?;

        Ok(settings)
    }

    fn apply_version(&self, settings: &mut ProvisionSettings) -> ConfigResult<()> {
        if let Some(version) = &self.shell_version {
            let trimmed = version.trim();
            if trimmed.is_empty() {
                return Err(eyre!("MONGOSH_SHELL_VERSION must not be blank").into());
            }
            trimmed.clone_into(&mut settings.shell_version);
        }
        Ok(())
    }

    fn apply_source(&self, settings: &mut ProvisionSettings) -> ConfigResult<()> {
        let Some(base_url) = &self.download_base_url else {
            return Ok(());
        };
        url::Url::parse(base_url).context("MONGOSH_DOWNLOAD_BASE_URL invalid URL")?;
        let install = InstallConfig {
            install_directory: self.install_dir.clone(),
            proxy: self.proxy.clone(),
            strict_ssl: self.strict_ssl.unwrap_or(true),
        };
        settings.source = ArchiveSource::Remote {
            base_url: base_url.clone(),
            install,
        };
        Ok(())
    }
}

/// Provisions the shell using settings from the environment.
///
/// Honours the `MONGOSH_*` variables described on [`ShellEnvCfg`]. The
/// resolved executable path is logged at `INFO`.
///
/// # Errors
/// Returns a [`MongoshSetupError`] when configuration fails, the platform is
/// unsupported, or extraction fails. An archive that lacks the executable is
/// reported as an error as well.
///
/// # Examples
/// ```no_run
/// fn main() -> Result<(), mongosh_setup::MongoshSetupError> {
///     mongosh_setup::run()?;
///     Ok(())
/// }
/// ```
pub fn run() -> Result<()> {
    run_internal()?;
    Ok(())
}

fn run_internal() -> ProvisionResult<()> {
    // `color_eyre::install()` errors when a hook is already registered.
    drop(color_eyre::install());

    let cfg = ShellEnvCfg::load().context("failed to load configuration via OrthoConfig")?;
    let settings = cfg.to_settings()?;
    let provisioner = ShellProvisioner::new(settings);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create Tokio runtime")?;

    let installed = rt.block_on(provisioner.ensure_installed(&NoopObserver))?;
    let Some(binary) = installed else {
        let expected = provisioner.binary_path()?;
        return Err(eyre!("archive extracted but {expected} is still missing").into());
    };

    info!(target: LOG_TARGET, path = %binary.path(), "mongo shell ready");
    Ok(())
}
