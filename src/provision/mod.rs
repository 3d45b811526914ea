//! Installs the MongoDB shell binary for the running platform.
//!
//! The provisioner looks up the archive published for the current operating
//! system and CPU, and extracts it into the install directory the first time
//! the executable is requested. Later calls only check that the executable is
//! still on disk.
//!
//! # Layout
//!
//! ```text
//! <extension_root>/resources/mongoshell/<version>/<archive>   bundled or downloaded archive
//! <extension_root>/mongoshellexecutable/<binary>              extracted executable
//! ```
//!
//! # Concurrency
//!
//! Calls targeting the same executable path are serialised through a
//! process-wide, per-path async lock, so separate provisioners pointing at the
//! same directory cooperate. A caller that waited re-checks the path after
//! acquiring the lock, so only one extraction runs for concurrent requests.
//! Extraction and permission changes run on the blocking thread pool.

mod config;
mod download;
mod events;
mod extract;

pub use config::{
    ARCHIVE_SUBDIR, ArchiveSource, DEFAULT_SHELL_VERSION, INSTALL_DIR_NAME, InstallConfig,
    ProvisionSettings, resolve_extension_root,
};
pub use events::{NoopObserver, ProgressObserver, ProvisionEvent};

use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::eyre::eyre;
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use tracing::{Instrument, Span, debug, info, info_span, warn};

use crate::error::{ProvisionError, ProvisionErrorKind, ProvisionResult};
use crate::fs::make_executable;
use crate::observability::PROVISION_TARGET;
use crate::platform::{BinaryArchiveEntry, PlatformDescriptor};

/// Per-executable install locks shared by every provisioner in the process.
static INSTALL_LOCKS: OnceLock<DashMap<Utf8PathBuf, Arc<Mutex<()>>>> = OnceLock::new();

fn install_locks() -> &'static DashMap<Utf8PathBuf, Arc<Mutex<()>>> {
    INSTALL_LOCKS.get_or_init(DashMap::new)
}

/// Absolute path of an extracted shell executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledBinary {
    path: Utf8PathBuf,
}

impl InstalledBinary {
    /// Returns the executable path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Consumes the handle, returning the executable path.
    #[must_use]
    pub fn into_path(self) -> Utf8PathBuf {
        self.path
    }
}

impl AsRef<Utf8Path> for InstalledBinary {
    fn as_ref(&self) -> &Utf8Path {
        &self.path
    }
}

/// Ensures a runnable copy of the shell exists for one platform.
///
/// # Examples
/// ```no_run
/// use mongosh_setup::{NoopObserver, ProvisionSettings, ShellProvisioner};
///
/// # async fn demo() -> mongosh_setup::ProvisionResult<()> {
/// let provisioner = ShellProvisioner::new(ProvisionSettings::bundled("/ext"));
/// if let Some(binary) = provisioner.ensure_installed(&NoopObserver).await? {
///     tracing::info!(path = %binary.path(), "shell ready");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ShellProvisioner {
    settings: ProvisionSettings,
    platform: PlatformDescriptor,
}

impl ShellProvisioner {
    /// Creates a provisioner for the platform the process runs on.
    #[must_use]
    pub fn new(settings: ProvisionSettings) -> Self {
        Self::with_platform(settings, PlatformDescriptor::current())
    }

    /// Creates a provisioner for an explicit platform.
    #[must_use]
    pub const fn with_platform(settings: ProvisionSettings, platform: PlatformDescriptor) -> Self {
        Self { settings, platform }
    }

    /// Returns the settings the provisioner was built with.
    #[must_use]
    pub const fn settings(&self) -> &ProvisionSettings {
        &self.settings
    }

    /// Returns the platform the provisioner targets.
    #[must_use]
    pub const fn platform(&self) -> PlatformDescriptor {
        self.platform
    }

    /// Computes where the executable lives once installed.
    ///
    /// # Errors
    /// Returns a [`ProvisionErrorKind::UnsupportedPlatform`] error when no
    /// archive exists for the target platform.
    pub fn binary_path(&self) -> ProvisionResult<Utf8PathBuf> {
        let entry = self.archive_entry()?;
        Ok(self.settings.install_dir().join(entry.binary_file_name))
    }

    /// Returns the installed executable, extracting the archive first if needed.
    ///
    /// Returns `Ok(None)` when extraction completed but the executable is
    /// still missing.
    ///
    /// # Errors
    /// Returns a [`ProvisionErrorKind::UnsupportedPlatform`] error before
    /// touching the filesystem when the platform has no archive. Download and
    /// extraction failures propagate as [`ProvisionErrorKind::Other`].
    pub async fn ensure_installed(
        &self,
        observer: &dyn ProgressObserver,
    ) -> ProvisionResult<Option<InstalledBinary>> {
        let entry = self.archive_entry()?;
        let install_dir = self.settings.install_dir();
        let binary = install_dir.join(entry.binary_file_name);

        if let Some(installed) = existing(&binary) {
            return Ok(Some(installed));
        }

        let gate = Arc::clone(&install_locks().entry(binary.clone()).or_default());
        let _guard = gate.lock().await;

        if let Some(installed) = existing(&binary) {
            return Ok(Some(installed));
        }

        let span = info_span!(
            target: PROVISION_TARGET,
            "install_shell",
            platform = %self.platform,
            install_dir = %install_dir
        );
        self.install(entry, &install_dir, &binary, observer)
            .instrument(span)
            .await
    }

    fn archive_entry(&self) -> ProvisionResult<&'static BinaryArchiveEntry> {
        self.platform.archive_entry().ok_or_else(|| {
            ProvisionError::new(
                ProvisionErrorKind::UnsupportedPlatform,
                eyre!("runtime not supported: {}", self.platform),
            )
        })
    }

    async fn install(
        &self,
        entry: &BinaryArchiveEntry,
        install_dir: &Utf8Path,
        binary: &Utf8Path,
        observer: &dyn ProgressObserver,
    ) -> ProvisionResult<Option<InstalledBinary>> {
        info!(target: PROVISION_TARGET, "installing mongo shell");
        observer.on_event(&ProvisionEvent::InstallStart {
            target: install_dir.to_path_buf(),
        });

        let outcome = self.unpack(entry, install_dir, binary, observer).await;

        let reported = match &outcome {
            Ok(Some(installed)) => Some(installed.path().to_path_buf()),
            Ok(None) | Err(_) => None,
        };
        observer.on_event(&ProvisionEvent::InstallEnd { binary: reported });
        outcome
    }

    async fn unpack(
        &self,
        entry: &BinaryArchiveEntry,
        install_dir: &Utf8Path,
        binary: &Utf8Path,
        observer: &dyn ProgressObserver,
    ) -> ProvisionResult<Option<InstalledBinary>> {
        let archive = self.settings.archive_dir().join(entry.archive_file_name);

        if let ArchiveSource::Remote { base_url, install } = &self.settings.source {
            if archive.is_file() {
                debug!(target: PROVISION_TARGET, archive = %archive, "reusing downloaded archive");
            } else {
                let client = download::build_client(install)?;
                let url = download::archive_url(base_url, entry.archive_file_name);
                download::download_archive(&client, &url, &archive, observer).await?;
            }
        }

        let source = archive.clone();
        let target = install_dir.to_path_buf();
        run_blocking("extract shell archive", move || {
            extract::extract_archive(&source, &target)
        })
        .await?;

        if !binary.exists() {
            warn!(
                target: PROVISION_TARGET,
                archive = %archive,
                expected = %binary,
                "extraction finished without producing the shell executable"
            );
            return Ok(None);
        }

        let executable = binary.to_path_buf();
        run_blocking("mark shell executable", move || {
            make_executable(&executable).map_err(ProvisionError::from)
        })
        .await?;
        info!(target: PROVISION_TARGET, path = %binary, "mongo shell installed");
        Ok(Some(InstalledBinary {
            path: binary.to_path_buf(),
        }))
    }
}

/// Runs `task` on the blocking pool inside the caller's span.
async fn run_blocking<T, F>(what: &'static str, task: F) -> ProvisionResult<T>
where
    F: FnOnce() -> ProvisionResult<T> + Send + 'static,
    T: Send + 'static,
{
    let span = Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(task))
        .await
        .map_err(|err| ProvisionError::from(eyre!("{what} task panicked: {err}")))?
}

fn existing(binary: &Utf8Path) -> Option<InstalledBinary> {
    if !binary.exists() {
        return None;
    }
    debug!(target: PROVISION_TARGET, path = %binary, "mongo shell already installed");
    Some(InstalledBinary {
        path: binary.to_path_buf(),
    })
}

/// Installs the bundled shell under `extension_root` for the current platform.
///
/// Equivalent to [`ShellProvisioner::ensure_installed`] with bundled settings
/// and a [`NoopObserver`].
///
/// # Errors
/// See [`ShellProvisioner::ensure_installed`].
pub async fn ensure_installed(
    extension_root: impl Into<Utf8PathBuf>,
) -> ProvisionResult<Option<InstalledBinary>> {
    ShellProvisioner::new(ProvisionSettings::bundled(extension_root))
        .ensure_installed(&NoopObserver)
        .await
}
