//! Shared fixtures for provisioning tests.

use camino::Utf8Path;
use color_eyre::eyre::{Result, eyre};
use rstest::fixture;
use std::fs::{self, File};
use std::io::Write;
use tokio::runtime::{Builder, Runtime};
use zip::write::SimpleFileOptions;

use crate::platform::{CpuArch, OsFamily, PlatformDescriptor};

/// Builds a single-threaded Tokio runtime for synchronous tests.
///
/// # Examples
/// ```rust
/// use mongosh_setup::test_support::test_runtime;
///
/// # fn demo() -> color_eyre::eyre::Result<()> {
/// let runtime = test_runtime()?;
/// # drop(runtime);
/// # Ok(())
/// # }
/// # demo().unwrap();
/// ```
pub fn test_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| eyre!(err))
}

/// rstest fixture naming the Linux x86-64 platform.
#[fixture]
pub fn linux_x64() -> PlatformDescriptor {
    PlatformDescriptor::new(OsFamily::Linux, CpuArch::X86_64)
}

/// Writes a zip archive at `path` holding `entries` as `(name, contents)`.
///
/// Parent directories are created as needed.
///
/// # Panics
/// Panics when the archive cannot be written; intended for test setup only.
pub fn write_shell_archive(path: &Utf8Path, entries: &[(&str, &[u8])]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|err| panic!("create archive directory {parent}: {err}"));
    }
    let file = File::create(path).unwrap_or_else(|err| panic!("create archive {path}: {err}"));
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().unix_permissions(0o644);
    for (name, contents) in entries {
        zip.start_file(*name, options)
            .unwrap_or_else(|err| panic!("start archive entry {name}: {err}"));
        zip.write_all(contents)
            .unwrap_or_else(|err| panic!("write archive entry {name}: {err}"));
    }
    zip.finish()
        .unwrap_or_else(|err| panic!("finish archive {path}: {err}"));
}
