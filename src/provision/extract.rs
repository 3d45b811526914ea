//! Unpacks a shell archive into the install directory.

use camino::Utf8Path;
use color_eyre::eyre::Context;
use std::fs::File;
use tracing::debug;

use crate::error::ProvisionResult;
use crate::fs::ensure_dir_exists;
use crate::observability::PROVISION_TARGET;

/// Extracts every entry of the zip `archive` into `target`.
///
/// Entry paths that would escape `target` are rejected by the zip reader.
pub(crate) fn extract_archive(archive: &Utf8Path, target: &Utf8Path) -> ProvisionResult<()> {
    debug!(
        target: PROVISION_TARGET,
        archive = %archive,
        install_dir = %target,
        "extracting shell archive"
    );

    ensure_dir_exists(target)?;

    let file = File::open(archive).with_context(|| format!("open shell archive {archive}"))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("read shell archive {archive}"))?;
    let entries = zip.len();
    zip.extract(target.as_std_path())
        .with_context(|| format!("extract {archive} into {target}"))?;

    debug!(
        target: PROVISION_TARGET,
        archive = %archive,
        entries,
        "shell archive extracted"
    );
    Ok(())
}
