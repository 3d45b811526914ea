//! Fetches a platform archive over HTTP when it is not already on disk.

use camino::Utf8Path;
use color_eyre::eyre::{Context, eyre};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::config::InstallConfig;
use super::events::{PercentTracker, ProgressObserver, ProvisionEvent};
use crate::error::ProvisionResult;
use crate::fs::ensure_dir_exists;
use crate::observability::PROVISION_TARGET;

/// Builds an HTTP client honouring the proxy and TLS options.
pub(crate) fn build_client(install: &InstallConfig) -> ProvisionResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(!install.strict_ssl);
    // Only the configured proxy applies; environment proxies are ignored.
    builder = match install.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(url) => {
            let proxy = reqwest::Proxy::all(url).with_context(|| format!("invalid proxy {url}"))?;
            builder.proxy(proxy)
        }
        None => builder.no_proxy(),
    };
    let client = builder.build().context("build HTTP client")?;
    Ok(client)
}

/// Joins the archive file name onto `base_url`.
pub(crate) fn archive_url(base_url: &str, archive_file_name: &str) -> String {
    format!("{}/{archive_file_name}", base_url.trim_end_matches('/'))
}

/// Downloads `url` into `destination`, reporting progress to `observer`.
///
/// The body is streamed into a temporary file beside `destination` and only
/// renamed into place once complete.
pub(crate) async fn download_archive(
    client: &reqwest::Client,
    url: &str,
    destination: &Utf8Path,
    observer: &dyn ProgressObserver,
) -> ProvisionResult<()> {
    let parent = destination
        .parent()
        .ok_or_else(|| eyre!("archive path {destination} has no parent directory"))?;
    ensure_dir_exists(parent)?;

    info!(target: PROVISION_TARGET, url, destination = %destination, "downloading shell archive");

    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request {url}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(eyre!("download of {url} failed with HTTP {status}").into());
    }

    let total_bytes = response.content_length();
    observer.on_event(&ProvisionEvent::DownloadStart {
        url: url.to_owned(),
        total_bytes,
    });

    let (std_file, staging) = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("create staging file in {parent}"))?
        .into_parts();
    let mut file = tokio::fs::File::from_std(std_file);
    let mut tracker = PercentTracker::new(total_bytes);

    while let Some(chunk) = response
        .chunk()
        .await
        .with_context(|| format!("read body of {url}"))?
    {
        file.write_all(&chunk)
            .await
            .with_context(|| format!("write staging file for {destination}"))?;
        let len = u64::try_from(chunk.len()).unwrap_or(u64::MAX);
        if let Some(percent) = tracker.advance(len) {
            observer.on_event(&ProvisionEvent::DownloadProgress { percent });
        }
    }
    if let Some(percent) = tracker.finish() {
        observer.on_event(&ProvisionEvent::DownloadProgress { percent });
    }

    file.flush()
        .await
        .with_context(|| format!("flush staging file for {destination}"))?;
    drop(file);

    staging
        .persist(destination)
        .map_err(|err| err.error)
        .with_context(|| format!("move downloaded archive to {destination}"))?;

    debug!(target: PROVISION_TARGET, destination = %destination, "shell archive downloaded");
    observer.on_event(&ProvisionEvent::DownloadEnd {
        archive: destination.to_path_buf(),
    });
    Ok(())
}
