//! Installs the bundled MongoDB shell for the current platform and logs the
//! path of the executable.
//!
//! Configuration is provided via `MONGOSH_*` environment variables parsed by
//! [`OrthoConfig`](https://github.com/leynos/ortho-config); log verbosity follows
//! `RUST_LOG`. The binary exits with status code `0` on success and `1` on
//! error.

use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    mongosh_setup::run().map_err(|err| color_eyre::eyre::eyre!(err))?;
    Ok(())
}
