//! Validates translating environment settings into provisioner configuration.

use camino::Utf8PathBuf;
use mongosh_setup::{ArchiveSource, DEFAULT_SHELL_VERSION, InstallConfig, ShellEnvCfg};
use rstest::rstest;

/// A fully populated `ShellEnvCfg` keeps every value in the resulting settings.
#[rstest]
fn to_settings_roundtrip() -> color_eyre::Result<()> {
    let cfg = ShellEnvCfg {
        extension_root: Some(Utf8PathBuf::from("/opt/ext")),
        install_dir: Some(Utf8PathBuf::from("/opt/shell")),
        shell_version: Some(" 2.0.1 ".into()),
        download_base_url: Some("https://downloads.example.com/mongosh".into()),
        proxy: Some("http://proxy:3128".into()),
        strict_ssl: Some(false),
    };

    let settings = cfg.to_settings()?;

    assert_eq!(settings.extension_root, Utf8PathBuf::from("/opt/ext"));
    assert_eq!(settings.shell_version, "2.0.1");
    assert_eq!(
        settings.archive_dir(),
        Utf8PathBuf::from("/opt/ext/resources/mongoshell/2.0.1")
    );
    assert_eq!(settings.install_dir(), Utf8PathBuf::from("/opt/shell"));
    assert_eq!(
        settings.source,
        ArchiveSource::Remote {
            base_url: "https://downloads.example.com/mongosh".into(),
            install: InstallConfig {
                install_directory: Some(Utf8PathBuf::from("/opt/shell")),
                proxy: Some("http://proxy:3128".into()),
                strict_ssl: false,
            },
        }
    );
    Ok(())
}

#[rstest]
fn to_settings_default_config() -> color_eyre::Result<()> {
    let cfg = ShellEnvCfg {
        extension_root: Some(Utf8PathBuf::from("/opt/ext")),
        ..ShellEnvCfg::default()
    };

    let settings = cfg.to_settings()?;

    assert_eq!(settings.shell_version, DEFAULT_SHELL_VERSION);
    assert_eq!(settings.source, ArchiveSource::Bundled);
    assert_eq!(
        settings.install_dir(),
        Utf8PathBuf::from("/opt/ext/mongoshellexecutable")
    );
    Ok(())
}

#[rstest]
fn remote_source_verifies_tls_unless_disabled() -> color_eyre::Result<()> {
    let cfg = ShellEnvCfg {
        extension_root: Some(Utf8PathBuf::from("/opt/ext")),
        download_base_url: Some("https://downloads.example.com/mongosh".into()),
        ..ShellEnvCfg::default()
    };

    let settings = cfg.to_settings()?;

    let ArchiveSource::Remote { install, .. } = settings.source else {
        panic!("download URL selects the remote source");
    };
    assert!(install.strict_ssl);
    assert!(install.proxy.is_none());
    Ok(())
}

#[rstest]
#[case::blank_version(
    ShellEnvCfg { shell_version: Some("  ".into()), ..ShellEnvCfg::default() },
    "MONGOSH_SHELL_VERSION"
)]
#[case::invalid_url(
    ShellEnvCfg { download_base_url: Some("not a url".into()), ..ShellEnvCfg::default() },
    "MONGOSH_DOWNLOAD_BASE_URL"
)]
fn to_settings_rejects_invalid_values(#[case] mut cfg: ShellEnvCfg, #[case] variable: &str) {
    cfg.extension_root = Some(Utf8PathBuf::from("/opt/ext"));

    let err = cfg.to_settings().expect_err("invalid configuration");

    assert!(
        err.to_string().contains(variable),
        "error should name {variable}: {err}"
    );
}

#[rstest]
fn load_reads_prefixed_environment() -> color_eyre::Result<()> {
    let cfg = temp_env::with_vars(
        [
            ("MONGOSH_EXTENSION_ROOT", Some("/srv/ext")),
            ("MONGOSH_SHELL_VERSION", Some("1.2.0")),
            ("MONGOSH_STRICT_SSL", Some("false")),
            ("MONGOSH_INSTALL_DIR", None::<&str>),
            ("MONGOSH_DOWNLOAD_BASE_URL", None),
            ("MONGOSH_PROXY", None),
        ],
        ShellEnvCfg::load,
    )?;

    assert_eq!(cfg.extension_root, Some(Utf8PathBuf::from("/srv/ext")));
    assert_eq!(cfg.shell_version.as_deref(), Some("1.2.0"));
    assert_eq!(cfg.strict_ssl, Some(false));
    assert!(cfg.download_base_url.is_none());
    Ok(())
}
