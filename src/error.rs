//! Domain error types for shell provisioning and connection caching.

use color_eyre::Report;
use thiserror::Error;

/// Result alias for operations that may return a [`MongoshSetupError`].
pub type Result<T> = std::result::Result<T, MongoshSetupError>;

/// Result alias for provisioning-specific fallible operations.
pub type ProvisionResult<T> = std::result::Result<T, ProvisionError>;

/// Result alias for connection-cache fallible operations.
pub type ConnectionResult<T> = std::result::Result<T, ConnectionError>;

/// Result alias for configuration fallible operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level error exposed by the crate.
#[derive(Debug, Error)]
pub enum MongoshSetupError {
    /// Indicates the shell binary could not be provisioned.
    #[error("shell provisioning failed")]
    Provision(#[from] ProvisionError),
    /// Indicates a cached driver connection failed.
    #[error("connection cache operation failed")]
    Connection(#[from] ConnectionError),
    /// Indicates configuration parsing failed.
    #[error("configuration parsing failed")]
    Config(#[from] ConfigError),
}

/// Categorises provisioning failures so callers can branch on structured errors.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ProvisionErrorKind {
    /// Represents errors without a more specific semantic meaning.
    #[default]
    Other,
    /// No archive is published for the running operating system and CPU.
    UnsupportedPlatform,
}

/// Captures provisioning failures.
#[derive(Debug, Error)]
#[error("{report}")]
pub struct ProvisionError {
    kind: ProvisionErrorKind,
    #[source]
    report: Report,
}

impl ProvisionError {
    /// Constructs a new provisioning error with the provided kind and
    /// diagnostic report.
    #[must_use]
    pub const fn new(kind: ProvisionErrorKind, report: Report) -> Self {
        Self { kind, report }
    }

    /// Returns the semantic category for this provisioning failure.
    #[must_use]
    pub const fn kind(&self) -> ProvisionErrorKind {
        self.kind
    }

    /// Returns `true` when the failure stems from an unsupported platform.
    #[must_use]
    pub fn is_unsupported_platform(&self) -> bool {
        self.kind == ProvisionErrorKind::UnsupportedPlatform
    }

    /// Extracts the underlying diagnostic report.
    #[must_use]
    pub fn into_report(self) -> Report {
        self.report
    }
}

impl From<Report> for ProvisionError {
    fn from(report: Report) -> Self {
        Self::new(ProvisionErrorKind::Other, report)
    }
}

impl From<ConfigError> for ProvisionError {
    fn from(err: ConfigError) -> Self {
        let ConfigError(report) = err;
        Self::new(ProvisionErrorKind::Other, report)
    }
}

impl From<MongoshSetupError> for ProvisionError {
    fn from(err: MongoshSetupError) -> Self {
        match err {
            MongoshSetupError::Provision(inner) => inner,
            MongoshSetupError::Connection(ConnectionError(report)) => report.into(),
            MongoshSetupError::Config(inner) => inner.into(),
        }
    }
}

/// Captures failures raised by a cached driver connection.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ConnectionError(#[from] Report);

/// Captures configuration failures.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ConfigError(#[from] Report);

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::eyre;

    #[test]
    fn report_conversion_defaults_to_other_kind() {
        let err = ProvisionError::from(eyre!("disk full"));
        assert_eq!(err.kind(), ProvisionErrorKind::Other);
        assert!(!err.is_unsupported_platform());
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn top_level_error_unwraps_back_into_provision_error() {
        let inner = ProvisionError::new(
            ProvisionErrorKind::UnsupportedPlatform,
            eyre!("runtime not supported"),
        );
        let outer = MongoshSetupError::from(inner);
        let recovered = ProvisionError::from(outer);
        assert!(recovered.is_unsupported_platform());
    }
}
