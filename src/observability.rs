//! Shared tracing targets for observability instrumentation.
//!
//! Centralises the log targets used by the crate so subscribers can filter
//! provisioning and connection events without pulling in unrelated
//! application logs.

/// Target used by the binary provisioner.
pub(crate) const PROVISION_TARGET: &str = "mongosh_setup::provision";

/// Target used by the connection cache.
pub(crate) const CONNECTION_TARGET: &str = "mongosh_setup::connection";

/// Target used by the command-line entry point.
pub(crate) const LOG_TARGET: &str = "mongosh_setup::observability";
