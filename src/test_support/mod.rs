//! Internal helpers re-exported for integration tests.
//!
//! Provides an in-memory driver for exercising the connection cache, archive
//! fixtures for the provisioner, and log capture for asserting on tracing
//! output.

mod fixtures;
mod logging;
mod memory_driver;

pub use fixtures::{linux_x64, test_runtime, write_shell_archive};
pub use logging::{capture_info_logs, capture_logs, capture_warn_logs};
pub use memory_driver::{MemoryConnection, MemoryConnector};
