//! Seam between the connection cache and the wire-protocol driver.

use async_trait::async_trait;
use color_eyre::Report;
use serde::{Deserialize, Serialize};

/// Error raised by a driver implementation.
pub type DriverError = Report;

/// Summary of one database as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInfo {
    /// Database name.
    pub name: String,
    /// Whether the server reports the database as empty.
    #[serde(default)]
    pub empty: Option<bool>,
    /// Size on disk in bytes, when reported.
    #[serde(default)]
    pub size_on_disk: Option<u64>,
}

impl DatabaseInfo {
    /// Creates a summary carrying only the name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            empty: None,
            size_on_disk: None,
        }
    }
}

/// Summary of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name.
    pub name: String,
}

impl CollectionInfo {
    /// Creates a summary for `name`.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An open connection to one server.
#[async_trait]
pub trait DriverConnection: Send + Sync {
    /// Lists every database on the server.
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>, DriverError>;

    /// Lists the collections inside `database`.
    async fn list_collections(&self, database: &str) -> Result<Vec<CollectionInfo>, DriverError>;

    /// Drops `database`, returning the driver's acknowledgement.
    async fn drop_database(&self, database: &str) -> Result<bool, DriverError>;

    /// Drops `collection` from `database`, returning the driver's acknowledgement.
    async fn drop_collection(&self, database: &str, collection: &str)
    -> Result<bool, DriverError>;

    /// Creates `collection` inside `database`.
    async fn create_collection(&self, database: &str, collection: &str)
    -> Result<(), DriverError>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), DriverError>;
}

/// Opens driver connections from connection strings.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connection type produced by this connector.
    type Connection: DriverConnection + 'static;

    /// Opens a connection described by `connection_string`.
    async fn connect(&self, connection_string: &str) -> Result<Self::Connection, DriverError>;
}
