//! In-memory driver used to exercise the connection cache without a server.

use async_trait::async_trait;
use color_eyre::eyre::eyre;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::connection::{CollectionInfo, Connector, DatabaseInfo, DriverConnection, DriverError};

type Catalogue = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Default)]
struct ServerState {
    catalogue: Mutex<Catalogue>,
    refusing: AtomicBool,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl ServerState {
    fn catalogue(&self) -> MutexGuard<'_, Catalogue> {
        self.catalogue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Connector backed by a shared in-memory catalogue.
///
/// Clones share the same catalogue and counters, so a test can keep one
/// clone for assertions while the cache owns another.
///
/// # Examples
/// ```
/// use mongosh_setup::test_support::MemoryConnector;
///
/// let connector = MemoryConnector::default().with_databases(["admin"]);
/// assert_eq!(connector.opened(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    state: Arc<ServerState>,
}

impl MemoryConnector {
    /// Seeds empty databases named by `names`.
    #[must_use]
    pub fn with_databases<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut catalogue = self.state.catalogue();
            for name in names {
                catalogue.entry(name.into()).or_default();
            }
        }
        self
    }

    /// Seeds `collection` inside `database`.
    #[must_use]
    pub fn with_collection(self, database: &str, collection: &str) -> Self {
        self.state
            .catalogue()
            .entry(database.to_owned())
            .or_default()
            .insert(collection.to_owned());
        self
    }

    /// Makes every subsequent connect attempt fail.
    #[must_use]
    pub fn refusing(self) -> Self {
        self.set_refusing(true);
        self
    }

    /// Toggles whether connect attempts fail.
    pub fn set_refusing(&self, refusing: bool) {
        self.state.refusing.store(refusing, Ordering::SeqCst);
    }

    /// Number of connections opened so far.
    #[must_use]
    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    /// Number of connections closed so far.
    #[must_use]
    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Connection = MemoryConnection;

    async fn connect(&self, _connection_string: &str) -> Result<MemoryConnection, DriverError> {
        if self.state.refusing.load(Ordering::SeqCst) {
            return Err(eyre!("connection refused by in-memory server"));
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryConnection {
            state: Arc::clone(&self.state),
            closed: AtomicBool::new(false),
        })
    }
}

/// Connection produced by [`MemoryConnector`].
#[derive(Debug)]
pub struct MemoryConnection {
    state: Arc<ServerState>,
    closed: AtomicBool,
}

impl MemoryConnection {
    /// Returns `true` once [`DriverConnection::close`] ran.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.is_closed() {
            return Err(eyre!("connection already closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl DriverConnection for MemoryConnection {
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>, DriverError> {
        self.ensure_open()?;
        Ok(self
            .state
            .catalogue()
            .iter()
            .map(|(name, collections)| DatabaseInfo {
                name: name.clone(),
                empty: Some(collections.is_empty()),
                size_on_disk: None,
            })
            .collect())
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<CollectionInfo>, DriverError> {
        self.ensure_open()?;
        Ok(self
            .state
            .catalogue()
            .get(database)
            .map(|collections| collections.iter().map(CollectionInfo::named).collect())
            .unwrap_or_default())
    }

    async fn drop_database(&self, database: &str) -> Result<bool, DriverError> {
        self.ensure_open()?;
        Ok(self.state.catalogue().remove(database).is_some())
    }

    async fn drop_collection(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<bool, DriverError> {
        self.ensure_open()?;
        Ok(self
            .state
            .catalogue()
            .get_mut(database)
            .is_some_and(|collections| collections.remove(collection)))
    }

    async fn create_collection(&self, database: &str, collection: &str) -> Result<(), DriverError> {
        self.ensure_open()?;
        self.state
            .catalogue()
            .entry(database.to_owned())
            .or_default()
            .insert(collection.to_owned());
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.state.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
