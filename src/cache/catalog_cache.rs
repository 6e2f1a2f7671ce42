use super::indexes::CatalogIndexes;
use super::{CacheSettings, CacheState, CatalogError, CatalogResult};
use crate::catalog::CatalogStats;
use crate::catalog_store::CatalogDb;
use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// In-memory catalog over a durable [`CatalogDb`].
///
/// Reads are served from the indexes under a shared lock. Mutations are
/// serialized by a writer mutex: validation happens first, then the durable
/// write, then every index update under a single exclusive lock, so readers
/// see either the state before an operation or the state after it.
pub struct CatalogCache {
    pub(super) db: Arc<dyn CatalogDb>,
    pub(super) settings: CacheSettings,
    state: RwLock<CacheState>,
    indexes: RwLock<CatalogIndexes>,
    writer: Mutex<()>,
}

impl CatalogCache {
    pub fn new(db: Arc<dyn CatalogDb>, settings: CacheSettings) -> Self {
        let indexes = CatalogIndexes::new(&settings);
        CatalogCache {
            db,
            settings,
            state: RwLock::new(CacheState::Uninitialized),
            indexes: RwLock::new(indexes),
            writer: Mutex::new(()),
        }
    }

    /// Loads every index from the durable store. Must be called exactly once;
    /// a second call is a `Conflict`. A failed load leaves the cache `Failed`
    /// for good.
    pub fn initialize(&self) -> CatalogResult<()> {
        let _writer = self.writer.lock();
        {
            let mut state = self.state.write();
            if *state != CacheState::Uninitialized {
                return Err(CatalogError::Conflict(format!(
                    "catalog already initialized (state: {})",
                    *state
                )));
            }
            *state = CacheState::Loading;
        }

        info!("Loading catalog...");
        let start = Instant::now();
        match CatalogIndexes::load(self.db.as_ref(), &self.settings) {
            Ok(indexes) => {
                *self.indexes.write() = indexes;
                *self.state.write() = CacheState::Ready;
                info!("Catalog ready in {:?}", start.elapsed());
                Ok(())
            }
            Err(err) => {
                error!("Catalog load failed: {:#}", err);
                *self.state.write() = CacheState::Failed;
                Err(CatalogError::DependencyFailure(err))
            }
        }
    }

    pub fn state(&self) -> CacheState {
        *self.state.read()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == CacheState::Ready
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn stats(&self) -> CatalogResult<CatalogStats> {
        Ok(self.read()?.stats())
    }

    pub(super) fn ensure_ready(&self) -> CatalogResult<()> {
        match self.state() {
            CacheState::Ready => Ok(()),
            state => Err(CatalogError::NotReady(state)),
        }
    }

    /// Shared view of the indexes, only once the load has completed.
    pub(super) fn read(&self) -> CatalogResult<RwLockReadGuard<'_, CatalogIndexes>> {
        self.ensure_ready()?;
        Ok(self.indexes.read())
    }

    /// Starts a mutation: the returned guard keeps other mutations out until
    /// it is dropped.
    pub(super) fn begin_write(&self) -> CatalogResult<MutexGuard<'_, ()>> {
        let guard = self.writer.lock();
        self.ensure_ready()?;
        Ok(guard)
    }

    /// Exclusive view of the indexes for applying a mutation that already
    /// reached the durable store.
    pub(super) fn apply(&self) -> RwLockWriteGuard<'_, CatalogIndexes> {
        self.indexes.write()
    }

    /// Converts a durable store failure, logging it first.
    pub(super) fn durable<T>(
        &self,
        operation: &str,
        result: anyhow::Result<T>,
    ) -> CatalogResult<T> {
        result.map_err(|err| {
            warn!("Durable store failed to {}: {:#}", operation, err);
            CatalogError::DependencyFailure(err)
        })
    }
}
