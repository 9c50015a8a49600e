//! Per-type mapping cache.
//!
//! Lookups take a shared read lock. A miss takes the upgradable lock, which
//! admits concurrent readers but only one would-be writer, so each type's
//! mapping is constructed at most once and every caller sees the same `Arc`.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::trace;

use super::{Mapping, Record};
use crate::error::Result;

/// Memoized mappings keyed by record type.
#[derive(Debug, Default)]
pub struct MappingCache {
    mappings: RwLock<HashMap<TypeId, Arc<Mapping>>>,
    /// Number of mappings constructed.
    builds: AtomicU64,
}

impl MappingCache {
    /// Creates a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mapping for `T`, constructing it on first use.
    ///
    /// # Errors
    ///
    /// Returns `MappingCollision` if `T` maps two fields to one column.
    /// Failed constructions are not cached.
    pub fn get<T: Record>(&self) -> Result<Arc<Mapping>> {
        let id = TypeId::of::<T>();

        if let Some(mapping) = self.mappings.read().get(&id) {
            return Ok(Arc::clone(mapping));
        }

        let guard = self.mappings.upgradable_read();
        // Another caller may have finished construction while we waited.
        if let Some(mapping) = guard.get(&id) {
            return Ok(Arc::clone(mapping));
        }

        let mapping = Arc::new(Mapping::build::<T>()?);
        self.builds.fetch_add(1, Ordering::Relaxed);
        trace!(record = T::record_name(), "caching column mapping");

        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        guard.insert(id, Arc::clone(&mapping));
        Ok(mapping)
    }

    /// Returns the number of cached mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.read().len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.read().is_empty()
    }

    /// Returns how many mappings this cache has constructed.
    #[must_use]
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }
}

/// Returns the process-wide cached mapping for `T`.
///
/// # Errors
///
/// Returns `MappingCollision` if `T` maps two fields to one column.
pub fn mapping_for<T: Record>() -> Result<Arc<Mapping>> {
    static CACHE: OnceLock<MappingCache> = OnceLock::new();
    CACHE.get_or_init(MappingCache::new).get::<T>()
}
