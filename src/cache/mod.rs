//! Path cache with multi-sided lookup.
//!
//! [`PathCache`] stores traced paths keyed by origin and additionally indexes
//! every endpoint appearing in any branch back to the origins whose paths
//! contain it. A lookup from either end of a multi-hop link — or from any
//! node in between — resolves to a cached path without re-tracing.
//!
//! Both maps live under one `RwLock`: a `put` replaces the prior path for the
//! same origin and rewrites its index entries in a single write section, so
//! readers can never observe the path map and the member index out of sync.
//! Tracing happens outside the lock; the critical sections are plain map
//! operations proportional to the path's member count.
//!
//! Overlapping paths are real (two terminal origins on the same strand can
//! each cache a path sharing middle nodes), so the member index keeps an
//! ordered set of origins per endpoint. `get` prefers the path keyed by the
//! queried endpoint itself, else the lowest origin in `Endpoint` order —
//! deterministic across retraces.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::CacheError;
use crate::topology::models::Endpoint;
use crate::trace::models::TracedPath;

#[derive(Default)]
struct CacheInner {
    by_origin: HashMap<Endpoint, Arc<TracedPath>>,
    by_member: HashMap<Endpoint, BTreeSet<Endpoint>>,
}

/// Concurrent store of traced paths, indexed by origin and by member.
#[derive(Default)]
pub struct PathCache {
    inner: RwLock<CacheInner>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up the cached path containing `endpoint`.
    ///
    /// `Ok(None)` means not traced. `Err(Corrupted)` means the member index
    /// points at a path that is no longer stored — fatal to this entry only.
    pub fn get(&self, endpoint: Endpoint) -> Result<Option<Arc<TracedPath>>, CacheError> {
        let inner = self.read();
        if let Some(path) = inner.by_origin.get(&endpoint) {
            return Ok(Some(path.clone()));
        }
        let Some(origins) = inner.by_member.get(&endpoint) else {
            return Ok(None);
        };
        match origins.first() {
            None => Ok(None),
            Some(origin) => match inner.by_origin.get(origin) {
                Some(path) => Ok(Some(path.clone())),
                None => Err(CacheError::Corrupted {
                    endpoint,
                    origin: *origin,
                }),
            },
        }
    }

    /// Store a path, wholesale-replacing any prior path for the same origin.
    ///
    /// Returns the replaced path, if any.
    pub fn put(&self, path: TracedPath) -> Option<Arc<TracedPath>> {
        let origin = path.origin;
        let members = path.members();
        let mut inner = self.write();
        let replaced = Self::remove_origin(&mut inner, origin);
        for member in members {
            inner.by_member.entry(member).or_default().insert(origin);
        }
        inner.by_origin.insert(origin, Arc::new(path));
        replaced
    }

    /// Remove every cached path containing `endpoint`.
    ///
    /// Returns the origins of the removed paths.
    pub fn invalidate(&self, endpoint: Endpoint) -> Vec<Endpoint> {
        let mut inner = self.write();
        let mut origins: BTreeSet<Endpoint> = inner
            .by_member
            .get(&endpoint)
            .cloned()
            .unwrap_or_default();
        if inner.by_origin.contains_key(&endpoint) {
            origins.insert(endpoint);
        }
        origins
            .into_iter()
            .filter(|origin| Self::remove_origin(&mut inner, *origin).is_some())
            .collect()
    }

    /// Drop the whole cache. Returns the number of paths removed.
    pub fn invalidate_all(&self) -> usize {
        let mut inner = self.write();
        let count = inner.by_origin.len();
        inner.by_origin.clear();
        inner.by_member.clear();
        count
    }

    /// Drop a single member-index entry after a detected corruption, leaving
    /// the rest of the cache untouched.
    pub(crate) fn repair(&self, endpoint: Endpoint, origin: Endpoint) {
        let mut inner = self.write();
        if let Some(origins) = inner.by_member.get_mut(&endpoint) {
            origins.remove(&origin);
            if origins.is_empty() {
                inner.by_member.remove(&endpoint);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.read().by_origin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove_origin(inner: &mut CacheInner, origin: Endpoint) -> Option<Arc<TracedPath>> {
        let path = inner.by_origin.remove(&origin)?;
        for member in path.members() {
            if let Some(origins) = inner.by_member.get_mut(&member) {
                origins.remove(&origin);
                if origins.is_empty() {
                    inner.by_member.remove(&member);
                }
            }
        }
        Some(path)
    }

    /// Plant a dangling index entry, bypassing invariants.
    #[cfg(test)]
    fn corrupt(&self, endpoint: Endpoint, origin: Endpoint) {
        self.write()
            .by_member
            .entry(endpoint)
            .or_default()
            .insert(origin);
    }
}

// ============================================================================
// Tests
// ============================================================================
