//! Retrace coordinator — orchestrates the full pipeline.
//!
//! The [`PathEngine`] trait is the single entry point for everything outside
//! the tracer: the CRUD layer's mutation hooks, the operator's bulk rebuild,
//! and the read side's cache lookups. The concrete [`CablePathEngine`]
//! pipeline is:
//!
//! 1. **Load**: raw records via `TopologyStore`
//! 2. **Snapshot**: validated immutable graph
//! 3. **Trace**: every affected origin, in parallel (rayon), pure compute
//! 4. **Apply**: cache writes in sorted origin order with coverage skipping
//!
//! Coverage skipping keeps one cached path per traced strand: an origin that
//! already appears as the origin or a destination of a path applied earlier
//! in the same batch is skipped, so both ends of a link are served by the
//! same cached path.
//!
//! Per-origin faults (unknown endpoint, depth overrun) are recorded in the
//! [`RetraceReport`] and never abort the rest of the batch.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::PathCache;
use crate::error::{CacheError, TraceError};
use crate::topology::models::{
    Cable, Endpoint, EndpointKind, PassThroughPair, TerminationRole,
};
use crate::topology::snapshot::TopologySnapshot;
use crate::topology::store::TopologyStore;
use crate::trace::models::{TraceConfig, TracedPath};
use crate::trace::tracer::Tracer;

// ============================================================================
// Report
// ============================================================================

/// A per-origin failure recorded during a retrace batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginFailure {
    pub origin: Endpoint,
    pub reason: String,
}

impl OriginFailure {
    fn new(origin: Endpoint, error: &TraceError) -> Self {
        Self {
            origin,
            reason: error.to_string(),
        }
    }
}

/// Outcome of a retrace batch (mutation hook or bulk rebuild).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetraceReport {
    /// Paths written to the cache.
    pub created: usize,
    /// Paths removed: invalidated up front plus wholesale replacements.
    pub deleted: usize,
    /// Origins skipped because an earlier path in the batch already covers them.
    pub skipped: usize,
    /// Paths stored with a wiring-loop marker.
    pub loops: usize,
    /// Origins that failed (unknown endpoint, depth overrun).
    pub failed: Vec<OriginFailure>,
    pub duration_ms: u64,
    pub completed_at: DateTime<Utc>,
}

// ============================================================================
// Trait
// ============================================================================

/// Path engine trait — mutation hooks, bulk rebuild, and the read path.
///
/// Consumers use `Arc<dyn PathEngine>` for dependency injection. The hooks
/// are called synchronously by the CRUD layer after it commits a change;
/// `cached_path` is the side-effect-free read used by serialization (a miss
/// means "not yet traced" and never triggers a trace).
#[async_trait]
pub trait PathEngine: Send + Sync {
    /// Trace one endpoint against the current topology, without touching the
    /// cache. Fails for an unknown endpoint.
    async fn trace_endpoint(&self, endpoint: Endpoint) -> Result<TracedPath>;

    /// The cached path containing `endpoint`, if one has been traced.
    fn cached_path(&self, endpoint: Endpoint) -> Option<Arc<TracedPath>>;

    /// React to a created, updated, or deleted cable.
    async fn on_cable_changed(&self, cable: &Cable) -> Result<RetraceReport>;

    /// React to a created, updated, or deleted pass-through mapping.
    async fn on_pass_through_changed(&self, pair: &PassThroughPair) -> Result<RetraceReport>;

    /// Full rebuild of the cache, optionally restricted to origin kinds.
    async fn retrace_all(&self, kinds: Option<Vec<EndpointKind>>) -> Result<RetraceReport>;
}

// ============================================================================
// Concrete implementation
// ============================================================================

/// Real path engine backed by a `TopologyStore` and an in-process `PathCache`.
pub struct CablePathEngine {
    store: Arc<dyn TopologyStore>,
    cache: PathCache,
    config: TraceConfig,
}

impl CablePathEngine {
    pub fn new(store: Arc<dyn TopologyStore>, config: TraceConfig) -> Self {
        Self {
            store,
            cache: PathCache::new(),
            config,
        }
    }

    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    async fn snapshot(&self) -> Result<TopologySnapshot> {
        let records = self.store.load_records().await?;
        Ok(TopologySnapshot::from_records(&records)?)
    }

    /// Invalidate every path touching the changed object's endpoints, then
    /// rebuild. Origins of the removed paths are re-seeded so a now-dangling
    /// terminal still gets a fresh (zero-cable) path; terminal terminations
    /// of the object itself are seeded for the cable-creation case.
    async fn retrace_after_change(&self, endpoints: [Endpoint; 2]) -> Result<RetraceReport> {
        let mut deleted = 0;
        let mut seeds = BTreeSet::new();
        for endpoint in endpoints {
            let removed = self.cache.invalidate(endpoint);
            deleted += removed.len();
            seeds.extend(removed);
            if endpoint.role() == TerminationRole::Terminal {
                seeds.insert(endpoint);
            }
        }
        self.rebuild(seeds, None, deleted).await
    }

    /// Trace the affected origins and apply the results to the cache.
    ///
    /// The origin set is the conservative sweep — every cabled terminal
    /// endpoint — plus the seeds carried in by the caller. Traces run in
    /// parallel over the shared snapshot; cache application is sequential in
    /// sorted origin order so coverage skipping stays deterministic.
    async fn rebuild(
        &self,
        seeds: BTreeSet<Endpoint>,
        kinds: Option<&[EndpointKind]>,
        deleted: usize,
    ) -> Result<RetraceReport> {
        let started = Instant::now();
        let snapshot = self.snapshot().await?;

        let mut origins: BTreeSet<Endpoint> = snapshot.cabled_origins(kinds).into_iter().collect();
        origins.extend(seeds);
        let origins: Vec<Endpoint> = origins.into_iter().collect();
        debug!(origins = origins.len(), "Tracing origins");

        let tracer = Tracer::new(&snapshot, &self.config);
        let results: Vec<(Endpoint, Result<TracedPath, TraceError>)> = origins
            .par_iter()
            .map(|&origin| (origin, tracer.trace(origin)))
            .collect();

        let mut report = RetraceReport {
            created: 0,
            deleted,
            skipped: 0,
            loops: 0,
            failed: Vec::new(),
            duration_ms: 0,
            completed_at: Utc::now(),
        };
        let mut covered: HashSet<Endpoint> = HashSet::new();

        for (origin, result) in results {
            let path = match result {
                Ok(path) => path,
                Err(error) => {
                    warn!(%origin, %error, "Trace failed");
                    report.failed.push(OriginFailure::new(origin, &error));
                    continue;
                }
            };
            if covered.contains(&origin) {
                report.skipped += 1;
                continue;
            }
            if let Some(at) = path.loop_at() {
                report.loops += 1;
                warn!("{}", TraceError::LoopDetected { origin, at });
            }
            if path.exceeded_depth() {
                // The path is still cached with its marker; the origin is
                // reported as failed so an operator can find it.
                let error = TraceError::PathTooLong {
                    origin,
                    max_depth: self.config.max_depth,
                };
                warn!("{error}");
                report.failed.push(OriginFailure::new(origin, &error));
            }
            covered.insert(origin);
            covered.extend(path.destinations());
            if self.cache.put(path).is_some() {
                report.deleted += 1;
            }
            report.created += 1;
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        report.completed_at = Utc::now();
        info!(
            created = report.created,
            deleted = report.deleted,
            skipped = report.skipped,
            loops = report.loops,
            failed = report.failed.len(),
            duration_ms = report.duration_ms,
            "Retrace complete"
        );
        Ok(report)
    }
}

#[async_trait]
impl PathEngine for CablePathEngine {
    async fn trace_endpoint(&self, endpoint: Endpoint) -> Result<TracedPath> {
        let snapshot = self.snapshot().await?;
        let path = Tracer::new(&snapshot, &self.config).trace(endpoint)?;
        Ok(path)
    }

    fn cached_path(&self, endpoint: Endpoint) -> Option<Arc<TracedPath>> {
        match self.cache.get(endpoint) {
            Ok(path) => path,
            Err(CacheError::Corrupted {
                endpoint: member,
                origin,
            }) => {
                // Fatal to this entry only: drop the stale index entry and
                // report a miss; the next retrace rebuilds the path.
                warn!(
                    "{}",
                    CacheError::Corrupted {
                        endpoint: member,
                        origin
                    }
                );
                self.cache.repair(member, origin);
                None
            }
        }
    }

    async fn on_cable_changed(&self, cable: &Cable) -> Result<RetraceReport> {
        debug!(cable = cable.id, status = %cable.status, "Cable changed");
        self.retrace_after_change(cable.endpoints()).await
    }

    async fn on_pass_through_changed(&self, pair: &PassThroughPair) -> Result<RetraceReport> {
        debug!(front = %pair.front, rear = %pair.rear, "Pass-through changed");
        self.retrace_after_change([pair.front, pair.rear]).await
    }

    async fn retrace_all(&self, kinds: Option<Vec<EndpointKind>>) -> Result<RetraceReport> {
        let deleted = self.cache.invalidate_all();
        self.rebuild(BTreeSet::new(), kinds.as_deref(), deleted).await
    }
}

// ============================================================================
// Tests
// ============================================================================
