//! Error taxonomy for the tracing engine.
//!
//! Three families, matching where a fault can originate:
//!
//! - [`TraceError`] — per-origin faults raised while walking the topology.
//!   Loop and depth faults are also recorded on the traced path itself
//!   (branch outcomes), so the path can be cached with its marker while the
//!   fault is reported per-origin.
//! - [`TopologyError`] — class-invariant violations rejected when a snapshot
//!   is built from raw records.
//! - [`CacheError`] — internal inconsistency in the path cache's multi-key
//!   index; fatal to the affected entry only.
//!
//! Per-origin errors never abort a bulk retrace of unrelated origins; the
//! coordinator catches them and records them in its report.

use crate::topology::models::Endpoint;
use thiserror::Error;

/// Faults raised while tracing a single origin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    #[error("unknown endpoint {0}")]
    UnknownEndpoint(Endpoint),

    #[error("wiring loop detected at {at} while tracing from {origin}")]
    LoopDetected { origin: Endpoint, at: Endpoint },

    #[error("path from {origin} exceeded the maximum trace depth of {max_depth}")]
    PathTooLong { origin: Endpoint, max_depth: usize },
}

/// Violations of the topology class invariants, rejected at snapshot build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("reference to undeclared endpoint {0}")]
    UnknownEndpoint(Endpoint),

    #[error("endpoint {endpoint} already terminates cable {cable}")]
    EndpointOccupied { endpoint: Endpoint, cable: u64 },

    #[error("cable {0} connects an endpoint to itself")]
    SelfConnected(u64),

    #[error("front port {0} is already mapped to a rear port")]
    FrontRemapped(Endpoint),

    #[error("position {position} on {rear} is already mapped to a front port")]
    PositionTaken { rear: Endpoint, position: u32 },

    #[error("{0} cannot be the front side of a pass-through pair")]
    NotAFrontPort(Endpoint),

    #[error("{0} cannot be the rear side of a pass-through pair")]
    NotARearPort(Endpoint),
}

/// Internal inconsistency in the path cache's member index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache index corrupted: {endpoint} points at missing path origin {origin}")]
    Corrupted { endpoint: Endpoint, origin: Endpoint },
}
