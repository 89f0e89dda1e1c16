//! Topology records, snapshot, and store seam.
//!
//! ```text
//! CRUD layer / topology file ──► TopologyStore ──► TopologyRecords
//!                                                       │
//!                                              TopologySnapshot (petgraph)
//!                                                       │
//!                                            tracer per-hop queries
//! ```
//!
//! ## Modules
//!
//! - [`models`] — Endpoint identity, cables, pass-through pairs, raw records
//! - [`snapshot`] — validated immutable graph the tracer walks
//! - [`store`] — `TopologyStore` trait and the file-backed implementation
//! - [`mock`] — `MockTopologyStore` for testing (cfg(test) only)

pub mod models;
pub mod snapshot;
pub mod store;

#[cfg(test)]
pub(crate) mod mock;

pub use models::{
    Cable, CableStatus, Endpoint, EndpointKind, PassThroughPair, TerminationRole, TopologyRecords,
};
pub use snapshot::{CableRun, TopologySnapshot};
pub use store::{FileTopologyStore, TopologyStore};
