//! Immutable topology snapshot.
//!
//! [`TopologySnapshot`] wraps a `petgraph::Graph` (undirected) with an
//! endpoint → `NodeIndex` map, built once per retrace from raw
//! [`TopologyRecords`]. Every query the tracer issues mid-walk — attached
//! cable, paired rear port, fan-out front ports — is an in-memory lookup, so
//! a trace never touches the backing store.
//!
//! Building the snapshot enforces the class invariants the tracer assumes:
//! at most one cable per endpoint, exactly one rear port per front port, and
//! unique positions per rear port. A record set violating any of these is
//! rejected with a [`TopologyError`] rather than silently producing an
//! untraceable graph.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

use crate::error::{TopologyError, TraceError};
use crate::topology::models::{
    CableStatus, Endpoint, EndpointKind, TerminationRole, TopologyRecords,
};

/// The slice of cable state the tracer needs at each hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CableRun {
    pub id: u64,
    pub status: CableStatus,
}

/// Edge payload: either a cable or a front-to-rear panel mapping.
#[derive(Debug, Clone, Copy)]
enum Link {
    Cable(CableRun),
    Panel { position: u32 },
}

/// Immutable, validated view of the topology for one retrace operation.
#[derive(Debug, Clone)]
pub struct TopologySnapshot {
    graph: UnGraph<Endpoint, Link>,
    index: HashMap<Endpoint, NodeIndex>,
}

impl TopologySnapshot {
    /// Build a snapshot from raw records, validating class invariants.
    pub fn from_records(records: &TopologyRecords) -> Result<Self, TopologyError> {
        let mut graph = UnGraph::with_capacity(
            records.endpoints.len(),
            records.cables.len() + records.pass_throughs.len(),
        );
        let mut index = HashMap::with_capacity(records.endpoints.len());

        for &endpoint in &records.endpoints {
            index
                .entry(endpoint)
                .or_insert_with(|| graph.add_node(endpoint));
        }

        let resolve = |index: &HashMap<Endpoint, NodeIndex>, e: Endpoint| {
            index
                .get(&e)
                .copied()
                .ok_or(TopologyError::UnknownEndpoint(e))
        };

        let mut mapped_fronts: HashSet<Endpoint> = HashSet::new();
        let mut taken_positions: HashSet<(Endpoint, u32)> = HashSet::new();
        for pair in &records.pass_throughs {
            if pair.front.kind != EndpointKind::FrontPort {
                return Err(TopologyError::NotAFrontPort(pair.front));
            }
            if pair.rear.kind != EndpointKind::RearPort {
                return Err(TopologyError::NotARearPort(pair.rear));
            }
            let front = resolve(&index, pair.front)?;
            let rear = resolve(&index, pair.rear)?;
            if !mapped_fronts.insert(pair.front) {
                return Err(TopologyError::FrontRemapped(pair.front));
            }
            if !taken_positions.insert((pair.rear, pair.position)) {
                return Err(TopologyError::PositionTaken {
                    rear: pair.rear,
                    position: pair.position,
                });
            }
            graph.add_edge(
                front,
                rear,
                Link::Panel {
                    position: pair.position,
                },
            );
        }

        let mut occupied: HashMap<Endpoint, u64> = HashMap::new();
        for cable in &records.cables {
            if cable.a == cable.b {
                return Err(TopologyError::SelfConnected(cable.id));
            }
            let a = resolve(&index, cable.a)?;
            let b = resolve(&index, cable.b)?;
            for endpoint in cable.endpoints() {
                if let Some(&existing) = occupied.get(&endpoint) {
                    return Err(TopologyError::EndpointOccupied {
                        endpoint,
                        cable: existing,
                    });
                }
                occupied.insert(endpoint, cable.id);
            }
            graph.add_edge(
                a,
                b,
                Link::Cable(CableRun {
                    id: cable.id,
                    status: cable.status,
                }),
            );
        }

        Ok(Self { graph, index })
    }

    // ========================================================================
    // Endpoint registry
    // ========================================================================

    pub fn contains(&self, endpoint: Endpoint) -> bool {
        self.index.contains_key(&endpoint)
    }

    /// Resolve a `(kind, id)` pair to a registered endpoint.
    pub fn resolve(&self, kind: EndpointKind, id: u64) -> Result<Endpoint, TraceError> {
        let endpoint = Endpoint::new(kind, id);
        if self.contains(endpoint) {
            Ok(endpoint)
        } else {
            Err(TraceError::UnknownEndpoint(endpoint))
        }
    }

    /// Role of a registered endpoint; `UnknownEndpoint` if it is not registered.
    pub fn role_of(&self, endpoint: Endpoint) -> Result<TerminationRole, TraceError> {
        if self.contains(endpoint) {
            Ok(endpoint.role())
        } else {
            Err(TraceError::UnknownEndpoint(endpoint))
        }
    }

    // ========================================================================
    // Cable graph
    // ========================================================================

    /// The cable attached to an endpoint and the endpoint at its far side.
    ///
    /// `None` if the endpoint is unterminated. At most one cable can be
    /// attached (build-time invariant).
    pub fn cable_at(&self, endpoint: Endpoint) -> Option<(CableRun, Endpoint)> {
        let idx = *self.index.get(&endpoint)?;
        self.graph.edges(idx).find_map(|edge| match *edge.weight() {
            Link::Cable(run) => {
                let far = if edge.source() == idx {
                    edge.target()
                } else {
                    edge.source()
                };
                Some((run, self.graph[far]))
            }
            Link::Panel { .. } => None,
        })
    }

    // ========================================================================
    // Pass-through map
    // ========================================================================

    /// The rear port a front port maps to, with its position.
    pub fn rear_of(&self, front: Endpoint) -> Option<(Endpoint, u32)> {
        let idx = *self.index.get(&front)?;
        self.graph.edges(idx).find_map(|edge| match *edge.weight() {
            Link::Panel { position } => {
                let far = if edge.source() == idx {
                    edge.target()
                } else {
                    edge.source()
                };
                Some((self.graph[far], position))
            }
            Link::Cable(_) => None,
        })
    }

    /// All front ports mapped to a rear port, ascending by position.
    ///
    /// The ordering is a contract: fan-out branches are produced in this
    /// order, so it must be stable across retraces.
    pub fn fronts_of(&self, rear: Endpoint) -> Vec<(u32, Endpoint)> {
        let Some(&idx) = self.index.get(&rear) else {
            return Vec::new();
        };
        let mut fronts: Vec<(u32, Endpoint)> = self
            .graph
            .edges(idx)
            .filter_map(|edge| match *edge.weight() {
                Link::Panel { position } => {
                    let far = if edge.source() == idx {
                        edge.target()
                    } else {
                        edge.source()
                    };
                    Some((position, self.graph[far]))
                }
                Link::Cable(_) => None,
            })
            .collect();
        fronts.sort_unstable();
        fronts
    }

    // ========================================================================
    // Origin enumeration / stats
    // ========================================================================

    /// Terminal endpoints that currently have a cable attached, sorted.
    ///
    /// These are the origins a bulk retrace walks from. An optional kind
    /// filter narrows the sweep (e.g. interfaces only).
    pub fn cabled_origins(&self, kinds: Option<&[EndpointKind]>) -> Vec<Endpoint> {
        let mut origins: Vec<Endpoint> = self
            .index
            .iter()
            .filter(|(endpoint, _)| endpoint.role() == TerminationRole::Terminal)
            .filter(|(endpoint, _)| kinds.map_or(true, |ks| ks.contains(&endpoint.kind)))
            .filter(|(endpoint, _)| self.cable_at(**endpoint).is_some())
            .map(|(endpoint, _)| *endpoint)
            .collect();
        origins.sort_unstable();
        origins
    }

    pub fn endpoint_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn cable_count(&self) -> usize {
        self.graph
            .edge_weights()
            .filter(|w| matches!(w, Link::Cable(_)))
            .count()
    }

    pub fn pass_through_count(&self) -> usize {
        self.graph
            .edge_weights()
            .filter(|w| matches!(w, Link::Panel { .. }))
            .count()
    }
}

// ============================================================================
// Tests
// ============================================================================
