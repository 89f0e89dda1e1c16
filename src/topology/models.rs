//! Topology data models.
//!
//! Defines the raw record types handed over by the CRUD layer:
//!
//! - [`EndpointKind`] / [`Endpoint`] — stable identity for any terminable object
//! - [`TerminationRole`] — whether an endpoint kind terminates a path or passes it through
//! - [`CableStatus`] / [`Cable`] — a two-ended connection with a lifecycle status
//! - [`PassThroughPair`] — front-to-rear patch panel mapping with a 1-based position
//! - [`TopologyRecords`] — the complete record set a snapshot is built from
//!
//! Endpoints serialize as `"kind:id"` strings (e.g. `interface:17`) so
//! topology files stay compact and cable/pair records stay readable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Endpoint identity
// ============================================================================

/// The closed set of terminable object kinds.
///
/// Terminal kinds end a path; front and rear ports pass the signal through a
/// patch panel. The ordering of the variants is the deterministic tie-break
/// order used when origins are processed in bulk.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum EndpointKind {
    Interface,
    ConsolePort,
    ConsoleServerPort,
    PowerPort,
    PowerOutlet,
    CircuitTermination,
    FrontPort,
    RearPort,
}

/// Whether an endpoint kind is a true path destination or must be traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationRole {
    Terminal,
    PassThrough,
}

impl EndpointKind {
    /// All kinds, in tie-break order.
    pub const ALL: [EndpointKind; 8] = [
        EndpointKind::Interface,
        EndpointKind::ConsolePort,
        EndpointKind::ConsoleServerPort,
        EndpointKind::PowerPort,
        EndpointKind::PowerOutlet,
        EndpointKind::CircuitTermination,
        EndpointKind::FrontPort,
        EndpointKind::RearPort,
    ];

    pub fn role(self) -> TerminationRole {
        match self {
            EndpointKind::FrontPort | EndpointKind::RearPort => TerminationRole::PassThrough,
            _ => TerminationRole::Terminal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EndpointKind::Interface => "interface",
            EndpointKind::ConsolePort => "console-port",
            EndpointKind::ConsoleServerPort => "console-server-port",
            EndpointKind::PowerPort => "power-port",
            EndpointKind::PowerOutlet => "power-outlet",
            EndpointKind::CircuitTermination => "circuit-termination",
            EndpointKind::FrontPort => "front-port",
            EndpointKind::RearPort => "rear-port",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointKind {
    type Err = ParseEndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EndpointKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseEndpointError::Kind(s.to_string()))
    }
}

/// Stable reference to a terminable object: `(kind, id)`.
///
/// Identity is immutable; endpoints are created and destroyed by the owning
/// CRUD layer, never by the tracer. `Ord` (kind order, then id) gives stable
/// output ordering across retraces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct Endpoint {
    pub kind: EndpointKind,
    pub id: u64,
}

impl Endpoint {
    pub fn new(kind: EndpointKind, id: u64) -> Self {
        Self { kind, id }
    }

    pub fn role(self) -> TerminationRole {
        self.kind.role()
    }

    pub fn is_pass_through(self) -> bool {
        self.role() == TerminationRole::PassThrough
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Failure parsing a `"kind:id"` endpoint string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseEndpointError {
    #[error("expected `kind:id`, got {0:?}")]
    Format(String),
    #[error("unknown endpoint kind {0:?}")]
    Kind(String),
    #[error("invalid endpoint id {0:?}")]
    Id(String),
}

impl FromStr for Endpoint {
    type Err = ParseEndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| ParseEndpointError::Format(s.to_string()))?;
        let kind = kind.parse()?;
        let id = id
            .parse()
            .map_err(|_| ParseEndpointError::Id(id.to_string()))?;
        Ok(Endpoint::new(kind, id))
    }
}

impl From<Endpoint> for String {
    fn from(e: Endpoint) -> String {
        e.to_string()
    }
}

impl TryFrom<String> for Endpoint {
    type Error = ParseEndpointError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ============================================================================
// Cables
// ============================================================================

/// Lifecycle status of a cable.
///
/// Only `Connected` cables propagate signal in active-path mode; in the
/// default physical-path mode every status is traversable but a branch
/// crossing a non-connected cable is marked inactive.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CableStatus {
    #[default]
    Connected,
    Planned,
    Decommissioning,
}

impl CableStatus {
    pub fn is_connected(self) -> bool {
        self == CableStatus::Connected
    }
}

impl fmt::Display for CableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CableStatus::Connected => "connected",
            CableStatus::Planned => "planned",
            CableStatus::Decommissioning => "decommissioning",
        };
        f.write_str(s)
    }
}

/// A cable connecting exactly two endpoints, undirected for traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cable {
    pub id: u64,
    pub a: Endpoint,
    pub b: Endpoint,
    #[serde(default)]
    pub status: CableStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Cable {
    pub fn endpoints(&self) -> [Endpoint; 2] {
        [self.a, self.b]
    }
}

// ============================================================================
// Pass-throughs
// ============================================================================

/// Front-to-rear patch panel mapping.
///
/// A front port maps to exactly one rear port at a 1-based `position`; a rear
/// port may host many front ports (fan-out), one per position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassThroughPair {
    pub front: Endpoint,
    pub rear: Endpoint,
    pub position: u32,
}

// ============================================================================
// Record set
// ============================================================================

/// The complete raw record set a [`TopologySnapshot`] is built from.
///
/// This is the hand-off format from the CRUD layer (or a topology file):
/// every endpoint referenced by a cable or pass-through pair must also be
/// declared in `endpoints`.
///
/// [`TopologySnapshot`]: crate::topology::snapshot::TopologySnapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyRecords {
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub cables: Vec<Cable>,
    #[serde(default)]
    pub pass_throughs: Vec<PassThroughPair>,
}

// ============================================================================
// Tests
// ============================================================================
