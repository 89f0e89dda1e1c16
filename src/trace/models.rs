//! Traced path data models.
//!
//! ## Configuration
//! - [`TraceMode`] / [`TraceConfig`] — physical vs active propagation, depth ceiling
//!
//! ## Results
//! - [`PathNode`] — one step: an endpoint plus the cable used to reach the next node
//! - [`BranchOutcome`] — how a branch ended (reached, dangling, loop, depth)
//! - [`Branch`] — one ordered node sequence from origin to a branch end
//! - [`TracedPath`] — the full result of tracing one origin
//!
//! All result types derive `Eq`: tracing the same static topology twice must
//! yield structurally identical paths, and tests assert exactly that.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::topology::models::Endpoint;

// ============================================================================
// Configuration
// ============================================================================

/// Default ceiling on hops (cable hops plus panel jumps) per branch.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// How cable status affects propagation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    /// Traverse every cable regardless of status; a branch crossing a
    /// non-connected cable is marked inactive. Shows the physical path.
    #[default]
    Physical,
    /// Only connected cables propagate; a branch stops in front of a
    /// planned or decommissioning cable. Shows the active path.
    Active,
}

impl FromStr for TraceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "physical" => Ok(TraceMode::Physical),
            "active" => Ok(TraceMode::Active),
            other => Err(format!(
                "unknown trace mode {other:?} (expected \"physical\" or \"active\")"
            )),
        }
    }
}

/// Tuning parameters for the path tracer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Maximum hops per branch before the trace is cut off.
    pub max_depth: usize,
    /// Physical-path or active-path propagation.
    pub mode: TraceMode,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            mode: TraceMode::default(),
        }
    }
}

// ============================================================================
// Path structure
// ============================================================================

/// One step in a traced path.
///
/// `cable` is the cable used to reach the *next* node; `None` for
/// pass-through jumps inside a patch panel and for the last node of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathNode {
    pub endpoint: Endpoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cable: Option<u64>,
}

impl PathNode {
    /// A node leaving over a cable.
    pub fn via(endpoint: Endpoint, cable: u64) -> Self {
        Self {
            endpoint,
            cable: Some(cable),
        }
    }

    /// A node with no outgoing cable: a pass-through jump or a branch end.
    pub fn end(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            cable: None,
        }
    }
}

/// How a branch terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchOutcome {
    /// Ended at a terminal endpoint.
    Reached { destination: Endpoint },
    /// Ended at an endpoint with no outgoing cable (or, in active mode, in
    /// front of a non-connected cable).
    Dangling,
    /// Aborted: the next endpoint was already part of this branch.
    LoopDetected { at: Endpoint },
    /// Aborted: the depth ceiling was hit.
    DepthExceeded,
}

/// One ordered node sequence produced by a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub nodes: Vec<PathNode>,
    pub outcome: BranchOutcome,
    /// True iff the branch reached a destination over connected cables only.
    pub is_active: bool,
}

impl Branch {
    pub fn new(nodes: Vec<PathNode>, outcome: BranchOutcome, is_active: bool) -> Self {
        Self {
            nodes,
            outcome,
            is_active,
        }
    }

    pub fn destination(&self) -> Option<Endpoint> {
        match self.outcome {
            BranchOutcome::Reached { destination } => Some(destination),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.destination().is_some()
    }
}

/// The cached result of tracing from one origin endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracedPath {
    pub origin: Endpoint,
    /// Branches in fan-out position order; a single branch when no fan-out
    /// occurred, and a single zero-cable branch when the origin is dangling.
    pub branches: Vec<Branch>,
    /// True iff tracing produced more than one branch.
    pub is_split: bool,
    /// True iff every branch reached a destination over connected cables.
    pub is_active: bool,
}

impl TracedPath {
    /// Destinations in branch order, deduplicated.
    pub fn destinations(&self) -> Vec<Endpoint> {
        let mut seen = BTreeSet::new();
        self.branches
            .iter()
            .filter_map(Branch::destination)
            .filter(|d| seen.insert(*d))
            .collect()
    }

    /// Every endpoint appearing in any branch, origin included.
    ///
    /// This is the key set under which the path is indexed in the cache, so
    /// a lookup from any node of the path resolves to it.
    pub fn members(&self) -> BTreeSet<Endpoint> {
        self.branches
            .iter()
            .flat_map(|b| b.nodes.iter().map(|n| n.endpoint))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        !self.branches.is_empty() && self.branches.iter().all(Branch::is_complete)
    }

    pub fn has_loop(&self) -> bool {
        self.loop_at().is_some()
    }

    /// The first endpoint a wiring loop closed on, if any branch looped.
    pub fn loop_at(&self) -> Option<Endpoint> {
        self.branches.iter().find_map(|b| match b.outcome {
            BranchOutcome::LoopDetected { at } => Some(at),
            _ => None,
        })
    }

    pub fn exceeded_depth(&self) -> bool {
        self.branches
            .iter()
            .any(|b| b.outcome == BranchOutcome::DepthExceeded)
    }
}

// ============================================================================
// Tests
// ============================================================================
