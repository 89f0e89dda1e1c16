//! The path walk.
//!
//! [`Tracer`] walks the topology snapshot from an origin endpoint until every
//! branch terminates:
//!
//! 1. Follow the cable attached to the current endpoint; no cable means the
//!    branch ends dangling.
//! 2. A far endpoint already seen by this branch aborts it with a loop marker
//!    (physical mis-wiring can create real loops).
//! 3. A terminal far endpoint completes the branch; it is active iff every
//!    cable crossed was connected.
//! 4. A front port jumps to its paired rear port; a rear port fans out to all
//!    of its front ports in ascending position order, spawning one branch per
//!    front port.
//!
//! Each branch carries its own visited set and hop counter, so fan-out
//! branches are independent and every branch is bounded by the configured
//! depth ceiling. The walk is a pure function over the snapshot: no I/O, no
//! shared state, deterministic output order.

use std::collections::HashSet;

use crate::error::TraceError;
use crate::topology::models::{Endpoint, EndpointKind, TerminationRole};
use crate::topology::snapshot::TopologySnapshot;
use crate::trace::models::{Branch, BranchOutcome, PathNode, TraceConfig, TraceMode, TracedPath};

/// Walks cable and pass-through links from an origin endpoint.
pub struct Tracer<'a> {
    snapshot: &'a TopologySnapshot,
    config: &'a TraceConfig,
}

/// Per-branch walk state. Cloned at fan-out points so sibling branches do not
/// share visited sets.
#[derive(Clone)]
struct Cursor {
    current: Endpoint,
    nodes: Vec<PathNode>,
    visited: HashSet<Endpoint>,
    all_connected: bool,
    hops: usize,
}

impl<'a> Tracer<'a> {
    pub fn new(snapshot: &'a TopologySnapshot, config: &'a TraceConfig) -> Self {
        Self { snapshot, config }
    }

    /// Trace the full path from `origin`.
    ///
    /// Fails only for an unregistered origin; loops and depth overruns are
    /// recorded as branch outcomes on the returned path instead.
    pub fn trace(&self, origin: Endpoint) -> Result<TracedPath, TraceError> {
        if !self.snapshot.contains(origin) {
            return Err(TraceError::UnknownEndpoint(origin));
        }

        let cursor = Cursor {
            current: origin,
            nodes: Vec::new(),
            visited: HashSet::from([origin]),
            all_connected: true,
            hops: 0,
        };
        let branches = self.walk(cursor);
        let is_split = branches.len() > 1;
        let is_active = !branches.is_empty()
            && branches.iter().all(|b| b.is_complete() && b.is_active);

        Ok(TracedPath {
            origin,
            branches,
            is_split,
            is_active,
        })
    }

    fn walk(&self, mut cur: Cursor) -> Vec<Branch> {
        loop {
            if cur.hops >= self.config.max_depth {
                cur.nodes.push(PathNode::end(cur.current));
                return vec![Branch::new(cur.nodes, BranchOutcome::DepthExceeded, false)];
            }

            let Some((run, far)) = self.snapshot.cable_at(cur.current) else {
                cur.nodes.push(PathNode::end(cur.current));
                return vec![Branch::new(cur.nodes, BranchOutcome::Dangling, false)];
            };

            // Active mode: a non-connected cable does not propagate signal.
            if self.config.mode == TraceMode::Active && !run.status.is_connected() {
                cur.nodes.push(PathNode::end(cur.current));
                return vec![Branch::new(cur.nodes, BranchOutcome::Dangling, false)];
            }

            cur.nodes.push(PathNode::via(cur.current, run.id));
            if !cur.visited.insert(far) {
                return vec![Branch::new(
                    cur.nodes,
                    BranchOutcome::LoopDetected { at: far },
                    false,
                )];
            }
            cur.all_connected &= run.status.is_connected();
            cur.hops += 1;

            match far.role() {
                TerminationRole::Terminal => {
                    cur.nodes.push(PathNode::end(far));
                    let active = cur.all_connected;
                    return vec![Branch::new(
                        cur.nodes,
                        BranchOutcome::Reached { destination: far },
                        active,
                    )];
                }
                TerminationRole::PassThrough if far.kind == EndpointKind::FrontPort => {
                    cur.nodes.push(PathNode::end(far));
                    match self.snapshot.rear_of(far) {
                        // Unpaired front port: nowhere to continue.
                        None => {
                            return vec![Branch::new(cur.nodes, BranchOutcome::Dangling, false)]
                        }
                        Some((rear, _position)) => {
                            if !cur.visited.insert(rear) {
                                return vec![Branch::new(
                                    cur.nodes,
                                    BranchOutcome::LoopDetected { at: rear },
                                    false,
                                )];
                            }
                            cur.current = rear;
                            cur.hops += 1;
                        }
                    }
                }
                TerminationRole::PassThrough => {
                    // Rear port: continue through its front ports, position ascending.
                    cur.nodes.push(PathNode::end(far));
                    let fronts = self.snapshot.fronts_of(far);
                    match fronts.as_slice() {
                        [] => {
                            return vec![Branch::new(cur.nodes, BranchOutcome::Dangling, false)]
                        }
                        [(_position, front)] => {
                            if !cur.visited.insert(*front) {
                                return vec![Branch::new(
                                    cur.nodes,
                                    BranchOutcome::LoopDetected { at: *front },
                                    false,
                                )];
                            }
                            cur.current = *front;
                            cur.hops += 1;
                        }
                        _ => return self.fan_out(cur, &fronts),
                    }
                }
            }
        }
    }

    /// Spawn one branch per front port, preserving position order.
    fn fan_out(&self, cur: Cursor, fronts: &[(u32, Endpoint)]) -> Vec<Branch> {
        let mut branches = Vec::with_capacity(fronts.len());
        for &(_position, front) in fronts {
            let mut child = cur.clone();
            if !child.visited.insert(front) {
                branches.push(Branch::new(
                    child.nodes,
                    BranchOutcome::LoopDetected { at: front },
                    false,
                ));
                continue;
            }
            child.current = front;
            child.hops += 1;
            branches.extend(self.walk(child));
        }
        branches
    }
}

// ============================================================================
// Tests
// ============================================================================
