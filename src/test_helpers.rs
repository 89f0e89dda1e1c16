//! Test helper factories.
//!
//! Endpoint constructors and canned record sets shared across unit tests.
#![allow(dead_code)]

use crate::topology::models::{
    Cable, CableStatus, Endpoint, EndpointKind, PassThroughPair, TopologyRecords,
};

// ============================================================================
// Endpoint factories
// ============================================================================

pub fn iface(id: u64) -> Endpoint {
    Endpoint::new(EndpointKind::Interface, id)
}

pub fn front(id: u64) -> Endpoint {
    Endpoint::new(EndpointKind::FrontPort, id)
}

pub fn rear(id: u64) -> Endpoint {
    Endpoint::new(EndpointKind::RearPort, id)
}

pub fn power_port(id: u64) -> Endpoint {
    Endpoint::new(EndpointKind::PowerPort, id)
}

// ============================================================================
// Record factories
// ============================================================================

pub fn cable(id: u64, a: Endpoint, b: Endpoint) -> Cable {
    cable_with_status(id, a, b, CableStatus::Connected)
}

pub fn cable_with_status(id: u64, a: Endpoint, b: Endpoint, status: CableStatus) -> Cable {
    Cable {
        id,
        a,
        b,
        status,
        label: None,
    }
}

pub fn pair(front: Endpoint, rear: Endpoint, position: u32) -> PassThroughPair {
    PassThroughPair {
        front,
        rear,
        position,
    }
}

pub fn records(
    endpoints: &[Endpoint],
    cables: Vec<Cable>,
    pass_throughs: Vec<PassThroughPair>,
) -> TopologyRecords {
    TopologyRecords {
        endpoints: endpoints.to_vec(),
        cables,
        pass_throughs,
    }
}

// ============================================================================
// Canned topologies
// ============================================================================

/// The patch-panel fan-out scenario:
/// I1 —c1— R10 hosting F11 (pos 1) and F12 (pos 2); F11 —c2— I2; F12 unterminated.
pub fn fanout_records() -> TopologyRecords {
    records(
        &[iface(1), iface(2), rear(10), front(11), front(12)],
        vec![cable(1, iface(1), rear(10)), cable(2, front(11), iface(2))],
        vec![pair(front(11), rear(10), 1), pair(front(12), rear(10), 2)],
    )
}

/// A wiring loop: I1 feeds panel 1 (F11/F12 on R10); R10 trunks to R20, whose
/// front F21 is cabled back into F12 — the walk re-enters R10.
pub fn loop_records() -> TopologyRecords {
    records(
        &[
            iface(1),
            front(11),
            front(12),
            rear(10),
            front(21),
            rear(20),
        ],
        vec![
            cable(1, iface(1), front(11)),
            cable(2, rear(10), rear(20)),
            cable(3, front(21), front(12)),
        ],
        vec![
            pair(front(11), rear(10), 1),
            pair(front(12), rear(10), 2),
            pair(front(21), rear(20), 1),
        ],
    )
}
