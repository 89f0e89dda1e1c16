//! In-memory mock implementation of TopologyStore for testing.
//!
//! Holds a `TopologyRecords` behind a `tokio::sync::RwLock` and exposes the
//! mutation operations the CRUD layer would perform, so engine tests can
//! change the topology and then drive the mutation hooks.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::topology::models::{
    Cable, CableStatus, Endpoint, PassThroughPair, TopologyRecords,
};
use crate::topology::store::TopologyStore;

/// In-memory mock implementation of TopologyStore for testing.
pub struct MockTopologyStore {
    records: RwLock<TopologyRecords>,
}

impl MockTopologyStore {
    pub fn new() -> Self {
        Self::with_records(TopologyRecords::default())
    }

    pub fn with_records(records: TopologyRecords) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn add_endpoint(&self, endpoint: Endpoint) {
        let mut records = self.records.write().await;
        if !records.endpoints.contains(&endpoint) {
            records.endpoints.push(endpoint);
        }
    }

    /// Remove an endpoint and everything referencing it, as a CRUD cascade
    /// delete would.
    pub async fn remove_endpoint(&self, endpoint: Endpoint) {
        let mut records = self.records.write().await;
        records.endpoints.retain(|e| *e != endpoint);
        records
            .cables
            .retain(|c| c.a != endpoint && c.b != endpoint);
        records
            .pass_throughs
            .retain(|p| p.front != endpoint && p.rear != endpoint);
    }

    pub async fn add_cable(&self, cable: Cable) -> Cable {
        self.records.write().await.cables.push(cable.clone());
        cable
    }

    pub async fn remove_cable(&self, id: u64) -> Option<Cable> {
        let mut records = self.records.write().await;
        let pos = records.cables.iter().position(|c| c.id == id)?;
        Some(records.cables.remove(pos))
    }

    pub async fn set_cable_status(&self, id: u64, status: CableStatus) -> Option<Cable> {
        let mut records = self.records.write().await;
        let cable = records.cables.iter_mut().find(|c| c.id == id)?;
        cable.status = status;
        Some(cable.clone())
    }

    pub async fn add_pass_through(&self, pair: PassThroughPair) -> PassThroughPair {
        self.records.write().await.pass_throughs.push(pair);
        pair
    }

    pub async fn remove_pass_through(&self, front: Endpoint) -> Option<PassThroughPair> {
        let mut records = self.records.write().await;
        let pos = records.pass_throughs.iter().position(|p| p.front == front)?;
        Some(records.pass_throughs.remove(pos))
    }
}

impl Default for MockTopologyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TopologyStore for MockTopologyStore {
    async fn load_records(&self) -> Result<TopologyRecords> {
        Ok(self.records.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{cable, fanout_records, iface};

    #[tokio::test]
    async fn test_mutations_visible_on_next_load() {
        let store = MockTopologyStore::with_records(fanout_records());
        assert_eq!(store.load_records().await.unwrap().cables.len(), 2);

        let removed = store.remove_cable(1).await.unwrap();
        assert_eq!(removed.id, 1);
        assert_eq!(store.load_records().await.unwrap().cables.len(), 1);

        store.add_endpoint(iface(9)).await;
        store.add_cable(cable(9, iface(1), iface(9))).await;
        let records = store.load_records().await.unwrap();
        assert!(records.endpoints.contains(&iface(9)));
        assert_eq!(records.cables.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_endpoint_cascades() {
        let store = MockTopologyStore::with_records(fanout_records());
        store.remove_endpoint(iface(2)).await;

        let records = store.load_records().await.unwrap();
        assert!(!records.endpoints.contains(&iface(2)));
        // Cable 2 terminated on iface(2) and must be gone with it.
        assert!(records.cables.iter().all(|c| c.id != 2));
    }

    #[tokio::test]
    async fn test_set_cable_status() {
        let store = MockTopologyStore::with_records(fanout_records());
        let cable = store
            .set_cable_status(2, CableStatus::Planned)
            .await
            .unwrap();
        assert_eq!(cable.status, CableStatus::Planned);
        assert!(store.set_cable_status(99, CableStatus::Planned).await.is_none());
    }
}
