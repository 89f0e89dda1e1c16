//! Topology store seam.
//!
//! [`TopologyStore`] is the narrow interface to whatever owns the raw cable
//! and pass-through records — in production the CRUD layer, in tests an
//! in-memory mock, and for the CLI a YAML/JSON file. The engine pulls the
//! complete record set once per retrace and never queries mid-trace.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::topology::models::TopologyRecords;

/// Abstract source of raw topology records.
///
/// Consumers hold `Arc<dyn TopologyStore>` so the backing source can be
/// swapped without touching the engine.
#[async_trait]
pub trait TopologyStore: Send + Sync {
    /// Load the complete record set a snapshot is built from.
    async fn load_records(&self) -> Result<TopologyRecords>;
}

/// File-backed store: reads a YAML (or, by extension, JSON) topology file.
///
/// The file is re-read on every load, so rewriting it between retraces is the
/// file-world equivalent of a CRUD mutation.
pub struct FileTopologyStore {
    path: PathBuf,
}

impl FileTopologyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TopologyStore for FileTopologyStore {
    async fn load_records(&self) -> Result<TopologyRecords> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading topology file {}", self.path.display()))?;

        let is_json = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let records: TopologyRecords = if is_json {
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing {} as JSON", self.path.display()))?
        } else {
            serde_yaml::from_str(&raw)
                .with_context(|| format!("parsing {} as YAML", self.path.display()))?
        };

        tracing::debug!(
            path = %self.path.display(),
            endpoints = records.endpoints.len(),
            cables = records.cables.len(),
            pass_throughs = records.pass_throughs.len(),
            "Loaded topology records"
        );
        Ok(records)
    }
}

// ============================================================================
// Tests
// ============================================================================
