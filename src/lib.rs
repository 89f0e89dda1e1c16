//! Cable path tracing engine.
//!
//! A source-of-truth engine for physical network connectivity: given
//! terminable endpoints (interfaces, console/power ports, circuit
//! terminations) connected by cables, and patch panels whose front ports
//! remap a signal onto rear ports, compute the end-to-end path from any
//! endpoint to the endpoint(s) it is ultimately wired to — across any number
//! of intermediate panels, fanning out where a rear port hosts several front
//! ports — and cache the result for O(1) lookup from any node on the path.
//!
//! ```text
//! CRUD layer / topology file ──► TopologyStore ──► TopologySnapshot
//!                                                        │
//!                                                     Tracer
//!                                                        │
//!                                                   TracedPath ──► PathCache
//!                                                        │
//!                                        CablePathEngine (coordinator)
//! ```
//!
//! The CRUD layer owning the raw records is out of scope; it calls
//! [`PathEngine::on_cable_changed`] / [`PathEngine::on_pass_through_changed`]
//! after committing a mutation, and reads cached paths back through
//! [`PathEngine::cached_path`].

pub mod cache;
pub mod engine;
pub mod error;
pub mod topology;
pub mod trace;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use cache::PathCache;
pub use engine::{CablePathEngine, OriginFailure, PathEngine, RetraceReport};
pub use topology::{
    Cable, CableStatus, Endpoint, EndpointKind, FileTopologyStore, PassThroughPair,
    TopologyRecords, TopologySnapshot, TopologyStore,
};
pub use trace::{TraceConfig, TraceMode, TracedPath, Tracer};

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub trace: TraceYamlConfig,
}

/// Trace configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TraceYamlConfig {
    pub max_depth: usize,
    pub mode: TraceMode,
}

impl Default for TraceYamlConfig {
    fn default() -> Self {
        let defaults = TraceConfig::default();
        Self {
            max_depth: defaults.max_depth,
            mode: defaults.mode,
        }
    }
}

// ============================================================================
// Runtime config (what the engine actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub trace: TraceConfig,
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let max_depth = match std::env::var("CABLEPATH_MAX_DEPTH") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("CABLEPATH_MAX_DEPTH must be an integer, got {raw:?}"))?,
            Err(_) => yaml.trace.max_depth,
        };
        anyhow::ensure!(max_depth >= 1, "trace max_depth must be at least 1");

        let mode = match std::env::var("CABLEPATH_TRACE_MODE") {
            Ok(raw) => raw.parse().map_err(|e| anyhow::anyhow!("{e}"))?,
            Err(_) => yaml.trace.mode,
        };

        Ok(Self {
            trace: TraceConfig { max_depth, mode },
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
