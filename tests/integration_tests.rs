//! Integration tests for cablepath
//!
//! Drive the public API end-to-end through the file-backed store: write a
//! topology file, build the engine, retrace, then rewrite the file the way a
//! CRUD layer would mutate its records and fire the hooks.

use cablepath::{
    Cable, CablePathEngine, CableStatus, Endpoint, EndpointKind, FileTopologyStore, PathEngine,
    TraceConfig, TraceMode,
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const FANOUT_TOPOLOGY: &str = r#"
endpoints:
  - interface:1
  - interface:2
  - rear-port:10
  - front-port:11
  - front-port:12
cables:
  - { id: 1, a: "interface:1", b: "rear-port:10" }
  - { id: 2, a: "front-port:11", b: "interface:2" }
pass_throughs:
  - { front: "front-port:11", rear: "rear-port:10", position: 1 }
  - { front: "front-port:12", rear: "rear-port:10", position: 2 }
"#;

/// Topology with cable 1 deleted: interface:1 left dangling.
const FANOUT_TOPOLOGY_CABLE_1_CUT: &str = r#"
endpoints:
  - interface:1
  - interface:2
  - rear-port:10
  - front-port:11
  - front-port:12
cables:
  - { id: 2, a: "front-port:11", b: "interface:2" }
pass_throughs:
  - { front: "front-port:11", rear: "rear-port:10", position: 1 }
  - { front: "front-port:12", rear: "rear-port:10", position: 2 }
"#;

fn endpoint(s: &str) -> Endpoint {
    s.parse().unwrap()
}

fn write_topology(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("topology.yaml");
    std::fs::write(&path, contents).unwrap();
    path
}

fn engine_for(path: &PathBuf) -> CablePathEngine {
    CablePathEngine::new(
        Arc::new(FileTopologyStore::new(path)),
        TraceConfig::default(),
    )
}

#[tokio::test]
async fn test_retrace_and_lookup_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_topology(&dir, FANOUT_TOPOLOGY);
    let engine = engine_for(&path);

    let report = engine.retrace_all(None).await.unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 1);
    assert!(report.failed.is_empty());

    let traced = engine.cached_path(endpoint("interface:1")).unwrap();
    assert!(traced.is_split);
    assert_eq!(traced.branches.len(), 2);
    assert_eq!(
        traced.destinations(),
        vec![endpoint("interface:2")]
    );

    // Branch 1: complete and active through the panel.
    let hops: Vec<String> = traced.branches[0]
        .nodes
        .iter()
        .map(|n| n.endpoint.to_string())
        .collect();
    assert_eq!(
        hops,
        vec!["interface:1", "rear-port:10", "front-port:11", "interface:2"]
    );
    assert!(traced.branches[0].is_active);

    // Branch 2: dangles at the unterminated front port.
    assert!(!traced.branches[1].is_complete());

    // The same cached path is visible from every node on it.
    for member in ["interface:2", "rear-port:10", "front-port:12"] {
        let hit = engine.cached_path(endpoint(member)).unwrap();
        assert!(Arc::ptr_eq(&traced, &hit));
    }
}

#[tokio::test]
async fn test_cable_deletion_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_topology(&dir, FANOUT_TOPOLOGY);
    let engine = engine_for(&path);
    engine.retrace_all(None).await.unwrap();

    // The CRUD layer deletes cable 1, commits the new record set, then fires
    // the hook with the removed cable.
    write_topology(&dir, FANOUT_TOPOLOGY_CABLE_1_CUT);
    let removed = Cable {
        id: 1,
        a: endpoint("interface:1"),
        b: endpoint("rear-port:10"),
        status: CableStatus::Connected,
        label: None,
    };
    let report = engine.on_cable_changed(&removed).await.unwrap();
    assert!(report.deleted >= 1);

    // interface:1 now has a fresh zero-cable path.
    let dangling = engine.cached_path(endpoint("interface:1")).unwrap();
    assert_eq!(dangling.branches.len(), 1);
    assert!(!dangling.branches[0].is_complete());
    assert_eq!(dangling.branches[0].nodes.len(), 1);

    // interface:2 no longer resolves to a path containing interface:1.
    let far = engine.cached_path(endpoint("interface:2")).unwrap();
    assert!(!far.members().contains(&endpoint("interface:1")));
}

#[tokio::test]
async fn test_active_mode_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let topology = r#"
endpoints: [ "interface:1", "interface:2" ]
cables:
  - { id: 1, a: "interface:1", b: "interface:2", status: planned }
"#;
    let path = write_topology(&dir, topology);
    let engine = CablePathEngine::new(
        Arc::new(FileTopologyStore::new(&path)),
        TraceConfig {
            mode: TraceMode::Active,
            ..TraceConfig::default()
        },
    );

    let traced = engine.trace_endpoint(endpoint("interface:1")).await.unwrap();
    assert!(traced.destinations().is_empty());
    assert!(!traced.is_active);
}

#[tokio::test]
async fn test_kind_filtered_retrace() {
    let dir = tempfile::tempdir().unwrap();
    let topology = r#"
endpoints: [ "interface:1", "interface:2", "power-port:5", "power-outlet:6" ]
cables:
  - { id: 1, a: "interface:1", b: "interface:2" }
  - { id: 2, a: "power-port:5", b: "power-outlet:6" }
"#;
    let path = write_topology(&dir, topology);
    let engine = engine_for(&path);

    engine
        .retrace_all(Some(vec![EndpointKind::PowerPort]))
        .await
        .unwrap();
    assert!(engine.cached_path(endpoint("power-port:5")).is_some());
    assert!(engine.cached_path(endpoint("interface:1")).is_none());
}

#[tokio::test]
async fn test_example_topology_file_traces() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("topology.example.yaml");
    let engine = engine_for(&path);

    let report = engine.retrace_all(None).await.unwrap();
    assert!(report.created >= 1);
    assert!(report.failed.is_empty());
}
