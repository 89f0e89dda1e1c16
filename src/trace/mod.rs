//! Path tracing: the walk algorithm and its result types.
//!
//! ## Modules
//!
//! - [`models`] — `TraceConfig`, `PathNode`, `Branch`, `TracedPath`
//! - [`tracer`] — `Tracer`, the pure walk over a topology snapshot

pub mod models;
pub mod tracer;

pub use models::{
    Branch, BranchOutcome, PathNode, TraceConfig, TraceMode, TracedPath, DEFAULT_MAX_DEPTH,
};
pub use tracer::Tracer;
