//! Dependency graph model and the structural stages of the analysis.
//!
//! # Pipeline
//!
//! ```text
//! edges + node count
//!        ↓  model::Graph::new()          (range validation)
//! Graph (directed, may contain cycles)
//!        ↓  scc::find_components()       (iterative Tarjan)
//! Vec<Component>
//!        ↓  condense::build_condensation()  (min-weight edge collapsing)
//! CondensationGraph (DAG of components)
//!        ↓  topo::topological_order()     (Kahn)
//! TopoOrder
//! ```
//!
//! Distances over the condensation live in [`crate::paths`]; the whole chain
//! is wired together by [`crate::pipeline::analyze`].

use std::time::Instant;

pub mod condense;
pub mod model;
pub mod scc;
pub mod topo;

// Re-export primary types at module level for convenience.
pub use condense::{ComponentId, CondensationGraph, CondensedEdge, build_condensation};
pub use model::{Edge, Graph, NodeId};
pub use scc::{Component, SccMetrics, SccResult, find_components};
pub use topo::{TopoMetrics, TopoOrder, TopoResult, topological_order};

/// Nanoseconds elapsed since `started`, saturating at `u64::MAX`.
pub(crate) fn elapsed_ns(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX)
}
