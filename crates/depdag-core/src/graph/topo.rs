//! Topological ordering of the condensation with Kahn's algorithm.
//!
//! # Determinism
//!
//! The queue is seeded with every zero in-degree component in ascending id
//! order. Successors are visited in ascending target order (see
//! [`CondensationGraph::edges_from`]), so components whose in-degree drops to
//! zero during one dequeue step are also enqueued in ascending order.
//!
//! # Invariant
//!
//! The condensation of any graph is acyclic. If Kahn's algorithm still
//! leaves components unordered, the SCC or condensation stage is broken and
//! [`GraphError::InvariantViolation`] is returned instead of a partial order.

#![allow(clippy::module_name_repetitions)]

use std::collections::VecDeque;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::error::GraphError;
use crate::graph::condense::{ComponentId, CondensationGraph, CondensedEdge};
use crate::graph::elapsed_ns;
use crate::graph::model::NodeId;

/// A linear order of every component consistent with all condensation edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TopoOrder(Vec<ComponentId>);

impl TopoOrder {
    #[must_use]
    pub fn as_slice(&self) -> &[ComponentId] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.0.iter().copied()
    }

    /// Position of each component in the order, indexed by component id.
    #[must_use]
    pub fn positions(&self) -> Vec<usize> {
        let mut pos = vec![0; self.0.len()];
        for (i, &c) in self.0.iter().enumerate() {
            if let Some(slot) = pos.get_mut(c) {
                *slot = i;
            }
        }
        pos
    }

    /// Original nodes in component order, members of each component ascending.
    #[must_use]
    pub fn expand(&self, condensation: &CondensationGraph) -> Vec<NodeId> {
        condensation.expand_path(&self.0)
    }
}

/// Work counters for one Kahn run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TopoMetrics {
    pub queue_pushes: u64,
    pub queue_pops: u64,
    /// In-degree decrements, one per condensation edge processed.
    pub edge_removals: u64,
    pub elapsed_ns: u64,
}

#[derive(Debug, Clone)]
pub struct TopoResult {
    pub order: TopoOrder,
    pub metrics: TopoMetrics,
}

/// Order the components of `condensation` topologically.
///
/// # Errors
///
/// Returns [`GraphError::InvariantViolation`] if some component could not be
/// ordered, which means the condensation contains a cycle.
#[instrument(skip_all, fields(components = condensation.component_count()))]
pub fn topological_order(condensation: &CondensationGraph) -> Result<TopoResult, GraphError> {
    let adjacency: Vec<&[CondensedEdge]> = (0..condensation.component_count())
        .map(|c| condensation.edges_from(c))
        .collect();
    kahn(&adjacency)
}

fn kahn(adjacency: &[&[CondensedEdge]]) -> Result<TopoResult, GraphError> {
    let started = Instant::now();
    let n = adjacency.len();
    let mut metrics = TopoMetrics::default();

    let mut in_degree = vec![0_usize; n];
    for edge in adjacency.iter().flat_map(|edges| edges.iter()) {
        in_degree[edge.to] += 1;
    }

    let mut queue: VecDeque<ComponentId> = VecDeque::with_capacity(n);
    for (c, _) in in_degree.iter().enumerate().filter(|(_, d)| **d == 0) {
        queue.push_back(c);
        metrics.queue_pushes += 1;
    }

    let mut order = Vec::with_capacity(n);
    while let Some(u) = queue.pop_front() {
        metrics.queue_pops += 1;
        order.push(u);

        for edge in adjacency[u] {
            metrics.edge_removals += 1;
            in_degree[edge.to] -= 1;
            if in_degree[edge.to] == 0 {
                queue.push_back(edge.to);
                metrics.queue_pushes += 1;
            }
        }
    }

    metrics.elapsed_ns = elapsed_ns(started);

    if order.len() != n {
        error!(
            ordered = order.len(),
            components = n,
            "condensation contains a cycle"
        );
        return Err(GraphError::InvariantViolation {
            ordered: order.len(),
            component_count: n,
        });
    }

    debug!(
        queue_pushes = metrics.queue_pushes,
        queue_pops = metrics.queue_pops,
        edge_removals = metrics.edge_removals,
        elapsed_ns = metrics.elapsed_ns,
        "topological order computed"
    );

    Ok(TopoResult {
        order: TopoOrder(order),
        metrics,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
