//! Validated in-memory task graph.
//!
//! # Edge Direction
//!
//! An edge `u → v` with weight `w` means "task `u` must precede task `v`",
//! costing `w`. Multiple edges between the same pair and self-loops are
//! permitted. The model is always directed: callers holding an undirected
//! graph materialize both directions as separate edges before construction.
//!
//! # Validation
//!
//! [`Graph::new`] rejects any edge whose endpoint lies outside `[0, n)`, so
//! every later stage may index node arrays without bounds checks failing.

#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::GraphError;

/// Node identifier: an integer in `[0, n)`.
pub type NodeId = usize;

/// A weighted directed edge of the original graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: i64,
}

impl Edge {
    #[must_use]
    pub const fn new(from: NodeId, to: NodeId, weight: i64) -> Self {
        Self { from, to, weight }
    }

    /// Return `true` if this edge starts and ends at the same node.
    #[must_use]
    pub const fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// A validated directed graph with an adjacency view.
///
/// The adjacency lists hold edge indices in insertion order, so traversal
/// order is a deterministic function of the edge sequence.
#[derive(Debug, Clone)]
pub struct Graph {
    node_count: usize,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<usize>>,
}

impl Graph {
    /// Build a graph over nodes `0..node_count` from `edges`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeOutOfRange`] for the first edge with an
    /// endpoint outside `[0, node_count)`.
    #[instrument(skip(edges), fields(edges = edges.len()))]
    pub fn new(node_count: usize, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let mut adjacency = vec![Vec::new(); node_count];

        for (idx, edge) in edges.iter().enumerate() {
            if edge.from >= node_count || edge.to >= node_count {
                return Err(GraphError::NodeOutOfRange {
                    edge: idx,
                    from: edge.from,
                    to: edge.to,
                    node_count,
                });
            }
            adjacency[edge.from].push(idx);
        }

        Ok(Self {
            node_count,
            edges,
            adjacency,
        })
    }

    /// Check that `node` is a valid source for path queries.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::SourceOutOfRange`] if `node >= node_count`.
    pub const fn check_source(&self, node: NodeId) -> Result<(), GraphError> {
        if node < self.node_count {
            Ok(())
        } else {
            Err(GraphError::SourceOutOfRange {
                node,
                node_count: self.node_count,
            })
        }
    }

    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges in their original order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Outgoing edges of `node`, in insertion order.
    ///
    /// Yields nothing for an out-of-range node.
    pub fn successors(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency
            .get(node)
            .into_iter()
            .flatten()
            .map(|&idx| &self.edges[idx])
    }

    /// Number of outgoing edges of `node` (parallel edges counted).
    #[must_use]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.adjacency.get(node).map_or(0, Vec::len)
    }

    /// The `i`-th outgoing edge of `node`, if any.
    ///
    /// Used by the iterative DFS to resume a node's edge scan.
    #[must_use]
    pub fn successor_at(&self, node: NodeId, i: usize) -> Option<&Edge> {
        self.adjacency
            .get(node)
            .and_then(|list| list.get(i))
            .map(|&idx| &self.edges[idx])
    }
}
