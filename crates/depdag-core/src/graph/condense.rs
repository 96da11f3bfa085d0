//! Condensation of the task graph into a DAG of components.
//!
//! # Overview
//!
//! Every strongly connected component becomes one node of the condensation.
//! Original edges are then mapped onto component pairs:
//!
//! - Edges whose endpoints share a component are dropped; they only matter
//!   inside a cycle group.
//! - Parallel edges between the same ordered component pair collapse into a
//!   single edge carrying the **minimum** weight seen.
//!
//! The result is acyclic by construction: a cycle between components would
//! make their members mutually reachable, contradicting maximality.
//!
//! # Determinism
//!
//! Each component's outgoing edges are sorted by target id. Together with
//! the ascending seeding in [`crate::graph::topo`], this fixes the order in
//! which Kahn's algorithm discovers components.

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeMap;

use petgraph::graph::DiGraph;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::GraphError;
use crate::graph::model::{Graph, NodeId};
use crate::graph::scc::Component;

/// Index of a component in the sequence produced by the SCC search.
pub type ComponentId = usize;

/// A collapsed edge between two distinct components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CondensedEdge {
    pub from: ComponentId,
    pub to: ComponentId,
    /// Minimum weight over all original edges crossing `from → to`.
    pub weight: i64,
}

/// The DAG of strongly connected components.
#[derive(Debug, Clone)]
pub struct CondensationGraph {
    components: Vec<Component>,
    node_to_component: Vec<ComponentId>,
    adjacency: Vec<Vec<CondensedEdge>>,
    edge_count: usize,
}

impl CondensationGraph {
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// All components, indexed by [`ComponentId`].
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    #[must_use]
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// The component containing original node `node`.
    #[must_use]
    pub fn component_of(&self, node: NodeId) -> Option<ComponentId> {
        self.node_to_component.get(node).copied()
    }

    /// Outgoing edges of component `id`, sorted by target.
    #[must_use]
    pub fn edges_from(&self, id: ComponentId) -> &[CondensedEdge] {
        self.adjacency
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterate over every condensation edge, grouped by source component.
    pub fn edges(&self) -> impl Iterator<Item = &CondensedEdge> + '_ {
        self.adjacency.iter().flatten()
    }

    /// Weight of the edge `from → to`, if the condensation has one.
    #[must_use]
    pub fn edge_weight(&self, from: ComponentId, to: ComponentId) -> Option<i64> {
        self.edges_from(from)
            .binary_search_by_key(&to, |e| e.to)
            .ok()
            .map(|i| self.adjacency[from][i].weight)
    }

    /// Check that `id` names a component.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownComponent`] otherwise.
    pub fn check_component(&self, id: ComponentId) -> Result<(), GraphError> {
        if id < self.components.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownComponent {
                component: id,
                component_count: self.components.len(),
            })
        }
    }

    /// Replace each component of `path` by its sorted members.
    #[must_use]
    pub fn expand_path(&self, path: &[ComponentId]) -> Vec<NodeId> {
        path.iter()
            .filter_map(|&c| self.components.get(c))
            .flat_map(|c| c.members.iter().copied())
            .collect()
    }

    /// Export as a petgraph [`DiGraph`].
    ///
    /// Node `i` of the result is component `i`; its weight is the component
    /// id. Edge weights are the collapsed minimum weights.
    #[must_use]
    pub fn to_digraph(&self) -> DiGraph<ComponentId, i64> {
        let mut g = DiGraph::with_capacity(self.components.len(), self.edge_count);
        let nodes: Vec<_> = (0..self.components.len()).map(|c| g.add_node(c)).collect();
        for e in self.edges() {
            g.add_edge(nodes[e.from], nodes[e.to], e.weight);
        }
        g
    }
}

/// Collapse `components` of `graph` into a [`CondensationGraph`].
///
/// `components` must partition the nodes of `graph` into its strongly
/// connected components, as returned by
/// [`find_components`](crate::graph::scc::find_components). Component ids are
/// positions in that slice.
#[must_use]
#[instrument(skip_all, fields(components = components.len(), edges = graph.edge_count()))]
pub fn build_condensation(graph: &Graph, components: &[Component]) -> CondensationGraph {
    let mut node_to_component = vec![0; graph.node_count()];
    for (id, component) in components.iter().enumerate() {
        for &node in &component.members {
            node_to_component[node] = id;
        }
    }

    // BTreeMap keeps (from, to) pairs sorted, so adjacency lists come out
    // ordered by target without a second sort.
    let mut min_weight: BTreeMap<(ComponentId, ComponentId), i64> = BTreeMap::new();
    let mut intra_dropped = 0_usize;

    for edge in graph.edges() {
        let cu = node_to_component[edge.from];
        let cv = node_to_component[edge.to];
        if cu == cv {
            intra_dropped += 1;
            continue;
        }
        min_weight
            .entry((cu, cv))
            .and_modify(|w| *w = (*w).min(edge.weight))
            .or_insert(edge.weight);
    }

    let mut adjacency: Vec<Vec<CondensedEdge>> = vec![Vec::new(); components.len()];
    for (&(from, to), &weight) in &min_weight {
        adjacency[from].push(CondensedEdge { from, to, weight });
    }

    debug!(
        condensed_edges = min_weight.len(),
        intra_dropped,
        merged = graph.edge_count() - intra_dropped - min_weight.len(),
        "condensation built"
    );

    CondensationGraph {
        components: components.to_vec(),
        node_to_component,
        adjacency,
        edge_count: min_weight.len(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
