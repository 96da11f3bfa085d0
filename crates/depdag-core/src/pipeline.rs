//! The single computation entry point: graph in, structured analysis out.
//!
//! ```text
//! Graph ─► SCCs ─► condensation ─► topological order ─► shortest / longest
//! ```
//!
//! [`analyze`] is pure and deterministic. It neither parses nor prints;
//! presentation belongs to the caller.

#![allow(clippy::module_name_repetitions)]

use serde::Serialize;
use tracing::{info, instrument};

use crate::error::GraphError;
use crate::graph::{
    Component, ComponentId, CondensationGraph, Graph, NodeId, SccMetrics, TopoMetrics, TopoOrder,
    build_condensation, find_components, topological_order,
};
use crate::paths::{DistanceResult, PathMetrics, longest_from, shortest_from};

/// One reconstructed optimal path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedPath {
    /// Component the path ends at.
    pub target: ComponentId,
    /// Total edge weight of the path.
    pub distance: i64,
    /// Components from the source to `target`.
    pub components: Vec<ComponentId>,
    /// The same path with every component expanded to its sorted members.
    pub nodes: Vec<NodeId>,
}

/// Metrics of every stage of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageMetrics {
    pub scc: SccMetrics,
    pub topo: TopoMetrics,
    pub shortest: PathMetrics,
    pub longest: PathMetrics,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub source: NodeId,
    pub source_component: ComponentId,
    pub condensation: CondensationGraph,
    pub order: TopoOrder,
    /// Original nodes, components in topological order, members ascending.
    pub expanded_order: Vec<NodeId>,
    pub shortest: DistanceResult,
    /// Shortest path to the highest-numbered reachable component.
    pub shortest_path: Option<SelectedPath>,
    pub longest: DistanceResult,
    /// Longest path to the component with the maximum longest distance.
    pub critical_path: Option<SelectedPath>,
    pub metrics: StageMetrics,
}

impl Analysis {
    /// Components in discovery order, indexed by [`ComponentId`].
    #[must_use]
    pub fn components(&self) -> &[Component] {
        self.condensation.components()
    }

    /// Reconstruct a path to any `target` under `result`'s objective.
    ///
    /// Returns `Ok(None)` when `target` is unreachable.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownComponent`] if `target` is out of range.
    pub fn select_path(
        &self,
        result: &DistanceResult,
        target: ComponentId,
    ) -> Result<Option<SelectedPath>, GraphError> {
        select(&self.condensation, result, target)
    }
}

fn select(
    condensation: &CondensationGraph,
    result: &DistanceResult,
    target: ComponentId,
) -> Result<Option<SelectedPath>, GraphError> {
    let components = result.path_to(target)?;
    let Some(distance) = result.distance(target) else {
        return Ok(None);
    };
    let nodes = condensation.expand_path(&components);
    Ok(Some(SelectedPath {
        target,
        distance,
        components,
        nodes,
    }))
}

/// Run the full analysis of `graph` from node `source`.
///
/// # Errors
///
/// - [`GraphError::SourceOutOfRange`] if `source` is not a node of `graph`.
/// - [`GraphError::InvariantViolation`] if the condensation cannot be
///   ordered.
/// - [`GraphError::DistanceOverflow`] if a path sum leaves the `i64` range.
///
/// No partial result is returned on error.
#[instrument(skip(graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn analyze(graph: &Graph, source: NodeId) -> Result<Analysis, GraphError> {
    graph.check_source(source)?;

    let scc = find_components(graph);
    let condensation = build_condensation(graph, &scc.components);
    let topo = topological_order(&condensation)?;

    let source_component = condensation
        .component_of(source)
        .ok_or(GraphError::SourceOutOfRange {
            node: source,
            node_count: graph.node_count(),
        })?;

    let shortest = shortest_from(&condensation, source_component, &topo.order)?;
    let longest = longest_from(&condensation, source_component, &topo.order)?;

    let shortest_path = match shortest.distances.last_reachable() {
        Some(target) => select(&condensation, &shortest.distances, target)?,
        None => None,
    };
    let critical_path = match longest.distances.farthest() {
        Some((target, _)) => select(&condensation, &longest.distances, target)?,
        None => None,
    };

    info!(
        components = condensation.component_count(),
        cycles = condensation
            .components()
            .iter()
            .filter(|c| c.is_cycle())
            .count(),
        condensed_edges = condensation.edge_count(),
        reachable = shortest.distances.reachable_count(),
        "analysis complete"
    );

    Ok(Analysis {
        source,
        source_component,
        expanded_order: topo.order.expand(&condensation),
        order: topo.order,
        condensation,
        shortest: shortest.distances,
        shortest_path,
        longest: longest.distances,
        critical_path,
        metrics: StageMetrics {
            scc: scc.metrics,
            topo: topo.metrics,
            shortest: shortest.metrics,
            longest: longest.metrics,
        },
    })
}
