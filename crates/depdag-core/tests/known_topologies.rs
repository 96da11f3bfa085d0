//! Known-topology regression tests for the full analysis pipeline.
//!
//! Each test uses a hand-crafted graph with known components, condensation
//! edges and distances. Expected values are computed by hand and hardcoded.

use depdag_core::graph::{build_condensation, find_components, topological_order};
use depdag_core::paths::{Distance, shortest_from};
use depdag_core::{Analysis, Edge, Graph, GraphError, analyze};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_graph(n: usize, edges: &[(usize, usize, i64)]) -> Graph {
    Graph::new(
        n,
        edges.iter().map(|&(u, v, w)| Edge::new(u, v, w)).collect(),
    )
    .expect("test graph must be valid")
}

fn run(n: usize, edges: &[(usize, usize, i64)], source: usize) -> Analysis {
    analyze(&build_graph(n, edges), source).expect("analysis must succeed")
}

fn members(a: &Analysis) -> Vec<Vec<usize>> {
    let mut all: Vec<Vec<usize>> = a.components().iter().map(|c| c.members.clone()).collect();
    all.sort();
    all
}

// ---------------------------------------------------------------------------
// Cycle feeding a sink
// ---------------------------------------------------------------------------

#[test]
fn cycle_with_tail() {
    // 0 → 1 → 2 → 0 (w=1), 2 → 3 (w=5)
    let a = run(4, &[(0, 1, 1), (1, 2, 1), (2, 0, 1), (2, 3, 5)], 0);

    assert_eq!(members(&a), vec![vec![0, 1, 2], vec![3]]);

    let cycle = a.condensation.component_of(0).unwrap();
    let sink = a.condensation.component_of(3).unwrap();
    assert_eq!(a.condensation.edge_count(), 1);
    assert_eq!(a.condensation.edge_weight(cycle, sink), Some(5));

    let pos = a.order.positions();
    assert!(pos[cycle] < pos[sink], "cycle group precedes its sink");
    assert_eq!(a.expanded_order, vec![0, 1, 2, 3]);

    assert_eq!(a.source_component, cycle);
    assert_eq!(a.shortest.distance(cycle), Some(0));
    assert_eq!(a.shortest.distance(sink), Some(5));
    assert_eq!(
        a.longest.distance(sink),
        Some(5),
        "single path: longest = shortest"
    );

    let cp = a.critical_path.as_ref().unwrap();
    assert_eq!(cp.components, vec![cycle, sink]);
    assert_eq!(cp.nodes, vec![0, 1, 2, 3]);
    assert_eq!(cp.distance, 5);
}

// ---------------------------------------------------------------------------
// Disconnected
// ---------------------------------------------------------------------------

#[test]
fn disconnected_pair() {
    let a = run(2, &[], 0);

    assert_eq!(members(&a), vec![vec![0], vec![1]]);
    assert_eq!(a.condensation.edge_count(), 0);

    let other = a.condensation.component_of(1).unwrap();
    assert_eq!(a.shortest.distances()[other], Distance::Unreachable);
    assert_eq!(a.longest.distances()[other], Distance::Unreachable);
    assert!(a.shortest.path_to(other).unwrap().is_empty());
    assert!(a.longest.path_to(other).unwrap().is_empty());

    // Only the source is reachable; both selected paths end there.
    assert_eq!(a.shortest_path.as_ref().unwrap().target, a.source_component);
    assert_eq!(a.critical_path.as_ref().unwrap().distance, 0);
}

// ---------------------------------------------------------------------------
// Diamond
// ---------------------------------------------------------------------------

#[test]
fn diamond_shortest_and_longest_take_different_branches() {
    // 0 → 1 (2), 0 → 2 (3), 1 → 3 (4), 2 → 3 (1)
    // via 1: 2 + 4 = 6; via 2: 3 + 1 = 4
    let a = run(4, &[(0, 1, 2), (0, 2, 3), (1, 3, 4), (2, 3, 1)], 0);
    let c = |node| a.condensation.component_of(node).unwrap();

    assert_eq!(a.components().len(), 4, "all singleton components");

    assert_eq!(a.shortest.distance(c(3)), Some(4));
    assert_eq!(a.shortest.path_to(c(3)).unwrap(), vec![c(0), c(2), c(3)]);

    assert_eq!(a.longest.distance(c(3)), Some(6));
    assert_eq!(a.longest.path_to(c(3)).unwrap(), vec![c(0), c(1), c(3)]);

    let cp = a.critical_path.as_ref().unwrap();
    assert_eq!(cp.target, c(3));
    assert_eq!(cp.nodes, vec![0, 1, 3]);
}

// ---------------------------------------------------------------------------
// Multi-edges, self-loops, undirected input
// ---------------------------------------------------------------------------

#[test]
fn parallel_edges_collapse_to_minimum() {
    // Cycle {0,1}; cycle {2,3}; crossing edges with weights 8, 2, 6.
    let edges = [
        (0, 1, 1),
        (1, 0, 1),
        (2, 3, 1),
        (3, 2, 1),
        (0, 2, 8),
        (1, 3, 2),
        (1, 2, 6),
    ];
    let a = run(4, &edges, 0);
    let from = a.condensation.component_of(0).unwrap();
    let to = a.condensation.component_of(3).unwrap();
    assert_eq!(a.condensation.edge_weight(from, to), Some(2));
    assert_eq!(a.shortest.distance(to), Some(2));
    assert_eq!(
        a.longest.distance(to),
        Some(2),
        "collapsed edge used for longest too"
    );
}

#[test]
fn self_loops_do_not_create_condensation_edges() {
    let a = run(3, &[(0, 0, 3), (0, 1, 1), (1, 1, 9), (1, 2, 1)], 0);
    assert_eq!(a.components().len(), 3);
    assert_eq!(a.condensation.edge_count(), 2);
    let last = a.condensation.component_of(2).unwrap();
    assert_eq!(a.longest.distance(last), Some(2));
}

#[test]
fn symmetrized_undirected_graph_is_one_component_per_connected_part() {
    // Undirected 0 - 1 - 2 and 3 - 4, each edge materialized both ways.
    let undirected = [(0, 1, 1), (1, 2, 1), (3, 4, 1)];
    let edges: Vec<(usize, usize, i64)> = undirected
        .iter()
        .flat_map(|&(u, v, w)| [(u, v, w), (v, u, w)])
        .collect();
    let a = run(5, &edges, 0);

    assert_eq!(members(&a), vec![vec![0, 1, 2], vec![3, 4]]);
    assert_eq!(a.condensation.edge_count(), 0);
    assert_eq!(a.shortest.reachable_count(), 1);
}

// ---------------------------------------------------------------------------
// Source position
// ---------------------------------------------------------------------------

#[test]
fn source_mid_chain_leaves_upstream_unreachable() {
    // 0 → 1 → 2 → 3
    let a = run(4, &[(0, 1, 1), (1, 2, 10), (2, 3, 100)], 2);
    let c = |node| a.condensation.component_of(node).unwrap();

    assert!(!a.shortest.is_reachable(c(0)));
    assert!(!a.shortest.is_reachable(c(1)));
    assert_eq!(a.shortest.distance(c(3)), Some(100));
    assert_eq!(a.critical_path.as_ref().unwrap().nodes, vec![2, 3]);
}

#[test]
fn last_reachable_is_highest_component_id() {
    let a = run(4, &[(0, 1, 1), (0, 2, 1), (0, 3, 1)], 0);
    let expected = [1, 2, 3]
        .iter()
        .map(|&n| a.condensation.component_of(n).unwrap())
        .chain(std::iter::once(a.source_component))
        .max()
        .unwrap();
    assert_eq!(a.shortest_path.as_ref().unwrap().target, expected);
}

// ---------------------------------------------------------------------------
// Stage-by-stage use
// ---------------------------------------------------------------------------

#[test]
fn stages_compose_without_the_pipeline() {
    let g = build_graph(3, &[(0, 1, 4), (1, 2, 4), (2, 1, 4)]);
    let scc = find_components(&g);
    let condensation = build_condensation(&g, &scc.components);
    let topo = topological_order(&condensation).unwrap();
    let source = condensation.component_of(0).unwrap();
    let result = shortest_from(&condensation, source, &topo.order).unwrap();

    let cycle = condensation.component_of(2).unwrap();
    assert_eq!(result.distances.distance(cycle), Some(4));
    assert_eq!(scc.metrics.node_visits, 3);
    assert_eq!(scc.metrics.edge_explorations, 3);
    assert_eq!(topo.metrics.edge_removals, 1);
}

#[test]
fn invalid_edge_is_rejected_before_analysis() {
    let err = Graph::new(2, vec![Edge::new(0, 5, 1)]).unwrap_err();
    assert!(err.is_input_error());
    assert!(matches!(err, GraphError::NodeOutOfRange { to: 5, .. }));
}
