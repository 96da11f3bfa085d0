//! Strongly connected components via an iterative Tarjan search.
//!
//! # Algorithm
//!
//! Tarjan's single-pass DFS assigns each node a discovery index and a
//! low-link: the smallest discovery index reachable from it through tree
//! edges plus at most one back-edge to a node still on the Tarjan stack.
//! When a node's low-link equals its own index it roots a finished
//! component, and the Tarjan stack is popped down to and including it.
//!
//! Node states move `unvisited → on stack → assigned`.
//!
//! # Iteration
//!
//! The DFS never recurses. An explicit call stack holds one [`Frame`] per
//! active node with the index of the next outgoing edge to examine, so deep
//! chains cost heap memory bounded by the node count instead of thread
//! stack.
//!
//! # Output Order
//!
//! Components are returned in completion order. For the condensation this is
//! a *reverse* topological order in practice, but callers must not rely on
//! it: ordering is the job of [`crate::graph::topo`].

#![allow(clippy::module_name_repetitions)]

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::graph::elapsed_ns;
use crate::graph::model::{Graph, NodeId};

const UNVISITED: usize = usize::MAX;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One strongly connected component of the original graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    /// Node ids in this component, sorted ascending.
    pub members: Vec<NodeId>,
}

impl Component {
    /// Return `true` if this component groups more than one node.
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        self.members.len() > 1
    }

    /// The smallest node id in the component.
    #[must_use]
    pub fn representative(&self) -> Option<NodeId> {
        self.members.first().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.members.binary_search(&node).is_ok()
    }
}

/// Work counters for one SCC search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SccMetrics {
    /// Nodes discovered (each node exactly once).
    pub node_visits: u64,
    /// Outgoing edges examined (each edge exactly once).
    pub edge_explorations: u64,
    /// Wall-clock time spent in the search.
    pub elapsed_ns: u64,
}

/// Components of a graph plus the metrics of the search that found them.
#[derive(Debug, Clone)]
pub struct SccResult {
    /// Components in completion order.
    pub components: Vec<Component>,
    pub metrics: SccMetrics,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// DFS activation record: a node and the position of its next edge.
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    next_edge: usize,
}

struct Tarjan<'g> {
    graph: &'g Graph,
    next_index: usize,
    disc: Vec<usize>,
    low: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<NodeId>,
    call_stack: Vec<Frame>,
    components: Vec<Component>,
    metrics: SccMetrics,
}

impl<'g> Tarjan<'g> {
    fn new(graph: &'g Graph) -> Self {
        let n = graph.node_count();
        Self {
            graph,
            next_index: 0,
            disc: vec![UNVISITED; n],
            low: vec![UNVISITED; n],
            on_stack: vec![false; n],
            stack: Vec::with_capacity(n),
            call_stack: Vec::with_capacity(n),
            components: Vec::new(),
            metrics: SccMetrics::default(),
        }
    }

    fn discover(&mut self, node: NodeId) {
        self.disc[node] = self.next_index;
        self.low[node] = self.next_index;
        self.next_index += 1;
        self.metrics.node_visits += 1;

        self.stack.push(node);
        self.on_stack[node] = true;
        self.call_stack.push(Frame { node, next_edge: 0 });
    }

    fn search_from(&mut self, root: NodeId) {
        self.discover(root);

        while let Some(frame) = self.call_stack.last_mut() {
            let u = frame.node;
            let next = self.graph.successor_at(u, frame.next_edge);

            if let Some(edge) = next {
                frame.next_edge += 1;
                self.metrics.edge_explorations += 1;

                let v = edge.to;
                if self.disc[v] == UNVISITED {
                    self.discover(v);
                } else if self.on_stack[v] {
                    self.low[u] = self.low[u].min(self.disc[v]);
                }
                continue;
            }

            // Every edge of `u` has been examined.
            self.call_stack.pop();
            if self.low[u] == self.disc[u] {
                self.close_component(u);
            }
            if let Some(parent) = self.call_stack.last() {
                let p = parent.node;
                self.low[p] = self.low[p].min(self.low[u]);
            }
        }
    }

    fn close_component(&mut self, root: NodeId) {
        let mut members = Vec::new();
        while let Some(w) = self.stack.pop() {
            self.on_stack[w] = false;
            members.push(w);
            if w == root {
                break;
            }
        }
        members.sort_unstable();
        self.components.push(Component { members });
    }
}

/// Find the strongly connected components of `graph`.
///
/// Every node appears in exactly one component; two nodes share a component
/// iff each reaches the other. Self-loops and parallel edges are harmless.
///
/// Roots are tried in ascending node order and edges in insertion order, so
/// the result is deterministic for a given graph.
#[must_use]
#[instrument(skip(graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn find_components(graph: &Graph) -> SccResult {
    let started = Instant::now();
    let mut tarjan = Tarjan::new(graph);

    for root in 0..graph.node_count() {
        if tarjan.disc[root] == UNVISITED {
            tarjan.search_from(root);
        }
    }

    let mut metrics = tarjan.metrics;
    metrics.elapsed_ns = elapsed_ns(started);

    debug!(
        components = tarjan.components.len(),
        node_visits = metrics.node_visits,
        edge_explorations = metrics.edge_explorations,
        elapsed_ns = metrics.elapsed_ns,
        "scc search finished"
    );

    SccResult {
        components: tarjan.components,
        metrics,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
