//! Single-source shortest and longest distances over the condensation DAG.
//!
//! # Algorithm
//!
//! Both objectives share one dynamic program over a topological order:
//!
//! 1. `dist[source] = 0`; every other component starts unreached.
//! 2. Visit components in topological order. A component that is still
//!    unreached is skipped: all its predecessors are already final, so it
//!    can never be reached from the source.
//! 3. For each edge `u → v` with weight `w`, the candidate `dist[u] + w`
//!    replaces `dist[v]` only if it is *strictly* better (smaller for
//!    [`Objective::Shortest`], larger for [`Objective::Longest`]); `v`'s
//!    parent becomes `u`.
//!
//! Ties keep the first predecessor to reach the best value in processing
//! order. The longest-distance result is the critical path analysis: the
//! component with the maximum distance ends the critical path.
//!
//! # Unreached components
//!
//! Unreachability is an explicit [`Distance::Unreachable`] rather than a
//! numeric sentinel, and every sum is checked, so no weight magnitude can
//! wrap into a finite-looking value. Overflow aborts with
//! [`GraphError::DistanceOverflow`].

#![allow(clippy::module_name_repetitions)]

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::GraphError;
use crate::graph::condense::{ComponentId, CondensationGraph};
use crate::graph::elapsed_ns;
use crate::graph::topo::TopoOrder;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Which extreme the relaxation is driving towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    Shortest,
    Longest,
}

impl Objective {
    /// Return `true` if `candidate` strictly improves on `current`.
    #[must_use]
    pub const fn improves(self, candidate: i64, current: Distance) -> bool {
        match current {
            Distance::Unreachable => true,
            Distance::Finite(cur) => match self {
                Self::Shortest => candidate < cur,
                Self::Longest => candidate > cur,
            },
        }
    }
}

/// Distance of a component from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    Finite(i64),
    /// No path from the source.
    Unreachable,
}

impl Distance {
    #[must_use]
    pub const fn finite(self) -> Option<i64> {
        match self {
            Self::Finite(d) => Some(d),
            Self::Unreachable => None,
        }
    }

    #[must_use]
    pub const fn is_reachable(self) -> bool {
        matches!(self, Self::Finite(_))
    }
}

/// Distances and parent pointers for one `(source, objective)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistanceResult {
    pub objective: Objective,
    pub source: ComponentId,
    dist: Vec<Distance>,
    parent: Vec<Option<ComponentId>>,
}

/// Work counters for one solver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PathMetrics {
    /// Edges examined out of reached components.
    pub relax_attempts: u64,
    /// Relaxations that improved a distance.
    pub relax_successes: u64,
    pub elapsed_ns: u64,
}

#[derive(Debug, Clone)]
pub struct PathResult {
    pub distances: DistanceResult,
    pub metrics: PathMetrics,
}

impl DistanceResult {
    /// Per-component distances, indexed by component id.
    #[must_use]
    pub fn distances(&self) -> &[Distance] {
        &self.dist
    }

    /// Finite distance of `component`, or `None` if unreachable or unknown.
    #[must_use]
    pub fn distance(&self, component: ComponentId) -> Option<i64> {
        self.dist.get(component).and_then(|d| d.finite())
    }

    #[must_use]
    pub fn is_reachable(&self, component: ComponentId) -> bool {
        self.distance(component).is_some()
    }

    /// The predecessor of `component` on its optimal path.
    #[must_use]
    pub fn parent(&self, component: ComponentId) -> Option<ComponentId> {
        self.parent.get(component).copied().flatten()
    }

    /// Reconstruct one optimal path from the source to `target`.
    ///
    /// The path starts with the source and ends with `target`; its edge
    /// weights sum to `target`'s distance. An unreachable target yields an
    /// empty path.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownComponent`] if `target` is out of range.
    pub fn path_to(&self, target: ComponentId) -> Result<Vec<ComponentId>, GraphError> {
        let Some(&dist) = self.dist.get(target) else {
            return Err(GraphError::UnknownComponent {
                component: target,
                component_count: self.dist.len(),
            });
        };
        if !dist.is_reachable() {
            return Ok(Vec::new());
        }

        let mut path = vec![target];
        let mut current = target;
        while let Some(prev) = self.parent(current) {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        Ok(path)
    }

    /// The highest-numbered reachable component.
    ///
    /// The source itself is always reachable, so this is `None` only for an
    /// empty result.
    #[must_use]
    pub fn last_reachable(&self) -> Option<ComponentId> {
        self.dist.iter().rposition(|d| d.is_reachable())
    }

    /// The reachable component with the largest distance, lowest id on ties.
    #[must_use]
    pub fn farthest(&self) -> Option<(ComponentId, i64)> {
        self.dist
            .iter()
            .enumerate()
            .filter_map(|(c, d)| d.finite().map(|d| (c, d)))
            .fold(None, |best, (c, d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((c, d)),
            })
    }

    /// Number of components reachable from the source.
    #[must_use]
    pub fn reachable_count(&self) -> usize {
        self.dist.iter().filter(|d| d.is_reachable()).count()
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Compute `objective` distances from `source` over `condensation`.
///
/// `order` must be the topological order of this condensation.
///
/// # Errors
///
/// - [`GraphError::UnknownComponent`] if `source` is not a component.
/// - [`GraphError::InvariantViolation`] if `order` does not cover every
///   component.
/// - [`GraphError::DistanceOverflow`] if a path sum leaves the `i64` range.
#[instrument(skip(condensation, order), fields(components = condensation.component_count()))]
pub fn solve(
    condensation: &CondensationGraph,
    source: ComponentId,
    order: &TopoOrder,
    objective: Objective,
) -> Result<PathResult, GraphError> {
    let n = condensation.component_count();
    condensation.check_component(source)?;
    if order.len() != n {
        return Err(GraphError::InvariantViolation {
            ordered: order.len(),
            component_count: n,
        });
    }

    let started = Instant::now();
    let mut metrics = PathMetrics::default();
    let mut dist = vec![Distance::Unreachable; n];
    let mut parent: Vec<Option<ComponentId>> = vec![None; n];
    dist[source] = Distance::Finite(0);

    for u in order.iter() {
        let Distance::Finite(du) = dist[u] else {
            continue;
        };

        for edge in condensation.edges_from(u) {
            metrics.relax_attempts += 1;
            let candidate = du
                .checked_add(edge.weight)
                .ok_or(GraphError::DistanceOverflow {
                    from: u,
                    to: edge.to,
                })?;

            if objective.improves(candidate, dist[edge.to]) {
                dist[edge.to] = Distance::Finite(candidate);
                parent[edge.to] = Some(u);
                metrics.relax_successes += 1;
            }
        }
    }

    metrics.elapsed_ns = elapsed_ns(started);
    debug!(
        ?objective,
        relax_attempts = metrics.relax_attempts,
        relax_successes = metrics.relax_successes,
        elapsed_ns = metrics.elapsed_ns,
        "distances computed"
    );

    Ok(PathResult {
        distances: DistanceResult {
            objective,
            source,
            dist,
            parent,
        },
        metrics,
    })
}

/// Shortest distances from `source`. See [`solve`].
///
/// # Errors
///
/// As for [`solve`].
pub fn shortest_from(
    condensation: &CondensationGraph,
    source: ComponentId,
    order: &TopoOrder,
) -> Result<PathResult, GraphError> {
    solve(condensation, source, order, Objective::Shortest)
}

/// Longest (critical-path) distances from `source`. See [`solve`].
///
/// # Errors
///
/// As for [`solve`].
pub fn longest_from(
    condensation: &CondensationGraph,
    source: ComponentId,
    order: &TopoOrder,
) -> Result<PathResult, GraphError> {
    solve(condensation, source, order, Objective::Longest)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
