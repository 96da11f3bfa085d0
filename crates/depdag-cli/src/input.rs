//! Task file loading.
//!
//! A task file is a JSON object:
//!
//! ```json
//! {
//!   "directed": true,
//!   "n": 4,
//!   "edges": [{ "u": 0, "v": 1, "w": 3 }],
//!   "source": 0,
//!   "weight_model": "edge"
//! }
//! ```
//!
//! Undirected files are symmetrized here, before the core ever sees them:
//! every edge `(u, v, w)` becomes `(u, v, w)` followed by `(v, u, w)`.
//! A file without a `directed` key is undirected.

use std::path::Path;

use anyhow::{Context, Result, bail};
use depdag_core::{Edge, Graph, NodeId};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEdge {
    pub u: i64,
    pub v: i64,
    pub w: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFile {
    #[serde(default)]
    pub directed: bool,
    pub n: i64,
    #[serde(default)]
    pub edges: Vec<TaskEdge>,
    #[serde(default)]
    pub source: i64,
    #[serde(default)]
    pub weight_model: Option<String>,
}

/// A task file converted into the core model.
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    pub graph: Graph,
    pub source: NodeId,
    pub directed: bool,
    pub weight_model: Option<String>,
}

impl TaskFile {
    /// Parse a task file from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("task file is not valid JSON of the expected shape")
    }

    /// Materialize the edge list, symmetrizing undirected input.
    ///
    /// Fails on negative node ids. Ids beyond `n` are left for
    /// [`Graph::new`] to reject.
    pub fn materialize_edges(&self) -> Result<Vec<Edge>> {
        let per_edge = if self.directed { 1 } else { 2 };
        let mut edges = Vec::with_capacity(self.edges.len() * per_edge);
        for (idx, e) in self.edges.iter().enumerate() {
            let u = non_negative(e.u).with_context(|| format!("edge {idx}: bad endpoint u"))?;
            let v = non_negative(e.v).with_context(|| format!("edge {idx}: bad endpoint v"))?;
            edges.push(Edge::new(u, v, e.w));
            if !self.directed {
                edges.push(Edge::new(v, u, e.w));
            }
        }
        Ok(edges)
    }

    /// Build the validated core graph.
    ///
    /// `source_override` replaces the file's `source` when given.
    ///
    /// Range errors surface as [`depdag_core::GraphError`] inside the
    /// returned `anyhow::Error`, so callers can recover the error code.
    pub fn into_graph(self, source_override: Option<usize>) -> Result<LoadedGraph> {
        let n = non_negative(self.n).context("bad node count n")?;
        let source = match source_override {
            Some(s) => s,
            None => non_negative(self.source).context("bad source")?,
        };
        let edges = self.materialize_edges()?;
        debug!(
            n,
            input_edges = self.edges.len(),
            edges = edges.len(),
            directed = self.directed,
            "task file materialized"
        );

        let graph = Graph::new(n, edges)?;
        graph.check_source(source)?;

        Ok(LoadedGraph {
            graph,
            source,
            directed: self.directed,
            weight_model: self.weight_model,
        })
    }
}

/// Read and parse the task file at `path`.
pub fn load_task_file(path: &Path) -> Result<TaskFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    TaskFile::from_json(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn non_negative(value: i64) -> Result<usize> {
    if value < 0 {
        bail!("{value} is negative");
    }
    usize::try_from(value).with_context(|| format!("{value} does not fit in usize"))
}
