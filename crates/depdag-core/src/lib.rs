#![forbid(unsafe_code)]
//! depdag-core library.
//!
//! Strongly connected components, condensation, topological ordering and
//! DAG distance analysis for weighted task dependency graphs.
//!
//! # Conventions
//!
//! - **Errors**: Fallible operations return [`GraphError`].
//! - **Logging**: Use `tracing` macros (`info!`, `debug!`, `error!`); stage
//!   metrics are returned as values, never accumulated in globals.

pub mod error;
pub mod graph;
pub mod paths;
pub mod pipeline;

pub use error::{ErrorCode, GraphError};
pub use graph::{ComponentId, Edge, Graph, NodeId};
pub use paths::{Distance, DistanceResult, Objective};
pub use pipeline::{Analysis, SelectedPath, StageMetrics, analyze};
