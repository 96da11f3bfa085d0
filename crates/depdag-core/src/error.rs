//! Error taxonomy for the analysis pipeline.
//!
//! Two classes of failure abort a run:
//!
//! - **Input errors** — a node id referenced by an edge or by the source lies
//!   outside `[0, n)`. Detected when the [`Graph`](crate::graph::Graph) is
//!   built, before any algorithm runs.
//! - **Invariant violations** — the condensation DAG could not be fully
//!   ordered. This is a defect in SCC or condensation logic, never a normal
//!   property of the input, and is reported distinctly.
//!
//! Unreachable components are *not* errors; they surface as
//! [`Distance::Unreachable`](crate::paths::Distance::Unreachable).

use std::fmt;

/// Errors produced by graph construction and the analysis stages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An edge endpoint is not a valid node id.
    #[error("edge #{edge} ({from} -> {to}) references a node outside [0, {node_count})")]
    NodeOutOfRange {
        edge: usize,
        from: usize,
        to: usize,
        node_count: usize,
    },

    /// The requested source node is not a valid node id.
    #[error("source node {node} is outside [0, {node_count})")]
    SourceOutOfRange { node: usize, node_count: usize },

    /// A component id handed to a later stage does not exist.
    #[error("component C{component} does not exist ({component_count} components)")]
    UnknownComponent {
        component: usize,
        component_count: usize,
    },

    /// Kahn's algorithm could not order every component of the condensation.
    #[error(
        "condensation is not acyclic: ordered {ordered} of {component_count} components"
    )]
    InvariantViolation {
        ordered: usize,
        component_count: usize,
    },

    /// A relaxation `dist[from] + w` does not fit in an `i64`.
    #[error("distance overflow relaxing C{from} -> C{to}")]
    DistanceOverflow { from: usize, to: usize },
}

impl GraphError {
    /// The stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NodeOutOfRange { .. } | Self::SourceOutOfRange { .. } => ErrorCode::InvalidInput,
            Self::UnknownComponent { .. } => ErrorCode::UnknownComponent,
            Self::DistanceOverflow { .. } => ErrorCode::DistanceOverflow,
            Self::InvariantViolation { .. } => ErrorCode::InvariantViolation,
        }
    }

    /// Return `true` when the failure is caused by the caller's input rather
    /// than by a defect in the pipeline.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NodeOutOfRange { .. } | Self::SourceOutOfRange { .. }
        )
    }
}

/// Machine-readable error codes for scripted consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidInput,
    UnknownComponent,
    DistanceOverflow,
    InvariantViolation,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidInput => "E1001",
            Self::UnknownComponent => "E2001",
            Self::DistanceOverflow => "E3001",
            Self::InvariantViolation => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidInput => "Invalid graph input",
            Self::UnknownComponent => "Unknown component",
            Self::DistanceOverflow => "Distance overflow",
            Self::InvariantViolation => "Internal invariant violated",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidInput => Some("Check that every node id and the source lie in [0, n)."),
            Self::UnknownComponent => None,
            Self::DistanceOverflow => {
                Some("Reduce edge weight magnitudes so path sums fit in 64 bits.")
            }
            Self::InvariantViolation => Some("This is a bug. Report it with the input graph."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
