use thiserror::Error;

use crate::types::VertexId;

/// Errors reported by graph construction and value assignment.
///
/// Every error is raised before any state changes, so a failed call leaves
/// the graph exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A second edge with the same `(from, to)` pair was supplied.
    #[error("duplicate edge {from} -> {to}")]
    DuplicateEdge { from: VertexId, to: VertexId },

    /// A value was assigned to a vertex whose outgoing edges are not all satisfied.
    #[error("vertex {0} is not accessible")]
    Inaccessible(VertexId),

    #[error("unknown vertex {0}")]
    UnknownVertex(VertexId),

    #[error("predicate index {index} is out of range (table has {len} predicates)")]
    UnknownPredicate { index: usize, len: usize },

    /// Value classes are enumerated over all subsets of incoming edges.
    #[error("vertex {vertex} has {count} incoming edges, at most {max} are supported")]
    TooManyIncomingEdges {
        vertex: VertexId,
        count: usize,
        max: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
