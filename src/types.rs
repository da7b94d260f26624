//! Type-safe identifiers for vertices and edges.
//!
//! Vertices are named by the caller (any `u32`), edges are numbered densely
//! by the graph in insertion order. Keeping them apart prevents mixing an edge
//! sequence number (a fingerprint bit position) with a vertex identifier.
use std::fmt;

/// A vertex identifier, as supplied by the caller at construction time.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VertexId(u32);

impl VertexId {
    pub const fn new(id: u32) -> Self {
        VertexId(id)
    }

    /// Returns the raw identifier.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u32> for VertexId {
    fn from(id: u32) -> Self {
        VertexId(id)
    }
}

impl From<VertexId> for u32 {
    fn from(id: VertexId) -> Self {
        id.0
    }
}

/// An edge sequence number (0-indexed, dense).
///
/// The sequence number doubles as the bit position of the edge in every
/// graph-wide mask, including the satisfaction fingerprint.
///
/// # Invariants
///
/// - Edge ids are assigned in construction order: `0..edge_count`
/// - Edge ids never change after the graph is built
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EdgeId(usize);

impl EdgeId {
    pub const fn new(index: usize) -> Self {
        EdgeId(index)
    }

    /// Returns the raw index as a `usize`.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl From<EdgeId> for usize {
    fn from(id: EdgeId) -> Self {
        id.0
    }
}
