//! Dependency graph with incremental accessibility.
//!
//! Vertices carry a numeric value. A directed edge `from -> to` carries a
//! predicate over the value of `to`, and is *satisfied* when that value lies
//! in the predicate's truth set. A vertex is *accessible* when all of its
//! outgoing edges are satisfied, and only accessible vertices may change
//! their value.
//!
//! Vertices and edges live in arenas owned by the [`Graph`] and refer to each
//! other by index. Topology is fixed at construction; afterwards only vertex
//! values change, through [`Graph::set_value`].
//!
//! ```
//! use access_validator::graph::{EdgeSpec, Graph};
//! use access_validator::interval::Interval;
//! use access_validator::predicate::Predicate;
//! use access_validator::types::VertexId;
//!
//! let predicates = vec![Predicate::new([Interval::closed(0.0, 1.0)])];
//! let edges = [EdgeSpec::new(0, 1, 0)];
//! let mut graph = Graph::build(&edges, [(0, 0.0), (1, 5.0)], predicates).unwrap();
//!
//! let (v0, v1) = (VertexId::new(0), VertexId::new(1));
//! assert!(!graph.is_accessible(v0));
//! assert_eq!(graph.set_value(v1, 0.5).unwrap(), 5.0);
//! assert!(graph.is_accessible(v0));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::mem;

use log::{debug, trace};

use crate::bitset::BitSet;
use crate::classes::{compute_value_classes, ValueClass, MAX_INCOMING_EDGES};
use crate::error::{Error, Result};
use crate::predicate::Predicate;
use crate::types::{EdgeId, VertexId};

/// Construction input for one edge: `from -> to`, guarded by `predicates[predicate]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EdgeSpec {
    pub from: VertexId,
    pub to: VertexId,
    pub predicate: usize,
}

impl EdgeSpec {
    pub fn new(from: u32, to: u32, predicate: usize) -> Self {
        Self {
            from: VertexId::new(from),
            to: VertexId::new(to),
            predicate,
        }
    }
}

impl From<(u32, u32, usize)> for EdgeSpec {
    fn from((from, to, predicate): (u32, u32, usize)) -> Self {
        EdgeSpec::new(from, to, predicate)
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    from: VertexId,
    to: VertexId,
    /// Arena slot of `from`.
    source: usize,
    predicate: usize,
    satisfied: bool,
}

impl Edge {
    pub fn id(&self) -> EdgeId {
        self.id
    }
    pub fn from(&self) -> VertexId {
        self.from
    }
    pub fn to(&self) -> VertexId {
        self.to
    }
    /// Index into the graph's predicate table.
    pub fn predicate(&self) -> usize {
        self.predicate
    }
    /// Whether the predicate holds for the current value of `to`.
    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }
}

#[derive(Debug, Clone)]
pub struct Vertex {
    id: VertexId,
    value: f64,
    incoming: Vec<EdgeId>,
    outgoing: Vec<EdgeId>,
    accessible: bool,
    classes: Vec<ValueClass>,
}

impl Vertex {
    fn new(id: VertexId, value: f64) -> Self {
        Self {
            id,
            value,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            accessible: false,
            classes: Vec::new(),
        }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }
    pub fn value(&self) -> f64 {
        self.value
    }
    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }
    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }
    pub fn is_accessible(&self) -> bool {
        self.accessible
    }
    /// Value classes, in the order the solver tries them.
    pub fn classes(&self) -> &[ValueClass] {
        &self.classes
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} ({}), in: [",
            self.id,
            self.value,
            if self.accessible { "accessible" } else { "inaccessible" }
        )?;
        for (k, e) in self.incoming.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", e)?;
        }
        write!(f, "], out: [")?;
        for (k, e) in self.outgoing.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", e)?;
        }
        write!(f, "], {} classes", self.classes.len())
    }
}

pub struct Graph {
    vertices: Vec<Vertex>,
    slots: BTreeMap<VertexId, usize>,
    edges: Vec<Edge>,
    predicates: Vec<Predicate>,
    accessible: BTreeSet<VertexId>,
    /// Bit `i` is set iff edge `i` is satisfied.
    fingerprint: BitSet,
}

impl Graph {
    /// Builds a graph from an edge list, initial values and a predicate table.
    ///
    /// Vertices are created on first reference. A vertex with no entry in
    /// `values` starts at `0.0`; values for vertices that appear in no edge
    /// are ignored. Edges get sequence numbers in input order.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownPredicate`] if an edge refers past the predicate table
    /// - [`Error::DuplicateEdge`] if a `(from, to)` pair repeats, whatever the predicate
    /// - [`Error::TooManyIncomingEdges`] if a vertex has more than [`MAX_INCOMING_EDGES`]
    pub fn build(
        edges: &[EdgeSpec],
        values: impl IntoIterator<Item = (u32, f64)>,
        predicates: Vec<Predicate>,
    ) -> Result<Self> {
        let values: HashMap<VertexId, f64> = values.into_iter().map(|(v, x)| (VertexId::new(v), x)).collect();

        let mut graph = Graph {
            vertices: Vec::new(),
            slots: BTreeMap::new(),
            edges: Vec::with_capacity(edges.len()),
            predicates,
            accessible: BTreeSet::new(),
            fingerprint: BitSet::new(edges.len()),
        };

        for spec in edges {
            graph.add_edge(spec, &values)?;
        }

        for vertex in &graph.vertices {
            if vertex.incoming.len() > MAX_INCOMING_EDGES {
                return Err(Error::TooManyIncomingEdges {
                    vertex: vertex.id,
                    count: vertex.incoming.len(),
                    max: MAX_INCOMING_EDGES,
                });
            }
        }

        for slot in 0..graph.vertices.len() {
            let incoming: Vec<(EdgeId, &Predicate)> = graph.vertices[slot]
                .incoming
                .iter()
                .map(|&e| (e, &graph.predicates[graph.edges[e.index()].predicate]))
                .collect();
            let classes = compute_value_classes(&incoming);
            let accessible = graph.all_outgoing_satisfied(slot);

            let vertex = &mut graph.vertices[slot];
            debug!("{}: {} value classes", vertex.id, classes.len());
            vertex.classes = classes;
            vertex.accessible = accessible;
            if accessible {
                graph.accessible.insert(vertex.id);
            }
        }

        debug!(
            "Built graph with {} vertices and {} edges, accessible: {:?}",
            graph.vertices.len(),
            graph.edges.len(),
            graph.accessible
        );
        Ok(graph)
    }

    fn add_edge(&mut self, spec: &EdgeSpec, values: &HashMap<VertexId, f64>) -> Result<()> {
        if spec.predicate >= self.predicates.len() {
            return Err(Error::UnknownPredicate {
                index: spec.predicate,
                len: self.predicates.len(),
            });
        }

        let source = self.get_or_add_vertex(spec.from, values);
        let target = self.get_or_add_vertex(spec.to, values);

        let duplicate = self.vertices[source]
            .outgoing
            .iter()
            .any(|e| self.edges[e.index()].to == spec.to);
        if duplicate {
            return Err(Error::DuplicateEdge {
                from: spec.from,
                to: spec.to,
            });
        }

        let id = EdgeId::new(self.edges.len());
        let satisfied = self.predicates[spec.predicate].check(self.vertices[target].value);
        self.edges.push(Edge {
            id,
            from: spec.from,
            to: spec.to,
            source,
            predicate: spec.predicate,
            satisfied,
        });
        self.fingerprint.set(id.index(), satisfied);
        self.vertices[source].outgoing.push(id);
        self.vertices[target].incoming.push(id);
        Ok(())
    }

    fn get_or_add_vertex(&mut self, id: VertexId, values: &HashMap<VertexId, f64>) -> usize {
        if let Some(&slot) = self.slots.get(&id) {
            return slot;
        }
        let slot = self.vertices.len();
        let value = values.get(&id).copied().unwrap_or(0.0);
        self.vertices.push(Vertex::new(id, value));
        self.slots.insert(id, slot);
        slot
    }

    fn all_outgoing_satisfied(&self, slot: usize) -> bool {
        self.vertices[slot]
            .outgoing
            .iter()
            .all(|e| self.edges[e.index()].satisfied)
    }
}

impl Graph {
    /// Assigns `value` to an accessible vertex and returns the previous value.
    ///
    /// Every incoming edge of the vertex is re-checked, and the source of each
    /// such edge has its accessibility updated. Propagation stops there: the
    /// sources' own incoming edges are untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownVertex`] if the vertex does not exist
    /// - [`Error::Inaccessible`] if the vertex is not accessible; nothing changes
    pub fn set_value(&mut self, id: VertexId, value: f64) -> Result<f64> {
        let slot = self.slot(id).ok_or(Error::UnknownVertex(id))?;
        if !self.vertices[slot].accessible {
            return Err(Error::Inaccessible(id));
        }
        Ok(self.assign(slot, value))
    }

    /// Assigns a value without the accessibility check.
    ///
    /// Used to undo a change: the resulting state is a pure function of the
    /// vertex values, so undoing in reverse order restores it exactly.
    pub(crate) fn restore(&mut self, id: VertexId, value: f64) {
        if let Some(slot) = self.slot(id) {
            self.assign(slot, value);
        }
    }

    fn assign(&mut self, slot: usize, value: f64) -> f64 {
        let old = mem::replace(&mut self.vertices[slot].value, value);
        trace!("{}: {} -> {}", self.vertices[slot].id, old, value);

        for k in 0..self.vertices[slot].incoming.len() {
            let e = self.vertices[slot].incoming[k];
            let edge = &mut self.edges[e.index()];
            edge.satisfied = self.predicates[edge.predicate].check(value);
            let (source, satisfied) = (edge.source, edge.satisfied);
            self.fingerprint.set(e.index(), satisfied);

            let accessible = satisfied && self.all_outgoing_satisfied(source);
            self.set_accessible(source, accessible);
        }

        old
    }

    fn set_accessible(&mut self, slot: usize, accessible: bool) {
        let vertex = &mut self.vertices[slot];
        if vertex.accessible == accessible {
            return;
        }
        vertex.accessible = accessible;
        if accessible {
            self.accessible.insert(vertex.id);
        } else {
            self.accessible.remove(&vertex.id);
        }
    }
}

impl Graph {
    fn slot(&self, id: VertexId) -> Option<usize> {
        self.slots.get(&id).copied()
    }

    /// Currently accessible vertices, in ascending id order.
    pub fn accessible_vertices(&self) -> &BTreeSet<VertexId> {
        &self.accessible
    }

    pub fn is_accessible(&self, id: VertexId) -> bool {
        self.accessible.contains(&id)
    }

    /// Graph-wide satisfaction fingerprint: bit `i` is edge `i`'s satisfied flag.
    pub fn fingerprint(&self) -> &BitSet {
        &self.fingerprint
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.slot(id).map(|slot| &self.vertices[slot])
    }

    pub fn value(&self, id: VertexId) -> Option<f64> {
        self.vertex(id).map(|v| v.value)
    }

    /// All vertices, in ascending id order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.slots.values().map(move |&slot| &self.vertices[slot])
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("vertices", &self.vertices.len())
            .field("edges", &self.edges.len())
            .field("accessible", &self.accessible)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Graph with {} vertices, accessible: ", self.vertices.len())?;
        for (k, id) in self.accessible.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::interval::{Border, Interval};

    const INF: f64 = f64::INFINITY;

    fn v(id: u32) -> VertexId {
        VertexId::new(id)
    }

    fn reference_predicates() -> Vec<Predicate> {
        vec![
            Predicate::new([Interval::closed(0.0, 1.0)]),
            Predicate::new([Interval::new(2.0, 3.0, Border::LeftClosed)]),
            Predicate::new([
                Interval::new(-INF, -4.0, Border::RightClosed),
                Interval::open(6.0, INF),
            ]),
        ]
    }

    fn reference_graph() -> Graph {
        let edges = [EdgeSpec::new(0, 1, 0), EdgeSpec::new(0, 2, 1), EdgeSpec::new(1, 2, 2)];
        Graph::build(&edges, [(0, 3.12), (1, 2.17), (2, 5.0)], reference_predicates()).unwrap()
    }

    fn assert_accessibility_consistent(graph: &Graph) {
        for vertex in graph.vertices() {
            let expected = vertex.outgoing().iter().all(|&e| graph.edge(e).unwrap().is_satisfied());
            assert_eq!(vertex.is_accessible(), expected, "{}", vertex);
            assert_eq!(graph.is_accessible(vertex.id()), expected);
        }
        for edge in graph.edges() {
            assert_eq!(graph.fingerprint().contains(edge.id().index()), edge.is_satisfied());
        }
    }

    #[test]
    fn test_build_reference() {
        let graph = reference_graph();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.accessible_vertices().iter().map(|v| v.get()).collect::<Vec<_>>(), vec![2]);
        assert!(graph.fingerprint().is_empty());
        assert_accessibility_consistent(&graph);

        let v2 = graph.vertex(v(2)).unwrap();
        assert_eq!(v2.incoming(), &[EdgeId::new(1), EdgeId::new(2)]);
        assert!(v2.outgoing().is_empty());
        assert_eq!(v2.classes().len(), 2);
        assert_eq!(graph.vertex(v(0)).unwrap().classes().len(), 1);
    }

    #[test]
    fn test_duplicate_edge_rejected() {
        let edges = [EdgeSpec::new(0, 1, 0), EdgeSpec::new(0, 1, 1)];
        let err = Graph::build(&edges, [(0, 0.0), (1, 0.0)], reference_predicates()).unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateEdge {
                from: VertexId::new(0),
                to: VertexId::new(1)
            }
        );
    }

    #[test]
    fn test_reverse_edge_is_not_duplicate() {
        let edges = [EdgeSpec::new(0, 1, 0), EdgeSpec::new(1, 0, 0)];
        assert!(Graph::build(&edges, [(0, 0.0), (1, 0.0)], reference_predicates()).is_ok());
    }

    #[test]
    fn test_unknown_predicate() {
        let edges = [EdgeSpec::new(0, 1, 7)];
        let err = Graph::build(&edges, [(0, 0.0)], reference_predicates()).unwrap_err();
        assert_eq!(err, Error::UnknownPredicate { index: 7, len: 3 });
    }

    #[test]
    fn test_missing_value_defaults_to_zero() {
        let edges = [EdgeSpec::new(0, 1, 0)];
        let graph = Graph::build(&edges, [], reference_predicates()).unwrap();
        assert_eq!(graph.value(v(1)), Some(0.0));
        assert!(graph.is_accessible(v(0)));
    }

    #[test]
    fn test_too_many_incoming_edges() {
        let edges: Vec<_> = (1..=(MAX_INCOMING_EDGES as u32 + 1))
            .map(|from| EdgeSpec::new(from, 0, 0))
            .collect();
        let err = Graph::build(&edges, [], vec![Predicate::always()]).unwrap_err();
        assert!(matches!(err, Error::TooManyIncomingEdges { .. }));
    }

    #[test]
    fn test_set_value_inaccessible() {
        let mut graph = reference_graph();
        let err = graph.set_value(v(1), 0.5).unwrap_err();
        assert_eq!(err, Error::Inaccessible(VertexId::new(1)));
        assert_eq!(graph.value(v(1)), Some(2.17));
        assert_accessibility_consistent(&graph);
    }

    #[test]
    fn test_set_value_unknown_vertex() {
        let mut graph = reference_graph();
        assert_eq!(graph.set_value(v(9), 1.0), Err(Error::UnknownVertex(VertexId::new(9))));
    }

    #[test]
    fn test_set_value_propagates_one_hop() {
        let mut graph = reference_graph();

        let old = graph.set_value(v(2), -8.0).unwrap();
        assert_eq!(old, 5.0);
        assert!(graph.is_accessible(v(1)));
        assert!(!graph.is_accessible(v(0)));
        assert_eq!(graph.fingerprint().iter().collect::<Vec<_>>(), vec![2]);
        assert_accessibility_consistent(&graph);

        graph.set_value(v(1), 0.5).unwrap();
        assert!(!graph.is_accessible(v(0)));
        assert_eq!(graph.fingerprint().iter().collect::<Vec<_>>(), vec![0, 2]);

        graph.set_value(v(2), 2.5).unwrap();
        assert!(graph.is_accessible(v(0)));
        assert!(!graph.is_accessible(v(1)));
        assert_eq!(graph.fingerprint().iter().collect::<Vec<_>>(), vec![0, 1]);
        assert_accessibility_consistent(&graph);
    }

    #[test]
    fn test_edge_lookup() {
        let graph = reference_graph();
        let e2 = graph.edge(EdgeId::new(2)).unwrap();
        assert_eq!((e2.from(), e2.to()), (v(1), v(2)));
        assert_eq!(e2.predicate(), 2);
        assert!(!e2.is_satisfied());
        assert!(graph.edge(EdgeId::new(3)).is_none());
    }

    #[test]
    fn test_self_loop() {
        let predicates = vec![Predicate::new([Interval::closed(0.0, 1.0)])];
        let mut graph = Graph::build(&[EdgeSpec::new(0, 0, 0)], [(0, 0.5)], predicates).unwrap();
        assert!(graph.is_accessible(v(0)));
        graph.set_value(v(0), 2.0).unwrap();
        assert!(!graph.is_accessible(v(0)));
        assert_eq!(graph.set_value(v(0), 0.5), Err(Error::Inaccessible(VertexId::new(0))));

        graph.restore(VertexId::new(0), 0.5);
        assert!(graph.is_accessible(v(0)));
    }

    #[test]
    fn test_display() {
        let graph = reference_graph();
        assert_eq!(graph.to_string(), "Graph with 3 vertices, accessible: v2");
        let v0 = graph.vertex(v(0)).unwrap();
        assert_eq!(v0.to_string(), "v0 = 3.12 (inaccessible), in: [], out: [e0, e1], 1 classes");
    }
}
