//! Value classes of a vertex.
//!
//! Changing a vertex value only affects its *incoming* edges: each of them is
//! satisfied or not depending on the new value. A [`ValueClass`] is one
//! achievable combination together with a witness value. Only maximal
//! combinations are kept, so the classes of a vertex form an antichain.

use std::fmt;

use log::trace;

use crate::bitset::BitSet;
use crate::predicate::Predicate;
use crate::types::EdgeId;

/// Maximum number of incoming edges per vertex.
///
/// Class computation enumerates every subset of the incoming edges.
pub const MAX_INCOMING_EDGES: usize = 24;

#[derive(Debug, Clone, PartialEq)]
pub struct ValueClass {
    /// Representative value.
    pub value: f64,
    /// Incoming edges satisfied when the vertex takes `value`.
    pub satisfied: BitSet,
    /// Incoming edges left unsatisfied: the complement of `satisfied` among incoming edges.
    pub unsatisfied: BitSet,
}

impl ValueClass {
    /// Fingerprint the graph would have after assigning `value`:
    /// `(current ∪ satisfied) \ unsatisfied`.
    pub fn expected_fingerprint(&self, current: &BitSet) -> BitSet {
        let mut result = current.clone();
        result.union_with(&self.satisfied);
        result.difference_with(&self.unsatisfied);
        result
    }

    fn is_covered_by(&self, others: &[ValueClass]) -> bool {
        others.iter().any(|c| self.satisfied.is_subset(&c.satisfied))
    }
}

impl fmt::Display for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sat={} unsat={}", self.value, self.satisfied, self.unsatisfied)
    }
}

/// Computes the value classes for a vertex with the given incoming edges.
///
/// Subsets of the incoming edges are visited in descending bitmask order, so
/// every superset is seen before its subsets. A subset whose predicates have a
/// common value becomes a class unless a recorded class already covers it.
///
/// A vertex without incoming edges gets a single class with empty masks.
///
/// The caller keeps `incoming` within [`MAX_INCOMING_EDGES`];
/// [`Graph::build`](crate::graph::Graph::build) rejects larger vertices first.
pub(crate) fn compute_value_classes(incoming: &[(EdgeId, &Predicate)]) -> Vec<ValueClass> {
    assert!(
        incoming.len() <= MAX_INCOMING_EDGES,
        "Too many incoming edges: {}",
        incoming.len()
    );

    if incoming.is_empty() {
        return vec![ValueClass {
            value: 0.0,
            satisfied: BitSet::empty(),
            unsatisfied: BitSet::empty(),
        }];
    }

    let all: BitSet = incoming.iter().map(|(e, _)| e.index()).collect();
    let mut classes: Vec<ValueClass> = Vec::new();

    for subset in (1..(1u64 << incoming.len())).rev() {
        let mut common = Predicate::always();
        let mut satisfied = BitSet::empty();
        for (k, (edge, predicate)) in incoming.iter().enumerate() {
            if subset & (1 << k) != 0 {
                satisfied.insert(edge.index());
                common = common.intersect(predicate);
                if common.is_empty() {
                    break;
                }
            }
        }
        if common.is_empty() {
            continue;
        }

        let mut unsatisfied = all.clone();
        unsatisfied.difference_with(&satisfied);
        let class = ValueClass {
            value: common.sample(),
            satisfied,
            unsatisfied,
        };
        if !class.is_covered_by(&classes) {
            trace!("new value class {} from {}", class, common);
            classes.push(class);
        }
    }

    classes
}
