//! Backtracking search for a sequence of value changes.
//!
//! The search state is the graph's satisfaction fingerprint. Starting from
//! the current state, the solver repeatedly picks an accessible vertex and one
//! of its value classes whose resulting fingerprint has not been seen yet,
//! applies it, and descends. When a level runs out of candidates it
//! backtracks, undoing the change that led there. The search stops as soon as
//! the target vertex is accessible, or when every reachable fingerprint has
//! been visited.
//!
//! Recursion is replaced by an explicit stack of [`Frame`]s, one per applied
//! change (plus the root). Each frame owns its remaining candidates and the
//! cursor into the current candidate's classes.
//!
//! ```
//! use access_validator::graph::{EdgeSpec, Graph};
//! use access_validator::interval::Interval;
//! use access_validator::predicate::Predicate;
//! use access_validator::solver::solve;
//! use access_validator::types::VertexId;
//!
//! // 0 needs 1 in [0, 1]; 1 is free to change.
//! let predicates = vec![Predicate::new([Interval::closed(0.0, 1.0)])];
//! let mut graph = Graph::build(&[EdgeSpec::new(0, 1, 0)], [(0, 0.0), (1, 5.0)], predicates).unwrap();
//!
//! let trace = solve(&mut graph, VertexId::new(0)).unwrap();
//! assert_eq!(trace.len(), 1);
//! assert!(graph.is_accessible(VertexId::new(0)));
//! ```

use std::collections::{HashSet, VecDeque};
use std::fmt;

use log::{debug, trace};
use num_bigint::BigUint;

use crate::bitset::BitSet;
use crate::error::Result;
use crate::graph::Graph;
use crate::types::VertexId;

/// Which vertices may be changed again further down the same search path.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum VertexReuse {
    /// A vertex is excluded only right after its own change. Changing the same
    /// vertex twice in a row never reaches a state that one change could not.
    #[default]
    AfterOther,
    /// Every vertex changed on the current path is excluded.
    Never,
}

/// Search options.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Undo the change when backtracking, so the graph always matches the trace.
    pub restore_on_backtrack: bool,
    pub vertex_reuse: VertexReuse,
    /// Give up after this many applied changes.
    pub max_steps: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            restore_on_backtrack: true,
            vertex_reuse: VertexReuse::default(),
            max_steps: None,
        }
    }
}

/// One value change: `vertex` went from `old` to `new`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Change {
    pub vertex: VertexId,
    pub old: f64,
    pub new: f64,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ==> {}", self.vertex, self.old, self.new)
    }
}

/// Changes that made the target accessible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    /// In application order.
    changes: Vec<Change>,
}

impl Trace {
    /// Changes in application order.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Changes in reverse application order, last change first.
    pub fn reversed(&self) -> impl Iterator<Item = &Change> + '_ {
        self.changes.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Applies the changes in order through [`Graph::set_value`].
    ///
    /// Replaying on a graph in the state the search started from reproduces
    /// the state in which the target became accessible.
    pub fn replay(&self, graph: &mut Graph) -> Result<()> {
        for change in &self.changes {
            graph.set_value(change.vertex, change.new)?;
        }
        Ok(())
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, change) in self.changes.iter().enumerate() {
            if k > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", change)?;
        }
        Ok(())
    }
}

/// Counters for the last [`Solver::solve`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Changes applied (descents).
    pub expanded: usize,
    /// Frames popped after running out of candidates.
    pub backtracks: usize,
    /// Classes skipped because their fingerprint was already visited.
    pub pruned: usize,
    /// Distinct fingerprints visited.
    pub history: usize,
    /// Whether `max_steps` ended the search.
    pub step_limit_hit: bool,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expanded={} backtracks={} pruned={} history={}",
            self.expanded, self.backtracks, self.pruned, self.history
        )
    }
}

/// One level of the search.
#[derive(Debug)]
struct Frame {
    candidates: VecDeque<VertexId>,
    /// Next class to try for `candidates.front()`.
    cursor: usize,
}

impl Frame {
    fn new(candidates: VecDeque<VertexId>) -> Self {
        Self { candidates, cursor: 0 }
    }
}

#[derive(Debug, Default)]
pub struct Solver {
    config: SolverConfig,
    /// Fingerprints seen during the current run.
    history: HashSet<BitSet>,
    /// Changes on the current path, in application order.
    path: Vec<Change>,
    stats: SearchStats,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Upper bound on the number of distinct fingerprints: `2^edge_count`.
    ///
    /// No fingerprint is entered twice, so the search applies at most this
    /// many changes.
    pub fn state_space_bound(graph: &Graph) -> BigUint {
        BigUint::from(1u32) << graph.edge_count()
    }

    /// Searches for changes that make `target` accessible.
    ///
    /// Returns `None` if the reachable fingerprints are exhausted (or the
    /// step limit is hit) first. On success the graph is left in the state
    /// where `target` is accessible. With `restore_on_backtrack`, a failed
    /// search leaves the graph as it found it.
    pub fn solve(&mut self, graph: &mut Graph, target: VertexId) -> Option<Trace> {
        self.history.clear();
        self.path.clear();
        self.stats = SearchStats::default();

        debug!("Searching for access to {} in {}", target, graph);
        self.history.insert(graph.fingerprint().clone());

        let mut frames = vec![Frame::new(self.candidates(graph))];
        let result = loop {
            let Some(frame) = frames.last_mut() else {
                break None;
            };

            if graph.is_accessible(target) {
                break Some(Trace {
                    changes: self.path.clone(),
                });
            }

            if self.config.max_steps.is_some_and(|limit| self.stats.expanded >= limit) {
                self.stats.step_limit_hit = true;
                self.unwind(graph);
                break None;
            }

            match self.next_change(graph, frame) {
                Some(change) => {
                    trace!("Changed {}", change);
                    self.stats.expanded += 1;
                    self.history.insert(graph.fingerprint().clone());
                    self.path.push(change);
                    frames.push(Frame::new(self.candidates(graph)));
                }
                None => {
                    frames.pop();
                    self.backtrack(graph);
                }
            }
        };

        self.stats.history = self.history.len();
        match &result {
            Some(trace) => debug!("Access to {} after {} changes ({})", target, trace.len(), self.stats),
            None => debug!("No access to {} ({})", target, self.stats),
        }
        result
    }

    /// Accessible vertices allowed at the next level, in ascending id order.
    fn candidates(&self, graph: &Graph) -> VecDeque<VertexId> {
        let excluded: HashSet<VertexId> = match self.config.vertex_reuse {
            VertexReuse::AfterOther => self.path.last().map(|c| c.vertex).into_iter().collect(),
            VertexReuse::Never => self.path.iter().map(|c| c.vertex).collect(),
        };
        graph
            .accessible_vertices()
            .iter()
            .copied()
            .filter(|v| !excluded.contains(v))
            .collect()
    }

    /// Applies the next unexplored change of the frame, if any is left.
    fn next_change(&mut self, graph: &mut Graph, frame: &mut Frame) -> Option<Change> {
        while let Some(&vertex) = frame.candidates.front() {
            if let Some(value) = self.next_class(graph, vertex, &mut frame.cursor) {
                match graph.set_value(vertex, value) {
                    Ok(old) => {
                        return Some(Change {
                            vertex,
                            old,
                            new: value,
                        })
                    }
                    // Only reachable without restore_on_backtrack.
                    Err(err) => debug!("Skipping {}: {}", vertex, err),
                }
            }
            frame.candidates.pop_front();
            frame.cursor = 0;
        }
        None
    }

    /// Advances `cursor` to the next class of `vertex` leading to an unseen
    /// fingerprint and returns its value.
    fn next_class(&mut self, graph: &Graph, vertex: VertexId, cursor: &mut usize) -> Option<f64> {
        let classes = graph.vertex(vertex)?.classes();
        while let Some(class) = classes.get(*cursor) {
            *cursor += 1;
            let expected = class.expected_fingerprint(graph.fingerprint());
            if self.history.contains(&expected) {
                trace!("{} := {} leads to visited {}", vertex, class.value, expected);
                self.stats.pruned += 1;
                continue;
            }
            trace!("{} := {} leads to {}", vertex, class.value, expected);
            return Some(class.value);
        }
        None
    }

    fn backtrack(&mut self, graph: &mut Graph) {
        let Some(change) = self.path.pop() else {
            return;
        };
        self.stats.backtracks += 1;
        trace!("Backtracking over {}", change);
        if self.config.restore_on_backtrack {
            graph.restore(change.vertex, change.old);
        }
    }
}

impl Solver {
    /// Undoes every change on the current path.
    fn unwind(&mut self, graph: &mut Graph) {
        while let Some(change) = self.path.pop() {
            if self.config.restore_on_backtrack {
                graph.restore(change.vertex, change.old);
            }
        }
    }
}

/// Runs a [`Solver`] with the default configuration.
pub fn solve(graph: &mut Graph, target: VertexId) -> Option<Trace> {
    Solver::default().solve(graph, target)
}
