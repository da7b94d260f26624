//! # access-validator: reachability in numeric dependency graphs
//!
//! **`access-validator`** decides whether a vertex of a constrained dependency
//! graph can be made *accessible* by changing the numeric values of other
//! vertices. It models access-control graphs where reaching a resource
//! requires a chain of numeric conditions on intermediate attributes
//! (clearance levels, scores, thresholds).
//!
//! ## Model
//!
//! - Every vertex holds an `f64` value.
//! - Every edge `from -> to` is guarded by a [`Predicate`][crate::predicate::Predicate],
//!   a union of intervals over the value of `to`.
//! - A vertex is **accessible** when all its outgoing edges are satisfied.
//!   Only accessible vertices may change their value.
//!
//! The [`Solver`][crate::solver::Solver] searches for a sequence of value
//! changes after which the target vertex is accessible. Each vertex only takes
//! values from its precomputed [value classes][crate::classes::ValueClass],
//! one witness per maximal combination of incoming edges it can satisfy.
//!
//! ## Basic Usage
//!
//! ```rust
//! use access_validator::graph::{EdgeSpec, Graph};
//! use access_validator::interval::{Border, Interval};
//! use access_validator::predicate::Predicate;
//! use access_validator::solver::solve;
//! use access_validator::types::VertexId;
//!
//! let inf = f64::INFINITY;
//! let predicates = vec![
//!     Predicate::new([Interval::closed(0.0, 1.0)]),
//!     Predicate::new([Interval::new(2.0, 3.0, Border::LeftClosed)]),
//!     Predicate::new([
//!         Interval::new(-inf, -4.0, Border::RightClosed),
//!         Interval::open(6.0, inf),
//!     ]),
//! ];
//! let edges = [EdgeSpec::new(0, 1, 0), EdgeSpec::new(0, 2, 1), EdgeSpec::new(1, 2, 2)];
//! let mut graph = Graph::build(&edges, [(0, 3.12), (1, 2.17), (2, 5.0)], predicates).unwrap();
//!
//! let target = VertexId::new(0);
//! assert!(!graph.is_accessible(target));
//! let trace = solve(&mut graph, target).unwrap();
//! assert!(graph.is_accessible(target));
//! for change in trace.changes() {
//!     println!("{}", change);
//! }
//! ```
//!
//! ## Core Components
//!
//! - **[`interval`]** and **[`predicate`]**: the interval algebra.
//! - **[`graph`]**: the dependency graph and incremental accessibility.
//! - **[`classes`]**: per-vertex value classes.
//! - **[`solver`]**: the backtracking search.

pub mod bitset;
pub mod classes;
pub mod error;
pub mod graph;
pub mod interval;
pub mod predicate;
pub mod solver;
pub mod types;

pub use error::{Error, Result};
