//! Predicates as unions of intervals.
//!
//! A [`Predicate`] is the truth set of a numeric condition: a value satisfies
//! the predicate iff it lies in one of its intervals. Intervals are kept
//! sorted by left bound and pairwise disjoint, which is what makes the linear
//! [`intersect`] sweep correct.
//!
//! ```
//! use access_validator::interval::{Border, Interval};
//! use access_validator::predicate::{intersect, Predicate};
//!
//! let low = Predicate::new([Interval::closed(0.0, 10.0)]);
//! let mid = Predicate::new([Interval::new(5.0, 20.0, Border::LeftClosed)]);
//! let both = intersect(&low, &mid);
//! assert!(both.check(5.0));
//! assert!(!both.check(4.0));
//! assert!(both.check(both.sample()));
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::interval::Interval;

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    intervals: Vec<Interval>,
}

impl Predicate {
    /// Builds a predicate from intervals given in any order, possibly overlapping.
    ///
    /// Empty intervals are dropped; overlapping or touching intervals are merged.
    pub fn new(intervals: impl IntoIterator<Item = Interval>) -> Self {
        Self {
            intervals: normalize(intervals.into_iter().collect()),
        }
    }

    /// The predicate that holds everywhere: `(-inf, +inf)`.
    pub fn always() -> Self {
        Self {
            intervals: vec![Interval::full()],
        }
    }

    /// The predicate that never holds.
    pub fn never() -> Self {
        Self { intervals: Vec::new() }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Returns true if the predicate holds for no value.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Returns true if `x` satisfies the predicate.
    pub fn check(&self, x: f64) -> bool {
        self.intervals.iter().any(|i| i.contains(x))
    }

    /// Returns a value satisfying the predicate, taken from its first interval.
    ///
    /// An empty predicate has no witness; `0.0` is returned and must not be trusted.
    pub fn sample(&self) -> f64 {
        match self.intervals.first() {
            Some(first) => first.sample(),
            None => 0.0,
        }
    }

    pub fn intersect(&self, other: &Predicate) -> Predicate {
        intersect(self, other)
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Self::always()
    }
}

impl FromIterator<Interval> for Predicate {
    fn from_iter<T: IntoIterator<Item = Interval>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.intervals.is_empty() {
            return write!(f, "∅");
        }
        for (k, interval) in self.intervals.iter().enumerate() {
            if k > 0 {
                write!(f, " ∪ ")?;
            }
            write!(f, "{}", interval)?;
        }
        Ok(())
    }
}

/// Intersection of two predicates.
///
/// Merge-style sweep over both interval lists: every overlapping pair yields
/// its common part, then the interval whose right end comes first is advanced.
/// Output order follows the sweep, so the result stays sorted and disjoint.
pub fn intersect(p1: &Predicate, p2: &Predicate) -> Predicate {
    let a = &p1.intervals;
    let b = &p2.intervals;
    let mut result = Vec::new();

    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let common = a[i].meet(&b[j]);
        if !common.is_empty() {
            result.push(common);
        }

        if a[i].ends_before(&b[j]) {
            i += 1;
        } else if b[j].ends_before(&a[i]) {
            j += 1;
        } else {
            i += 1;
            j += 1;
        }
    }

    Predicate { intervals: result }
}

fn normalize(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.retain(|i| !i.is_empty());
    // NaN bounds are gone at this point, so `partial_cmp` is total.
    intervals.sort_by(|x, y| {
        x.left
            .partial_cmp(&y.left)
            .unwrap_or(Ordering::Equal)
            .then(y.left_closed.cmp(&x.left_closed))
    });

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for next in intervals {
        match merged.last_mut() {
            Some(last) if connects(last, &next) => {
                if next.left == last.left {
                    last.left_closed |= next.left_closed;
                }
                if next.right > last.right {
                    last.right = next.right;
                    last.right_closed = next.right_closed;
                } else if next.right == last.right {
                    last.right_closed |= next.right_closed;
                }
            }
            _ => merged.push(next),
        }
    }
    merged
}

/// Returns true if `next` (sorted after `last`) overlaps or touches `last`.
fn connects(last: &Interval, next: &Interval) -> bool {
    next.left < last.right || (next.left == last.right && (last.right_closed || next.left_closed))
}
