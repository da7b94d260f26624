//! Numeric intervals with optional infinite bounds.
//!
//! An [`Interval`] is the atomic piece of a [`Predicate`][crate::predicate::Predicate].
//! Bounds are `f64` and may be `±inf`. An infinite bound is never closed:
//! the closedness flag of that side is cleared on construction.

use std::fmt;

/// Which ends of an interval are included.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Border {
    /// `(a, b)`
    Open,
    /// `[a, b)`
    LeftClosed,
    /// `(a, b]`
    RightClosed,
    /// `[a, b]`
    DoubleClosed,
}

impl Border {
    pub fn from_flags(left_closed: bool, right_closed: bool) -> Self {
        match (left_closed, right_closed) {
            (false, false) => Border::Open,
            (true, false) => Border::LeftClosed,
            (false, true) => Border::RightClosed,
            (true, true) => Border::DoubleClosed,
        }
    }

    pub fn left_closed(self) -> bool {
        matches!(self, Border::LeftClosed | Border::DoubleClosed)
    }

    pub fn right_closed(self) -> bool {
        matches!(self, Border::RightClosed | Border::DoubleClosed)
    }
}

/// A range of reals between `left` and `right`.
///
/// # Invariants
///
/// - An infinite bound has its closedness flag cleared
/// - `left <= right` for non-empty intervals; see [`Interval::is_empty`]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Interval {
    pub left: f64,
    pub right: f64,
    pub left_closed: bool,
    pub right_closed: bool,
}

impl Interval {
    pub fn new(left: f64, right: f64, border: Border) -> Self {
        Self::with_flags(left, right, border.left_closed(), border.right_closed())
    }

    pub fn with_flags(left: f64, right: f64, left_closed: bool, right_closed: bool) -> Self {
        Self {
            left,
            right,
            left_closed: left_closed && left.is_finite(),
            right_closed: right_closed && right.is_finite(),
        }
    }

    /// `[left, right]`
    pub fn closed(left: f64, right: f64) -> Self {
        Self::new(left, right, Border::DoubleClosed)
    }

    /// `(left, right)`
    pub fn open(left: f64, right: f64) -> Self {
        Self::new(left, right, Border::Open)
    }

    /// `(-inf, +inf)`
    pub fn full() -> Self {
        Self::open(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// `[value, value]`
    pub fn point(value: f64) -> Self {
        Self::closed(value, value)
    }

    pub fn border(&self) -> Border {
        Border::from_flags(self.left_closed, self.right_closed)
    }

    /// Returns true if `x` lies strictly between the bounds, or on a closed bound.
    pub fn contains(&self, x: f64) -> bool {
        let above_left = self.left < x || (self.left_closed && self.left <= x);
        let below_right = x < self.right || (self.right_closed && x <= self.right);
        above_left && below_right
    }

    /// Returns true if no real number lies in the interval.
    ///
    /// A degenerate interval `left == right` is non-empty only when both ends are closed.
    pub fn is_empty(&self) -> bool {
        if self.left.is_nan() || self.right.is_nan() {
            return true;
        }
        if self.left < self.right {
            return false;
        }
        !(self.left == self.right && self.left_closed && self.right_closed)
    }

    /// Returns a value inside the interval.
    ///
    /// Unbounded on both sides gives `0`. Unbounded on one side gives a point
    /// twice as far from zero as the finite bound, on the open side. Otherwise
    /// the midpoint. Near the ends of the `f64` range, where these overflow or
    /// round onto an open bound, the value closest to the bound is used instead.
    pub fn sample(&self) -> f64 {
        match (self.left.is_infinite(), self.right.is_infinite()) {
            (true, true) => 0.0,
            (true, false) => {
                let x = -2.0 * self.right.abs();
                if self.contains(x) {
                    x
                } else if self.contains(self.right - 1.0) {
                    self.right - 1.0
                } else {
                    self.inner_right()
                }
            }
            (false, true) => {
                let x = 2.0 * self.left.abs();
                if self.contains(x) {
                    x
                } else if self.contains(self.left + 1.0) {
                    self.left + 1.0
                } else {
                    self.inner_left()
                }
            }
            (false, false) => {
                let mid = self.left / 2.0 + self.right / 2.0;
                if self.contains(mid) {
                    mid
                } else {
                    self.inner_left()
                }
            }
        }
    }

    /// The smallest value in the interval, or next to the open left bound.
    fn inner_left(&self) -> f64 {
        if self.left_closed {
            self.left
        } else {
            next_up(self.left)
        }
    }

    /// The largest value in the interval, or next to the open right bound.
    fn inner_right(&self) -> f64 {
        if self.right_closed {
            self.right
        } else {
            -next_up(-self.right)
        }
    }

    /// Intersection of two intervals. The result may be empty.
    ///
    /// On equal bounds the result is closed only if both inputs are closed there.
    pub fn meet(&self, other: &Interval) -> Interval {
        let (left, left_closed) = if self.left > other.left {
            (self.left, self.left_closed)
        } else if other.left > self.left {
            (other.left, other.left_closed)
        } else {
            (self.left, self.left_closed && other.left_closed)
        };
        let (right, right_closed) = if self.right < other.right {
            (self.right, self.right_closed)
        } else if other.right < self.right {
            (other.right, other.right_closed)
        } else {
            (self.right, self.right_closed && other.right_closed)
        };
        Interval::with_flags(left, right, left_closed, right_closed)
    }

    /// Returns true if the right end of `self` comes strictly before the right end of `other`.
    pub(crate) fn ends_before(&self, other: &Interval) -> bool {
        self.right < other.right || (self.right == other.right && !self.right_closed && other.right_closed)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.left_closed { '[' } else { '(' },
            Bound(self.left),
            Bound(self.right),
            if self.right_closed { ']' } else { ')' }
        )
    }
}

/// The next representable `f64` above a finite `x`.
fn next_up(x: f64) -> f64 {
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

struct Bound(f64);

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == f64::INFINITY {
            write!(f, "+inf")
        } else if self.0 == f64::NEG_INFINITY {
            write!(f, "-inf")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
