//! Sibling positions
//!
//! A position is a float so that an item can be inserted between two
//! siblings (e.g. at `1.5` between `1` and `2`) without renumbering.

use std::cmp::Ordering;

use tracing::trace;

/// Values at or below this floor are never stored.
pub const POSITION_FLOOR: f64 = -1.0;

/// Float sibling position embedded in a positioned entity.
///
/// Starts at `0.0`. `set` accepts any value strictly greater than
/// [`POSITION_FLOOR`] and silently ignores everything else, NaN included.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Position(f64);

impl Position {
    pub fn new() -> Self {
        Self(0.0)
    }

    pub fn get(&self) -> f64 {
        self.0
    }

    /// Store `value` if it is above the floor; otherwise leave the position unchanged.
    pub fn set(&mut self, value: f64) -> &mut Self {
        if value > POSITION_FLOOR {
            self.0 = value;
        } else {
            trace!(value, current = self.0, "position rejected");
        }
        self
    }
}

impl From<Position> for f64 {
    fn from(position: Position) -> Self {
        position.0
    }
}

/// Capability of any entity ordered among its siblings by a float position.
pub trait Positioned {
    fn position(&self) -> f64;

    /// Returns `self` whether or not the value was accepted.
    fn set_position(&mut self, value: f64) -> &mut Self;
}

impl Positioned for Position {
    fn position(&self) -> f64 {
        self.get()
    }

    fn set_position(&mut self, value: f64) -> &mut Self {
        self.set(value)
    }
}

/// Orders two positioned entities by position.
///
/// Uses a total order on `f64`, so it is usable as a sort comparator.
pub fn compare_position<P, Q>(a: &P, b: &Q) -> Ordering
where
    P: Positioned + ?Sized,
    Q: Positioned + ?Sized,
{
    a.position().total_cmp(&b.position())
}
