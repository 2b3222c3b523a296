//! Sibling position compaction
//!
//! Repeated fractional insertions drift positions toward the limits of `f64`
//! precision. Compaction reassigns `0..n` in the supplied order, so relative
//! order is kept and spacing is integral again.

use tracing::{debug, instrument};

use crate::domain::position::Positioned;

/// Reassigns integer positions to a sequence of siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionCompactor {
    set_positions: bool,
}

impl Default for PositionCompactor {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionCompactor {
    /// Compactor that assigns positions.
    pub fn new() -> Self {
        Self {
            set_positions: true,
        }
    }

    /// Compactor that only counts: returns the next free position, assigns nothing.
    pub fn dry_run() -> Self {
        Self {
            set_positions: false,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        !self.set_positions
    }

    /// Assigns `position = index` in sequence order.
    ///
    /// Returns the number of siblings, i.e. the next free position after the last one.
    #[instrument(level = "debug", skip(siblings))]
    pub fn compact<'a, P, I>(&self, siblings: I) -> usize
    where
        P: Positioned + ?Sized + 'a,
        I: IntoIterator<Item = &'a mut P>,
    {
        let mut next = 0usize;
        for sibling in siblings {
            self.assign(next, sibling);
            next += 1;
        }
        debug!(next, dry_run = self.is_dry_run(), "siblings compacted");
        next
    }

    /// Gives `sibling` the position `index`. No-op in dry-run mode.
    pub fn assign<P>(&self, index: usize, sibling: &mut P)
    where
        P: Positioned + ?Sized,
    {
        if self.set_positions {
            sibling.set_position(index as f64);
        }
    }
}

/// Compacts `siblings` in the given order and returns the next free position.
pub fn compact_positions<'a, P, I>(siblings: I) -> usize
where
    P: Positioned + ?Sized + 'a,
    I: IntoIterator<Item = &'a mut P>,
{
    PositionCompactor::new().compact(siblings)
}
