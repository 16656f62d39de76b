//! Dense renumbering of gaps and levels
//!
//! Every lookup by position relies on `index` running `1..=len` inside a
//! level and `level` matching the owning level's position in the matrix.
//! These helpers restore both after any insertion or removal.

use crate::gap::Gap;
use crate::level::Level;

/// Renumber `index` of every gap to its 1-based position
pub fn reindex_gaps(gaps: &mut [Gap]) {
    for (position, gap) in gaps.iter_mut().enumerate() {
        gap.index = position + 1;
    }
}

/// Stamp `level` on every gap of a level
pub fn relevel_gaps(gaps: &mut [Gap], level: usize) {
    for gap in gaps.iter_mut() {
        gap.level = level;
    }
}

/// Renumber every level (and the gaps inside it) to its 1-based position
pub fn reindex_levels(levels: &mut [Level]) {
    for (position, level) in levels.iter_mut().enumerate() {
        level.renumber(position + 1);
    }
}
