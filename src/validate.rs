//! Boundary propagation after a gap edit
//!
//! Overwriting one gap can leave its neighbours overlapping it or leave
//! holes next to it. Propagation walks outward from the edited gap to both
//! ends of the level, snapping each neighbour's facing border to the gap
//! beside it:
//!
//! - leftward, each gap's right border becomes `next.left_border - 1`
//!   (left border clamped down to it when the gap inverts);
//! - rightward, each gap's left border becomes `prev.right_border + 1`
//!   (right border clamped up to it when the gap inverts).
//!
//! Gaps squeezed below count 1 by the leftward walk are pruned afterwards.
//! Callers reindex the level once propagation returns.

use tracing::trace;

use crate::error::{Error, Result};
use crate::gap::Gap;
use crate::level::GapVec;

/// Restore contiguity around the gap at 0-based `position`.
///
/// Returns how many gaps were pruned. Pruned gaps all sit before
/// `position`, so the edited gap ends up at `position - pruned`. That holds
/// as long as the edited right border leaves one count in `i64` for every
/// gap after it; [`Level::update_gap`](crate::Level::update_gap) refuses
/// borders that do not.
pub fn propagate(gaps: &mut GapVec, position: usize) -> usize {
    propagate_left(gaps, position);
    propagate_right(gaps, position);
    prune(gaps)
}

fn propagate_left(gaps: &mut [Gap], position: usize) {
    for i in (0..position).rev() {
        let edge = gaps[i + 1].left_border.saturating_sub(1);
        let gap = &mut gaps[i];
        gap.right_border = edge;
        if gap.left_border > gap.right_border {
            gap.left_border = gap.right_border;
        }
    }
}

fn propagate_right(gaps: &mut [Gap], position: usize) {
    for i in position + 1..gaps.len() {
        let edge = gaps[i - 1].right_border.saturating_add(1);
        let gap = &mut gaps[i];
        gap.left_border = edge;
        if gap.left_border > gap.right_border {
            gap.right_border = gap.left_border;
        }
    }
}

fn prune(gaps: &mut GapVec) -> usize {
    let before = gaps.len();
    gaps.retain(|gap| {
        let keep = !gap.is_degenerate();
        if !keep {
            trace!(gap = %gap, "pruning degenerate gap");
        }
        keep
    });
    before - gaps.len()
}

/// Verify that `gaps` start at 1, tile without holes or overlap, and are
/// densely indexed for `level`.
pub fn check(gaps: &[Gap], level: usize) -> Result<()> {
    let Some(first) = gaps.first() else {
        return Err(Error::Corrupt(format!("level {} holds no gaps", level)));
    };
    if first.left_border != 1 {
        return Err(Error::Corrupt(format!(
            "level {} starts at {} instead of 1",
            level, first.left_border
        )));
    }

    for (position, gap) in gaps.iter().enumerate() {
        if gap.index != position + 1 || gap.level != level {
            return Err(Error::Corrupt(format!(
                "gap {} sits at position {}.{}",
                gap,
                level,
                position + 1
            )));
        }
        if gap.right_border < gap.left_border {
            return Err(Error::Corrupt(format!("gap {} has inverted borders", gap)));
        }
    }

    for pair in gaps.windows(2) {
        if pair[0].right_border.checked_add(1) != Some(pair[1].left_border) {
            return Err(Error::Corrupt(format!(
                "gaps {} and {} are not adjacent",
                pair[0], pair[1]
            )));
        }
    }

    Ok(())
}
