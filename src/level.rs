//! A single tier of the reward schedule
//!
//! A level partitions the positive counts into contiguous gaps ordered by
//! index. The last gap is open-ended: any count past its right border still
//! resolves to it.

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use tracing::{debug, trace};

use crate::error::{Error, Result, Target};
use crate::gap::Gap;
use crate::reindex::{reindex_gaps, relevel_gaps};
use crate::validate;

/// Inline storage for the gaps of one level
pub type GapVec = SmallVec<[Gap; 4]>;

/// Ordered, non-empty sequence of gaps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Gap>", into = "Vec<Gap>")]
pub struct Level {
    gaps: GapVec,
}

impl Level {
    /// Create level number `level` holding the single seed gap
    pub fn new(level: usize) -> Self {
        Self {
            gaps: smallvec![Gap::seed(level)],
        }
    }

    /// Build a level from gaps given in order. Indices are recomputed and an
    /// empty input yields the seed gap. Borders are taken as given; use
    /// [`Level::check`] to verify them.
    pub fn from_gaps<I: IntoIterator<Item = Gap>>(gaps: I) -> Self {
        let mut gaps: GapVec = gaps.into_iter().collect();
        if gaps.is_empty() {
            gaps.push(Gap::seed(0));
        }
        let number = gaps[0].level;
        let mut level = Self { gaps };
        level.renumber(number);
        level
    }

    /// All gaps in index order
    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    /// Number of gaps; at least 1
    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    /// 1-based number of this level, as stamped on its gaps
    pub fn number(&self) -> usize {
        self.first().level
    }

    /// The gap starting at count 1
    pub fn first(&self) -> &Gap {
        &self.gaps[0]
    }

    /// The open-ended top gap
    pub fn last(&self) -> &Gap {
        &self.gaps[self.gaps.len() - 1]
    }

    /// Find the gap covering `count`, falling back to the open-ended last gap
    pub fn lookup(&self, count: i64) -> &Gap {
        self.gaps
            .iter()
            .find(|gap| gap.contains(count))
            .unwrap_or_else(|| self.last())
    }

    /// Gap at 1-based `index`
    pub fn gap(&self, index: usize) -> Option<&Gap> {
        index.checked_sub(1).and_then(|i| self.gaps.get(i))
    }

    /// Append a one-count gap right after the last one, inheriting its amount
    pub fn add_gap(&mut self) -> Result<Gap> {
        let last = *self.last();
        let Some(next) = last.right_border.checked_add(1) else {
            return Err(Error::BorderOverflow { level: last.level });
        };
        let gap = Gap::new(next, next, last.amount).at(last.level, last.index + 1);
        self.gaps.push(gap);
        debug!(gap = %gap, "added gap");
        Ok(gap)
    }

    /// Overwrite the gap at `gap.index` and propagate its borders through
    /// the level. Returns the updated gap as stored afterwards; its index
    /// moves left when gaps before it were swallowed.
    pub fn update_gap(&mut self, gap: Gap) -> Result<Gap> {
        let position = self.position(gap.index)?;
        let mut gap = gap.at(self.number(), gap.index);
        if position == 0 && gap.left_border != 1 {
            trace!(left = gap.left_border, "pinning first gap to count 1");
            gap.left_border = 1;
        }
        // Every gap after this one needs a count of its own past the right border.
        let following = (self.gaps.len() - 1 - position) as i64;
        if gap.left_border < 1
            || gap.right_border < gap.left_border
            || gap.right_border.checked_add(following).is_none()
        {
            return Err(Error::InvalidBorders {
                left: gap.left_border,
                right: gap.right_border,
            });
        }

        self.gaps[position] = gap;
        let pruned = validate::propagate(&mut self.gaps, position);
        reindex_gaps(&mut self.gaps);

        let updated = self.gaps[position - pruned];
        debug!(gap = %updated, pruned, "updated gap");
        Ok(updated)
    }

    /// Remove the gap at 1-based `index` and close the hole it leaves.
    ///
    /// Returns the gap to focus next: the one now at `index`, or the new
    /// last gap when the last one was removed.
    pub fn delete_gap(&mut self, index: usize) -> Result<Gap> {
        let position = self.position(index)?;
        if self.gaps.len() == 1 {
            return Err(Error::DegenerateLevel {
                level: self.number(),
            });
        }

        let removed = self.gaps.remove(position);
        if position == 0 {
            self.gaps[0].left_border = 1;
        } else if position < self.gaps.len() {
            self.gaps[position].left_border =
                self.gaps[position - 1].right_border.saturating_add(1);
        }
        reindex_gaps(&mut self.gaps);

        let focus = self.gaps[position.min(self.gaps.len() - 1)];
        debug!(removed = %removed, focus = %focus, "deleted gap");
        Ok(focus)
    }

    /// Add `delta` to the amount of the gap at 1-based `index`.
    /// Amounts never drop below 1.
    pub fn adjust_amount(&mut self, index: usize, delta: i64) -> Result<Gap> {
        let position = self.position(index)?;
        let gap = &mut self.gaps[position];
        let amount = gap.amount.saturating_add(delta);
        if amount < 1 {
            return Err(Error::AmountBelowMinimum { amount });
        }
        gap.amount = amount;
        debug!(gap = %gap, delta, "adjusted amount");
        Ok(*gap)
    }

    /// Verify contiguity and dense indexing
    pub fn check(&self) -> Result<()> {
        validate::check(&self.gaps, self.number())
    }

    /// Stamp this level's number on every gap and reindex them
    pub(crate) fn renumber(&mut self, level: usize) {
        relevel_gaps(&mut self.gaps, level);
        reindex_gaps(&mut self.gaps);
    }

    fn position(&self, index: usize) -> Result<usize> {
        if index == 0 || index > self.gaps.len() {
            return Err(Error::InvalidIndex {
                target: Target::Gap,
                value: index,
                len: self.gaps.len(),
            });
        }
        Ok(index - 1)
    }
}

impl From<Vec<Gap>> for Level {
    fn from(gaps: Vec<Gap>) -> Self {
        Self::from_gaps(gaps)
    }
}

impl From<Level> for Vec<Gap> {
    fn from(level: Level) -> Self {
        level.gaps.into_vec()
    }
}
