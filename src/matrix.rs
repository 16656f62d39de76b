//! The full reward schedule: an ordered, non-empty list of levels
//!
//! Lookups never fail. Out-of-range arguments resolve through fixed
//! fallbacks so that display code always has something to show. Mutations
//! validate their positions and report [`Error`]s without touching the
//! matrix when they refuse.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result, Target};
use crate::gap::Gap;
use crate::level::Level;
use crate::reindex::reindex_levels;

/// Ordered levels of gaps for one configuration scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Level>", into = "Vec<Level>")]
pub struct Matrix {
    levels: Vec<Level>,
}

impl Default for Matrix {
    /// One level holding the seed gap `[1, 1] -> 1`
    fn default() -> Self {
        Self {
            levels: vec![Level::new(1)],
        }
    }
}

impl Matrix {
    /// Same as [`Matrix::default`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a matrix from levels in order; level numbers are recomputed and
    /// an empty input yields the default matrix.
    pub fn from_levels<I: IntoIterator<Item = Level>>(levels: I) -> Self {
        let mut levels: Vec<Level> = levels.into_iter().collect();
        if levels.is_empty() {
            return Self::default();
        }
        reindex_levels(&mut levels);
        Self { levels }
    }

    /// All levels in order
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Number of levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false; a matrix keeps at least one level
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level at 1-based `level`
    pub fn level(&self, level: usize) -> Option<&Level> {
        level.checked_sub(1).and_then(|i| self.levels.get(i))
    }

    /// Reward for `count` at `level`. `level` is clamped into range.
    pub fn reward(&self, level: usize, count: i64) -> i64 {
        self.lookup(level, count).amount
    }

    /// Gap covering `count` at `level`. `level` is clamped into range and
    /// the level's last gap covers every count past its right border.
    pub fn lookup(&self, level: usize, count: i64) -> &Gap {
        let position = level.clamp(1, self.levels.len()) - 1;
        self.levels[position].lookup(count)
    }

    /// Gap at `(level, index)`, or the very first gap of the matrix when
    /// either position is out of range.
    pub fn gap(&self, level: usize, index: usize) -> &Gap {
        self.level(level)
            .and_then(|l| l.gap(index))
            .unwrap_or_else(|| self.levels[0].first())
    }

    /// Append a gap to `level`; see [`Level::add_gap`]
    pub fn add_gap(&mut self, level: usize) -> Result<Gap> {
        self.level_mut(level)?.add_gap()
    }

    /// Overwrite the gap at `(gap.level, gap.index)` and propagate its
    /// borders; see [`Level::update_gap`]
    pub fn update_gap(&mut self, gap: Gap) -> Result<Gap> {
        self.level_mut(gap.level)?.update_gap(gap)
    }

    /// Remove the gap at `(level, index)`; see [`Level::delete_gap`]
    pub fn delete_gap(&mut self, level: usize, index: usize) -> Result<Gap> {
        self.level_mut(level)?.delete_gap(index)
    }

    /// Shift the amount of the gap at `(level, index)` by `delta`
    pub fn adjust_amount(&mut self, level: usize, index: usize, delta: i64) -> Result<Gap> {
        self.level_mut(level)?.adjust_amount(index, delta)
    }

    /// Append a new level holding the seed gap and return that gap
    pub fn add_level(&mut self) -> Gap {
        let level = Level::new(self.levels.len() + 1);
        let gap = *level.first();
        self.levels.push(level);
        debug!(level = gap.level, "added level");
        gap
    }

    /// Remove the level at 1-based `level` and renumber the rest.
    ///
    /// Returns the first gap of the level to focus next: the new level 1
    /// when level 1 was removed, otherwise the level just below.
    pub fn delete_level(&mut self, level: usize) -> Result<Gap> {
        let position = self.position(level)?;
        if self.levels.len() == 1 {
            return Err(Error::DegenerateMatrix);
        }

        self.levels.remove(position);
        reindex_levels(&mut self.levels);

        let focus = *self.levels[position.saturating_sub(1)].first();
        debug!(level, focus = %focus, "deleted level");
        Ok(focus)
    }

    /// Verify contiguity and dense numbering of every level
    pub fn check(&self) -> Result<()> {
        for (position, level) in self.levels.iter().enumerate() {
            if level.number() != position + 1 {
                return Err(Error::Corrupt(format!(
                    "level at position {} is numbered {}",
                    position + 1,
                    level.number()
                )));
            }
            level.check()?;
        }
        Ok(())
    }

    fn level_mut(&mut self, level: usize) -> Result<&mut Level> {
        let position = self.position(level)?;
        Ok(&mut self.levels[position])
    }

    fn position(&self, level: usize) -> Result<usize> {
        if level == 0 || level > self.levels.len() {
            return Err(Error::InvalidIndex {
                target: Target::Level,
                value: level,
                len: self.levels.len(),
            });
        }
        Ok(level - 1)
    }
}

impl From<Vec<Level>> for Matrix {
    fn from(levels: Vec<Level>) -> Self {
        Self::from_levels(levels)
    }
}

impl From<Matrix> for Vec<Level> {
    fn from(matrix: Matrix) -> Self {
        matrix.levels
    }
}
