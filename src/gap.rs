//! Gap value type
//!
//! A gap is one contiguous, inclusive range of counts together with the
//! reward granted for any count inside it, plus its position inside the
//! matrix (1-based level and 1-based index within that level).

use std::fmt;

use serde::{Deserialize, Serialize};

/// One contiguous range of counts mapped to a reward amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Gap {
    /// First count covered by this gap (inclusive)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub left_border: i64,
    /// Last count covered by this gap (inclusive)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub right_border: i64,
    /// Reward granted for a count inside the gap
    #[serde(default, skip_serializing_if = "is_zero")]
    pub amount: i64,
    /// 1-based number of the owning level
    #[serde(default, skip_serializing_if = "is_zero")]
    pub level: usize,
    /// 1-based position within the owning level
    #[serde(default, skip_serializing_if = "is_zero")]
    pub index: usize,
}

fn is_zero<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

impl Gap {
    /// Create an unpositioned gap covering `[left_border, right_border]`
    pub fn new(left_border: i64, right_border: i64, amount: i64) -> Self {
        Self {
            left_border,
            right_border,
            amount,
            level: 0,
            index: 0,
        }
    }

    /// The gap every fresh level starts with: `[1, 1]` paying 1
    pub fn seed(level: usize) -> Self {
        Self::new(1, 1, 1).at(level, 1)
    }

    /// Return a copy of this gap placed at `(level, index)`
    pub fn at(mut self, level: usize, index: usize) -> Self {
        self.level = level;
        self.index = index;
        self
    }

    /// Whether `count` falls inside the inclusive borders
    pub fn contains(&self, count: i64) -> bool {
        count >= self.left_border && count <= self.right_border
    }

    /// Number of counts covered; zero or negative when the borders are inverted
    pub fn width(&self) -> i64 {
        self.right_border.saturating_sub(self.left_border).saturating_add(1)
    }

    /// A border fell below 1 during propagation; such gaps get pruned
    pub fn is_degenerate(&self) -> bool {
        self.left_border < 1 || self.right_border < 1
    }
}

impl fmt::Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}.{} [{}..={}] -> {}",
            self.level, self.index, self.left_border, self.right_border, self.amount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let gap = Gap::new(6, 10, 20);
        assert!(!gap.contains(5));
        assert!(gap.contains(6));
        assert!(gap.contains(10));
        assert!(!gap.contains(11));
    }

    #[test]
    fn test_width_and_degenerate() {
        assert_eq!(Gap::new(1, 1, 1).width(), 1);
        assert_eq!(Gap::new(6, 10, 1).width(), 5);
        assert!(Gap::new(0, 0, 1).is_degenerate());
        assert!(Gap::new(-3, 4, 1).is_degenerate());
        assert!(!Gap::new(3, 3, 1).is_degenerate());
    }

    #[test]
    fn test_sparse_serialization() {
        let json = serde_json::to_string(&Gap::new(1, 5, 0).at(1, 1)).unwrap();
        assert!(!json.contains("amount"));

        let gap: Gap = serde_json::from_str(&json).unwrap();
        assert_eq!(gap, Gap::new(1, 5, 0).at(1, 1));

        let empty: Gap = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Gap::default());
    }

    #[test]
    fn test_display() {
        assert_eq!(Gap::new(6, 10, 20).at(2, 3).to_string(), "#2.3 [6..=10] -> 20");
    }
}
