use std::{fmt::Display, ops::Range};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Side;

/// A run of characters that is identical in the base text and in one of the
/// branches. Offsets are character offsets.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualPair {
    pub side: Side,
    pub base: Range<usize>,
    pub branch: Range<usize>,
}

impl EqualPair {
    #[must_use]
    pub fn new(side: Side, base_start: usize, branch_start: usize, length: usize) -> Self {
        Self {
            side,
            base: base_start..base_start + length,
            branch: branch_start..branch_start + length,
        }
    }

    /// The zero-length pair marking the end of both texts.
    pub(crate) fn terminal(side: Side, base_length: usize, branch_length: usize) -> Self {
        Self::new(side, base_length, branch_length, 0)
    }

    #[must_use]
    pub fn len(&self) -> usize { self.base.len().min(self.branch.len()) }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Drop the first `count` characters from both ranges.
    pub(crate) fn trim_start(&mut self, count: usize) {
        let count = count.min(self.len());
        self.base.start += count;
        self.branch.start += count;
    }

    /// Branch offset corresponding to `base_offset`, which must lie within
    /// (or at the end of) the pair's base range.
    pub(crate) fn branch_offset_at(&self, base_offset: usize) -> usize {
        self.branch.start + base_offset.saturating_sub(self.base.start)
    }
}

impl Display for EqualPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} base={:?} branch={:?}",
            self.side, self.base, self.branch
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_trim_and_offsets() {
        let mut pair = EqualPair::new(Side::Left, 4, 10, 5);
        assert_eq!(pair.branch_offset_at(6), 12);
        assert_eq!(pair.branch_offset_at(9), 15);

        pair.trim_start(2);
        assert_eq!(pair, EqualPair::new(Side::Left, 6, 12, 3));

        pair.trim_start(10);
        assert!(pair.is_empty());
        assert_eq!(pair.base, 9..9);
    }
}
