use std::{fmt::Display, ops::Range};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Side;

/// One region of the three-way partition of the texts. Ranges are character
/// offsets into base, left and right respectively.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    LeftChange {
        base: Range<usize>,
        left: Range<usize>,
    },
    RightChange {
        base: Range<usize>,
        right: Range<usize>,
    },
    Conflict {
        base: Range<usize>,
        left: Range<usize>,
        right: Range<usize>,
    },
    /// Both sides appended text after the end of base.
    TrailingInsert {
        base: Range<usize>,
        left: Range<usize>,
        right: Range<usize>,
    },
}

impl Fragment {
    pub(crate) fn single_side(side: Side, base: Range<usize>, branch: Range<usize>) -> Self {
        match side {
            Side::Left => Fragment::LeftChange { base, left: branch },
            Side::Right => Fragment::RightChange {
                base,
                right: branch,
            },
        }
    }

    #[must_use]
    pub fn base_range(&self) -> Range<usize> {
        match self {
            Fragment::LeftChange { base, .. }
            | Fragment::RightChange { base, .. }
            | Fragment::Conflict { base, .. }
            | Fragment::TrailingInsert { base, .. } => base.clone(),
        }
    }

    /// The edited left text, absent unless the fragment is a left change or
    /// a conflict.
    #[must_use]
    pub fn left_range(&self) -> Option<Range<usize>> {
        match self {
            Fragment::LeftChange { left, .. } | Fragment::Conflict { left, .. } => {
                Some(left.clone())
            }
            Fragment::RightChange { .. } | Fragment::TrailingInsert { .. } => None,
        }
    }

    #[must_use]
    pub fn right_range(&self) -> Option<Range<usize>> {
        match self {
            Fragment::RightChange { right, .. } | Fragment::Conflict { right, .. } => {
                Some(right.clone())
            }
            Fragment::LeftChange { .. } | Fragment::TrailingInsert { .. } => None,
        }
    }

    /// The text `side` contributes to this region, including the appended
    /// text of a trailing insert.
    #[must_use]
    pub fn edited_range(&self, side: Side) -> Option<Range<usize>> {
        match (self, side) {
            (Fragment::TrailingInsert { left, .. }, Side::Left) => Some(left.clone()),
            (Fragment::TrailingInsert { right, .. }, Side::Right) => Some(right.clone()),
            (_, Side::Left) => self.left_range(),
            (_, Side::Right) => self.right_range(),
        }
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool { matches!(self, Fragment::Conflict { .. }) }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fragment::LeftChange { base, left } => {
                write!(f, "LeftChange base={base:?} left={left:?}")
            }
            Fragment::RightChange { base, right } => {
                write!(f, "RightChange base={base:?} right={right:?}")
            }
            Fragment::Conflict { base, left, right } => {
                write!(f, "Conflict base={base:?} left={left:?} right={right:?}")
            }
            Fragment::TrailingInsert { base, left, right } => {
                write!(
                    f,
                    "TrailingInsert base={base:?} left={left:?} right={right:?}"
                )
            }
        }
    }
}
