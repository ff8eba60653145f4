use std::{fmt::Display, ops::Range};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ConflictId, Side, TextRole, document::edit_dispatcher::TrackerId};

/// Handle of a change within its `MergeSession`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChangeId(pub(crate) usize);

impl Display for ChangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "#{}", self.0) }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Insert,
    Delete,
    Modify,
    Conflict,
}

impl ChangeKind {
    /// Kind of a single-side change turning `base` into `branch`.
    #[must_use]
    pub fn from_ranges(base: &Range<usize>, branch: &Range<usize>) -> Self {
        if base.is_empty() {
            ChangeKind::Insert
        } else if branch.is_empty() {
            ChangeKind::Delete
        } else {
            ChangeKind::Modify
        }
    }
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Insert => write!(f, "insert"),
            ChangeKind::Delete => write!(f, "delete"),
            ChangeKind::Modify => write!(f, "modify"),
            ChangeKind::Conflict => write!(f, "conflict"),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeStatus {
    Pending,
    Applied,
}

/// A region where one side differs from base, bound to the live documents
/// through a tracker on its side's text and one on the base text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub(crate) id: ChangeId,
    pub(crate) side: Side,
    pub(crate) kind: ChangeKind,
    pub(crate) status: ChangeStatus,
    pub(crate) side_tracker: TrackerId,
    pub(crate) base_tracker: TrackerId,
    pub(crate) conflict: Option<ConflictId>,
}

impl Change {
    #[must_use]
    pub fn id(&self) -> ChangeId { self.id }

    #[must_use]
    pub fn side(&self) -> Side { self.side }

    #[must_use]
    pub fn kind(&self) -> ChangeKind { self.kind }

    #[must_use]
    pub fn status(&self) -> ChangeStatus { self.status }

    #[must_use]
    pub fn is_pending(&self) -> bool { self.status == ChangeStatus::Pending }

    /// Whether this is still one half of an unresolved conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool { self.kind == ChangeKind::Conflict }

    /// The conflict this change was created for, kept after the change
    /// degenerates into a single-side change.
    #[must_use]
    pub fn conflict(&self) -> Option<ConflictId> { self.conflict }

    /// The tracker bound to `role`'s document, `None` if `role` is the other
    /// side.
    #[must_use]
    pub fn tracker(&self, role: TextRole) -> Option<TrackerId> {
        match role {
            TextRole::Base => Some(self.base_tracker),
            role if role == self.side.role() => Some(self.side_tracker),
            _ => None,
        }
    }

    pub(crate) fn set_tracker(&mut self, role: TextRole, tracker: TrackerId) {
        if role == TextRole::Base {
            self.base_tracker = tracker;
        } else {
            self.side_tracker = tracker;
        }
    }
}

impl Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} change", self.id, self.side, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    #[test_case(2..2, 2..5, ChangeKind::Insert ; "empty base")]
    #[test_case(2..5, 2..2, ChangeKind::Delete ; "empty branch")]
    #[test_case(2..5, 2..4, ChangeKind::Modify ; "both present")]
    #[test_case(3..3, 3..3, ChangeKind::Insert ; "both empty")]
    fn test_kind_from_ranges(base: Range<usize>, branch: Range<usize>, expected: ChangeKind) {
        assert_eq!(ChangeKind::from_ranges(&base, &branch), expected);
    }
}
