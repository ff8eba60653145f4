use std::fmt::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ChangeId, Side, document::edit_dispatcher::TrackerId};

/// Handle of a conflict within its `MergeSession`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConflictId(pub(crate) usize);

impl Display for ConflictId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "!{}", self.0) }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictState {
    Open,
    /// `Side` has been resolved, the other side hasn't.
    HalfResolved(Side),
    Closed,
}

/// Two changes, one per side, editing the same base region differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    id: ConflictId,
    changes: [ChangeId; 2],
    base_tracker: TrackerId,
    state: ConflictState,
}

impl MergeConflict {
    pub(crate) fn new(
        id: ConflictId,
        left: ChangeId,
        right: ChangeId,
        base_tracker: TrackerId,
    ) -> Self {
        Self {
            id,
            changes: [left, right],
            base_tracker,
            state: ConflictState::Open,
        }
    }

    #[must_use]
    pub fn id(&self) -> ConflictId { self.id }

    #[must_use]
    pub fn change(&self, side: Side) -> ChangeId { self.changes[side.index()] }

    #[must_use]
    pub fn state(&self) -> ConflictState { self.state }

    #[must_use]
    pub fn is_closed(&self) -> bool { self.state == ConflictState::Closed }

    pub(crate) fn base_tracker(&self) -> TrackerId { self.base_tracker }

    pub(crate) fn set_base_tracker(&mut self, tracker: TrackerId) { self.base_tracker = tracker; }

    /// Record that `side` got resolved. The state only ever moves forward.
    pub(crate) fn resolve(&mut self, side: Side) {
        self.state = match self.state {
            ConflictState::Open => ConflictState::HalfResolved(side),
            ConflictState::HalfResolved(resolved) if resolved == side => self.state,
            ConflictState::HalfResolved(_) | ConflictState::Closed => ConflictState::Closed,
        };
    }

    pub(crate) fn close(&mut self) { self.state = ConflictState::Closed; }
}
