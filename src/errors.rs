use thiserror::Error;

use crate::{ChangeId, Side, TextRole};

/// Everything that can go wrong while building or driving a merge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The texts have too many tokens for the differencer
    #[error("Cannot compare base with {side}: {token_count} tokens exceed the limit of {limit}")]
    TooLarge {
        side: Side,
        token_count: usize,
        limit: usize,
    },

    #[error("The comparison was cancelled")]
    Cancelled,

    #[error("The target document is read-only")]
    ReadOnlyDocument,

    #[error("Range {start}..{end} is out of bounds for a document of {length} characters")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        length: usize,
    },

    #[error("Unknown or removed change {0}")]
    UnknownChange(ChangeId),

    #[error("Change {0} is not pending")]
    ChangeNotPending(ChangeId),

    /// The role is neither the change's side nor the base
    #[error("Change {change} cannot be applied from {role}")]
    InvalidSourceRole { change: ChangeId, role: TextRole },
}
