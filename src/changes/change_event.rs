use crate::{ChangeId, ChangeKind};

/// Notification sent to the listeners of a change list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Applied(ChangeId),

    /// Removed explicitly or because an edit destroyed one of its ranges.
    Removed(ChangeId),

    /// The other half of the change's conflict got resolved on its own, so
    /// the change turned into an ordinary change of `kind`.
    Degenerated { change: ChangeId, kind: ChangeKind },

    CountChanged { pending: usize, conflicts: usize },
}
