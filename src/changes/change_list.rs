use std::{collections::HashSet, fmt::Debug};

use crate::{ChangeEvent, ChangeId, Side};

pub type ChangeListener = Box<dyn FnMut(&ChangeEvent)>;

/// The changes of one side, ordered by their position in that side's text
/// and then in base.
pub struct ChangeList {
    side: Side,
    pending: Vec<ChangeId>,
    applied: Vec<ChangeId>,
    conflicted: HashSet<ChangeId>,
    reported_counts: (usize, usize),
    listeners: Vec<ChangeListener>,
}

impl Debug for ChangeList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeList")
            .field("side", &self.side)
            .field("pending", &self.pending)
            .field("applied", &self.applied)
            .field("conflicted", &self.conflicted)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl ChangeList {
    pub(crate) fn new(side: Side) -> Self {
        Self {
            side,
            pending: Vec::new(),
            applied: Vec::new(),
            conflicted: HashSet::new(),
            reported_counts: (0, 0),
            listeners: Vec::new(),
        }
    }

    #[must_use]
    pub fn side(&self) -> Side { self.side }

    pub fn pending(&self) -> impl Iterator<Item = ChangeId> + '_ { self.pending.iter().copied() }

    pub fn applied(&self) -> impl Iterator<Item = ChangeId> + '_ { self.applied.iter().copied() }

    /// Number of pending changes, conflicts included.
    #[must_use]
    pub fn count(&self) -> usize { self.pending.len() }

    #[must_use]
    pub fn conflict_count(&self) -> usize {
        self.pending
            .iter()
            .filter(|id| self.conflicted.contains(id))
            .count()
    }

    #[must_use]
    pub fn is_pending(&self, id: ChangeId) -> bool { self.pending.contains(&id) }

    #[must_use]
    pub fn contains(&self, id: ChangeId) -> bool {
        self.is_pending(id) || self.applied.contains(&id)
    }

    pub(crate) fn push_pending(&mut self, id: ChangeId, conflict: bool) {
        self.pending.push(id);
        if conflict {
            self.conflicted.insert(id);
        }
    }

    pub(crate) fn mark_applied(&mut self, id: ChangeId) -> bool {
        let Some(position) = self.pending.iter().position(|&pending| pending == id) else {
            return false;
        };

        self.pending.remove(position);
        self.conflicted.remove(&id);
        self.applied.push(id);
        true
    }

    pub(crate) fn remove(&mut self, id: ChangeId) -> bool {
        let before = self.pending.len() + self.applied.len();
        self.pending.retain(|&pending| pending != id);
        self.applied.retain(|&applied| applied != id);
        self.conflicted.remove(&id);

        before != self.pending.len() + self.applied.len()
    }

    pub(crate) fn clear_conflict(&mut self, id: ChangeId) { self.conflicted.remove(&id); }

    pub(crate) fn sort_by_key<K: Ord>(&mut self, key: impl Fn(ChangeId) -> K) {
        self.pending.sort_by_cached_key(|&id| key(id));
        self.applied.sort_by_cached_key(|&id| key(id));
    }

    pub(crate) fn subscribe(&mut self, listener: ChangeListener) { self.listeners.push(listener); }

    pub(crate) fn notify(&mut self, event: &ChangeEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    /// Send `CountChanged` if the counts differ from the last reported ones.
    pub(crate) fn notify_counts(&mut self) {
        let counts = (self.count(), self.conflict_count());
        if counts == self.reported_counts {
            return;
        }

        self.reported_counts = counts;
        self.notify(&ChangeEvent::CountChanged {
            pending: counts.0,
            conflicts: counts.1,
        });
    }
}
