use std::{fmt::Display, ops::Range};

use log::trace;

use crate::document::range_tracker::{RangeTracker, TextEdit};

/// Handle of a tracked range. Handles of a torn down dispatcher never refer
/// to trackers of a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackerId {
    index: usize,
    generation: u64,
}

impl Display for TrackerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}.{}", self.generation, self.index)
    }
}

#[derive(Debug)]
struct Slot {
    tracker: RangeTracker,
    watched: bool,
}

/// Forwards the edits of one document to the trackers registered on it.
#[derive(Debug)]
pub struct EditDispatcher {
    generation: u64,
    slots: Vec<Option<Slot>>,
    live: usize,
}

impl EditDispatcher {
    pub(crate) fn new(generation: u64) -> Self {
        Self {
            generation,
            slots: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn track(&mut self, range: Range<usize>) -> TrackerId {
        self.slots.push(Some(Slot {
            tracker: RangeTracker::new(range),
            watched: false,
        }));
        self.live += 1;

        TrackerId {
            index: self.slots.len() - 1,
            generation: self.generation,
        }
    }

    fn slot(&self, id: TrackerId) -> Option<&Slot> {
        if id.generation != self.generation {
            return None;
        }
        self.slots.get(id.index)?.as_ref()
    }

    fn slot_mut(&mut self, id: TrackerId) -> Option<&mut Slot> {
        if id.generation != self.generation {
            return None;
        }
        self.slots.get_mut(id.index)?.as_mut()
    }

    pub(crate) fn tracker(&self, id: TrackerId) -> Option<&RangeTracker> {
        self.slot(id).map(|slot| &slot.tracker)
    }

    /// Report the invalidation of `id` from the next `dispatch`. Returns
    /// `false` for unknown or already invalid trackers.
    pub(crate) fn watch(&mut self, id: TrackerId) -> bool {
        match self.slot_mut(id) {
            Some(slot) if slot.tracker.is_valid() => {
                slot.watched = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn release(&mut self, id: TrackerId) -> bool {
        if self.slot(id).is_none() {
            return false;
        }

        self.slots[id.index] = None;
        self.live -= 1;
        true
    }

    pub(crate) fn live(&self) -> usize { self.live }

    /// Adjust every tracker to `edit` and return the watched ones it
    /// invalidated. Their watches are cleared.
    pub(crate) fn dispatch(&mut self, edit: &TextEdit) -> Vec<TrackerId> {
        let mut invalidated = Vec::new();

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(slot) = slot else {
                continue;
            };

            let before = slot.tracker.range();
            if slot.tracker.adjust(edit) && std::mem::take(&mut slot.watched) {
                invalidated.push(TrackerId {
                    index,
                    generation: self.generation,
                });
            }

            if before != slot.tracker.range() {
                trace!(
                    "Tracker #{}.{index} moved from {before:?} to {:?} by {edit}",
                    self.generation,
                    slot.tracker.range()
                );
            }
        }

        invalidated
    }
}
