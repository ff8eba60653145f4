//! Live text buffers with self-adjusting tracked ranges.

pub mod edit_dispatcher;
pub mod range_tracker;

use std::ops::Range;

use edit_dispatcher::{EditDispatcher, TrackerId};
use log::debug;
use range_tracker::TextEdit;

use crate::{
    errors::MergeError,
    utils::char_offsets::{byte_index, char_slice},
};

/// One of the texts of a merge. Offsets are character offsets.
///
/// The dispatcher forwarding edits to tracked ranges is created by the first
/// `track_range` and dropped again when the last tracker is released.
#[derive(Debug)]
pub struct Document {
    text: String,
    length: usize,
    writable: bool,
    dispatcher: Option<EditDispatcher>,
    next_generation: u64,
}

impl Document {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            length: text.chars().count(),
            text,
            writable: true,
            dispatcher: None,
            next_generation: 0,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str { &self.text }

    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize { self.length }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.length == 0 }

    #[must_use]
    pub fn is_writable(&self) -> bool { self.writable }

    pub fn set_writable(&mut self, writable: bool) { self.writable = writable; }

    /// # Errors
    ///
    /// Returns `MergeError::RangeOutOfBounds` if `range` isn't within the text.
    pub fn slice(&self, range: Range<usize>) -> Result<&str, MergeError> {
        self.check_bounds(&range)?;
        Ok(char_slice(&self.text, range.start, range.end))
    }

    fn check_bounds(&self, range: &Range<usize>) -> Result<(), MergeError> {
        if range.start > range.end || range.end > self.length {
            return Err(MergeError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                length: self.length,
            });
        }
        Ok(())
    }

    /// Replace the characters in `range` with `new_text` and adjust the
    /// tracked ranges. Returns the watched trackers this edit invalidated;
    /// they are no longer watched afterwards.
    ///
    /// # Errors
    ///
    /// Returns `MergeError::ReadOnlyDocument` if the document isn't writable
    /// and `MergeError::RangeOutOfBounds` if `range` isn't within the text.
    /// The document is left untouched in both cases.
    pub fn replace(
        &mut self,
        range: Range<usize>,
        new_text: &str,
    ) -> Result<Vec<TrackerId>, MergeError> {
        if !self.writable {
            return Err(MergeError::ReadOnlyDocument);
        }
        self.check_bounds(&range)?;

        let start_byte = byte_index(&self.text, range.start);
        let end_byte = start_byte + byte_index(&self.text[start_byte..], range.len());
        self.text.replace_range(start_byte..end_byte, new_text);

        let edit = TextEdit::new(&range, new_text.chars().count());
        self.length = self.length - edit.old_length + edit.new_length;

        Ok(self
            .dispatcher
            .as_mut()
            .map(|dispatcher| dispatcher.dispatch(&edit))
            .unwrap_or_default())
    }

    /// Start following `range` through future edits.
    ///
    /// # Errors
    ///
    /// Returns `MergeError::RangeOutOfBounds` if `range` isn't within the text.
    pub fn track_range(&mut self, range: Range<usize>) -> Result<TrackerId, MergeError> {
        self.check_bounds(&range)?;

        let dispatcher = self.dispatcher.get_or_insert_with(|| {
            let generation = self.next_generation;
            self.next_generation += 1;
            debug!("Creating edit dispatcher generation {generation}");
            EditDispatcher::new(generation)
        });

        Ok(dispatcher.track(range))
    }

    /// The current span of a tracker, `None` if it was invalidated or
    /// released.
    #[must_use]
    pub fn range(&self, id: TrackerId) -> Option<Range<usize>> {
        self.dispatcher.as_ref()?.tracker(id)?.range()
    }

    /// Have the `replace` invalidating `id` report it. Returns `false` if
    /// the tracker is unknown or already invalid.
    pub fn watch(&mut self, id: TrackerId) -> bool {
        self.dispatcher
            .as_mut()
            .is_some_and(|dispatcher| dispatcher.watch(id))
    }

    /// Stop tracking `id`. Releasing the last tracker drops the dispatcher.
    pub fn release(&mut self, id: TrackerId) {
        let Some(dispatcher) = &mut self.dispatcher else {
            return;
        };

        if dispatcher.release(id) && dispatcher.live() == 0 {
            debug!("Dropping edit dispatcher: no trackers left");
            self.dispatcher = None;
        }
    }

    /// Number of live (valid or invalidated but unreleased) trackers.
    #[must_use]
    pub fn tracker_count(&self) -> usize {
        self.dispatcher.as_ref().map_or(0, EditDispatcher::live)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_replace_moves_trackers() {
        let mut document = Document::new("hello world");
        let world = document.track_range(6..11).unwrap();

        document.replace(0..5, "goodbye").unwrap();

        assert_eq!(document.text(), "goodbye world");
        assert_eq!(document.len(), 13);
        assert_eq!(document.range(world), Some(8..13));
        assert_eq!(document.slice(8..13).unwrap(), "world");
    }

    #[test]
    fn test_multibyte_offsets() {
        let mut document = Document::new("ő\nű\n");
        let second = document.track_range(2..4).unwrap();

        document.replace(0..1, "ö😀").unwrap();

        assert_eq!(document.text(), "ö😀\nű\n");
        assert_eq!(document.range(second), Some(3..5));
        assert_eq!(document.slice(3..5).unwrap(), "ű\n");
    }

    #[test]
    fn test_invalidation_is_reported_to_watchers() {
        let mut document = Document::new("a\nb\nc\n");
        let watched = document.track_range(2..4).unwrap();
        assert!(document.watch(watched));

        assert_eq!(document.replace(0..2, "").unwrap(), vec![]);
        assert_eq!(document.replace(0..2, "").unwrap(), vec![watched]);
        assert_eq!(document.range(watched), None);
        assert!(!document.watch(watched));
    }

    #[test]
    fn test_read_only() {
        let mut document = Document::new("text");
        document.set_writable(false);

        assert_eq!(document.replace(0..1, "T"), Err(MergeError::ReadOnlyDocument));
        assert_eq!(document.text(), "text");
    }

    #[test]
    fn test_out_of_bounds() {
        let mut document = Document::new("text");

        assert_eq!(
            document.replace(2..9, ""),
            Err(MergeError::RangeOutOfBounds {
                start: 2,
                end: 9,
                length: 4
            })
        );
        assert!(document.track_range(5..5).is_err());
        assert!(document.slice(3..2).is_err());
    }

    #[test]
    fn test_dispatcher_lifecycle() {
        let mut document = Document::new("abc");
        assert_eq!(document.tracker_count(), 0);

        let first = document.track_range(0..1).unwrap();
        let second = document.track_range(1..2).unwrap();
        assert_eq!(document.tracker_count(), 2);

        document.release(first);
        document.release(first);
        assert_eq!(document.tracker_count(), 1);

        document.release(second);
        assert_eq!(document.tracker_count(), 0);

        let third = document.track_range(0..3).unwrap();
        assert_ne!(third, first);
        assert_eq!(document.range(first), None);
        assert_eq!(document.range(third), Some(0..3));
    }
}
