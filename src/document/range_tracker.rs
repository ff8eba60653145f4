use std::{fmt::Display, ops::Range};

/// A replacement of `old_length` characters at `offset` with `new_length`
/// characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    pub offset: usize,
    pub old_length: usize,
    pub new_length: usize,
}

impl TextEdit {
    #[must_use]
    pub fn new(range: &Range<usize>, new_length: usize) -> Self {
        Self {
            offset: range.start,
            old_length: range.len(),
            new_length,
        }
    }

    fn old_end(&self) -> usize { self.offset + self.old_length }

    fn shift(&self, position: usize) -> usize { position + self.new_length - self.old_length }
}

impl Display for TextEdit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}..{} -> {} characters",
            self.offset,
            self.old_end(),
            self.new_length
        )
    }
}

/// A span of a live document that follows the edits made to the document.
///
/// Once an edit destroys the span, the tracker becomes invalid and stays so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeTracker {
    range: Option<Range<usize>>,
}

impl RangeTracker {
    #[must_use]
    pub fn new(range: Range<usize>) -> Self { Self { range: Some(range) } }

    /// The current span, `None` once invalidated.
    #[must_use]
    pub fn range(&self) -> Option<Range<usize>> { self.range.clone() }

    #[must_use]
    pub fn is_valid(&self) -> bool { self.range.is_some() }

    /// Move the span to account for `edit`. Returns `true` if this edit
    /// invalidated the tracker.
    pub fn adjust(&mut self, edit: &TextEdit) -> bool {
        let Some(range) = &self.range else {
            return false;
        };

        let adjusted = adjust_range(range, edit);
        let invalidated = adjusted.is_none();
        self.range = adjusted;
        invalidated
    }
}

fn adjust_range(range: &Range<usize>, edit: &TextEdit) -> Option<Range<usize>> {
    let Range { start, end } = *range;

    if edit.old_length == 0 {
        return Some(if edit.offset <= start {
            edit.shift(start)..edit.shift(end)
        } else if edit.offset >= end {
            start..end
        } else {
            start..edit.shift(end)
        });
    }

    let edit_end = edit.old_end();

    if edit_end <= start {
        Some(edit.shift(start)..edit.shift(end))
    } else if edit.offset >= end {
        Some(start..end)
    } else if edit.offset >= start && edit_end <= end {
        let is_whole_span = edit.offset == start && edit_end == end;
        (!is_whole_span || edit.new_length > 0).then(|| start..edit.shift(end))
    } else if edit.offset < start && edit_end < end {
        Some(edit.offset + edit.new_length..edit.shift(end))
    } else if edit.offset > start && edit_end > end {
        Some(start..edit.offset)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    #[test_case(2, 0, 3, Some(7..11) ; "insertion before shifts")]
    #[test_case(4, 0, 3, Some(7..11) ; "insertion at start shifts")]
    #[test_case(6, 0, 3, Some(4..11) ; "insertion inside grows")]
    #[test_case(8, 0, 3, Some(4..8) ; "insertion at end is outside")]
    #[test_case(0, 2, 0, Some(2..6) ; "deletion before shifts")]
    #[test_case(0, 4, 1, Some(1..5) ; "replacement ending at start shifts")]
    #[test_case(8, 2, 0, Some(4..8) ; "deletion after is ignored")]
    #[test_case(5, 2, 0, Some(4..6) ; "deletion inside shrinks")]
    #[test_case(4, 2, 3, Some(4..9) ; "replacement touching start from inside")]
    #[test_case(6, 2, 0, Some(4..6) ; "deletion touching end from inside")]
    #[test_case(4, 4, 2, Some(4..6) ; "replacing the whole span rebinds")]
    #[test_case(4, 4, 0, None ; "deleting the whole span invalidates")]
    #[test_case(2, 4, 3, Some(5..7) ; "straddling the start clips the head")]
    #[test_case(6, 4, 1, Some(4..6) ; "straddling the end clips the tail")]
    #[test_case(2, 8, 0, None ; "covering deletion invalidates")]
    #[test_case(2, 6, 1, None ; "removing through the end invalidates")]
    #[test_case(4, 6, 5, None ; "removing from the start past the end invalidates")]
    fn test_adjust(
        offset: usize,
        old_length: usize,
        new_length: usize,
        expected: Option<Range<usize>>,
    ) {
        let mut tracker = RangeTracker::new(4..8);
        let edit = TextEdit {
            offset,
            old_length,
            new_length,
        };

        let invalidated = tracker.adjust(&edit);

        assert_eq!(tracker.range(), expected);
        assert_eq!(invalidated, expected.is_none());
    }

    #[test]
    fn test_empty_span() {
        let mut tracker = RangeTracker::new(4..4);

        tracker.adjust(&TextEdit::new(&(4..4), 2));
        assert_eq!(tracker.range(), Some(6..6));

        tracker.adjust(&TextEdit::new(&(6..8), 0));
        assert_eq!(tracker.range(), Some(6..6));

        assert!(tracker.adjust(&TextEdit::new(&(5..7), 0)));
        assert!(!tracker.is_valid());
    }

    #[test]
    fn test_invalid_tracker_stays_invalid() {
        let mut tracker = RangeTracker::new(0..2);

        assert!(tracker.adjust(&TextEdit::new(&(0..2), 0)));
        assert!(!tracker.adjust(&TextEdit::new(&(0..0), 2)));
        assert_eq!(tracker.range(), None);
    }
}
