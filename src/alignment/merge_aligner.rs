//! Combines the equal runs of (base, left) and (base, right) into a single
//! ordered partition of the base text.
//!
//! The aligner keeps three cursors, one per text, marking how far the
//! partition has been built. A queued pair is _aligned_ when it starts exactly
//! at the base cursor and at its branch's cursor. Whenever both queues have a
//! front pair, the first applicable rule fires:
//!
//! 1. both fronts are aligned: the texts agree, all cursors advance by the
//!    shorter run;
//! 2. one front is aligned and reaches the other side's next run: only the
//!    other side edited the text in between;
//! 3. otherwise an insertion on one side that precedes the other side's edit
//!    is emitted alone, and everything else becomes a conflict extending to
//!    the first base offset where both sides are equal to base again.
//!
//! Pairs may be added in any interleaving of the two streams as long as each
//! stream is ascending. They are only queued by `add`: the partition is built
//! by `finish`, once the runs can be checked against the text lengths.

use std::collections::VecDeque;

use log::{debug, trace, warn};

use crate::{
    Side,
    alignment::fragment::Fragment,
    diffs::equal_pair::EqualPair,
    utils::merge_ascending::MergeSorted as _,
};

#[derive(Debug, Default)]
pub struct MergeAligner {
    queues: [VecDeque<EqualPair>; 2],

    /// Base and branch end of the last accepted pair per side.
    accepted: [Option<(usize, usize)>; 2],

    processed_base: usize,
    processed: [usize; 2],

    base_length: usize,
    fragments: Vec<Fragment>,
}

enum Coverage {
    /// The offset is inside (or at the start of) an equal run which maps it
    /// to this branch offset.
    Covered(usize),

    /// The offset falls into an edit of the branch that lasts until here.
    GapUntil(usize),

    Unknown,
}

impl MergeAligner {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Queue the next equal run of `pair.side`.
    ///
    /// Pairs must be ascending within their stream. Overlapping pairs lose
    /// their overlapping prefix and pairs with mismatching base and branch
    /// lengths are truncated; both are logged and never fail.
    pub fn add(&mut self, pair: EqualPair) {
        let Some(pair) = self.accept(pair) else {
            return;
        };

        let queue = &mut self.queues[pair.side.index()];
        match queue.back_mut() {
            Some(last)
                if last.base.end == pair.base.start && last.branch.end == pair.branch.start =>
            {
                last.base.end = pair.base.end;
                last.branch.end = pair.branch.end;
            }
            _ => queue.push_back(pair),
        }
    }

    /// Close both streams at the end of the texts and return the complete
    /// partition. Queued runs reaching past the given lengths are clipped.
    #[must_use]
    pub fn finish(
        mut self,
        left_length: usize,
        base_length: usize,
        right_length: usize,
    ) -> Vec<Fragment> {
        for (side, branch_length) in [(Side::Left, left_length), (Side::Right, right_length)] {
            let queue = &mut self.queues[side.index()];
            *queue = std::mem::take(queue)
                .into_iter()
                .filter_map(|pair| clip(pair, base_length, branch_length))
                .collect();
            queue.push_back(EqualPair::terminal(side, base_length, branch_length));
        }

        self.base_length = base_length;
        self.run();

        debug!(
            "Aligned {base_length} base characters into {} fragments ({} conflicts)",
            self.fragments.len(),
            self.fragments.iter().filter(|fragment| fragment.is_conflict()).count()
        );

        self.fragments
    }

    fn accept(&mut self, mut pair: EqualPair) -> Option<EqualPair> {
        if pair.base.len() != pair.branch.len() {
            warn!("Truncating {pair} to its shorter range: base and branch lengths differ");
            let length = pair.len();
            pair.base.end = pair.base.start + length;
            pair.branch.end = pair.branch.start + length;
        }

        let accepted = &mut self.accepted[pair.side.index()];
        if let Some((base_end, branch_end)) = *accepted {
            let overlap = base_end
                .saturating_sub(pair.base.start)
                .max(branch_end.saturating_sub(pair.branch.start));

            if overlap > 0 {
                warn!("Trimming {overlap} characters off {pair}: it overlaps the previous run");
                pair.trim_start(overlap);
            }
        }

        if pair.is_empty() {
            trace!("Ignoring empty run {pair}");
            return None;
        }

        *accepted = Some((pair.base.end, pair.branch.end));
        Some(pair)
    }

    fn run(&mut self) { while self.step() {} }

    fn step(&mut self) -> bool {
        self.discard_processed();

        let aligned = Side::BOTH.map(|side| self.front(side).map(|pair| self.is_aligned(pair)));
        let [Some(left_aligned), Some(right_aligned)] = aligned else {
            return false;
        };

        match (left_aligned, right_aligned) {
            (true, true) => self.advance_equal(),
            (true, false) => self.emit_single_side(Side::Left) || self.emit_conflict(),
            (false, true) => self.emit_single_side(Side::Right) || self.emit_conflict(),
            (false, false) => self.emit_disjoint_insertion() || self.emit_conflict(),
        }
    }

    /// Drop the parts of the queued runs that are behind the cursors. The
    /// empty terminal runs are never dropped.
    fn discard_processed(&mut self) {
        for side in Side::BOTH {
            let processed = self.processed[side.index()];
            let queue = &mut self.queues[side.index()];

            while let Some(front) = queue.front_mut() {
                let behind = self
                    .processed_base
                    .saturating_sub(front.base.start)
                    .max(processed.saturating_sub(front.branch.start));

                if behind == 0 || front.is_empty() {
                    break;
                }

                if behind >= front.len() {
                    queue.pop_front();
                } else {
                    front.trim_start(behind);
                    break;
                }
            }
        }
    }

    fn front(&self, side: Side) -> Option<&EqualPair> { self.queues[side.index()].front() }

    fn is_aligned(&self, pair: &EqualPair) -> bool {
        pair.base.start == self.processed_base
            && pair.branch.start == self.processed[pair.side.index()]
    }

    fn advance_equal(&mut self) -> bool {
        let step = Side::BOTH
            .iter()
            .filter_map(|&side| self.front(side))
            .map(EqualPair::len)
            .min()
            .unwrap_or(0);

        if step == 0 {
            return false;
        }

        self.processed_base += step;
        for processed in &mut self.processed {
            *processed += step;
        }

        true
    }

    /// `aligned` is equal to base until at least the start of the other
    /// side's next run, so only the other side changed the text before it.
    fn emit_single_side(&mut self, aligned: Side) -> bool {
        let changed = aligned.other();
        let (Some(equal), Some(next)) = (self.front(aligned), self.front(changed)) else {
            return false;
        };

        if equal.base.end < next.base.start {
            return false;
        }

        let base = self.processed_base..next.base.start;
        let branch = self.processed[changed.index()]..next.branch.start;

        self.processed_base = base.end;
        self.processed[changed.index()] = branch.end;
        self.processed[aligned.index()] += base.len();

        self.push(Fragment::single_side(changed, base, branch));
        true
    }

    /// A pure insertion at the base cursor doesn't overlap an edit of the
    /// other side that starts there but spans some base text.
    fn emit_disjoint_insertion(&mut self) -> bool {
        let gaps = Side::BOTH.map(|side| {
            self.front(side)
                .map(|pair| pair.base.start > self.processed_base)
        });

        let inserting = match gaps {
            [Some(false), Some(true)] => Side::Left,
            [Some(true), Some(false)] => Side::Right,
            _ => return false,
        };

        let Some(next) = self.front(inserting) else {
            return false;
        };

        let base = self.processed_base..self.processed_base;
        let branch = self.processed[inserting.index()]..next.branch.start;
        self.processed[inserting.index()] = branch.end;

        self.push(Fragment::single_side(inserting, base, branch));
        true
    }

    fn emit_conflict(&mut self) -> bool {
        let mut end = Side::BOTH
            .iter()
            .filter_map(|&side| self.front(side))
            .filter(|pair| !self.is_aligned(pair))
            .map(|pair| pair.base.start)
            .max()
            .unwrap_or(self.processed_base);

        let (left_end, right_end) = loop {
            match (self.coverage(Side::Left, end), self.coverage(Side::Right, end)) {
                (Coverage::Covered(left), Coverage::Covered(right)) => break (left, right),
                (Coverage::GapUntil(next), _) | (_, Coverage::GapUntil(next)) => end = next,
                _ => return false,
            }
        };

        let base = self.processed_base..end;
        let left = self.processed[Side::Left.index()]..left_end;
        let right = self.processed[Side::Right.index()]..right_end;

        self.processed_base = end;
        self.processed = [left_end, right_end];

        let fragment = if base.is_empty() && self.base_length == end {
            Fragment::TrailingInsert { base, left, right }
        } else {
            Fragment::Conflict { base, left, right }
        };

        self.push(fragment);
        true
    }

    fn coverage(&self, side: Side, offset: usize) -> Coverage {
        for pair in &self.queues[side.index()] {
            if pair.base.start > offset {
                return Coverage::GapUntil(pair.base.start);
            }

            if offset < pair.base.end || pair.is_empty() {
                return Coverage::Covered(pair.branch_offset_at(offset));
            }
        }

        Coverage::Unknown
    }

    fn push(&mut self, fragment: Fragment) {
        trace!("Emitting {fragment}");
        self.fragments.push(fragment);
    }
}

/// Cut `pair` so that it fits into texts of the given lengths.
fn clip(mut pair: EqualPair, base_length: usize, branch_length: usize) -> Option<EqualPair> {
    let length = pair
        .len()
        .min(base_length.saturating_sub(pair.base.start))
        .min(branch_length.saturating_sub(pair.branch.start));

    if length < pair.len() {
        warn!("Clipping {pair} to the end of the texts");
        pair.base.end = pair.base.start + length;
        pair.branch.end = pair.branch.start + length;
    }

    (!pair.is_empty()).then_some(pair)
}

/// Align two complete streams of equal runs. Runs reaching past the given
/// text lengths are clipped.
#[must_use]
pub fn align(
    left_pairs: Vec<EqualPair>,
    right_pairs: Vec<EqualPair>,
    left_length: usize,
    base_length: usize,
    right_length: usize,
) -> Vec<Fragment> {
    let stream = |pairs: Vec<EqualPair>, side: Side, branch_length: usize| {
        pairs
            .into_iter()
            .filter_map(move |pair| clip(EqualPair { side, ..pair }, base_length, branch_length))
    };

    let mut aligner = MergeAligner::new();
    stream(left_pairs, Side::Left, left_length)
        .merge_sorted_by_key(stream(right_pairs, Side::Right, right_length), |pair| {
            pair.base.start
        })
        .for_each(|pair| aligner.add(pair));

    aligner.finish(left_length, base_length, right_length)
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;
    use crate::{
        MergeConfig,
        diffs::differencer::{Differencer as _, TokenDifferencer},
        utils::char_offsets::char_slice,
    };

    fn pairs(base: &str, left: &str, right: &str) -> (Vec<EqualPair>, Vec<EqualPair>) {
        let differencer = TokenDifferencer::new(&MergeConfig::default());
        (
            differencer.equal_pairs(base, left, Side::Left).unwrap(),
            differencer.equal_pairs(base, right, Side::Right).unwrap(),
        )
    }

    fn fragments(base: &str, left: &str, right: &str) -> Vec<Fragment> {
        let (left_pairs, right_pairs) = pairs(base, left, right);
        align(
            left_pairs,
            right_pairs,
            left.chars().count(),
            base.chars().count(),
            right.chars().count(),
        )
    }

    fn render(fragments: &[Fragment]) -> String {
        fragments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Rebuild `branch` from base and the fragments: outside of the
    /// fragments, and inside those `side` didn't edit, the texts are equal.
    fn rebuild(fragments: &[Fragment], base: &str, branch: &str, side: Side) -> String {
        let mut result = String::new();
        let mut base_offset = 0;

        for fragment in fragments {
            let range = fragment.base_range();
            assert!(range.start >= base_offset, "fragments overlap or go backwards");

            result.push_str(char_slice(base, base_offset, range.start));
            match fragment.edited_range(side) {
                Some(edited) => result.push_str(char_slice(branch, edited.start, edited.end)),
                None => result.push_str(char_slice(base, range.start, range.end)),
            }
            base_offset = range.end;
        }

        result.push_str(char_slice(base, base_offset, base.chars().count()));
        result
    }

    #[test]
    fn test_edits_on_different_lines() {
        assert_snapshot!(render(&fragments("A\nB\nC\n", "A\nX\nC\n", "A\nB\nC\nD\n")), @r"
        LeftChange base=2..4 left=2..4
        RightChange base=6..6 right=6..8
        ");
    }

    #[test]
    fn test_edits_on_the_same_line() {
        assert_snapshot!(
            render(&fragments("A\nB\nC\n", "A\nX\nC\n", "A\nY\nC\n")),
            @"Conflict base=2..4 left=2..4 right=2..4"
        );
    }

    #[test]
    fn test_insert_into_empty_base() {
        assert_eq!(
            fragments("", "foo", ""),
            vec![Fragment::LeftChange {
                base: 0..0,
                left: 0..3
            }]
        );
    }

    #[test_case("" ; "empty")]
    #[test_case("single line" ; "no terminator")]
    #[test_case("a\nb\nc\n" ; "lines")]
    fn test_identical_texts(text: &str) {
        assert_eq!(fragments(text, text, text), vec![]);
    }

    #[test]
    fn test_identical_edits_conflict() {
        assert_snapshot!(
            render(&fragments("a\nb\nc\n", "a\nx\nc\n", "a\nx\nc\n")),
            @"Conflict base=2..4 left=2..4 right=2..4"
        );
    }

    #[test]
    fn test_insertions_at_the_same_point() {
        assert_snapshot!(
            render(&fragments("a\nb\n", "a\nx\nb\n", "a\ny\nb\n")),
            @"Conflict base=2..2 left=2..4 right=2..4"
        );
    }

    #[test]
    fn test_insertions_at_the_end() {
        assert_snapshot!(
            render(&fragments("a\n", "a\nx\n", "a\ny\n")),
            @"TrailingInsert base=2..2 left=2..4 right=2..4"
        );
    }

    #[test]
    fn test_insertion_at_the_boundary_of_a_deletion() {
        assert_snapshot!(render(&fragments("a\nb\nc\n", "a\nx\nb\nc\n", "a\nc\n")), @r"
        LeftChange base=2..2 left=2..4
        RightChange base=2..4 right=2..2
        ");
    }

    #[test]
    fn test_conflict_extends_over_overlapping_edits() {
        assert_snapshot!(
            render(&fragments("a\nb\nc\nd\n", "a\nX\nY\nd\n", "a\nb\nZ\nd\n")),
            @"Conflict base=2..6 left=2..6 right=2..6"
        );
    }

    #[test]
    fn test_trailing_edits() {
        assert_snapshot!(
            render(&fragments("a\nb", "a\nc", "a\nd")),
            @"Conflict base=2..3 left=2..3 right=2..3"
        );
        assert_snapshot!(
            render(&fragments("a\nb", "a\nb", "a\n")),
            @"RightChange base=2..3 right=2..2"
        );
    }

    #[test_case("a\nb\nc\n", "a\nb\nc\n", "x\na\nb\nc\n" ; "right prepends")]
    #[test_case("a\nb\nc\nd\ne\n", "a\nB\nc\nd\nE\n", "a\nb\nC\nd\ne\nf\n" ; "interleaved edits")]
    #[test_case("a\nb\nc\n", "", "a\nb\nc\n" ; "left deletes everything")]
    #[test_case("a\nb\nc\n", "c\nb\na\n", "b\n" ; "heavy rewrite")]
    #[test_case("", "x\n", "y\n" ; "both fill an empty base")]
    #[test_case("árvíztűrő\ntükörfúrógép\n", "árvíztűrő\n", "ÁRVÍZTŰRŐ\ntükörfúrógép\nü\n" ; "multibyte")]
    fn test_fragments_partition_the_texts(base: &str, left: &str, right: &str) {
        let fragments = fragments(base, left, right);

        assert_eq!(rebuild(&fragments, base, left, Side::Left), left);
        assert_eq!(rebuild(&fragments, base, right, Side::Right), right);
    }

    #[test]
    fn test_interleaving_does_not_matter() {
        let base = "a\nb\nc\nd\ne\n";
        let left = "a\nX\nc\nd\ne\n";
        let right = "a\nb\nc\nY\ne\nf\n";
        let (left_pairs, right_pairs) = pairs(base, left, right);

        let mut aligner = MergeAligner::new();
        right_pairs
            .iter()
            .chain(&left_pairs)
            .cloned()
            .for_each(|pair| aligner.add(pair));

        assert_eq!(
            aligner.finish(left.len(), base.len(), right.len()),
            fragments(base, left, right)
        );
    }

    #[test]
    fn test_inconsistent_runs_are_repaired() {
        let mut aligner = MergeAligner::new();

        aligner.add(EqualPair::new(Side::Left, 0, 0, 4));
        aligner.add(EqualPair::new(Side::Left, 2, 2, 4));
        aligner.add(EqualPair::new(Side::Left, 1, 1, 1));
        aligner.add(EqualPair {
            side: Side::Right,
            base: 0..6,
            branch: 0..3,
        });

        assert_eq!(
            aligner.finish(6, 6, 6),
            vec![Fragment::RightChange {
                base: 3..6,
                right: 3..6
            }]
        );
    }

    #[test]
    fn test_streamed_runs_past_the_end_are_clipped() {
        let mut aligner = MergeAligner::new();

        aligner.add(EqualPair {
            side: Side::Right,
            base: 6..8,
            branch: 2..6,
        });
        aligner.add(EqualPair::new(Side::Left, 7, 4, 4));

        assert_eq!(
            aligner.finish(2, 10, 10),
            vec![Fragment::Conflict {
                base: 0..10,
                left: 0..2,
                right: 0..10
            }]
        );
    }

    #[test]
    fn test_runs_past_the_end_are_clipped() {
        let fragments = align(
            vec![EqualPair::new(Side::Left, 0, 0, 10)],
            vec![EqualPair::new(Side::Right, 0, 0, 2)],
            4,
            4,
            3,
        );

        assert_eq!(
            fragments,
            vec![Fragment::RightChange {
                base: 2..4,
                right: 2..3
            }]
        );
    }
}
