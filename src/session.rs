//! A merge in progress: three live documents and the changes between them.
//!
//! Every change is bound to its texts through trackers that follow the edits
//! of the documents, so the session never re-runs the diff. Changes whose
//! ranges get destroyed by an edit are removed on the spot.

use std::ops::Range;

use log::debug;

use crate::{
    Change, ChangeEvent, ChangeId, ChangeKind, ChangeList, ChangeStatus, ConflictId, Document,
    Fragment, MergeConfig, MergeConflict, Side, TextRole,
    alignment::merge_aligner::align,
    diffs::differencer::{Differencer, TokenDifferencer},
    document::edit_dispatcher::TrackerId,
    errors::MergeError,
};

/// Diff `left` and `right` against `base` with the built-in differencer and
/// start a merge session.
///
/// # Errors
///
/// Returns `MergeError::TooLarge` if the texts exceed `config.max_tokens`.
pub fn build_merge(
    base: &str,
    left: &str,
    right: &str,
    config: &MergeConfig,
) -> Result<MergeSession, MergeError> {
    build_merge_with(&TokenDifferencer::new(config), base, left, right)
}

/// Like [`build_merge`] but with a custom differencer.
///
/// # Errors
///
/// Returns the differencer's error; no session is created in that case.
pub fn build_merge_with<D>(
    differencer: &D,
    base: &str,
    left: &str,
    right: &str,
) -> Result<MergeSession, MergeError>
where
    D: Differencer + ?Sized,
{
    let left_pairs = differencer.equal_pairs(base, left, Side::Left)?;
    let right_pairs = differencer.equal_pairs(base, right, Side::Right)?;

    let fragments = align(
        left_pairs,
        right_pairs,
        left.chars().count(),
        base.chars().count(),
        right.chars().count(),
    );

    MergeSession::from_fragments(base, left, right, &fragments)
}

#[derive(Debug)]
pub struct MergeSession {
    documents: [Document; 3],
    changes: Vec<Option<Change>>,
    conflicts: Vec<MergeConflict>,
    lists: [ChangeList; 2],
}

impl MergeSession {
    /// Start a session from an already computed partition.
    ///
    /// # Errors
    ///
    /// Returns `MergeError::RangeOutOfBounds` if a fragment doesn't fit into
    /// the texts.
    pub fn from_fragments(
        base: &str,
        left: &str,
        right: &str,
        fragments: &[Fragment],
    ) -> Result<Self, MergeError> {
        let mut session = Self {
            documents: [Document::new(left), Document::new(base), Document::new(right)],
            changes: Vec::new(),
            conflicts: Vec::new(),
            lists: [ChangeList::new(Side::Left), ChangeList::new(Side::Right)],
        };

        session.build_changes(fragments)?;
        session.finish_operation();

        debug!(
            "Built merge with {} left and {} right changes, {} conflicts",
            session.lists[Side::Left.index()].count(),
            session.lists[Side::Right.index()].count(),
            session.conflicts.len()
        );

        Ok(session)
    }

    fn build_changes(&mut self, fragments: &[Fragment]) -> Result<(), MergeError> {
        for fragment in fragments {
            match fragment {
                Fragment::LeftChange { base, left } => {
                    self.add_change(Side::Left, base.clone(), left.clone(), None)?;
                }
                Fragment::RightChange { base, right } => {
                    self.add_change(Side::Right, base.clone(), right.clone(), None)?;
                }
                Fragment::Conflict { base, left, right } => {
                    let id = ConflictId(self.conflicts.len());
                    let base_tracker = self.track(TextRole::Base, base.clone())?;

                    let shared = Some((id, base_tracker));
                    let left = self.add_change(Side::Left, base.clone(), left.clone(), shared)?;
                    let right = self.add_change(Side::Right, base.clone(), right.clone(), shared)?;

                    self.conflicts
                        .push(MergeConflict::new(id, left, right, base_tracker));
                }
                Fragment::TrailingInsert { base, left, right } => {
                    self.add_change(Side::Left, base.clone(), left.clone(), None)?;
                    self.add_change(Side::Right, base.clone(), right.clone(), None)?;
                }
            }
        }

        Ok(())
    }

    fn track(&mut self, role: TextRole, range: Range<usize>) -> Result<TrackerId, MergeError> {
        let document = &mut self.documents[role.index()];
        let tracker = document.track_range(range)?;
        document.watch(tracker);
        Ok(tracker)
    }

    fn add_change(
        &mut self,
        side: Side,
        base: Range<usize>,
        branch: Range<usize>,
        conflict: Option<(ConflictId, TrackerId)>,
    ) -> Result<ChangeId, MergeError> {
        let side_tracker = self.track(side.role(), branch.clone())?;
        let (kind, base_tracker, conflict) = match conflict {
            Some((id, tracker)) => (ChangeKind::Conflict, tracker, Some(id)),
            None => (
                ChangeKind::from_ranges(&base, &branch),
                self.track(TextRole::Base, base)?,
                None,
            ),
        };

        let id = ChangeId(self.changes.len());
        self.changes.push(Some(Change {
            id,
            side,
            kind,
            status: ChangeStatus::Pending,
            side_tracker,
            base_tracker,
            conflict,
        }));
        self.lists[side.index()].push_pending(id, conflict.is_some());

        Ok(id)
    }

    #[must_use]
    pub fn document(&self, role: TextRole) -> &Document { &self.documents[role.index()] }

    pub fn set_writable(&mut self, role: TextRole, writable: bool) {
        self.documents[role.index()].set_writable(writable);
    }

    #[must_use]
    pub fn change_list(&self, side: Side) -> &ChangeList { &self.lists[side.index()] }

    /// A live change, pending or applied.
    #[must_use]
    pub fn change(&self, id: ChangeId) -> Option<&Change> { self.changes.get(id.0)?.as_ref() }

    pub fn changes(&self) -> impl Iterator<Item = &Change> + '_ { self.changes.iter().flatten() }

    #[must_use]
    pub fn conflict(&self, id: ConflictId) -> Option<&MergeConflict> { self.conflicts.get(id.0) }

    pub fn conflicts(&self) -> impl Iterator<Item = &MergeConflict> + '_ { self.conflicts.iter() }

    /// Current span of a change in `role`'s document.
    #[must_use]
    pub fn range(&self, id: ChangeId, role: TextRole) -> Option<Range<usize>> {
        let tracker = self.change(id)?.tracker(role)?;
        self.documents[role.index()].range(tracker)
    }

    #[must_use]
    pub fn text(&self, id: ChangeId, role: TextRole) -> Option<&str> {
        let range = self.range(id, role)?;
        self.documents[role.index()].slice(range).ok()
    }

    /// True once neither side has pending changes and every conflict is
    /// closed.
    #[must_use]
    pub fn is_fully_merged(&self) -> bool {
        self.lists.iter().all(|list| list.count() == 0)
            && self.conflicts.iter().all(MergeConflict::is_closed)
    }

    /// Call `listener` synchronously with every event of `side`'s list.
    pub fn subscribe(&mut self, side: Side, listener: impl FnMut(&ChangeEvent) + 'static) {
        self.lists[side.index()].subscribe(Box::new(listener));
    }

    /// Copy the text of a pending change from `from` into the other document
    /// of the change: from its side into base to take the change, or from
    /// base into its side to revert it.
    ///
    /// Taking one half of a conflict closes the conflict and marks the other
    /// half applied too. Reverting one half resolves only that side, the
    /// other half becomes an ordinary change.
    ///
    /// # Errors
    ///
    /// Fails without modifying anything if the change isn't live or pending,
    /// if `from` is the other side or if the target document is read-only.
    pub fn apply(&mut self, id: ChangeId, from: TextRole) -> Result<(), MergeError> {
        let change = self.change(id).ok_or(MergeError::UnknownChange(id))?;
        if !change.is_pending() {
            return Err(MergeError::ChangeNotPending(id));
        }

        let side = change.side;
        let (target, source_tracker, target_tracker) = if from == side.role() {
            (TextRole::Base, change.side_tracker, change.base_tracker)
        } else if from == TextRole::Base {
            (side.role(), change.base_tracker, change.side_tracker)
        } else {
            return Err(MergeError::InvalidSourceRole { change: id, role: from });
        };
        let (kind, conflict) = (change.kind, change.conflict);

        let source_range = self.documents[from.index()]
            .range(source_tracker)
            .ok_or(MergeError::UnknownChange(id))?;
        let target_range = self.documents[target.index()]
            .range(target_tracker)
            .ok_or(MergeError::UnknownChange(id))?;
        let text = self.documents[from.index()].slice(source_range)?.to_owned();

        let document = &mut self.documents[target.index()];
        if !document.is_writable() {
            return Err(MergeError::ReadOnlyDocument);
        }

        document.release(target_tracker);
        let invalidated = document.replace(target_range.clone(), &text)?;
        let written = target_range.start..target_range.start + text.chars().count();
        let tracker = self.track(target, written)?;
        self.rebind(id, target, target_tracker, tracker);

        debug!("Applied change {id} from {from}: {target_range:?} of {target} now reads {text:?}");
        self.mark_applied(id);

        if let Some(conflict) = conflict {
            let sibling = self.conflicts[conflict.0].change(side.other());

            if kind != ChangeKind::Conflict {
                self.conflicts[conflict.0].resolve(side);
            } else if target == TextRole::Base {
                if self.change(sibling).is_some_and(Change::is_pending) {
                    self.mark_applied(sibling);
                }
                self.conflicts[conflict.0].close();
            } else {
                self.conflicts[conflict.0].resolve(side);
                self.degenerate(sibling);
            }
        }

        self.handle_invalidated(target, &invalidated);
        self.finish_operation();

        Ok(())
    }

    /// Point every holder of the released `old` tracker at `new`. Conflict
    /// halves share their base tracker.
    fn rebind(&mut self, id: ChangeId, role: TextRole, old: TrackerId, new: TrackerId) {
        let Some(change) = self.changes[id.0].as_mut() else {
            return;
        };
        change.set_tracker(role, new);

        if role != TextRole::Base {
            return;
        }

        let Some(conflict) = change.conflict else {
            return;
        };
        let conflict = &mut self.conflicts[conflict.0];
        if conflict.base_tracker() == old {
            conflict.set_base_tracker(new);
        }

        for side in Side::BOTH {
            let holder = conflict.change(side);
            if let Some(change) = self.changes[holder.0].as_mut() {
                if change.base_tracker == old {
                    change.base_tracker = new;
                }
            }
        }
    }

    fn mark_applied(&mut self, id: ChangeId) {
        let Some(change) = self.changes[id.0].as_mut() else {
            return;
        };
        change.status = ChangeStatus::Applied;

        let list = &mut self.lists[change.side.index()];
        list.mark_applied(id);
        list.notify(&ChangeEvent::Applied(id));
    }

    /// Turn the pending half of a conflict into an ordinary change whose
    /// kind follows from its current ranges.
    fn degenerate(&mut self, id: ChangeId) {
        let Some(change) = self.change(id) else {
            return;
        };
        if !change.is_conflict() || !change.is_pending() {
            return;
        }

        let side = change.side;
        let kind = match (self.range(id, TextRole::Base), self.range(id, side.role())) {
            (Some(base), Some(branch)) => ChangeKind::from_ranges(&base, &branch),
            _ => ChangeKind::Modify,
        };

        if let Some(change) = self.changes[id.0].as_mut() {
            change.kind = kind;
        }

        debug!("Change {id} is no longer part of a conflict, it's a {kind} change now");
        let list = &mut self.lists[side.index()];
        list.clear_conflict(id);
        list.notify(&ChangeEvent::Degenerated { change: id, kind });
    }

    /// Drop a pending or applied change without touching the texts.
    ///
    /// Removing one half of an open conflict resolves that side; the other
    /// half becomes an ordinary change.
    ///
    /// # Errors
    ///
    /// Returns `MergeError::UnknownChange` if the change isn't live.
    pub fn remove(&mut self, id: ChangeId) -> Result<(), MergeError> {
        if self.change(id).is_none() {
            return Err(MergeError::UnknownChange(id));
        }

        self.remove_change(id, true);
        self.finish_operation();

        Ok(())
    }

    /// The live other half of `change`'s conflict.
    fn sibling(&self, change: &Change) -> Option<ChangeId> {
        let conflict = self.conflicts.get(change.conflict?.0)?;
        let sibling = conflict.change(change.side.other());
        self.change(sibling).map(Change::id)
    }

    fn remove_change(&mut self, id: ChangeId, degenerate_sibling: bool) {
        let Some(change) = self.changes.get_mut(id.0).and_then(Option::take) else {
            return;
        };

        let list = &mut self.lists[change.side.index()];
        list.remove(id);
        list.notify(&ChangeEvent::Removed(id));

        let sibling = self.sibling(&change);
        let shares_base_tracker = sibling
            .and_then(|sibling| self.change(sibling))
            .is_some_and(|sibling| sibling.base_tracker == change.base_tracker);

        self.documents[change.side.role().index()].release(change.side_tracker);
        if !shares_base_tracker {
            self.documents[TextRole::Base.index()].release(change.base_tracker);
        }

        if let Some(conflict) = change.conflict {
            match sibling {
                Some(sibling) => {
                    self.conflicts[conflict.0].resolve(change.side);
                    if degenerate_sibling {
                        self.degenerate(sibling);
                    }
                }
                None => self.conflicts[conflict.0].close(),
            }
        }

        debug!("Removed {change}");
    }

    /// Replace `range` of `role`'s document with `text`. Changes whose
    /// ranges this destroys are removed.
    ///
    /// # Errors
    ///
    /// Returns the document's error if it's read-only or `range` is out of
    /// bounds.
    pub fn edit(
        &mut self,
        role: TextRole,
        range: Range<usize>,
        text: &str,
    ) -> Result<(), MergeError> {
        let invalidated = self.documents[role.index()].replace(range, text)?;
        self.handle_invalidated(role, &invalidated);
        self.finish_operation();

        Ok(())
    }

    fn handle_invalidated(&mut self, role: TextRole, trackers: &[TrackerId]) {
        if trackers.is_empty() {
            return;
        }

        let affected: Vec<ChangeId> = self
            .changes()
            .filter(|change| {
                change
                    .tracker(role)
                    .is_some_and(|tracker| trackers.contains(&tracker))
            })
            .map(Change::id)
            .collect();

        for &id in &affected {
            let Some(change) = self.change(id) else {
                continue;
            };

            let degenerate_sibling = !self
                .sibling(change)
                .is_some_and(|sibling| affected.contains(&sibling));

            debug!("Change {id} lost its range in {role}");
            self.remove_change(id, degenerate_sibling);
        }
    }

    fn finish_operation(&mut self) {
        let Self {
            documents,
            changes,
            lists,
            ..
        } = self;

        for list in lists.iter_mut() {
            list.sort_by_key(|id| order_key(documents, changes.get(id.0).and_then(Option::as_ref)));
            list.notify_counts();
        }
    }

    /// Apply every pending change that isn't part of a conflict, from its own
    /// side. `TextRole::Base` stands for both sides. Returns the number of
    /// applied changes.
    ///
    /// # Errors
    ///
    /// Stops at the first change that can't be applied and returns its
    /// error. The changes applied before it stay applied.
    pub fn apply_non_conflicted(&mut self, from: TextRole) -> Result<usize, MergeError> {
        let mut applied = 0;

        for &side in sides_of(from) {
            let candidates: Vec<ChangeId> = self.non_conflicted(side).collect();
            for id in candidates {
                if self
                    .change(id)
                    .is_some_and(|change| change.is_pending() && !change.is_conflict())
                {
                    self.apply(id, side.role())?;
                    applied += 1;
                }
            }
        }

        debug!("Applied {applied} non-conflicting changes from {from}");
        Ok(applied)
    }

    #[must_use]
    pub fn has_non_conflicted(&self, role: TextRole) -> bool {
        sides_of(role)
            .iter()
            .any(|&side| self.non_conflicted(side).next().is_some())
    }

    fn non_conflicted(&self, side: Side) -> impl Iterator<Item = ChangeId> + '_ {
        self.lists[side.index()]
            .pending()
            .filter(|&id| self.change(id).is_some_and(|change| !change.is_conflict()))
    }

    #[must_use]
    pub fn first_pending(&self, side: Side) -> Option<ChangeId> {
        self.lists[side.index()].pending().next()
    }

    /// The pending change of `side` following `after` in list order. `after`
    /// doesn't have to be pending itself.
    #[must_use]
    pub fn next_pending(&self, side: Side, after: ChangeId) -> Option<ChangeId> {
        let list = &self.lists[side.index()];
        if list.is_pending(after) {
            return list.pending().skip_while(|&id| id != after).nth(1);
        }

        let key = order_key(&self.documents, self.change(after));
        list.pending()
            .find(|&id| order_key(&self.documents, self.change(id)) > key)
    }

    #[must_use]
    pub fn previous_pending(&self, side: Side, before: ChangeId) -> Option<ChangeId> {
        let list = &self.lists[side.index()];
        if list.is_pending(before) {
            return list.pending().take_while(|&id| id != before).last();
        }

        let key = order_key(&self.documents, self.change(before));
        list.pending()
            .filter(|&id| order_key(&self.documents, self.change(id)) < key)
            .last()
    }
}

/// Position of a change in its side's text, then in base. Dead changes sort
/// last.
fn order_key(documents: &[Document; 3], change: Option<&Change>) -> (usize, usize) {
    let start = |role: TextRole, tracker: TrackerId| {
        documents[role.index()]
            .range(tracker)
            .map_or(usize::MAX, |range| range.start)
    };

    change.map_or((usize::MAX, usize::MAX), |change| {
        (
            start(change.side.role(), change.side_tracker),
            start(TextRole::Base, change.base_tracker),
        )
    })
}

fn sides_of(role: TextRole) -> &'static [Side] {
    match role.side() {
        Some(Side::Left) => &[Side::Left],
        Some(Side::Right) => &[Side::Right],
        None => &Side::BOTH,
    }
}
