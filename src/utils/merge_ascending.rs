use std::{fmt::Debug, iter::Peekable};

/// Interleaves two iterators that are each sorted by `get_key` into one
/// sorted iterator. On equal keys the item of the first iterator comes first.
pub struct MergeAscending<L, R, F>
where
    L: Iterator,
    R: Iterator<Item = L::Item>,
{
    first: Peekable<L>,
    second: Peekable<R>,
    get_key: F,
}

impl<L, R, F> Debug for MergeAscending<L, R, F>
where
    L: Iterator,
    R: Iterator<Item = L::Item>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeAscending").finish_non_exhaustive()
    }
}

impl<L, R, F, K> Iterator for MergeAscending<L, R, F>
where
    L: Iterator,
    R: Iterator<Item = L::Item>,
    F: Fn(&L::Item) -> K,
    K: Ord,
{
    type Item = L::Item;

    fn next(&mut self) -> Option<L::Item> {
        let take_first = match (self.first.peek(), self.second.peek()) {
            (Some(first), Some(second)) => (self.get_key)(first) <= (self.get_key)(second),
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => return None,
        };

        if take_first {
            self.first.next()
        } else {
            self.second.next()
        }
    }
}

pub trait MergeSorted: Iterator {
    fn merge_sorted_by_key<R, F, K>(self, other: R, get_key: F) -> MergeAscending<Self, R, F>
    where
        Self: Sized,
        R: Iterator<Item = Self::Item>,
        F: Fn(&Self::Item) -> K,
        K: Ord,
    {
        MergeAscending {
            first: self.peekable(),
            second: other.peekable(),
            get_key,
        }
    }
}

impl<T> MergeSorted for T where T: Iterator + ?Sized {}
