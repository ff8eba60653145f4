//! Myers' diff algorithm, adapted from <https://github.com/mitsuhiko/similar/blob/7e15c44de11a1cd61e1149189929e189ef977fd8/src/algorithms/myers.rs>
//!
//! * time: `O((N+M)D)`
//! * space `O(N+M)`
//!
//! See [the original article by Eugene W. Myers](http://www.xmailserver.org/diff2.pdf).
//!
//! The recursion polls a [`CancellationToken`] before every divide step so a
//! long-running comparison can be abandoned from another thread.

use std::{
    fmt::Debug,
    ops::{Index, IndexMut, Range},
};

use tokio_util::sync::CancellationToken;

use crate::{
    diffs::raw_operation::RawOperation,
    errors::MergeError,
    tokenizer::token::Token,
    utils::common_affix_len::{common_prefix_len, common_suffix_len},
};

/// Diff `old` against `new`, returning one `RawOperation` per token.
///
/// # Errors
///
/// Returns `MergeError::Cancelled` if `cancellation` is flipped while the
/// diff is being computed.
pub fn myers_diff<T>(
    old: &[Token<T>],
    new: &[Token<T>],
    cancellation: &CancellationToken,
) -> Result<Vec<RawOperation<T>>, MergeError>
where
    T: PartialEq + Clone + Debug,
{
    let max_d = (old.len() + new.len()).div_ceil(2) + 1;
    let mut vb = V::new(max_d);
    let mut vf = V::new(max_d);
    let mut result = Vec::with_capacity(old.len().max(new.len()));

    conquer(
        &mut Search {
            old,
            new,
            vf: &mut vf,
            vb: &mut vb,
            cancellation,
        },
        0..old.len(),
        0..new.len(),
        &mut result,
    )?;

    Ok(result)
}

/// `V` holds the furthest reaching x coordinate of every diagonal `k`. As `k`
/// can be negative, indices are shifted by `offset`.
#[derive(Debug)]
struct V {
    offset: isize,
    v: Vec<usize>,
}

impl V {
    fn new(max_d: usize) -> Self {
        Self {
            offset: isize::try_from(max_d).unwrap_or(isize::MAX),
            v: vec![0; 2 * max_d],
        }
    }

    fn len(&self) -> usize { self.v.len() }

    fn slot(&self, k: isize) -> usize {
        usize::try_from(k + self.offset)
            .unwrap_or(usize::MAX)
            .min(self.v.len().saturating_sub(1))
    }
}

impl Index<isize> for V {
    type Output = usize;

    fn index(&self, k: isize) -> &Self::Output { &self.v[self.slot(k)] }
}

impl IndexMut<isize> for V {
    fn index_mut(&mut self, k: isize) -> &mut Self::Output {
        let slot = self.slot(k);
        &mut self.v[slot]
    }
}

struct Search<'a, T>
where
    T: PartialEq + Clone + Debug,
{
    old: &'a [Token<T>],
    new: &'a [Token<T>],
    vf: &'a mut V,
    vb: &'a mut V,
    cancellation: &'a CancellationToken,
}

fn to_isize(value: usize) -> isize { isize::try_from(value).unwrap_or(isize::MAX) }

/// Find the middle snake of an optimal path by running the greedy search
/// forwards from the top-left and backwards from the bottom-right corner
/// until the two frontiers overlap.
fn find_middle_snake<T>(
    search: &mut Search<'_, T>,
    old_range: Range<usize>,
    new_range: Range<usize>,
) -> Option<(usize, usize)>
where
    T: PartialEq + Clone + Debug,
{
    let n = old_range.len();
    let m = new_range.len();

    // The parity of `delta` decides which search direction can detect the overlap.
    let delta = to_isize(n) - to_isize(m);
    let odd = delta & 1 == 1;

    search.vf[1] = 0;
    search.vb[1] = 0;

    let d_max = (n + m).div_ceil(2) + 1;
    debug_assert!(search.vf.len() >= d_max && search.vb.len() >= d_max);

    for d in 0..to_isize(d_max) {
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && search.vf[k - 1] < search.vf[k + 1]) {
                search.vf[k + 1]
            } else {
                search.vf[k - 1] + 1
            };
            let y = usize::try_from(to_isize(x) - k).unwrap_or(0);

            let (x0, y0) = (x, y);
            if x < n && y < m {
                x += common_prefix_len(
                    search.old,
                    old_range.start + x..old_range.end,
                    search.new,
                    new_range.start + y..new_range.end,
                );
            }

            search.vf[k] = x;

            if odd && (k - delta).abs() <= (d - 1) && search.vf[k] + search.vb[-(k - delta)] >= n
            {
                return Some((x0 + old_range.start, y0 + new_range.start));
            }
        }

        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && search.vb[k - 1] < search.vb[k + 1]) {
                search.vb[k + 1]
            } else {
                search.vb[k - 1] + 1
            };
            let mut y = usize::try_from(to_isize(x) - k).unwrap_or(0);

            if x < n && y < m {
                let advance = common_suffix_len(
                    search.old,
                    old_range.start..old_range.start + n - x,
                    search.new,
                    new_range.start..new_range.start + m - y,
                );
                x += advance;
                y += advance;
            }

            search.vb[k] = x;

            if !odd && (k - delta).abs() <= d && search.vb[k] + search.vf[-(k - delta)] >= n {
                return Some((n - x + old_range.start, m - y + new_range.start));
            }
        }
    }

    None
}

fn conquer<T>(
    search: &mut Search<'_, T>,
    mut old_range: Range<usize>,
    mut new_range: Range<usize>,
    result: &mut Vec<RawOperation<T>>,
) -> Result<(), MergeError>
where
    T: PartialEq + Clone + Debug,
{
    if search.cancellation.is_cancelled() {
        return Err(MergeError::Cancelled);
    }

    let prefix_len =
        common_prefix_len(search.old, old_range.clone(), search.new, new_range.clone());
    result.extend(
        search.old[old_range.start..old_range.start + prefix_len]
            .iter()
            .cloned()
            .map(RawOperation::Equal),
    );
    old_range.start += prefix_len;
    new_range.start += prefix_len;

    let suffix_len =
        common_suffix_len(search.old, old_range.clone(), search.new, new_range.clone());
    let suffix_start = old_range.end - suffix_len;
    old_range.end -= suffix_len;
    new_range.end -= suffix_len;

    if old_range.is_empty() || new_range.is_empty() {
        result.extend(search.old[old_range].iter().cloned().map(RawOperation::Delete));
        result.extend(search.new[new_range].iter().cloned().map(RawOperation::Insert));
    } else if let Some((old_split, new_split)) =
        find_middle_snake(search, old_range.clone(), new_range.clone())
    {
        conquer(search, old_range.start..old_split, new_range.start..new_split, result)?;
        conquer(search, old_split..old_range.end, new_split..new_range.end, result)?;
    } else {
        result.extend(search.old[old_range].iter().cloned().map(RawOperation::Delete));
        result.extend(search.new[new_range].iter().cloned().map(RawOperation::Insert));
    }

    result.extend(
        search.old[suffix_start..suffix_start + suffix_len]
            .iter()
            .cloned()
            .map(RawOperation::Equal),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tokens(items: &[&str]) -> Vec<Token<String>> {
        items.iter().map(|&item| item.into()).collect()
    }

    fn render(operations: &[RawOperation<String>]) -> String {
        operations
            .iter()
            .map(|operation| match operation {
                RawOperation::Equal(token) => format!("={}", token.original()),
                RawOperation::Insert(token) => format!("+{}", token.original()),
                RawOperation::Delete(token) => format!("-{}", token.original()),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn diff(old: &[&str], new: &[&str]) -> String {
        render(&myers_diff(&tokens(old), &tokens(new), &CancellationToken::new()).unwrap())
    }

    #[test]
    fn test_empty_diff() {
        assert_eq!(diff(&[], &[]), "");
    }

    #[test]
    fn test_identical_content() {
        assert_eq!(diff(&["a", "b", "c"], &["a", "b", "c"]), "=a =b =c");
    }

    #[test]
    fn test_insert_and_delete_only() {
        assert_eq!(diff(&[], &["a", "b"]), "+a +b");
        assert_eq!(diff(&["a", "b"], &[]), "-a -b");
    }

    fn equal_and_changed(old: &[&str], new: &[&str]) -> (String, usize) {
        let operations = myers_diff(&tokens(old), &tokens(new), &CancellationToken::new()).unwrap();
        let (equal, changed): (Vec<_>, Vec<_>) = operations
            .into_iter()
            .partition(|operation| matches!(operation, RawOperation::Equal(_)));

        (render(&equal), changed.len())
    }

    #[test]
    fn test_prefix_and_suffix() {
        assert_eq!(
            equal_and_changed(&["a", "b", "c", "d"], &["a", "x", "d"]),
            ("=a =d".to_owned(), 3)
        );
    }

    #[test]
    fn test_middle_snake() {
        assert_eq!(
            equal_and_changed(&["a", "b", "c", "d", "e"], &["x", "b", "c", "y", "e"]),
            ("=b =c =e".to_owned(), 4)
        );
    }

    #[test]
    fn test_cancelled_diff() {
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let result = myers_diff(&tokens(&["a"]), &tokens(&["b"]), &cancellation);
        assert_eq!(result, Err(MergeError::Cancelled));
    }
}
