#![forbid(unsafe_code)]

//! Ordered-collection difference.
//!
//! [`Difference::between`] computes the removals and insertions that turn
//! `old` into `new`, based on a longest common subsequence. Offsets follow
//! the usual convention:
//!
//! - removal offsets index into `old`,
//! - insertion offsets index into `new`.
//!
//! Applying all removals (highest offset first) and then all insertions
//! (lowest offset first) to `old` yields `new`.
//!
//! # Invariants
//!
//! 1. `removals.len() + insertions.len()` is minimal (LCS-optimal).
//! 2. Both offset lists are strictly increasing.
//! 3. Common prefixes and suffixes never produce changes.
//! 4. `between(x, x)` is empty.
//!
//! # Complexity
//!
//! O(p + s + n·m) time, O(n·m) space, where p/s are the common prefix and
//! suffix lengths and n/m the lengths of the differing middles. Navigation
//! stacks are short, so the quadratic middle is not a concern in practice.

/// The changes that turn one sequence into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Difference {
    removals: Vec<usize>,
    insertions: Vec<usize>,
}

impl Difference {
    /// Compute the difference from `old` to `new`.
    pub fn between<T: PartialEq>(old: &[T], new: &[T]) -> Self {
        let prefix = old
            .iter()
            .zip(new.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let old_rest = &old[prefix..];
        let new_rest = &new[prefix..];
        let suffix = old_rest
            .iter()
            .rev()
            .zip(new_rest.iter().rev())
            .take_while(|(a, b)| a == b)
            .count();
        let a = &old_rest[..old_rest.len() - suffix];
        let b = &new_rest[..new_rest.len() - suffix];

        let mut diff = Self::default();
        if a.is_empty() {
            diff.insertions.extend((0..b.len()).map(|j| prefix + j));
            return diff;
        }
        if b.is_empty() {
            diff.removals.extend((0..a.len()).map(|i| prefix + i));
            return diff;
        }

        // lcs[i][j] = LCS length of a[i..] and b[j..].
        let width = b.len() + 1;
        let mut lcs = vec![0_usize; (a.len() + 1) * width];
        for i in (0..a.len()).rev() {
            for j in (0..b.len()).rev() {
                lcs[i * width + j] = if a[i] == b[j] {
                    lcs[(i + 1) * width + j + 1] + 1
                } else {
                    lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
                };
            }
        }

        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            if a[i] == b[j] {
                i += 1;
                j += 1;
            } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
                diff.removals.push(prefix + i);
                i += 1;
            } else {
                diff.insertions.push(prefix + j);
                j += 1;
            }
        }
        diff.removals.extend((i..a.len()).map(|i| prefix + i));
        diff.insertions.extend((j..b.len()).map(|j| prefix + j));
        diff
    }

    /// Whether `old` and `new` were equal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.insertions.is_empty()
    }

    /// Total number of changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.removals.len() + self.insertions.len()
    }

    /// Removal offsets into `old`, ascending.
    #[must_use]
    pub fn removals(&self) -> &[usize] {
        &self.removals
    }

    /// Insertion offsets into `new`, ascending.
    #[must_use]
    pub fn insertions(&self) -> &[usize] {
        &self.insertions
    }

    /// Exactly one change: an insertion of the last element of `new`.
    #[must_use]
    pub fn is_single_push(&self, new_len: usize) -> bool {
        self.removals.is_empty() && self.insertions == [new_len.wrapping_sub(1)] && new_len > 0
    }

    /// Exactly one change: removal of the element just past the end of `new`.
    #[must_use]
    pub fn is_single_pop(&self, new_len: usize) -> bool {
        self.insertions.is_empty() && self.removals == [new_len]
    }

    /// If every change is a removal and the removals form one contiguous run
    /// that starts at `new_len`, the offset where that run starts.
    #[must_use]
    pub fn trailing_removal_start(&self, new_len: usize) -> Option<usize> {
        if !self.insertions.is_empty() {
            return None;
        }
        let (&first, &last) = (self.removals.first()?, self.removals.last()?);
        let contiguous = last - first + 1 == self.removals.len();
        (contiguous && first == new_len).then_some(first)
    }
}
