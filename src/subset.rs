//! Fixed-width subsets of the frame of discernment.
//!
//! A [`Subset`] is a 64-bit mask: bit `i` set means hypothesis `i` is a member.
//! Subsets are plain `Copy` values; the [`Universe`](crate::universe::Universe)
//! hands them out and the evidence engine keys its sparse mass map on them.
//!
//! # Invariants
//! - Two subsets are equal iff their bit patterns are equal.
//! - [`Subset::EMPTY`] is logical impossibility; it never carries mass in a
//!   completed mass function.
//! - No heap allocation; zero unsafe code.

use core::fmt;
use core::ops::{BitAnd, BitOr};

/// Maximum number of hypotheses a universe can hold (width of [`Subset`]).
pub const MAX_HYPOTHESES: usize = 64;

/// Interned hypothesis identifier, `0..MAX_HYPOTHESES`.
///
/// Issued by [`Universe::register`](crate::universe::Universe::register) in
/// registration order. Ordering follows the index, which is what `best_match`
/// uses to break ties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HypothesisId(u8);

impl HypothesisId {
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < MAX_HYPOTHESES);
        Self(index as u8)
    }

    /// Zero-based registration index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for HypothesisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// A set of hypotheses encoded as a bit vector.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Subset(u64);

impl Subset {
    /// The empty set.
    pub const EMPTY: Subset = Subset(0);

    /// Wrap a raw bit pattern.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw bit pattern.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// The set `{id}`.
    pub fn singleton(id: HypothesisId) -> Self {
        Self(1u64 << id.index())
    }

    /// The set of the first `n` hypotheses (`n` is clamped to [`MAX_HYPOTHESES`]).
    pub fn first_n(n: usize) -> Self {
        if n >= MAX_HYPOTHESES {
            Self(u64::MAX)
        } else {
            Self((1u64 << n) - 1)
        }
    }

    /// `self ∪ other`.
    pub const fn union(self, other: Subset) -> Self {
        Self(self.0 | other.0)
    }

    /// `self ∩ other`.
    pub const fn intersection(self, other: Subset) -> Self {
        Self(self.0 & other.0)
    }

    /// `omega \ self`: the complement relative to a frame of discernment.
    pub const fn complement_within(self, omega: Subset) -> Self {
        Self(!self.0 & omega.0)
    }

    /// `true` if every member of `self` is also in `other`.
    pub const fn is_subset_of(self, other: Subset) -> bool {
        self.0 & other.0 == self.0
    }

    /// `true` if the two sets share at least one hypothesis.
    pub const fn intersects(self, other: Subset) -> bool {
        self.0 & other.0 != 0
    }

    /// `true` for the empty set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of member hypotheses.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// `true` if `id` is a member.
    pub fn contains(self, id: HypothesisId) -> bool {
        self.0 & (1u64 << id.index()) != 0
    }

    /// Member ids in ascending index order.
    pub fn iter(self) -> SubsetIter {
        SubsetIter { remaining: self.0 }
    }
}

impl BitAnd for Subset {
    type Output = Subset;

    fn bitand(self, rhs: Subset) -> Subset {
        self.intersection(rhs)
    }
}

impl BitOr for Subset {
    type Output = Subset;

    fn bitor(self, rhs: Subset) -> Subset {
        self.union(rhs)
    }
}

impl fmt::Debug for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subset({:#b})", self.0)
    }
}

impl IntoIterator for Subset {
    type Item = HypothesisId;
    type IntoIter = SubsetIter;

    fn into_iter(self) -> SubsetIter {
        self.iter()
    }
}

/// Iterator over the member ids of a [`Subset`], lowest index first.
#[derive(Clone, Debug)]
pub struct SubsetIter {
    remaining: u64,
}

impl Iterator for SubsetIter {
    type Item = HypothesisId;

    fn next(&mut self) -> Option<HypothesisId> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.remaining.trailing_zeros() as usize;
        // clear lowest set bit
        self.remaining &= self.remaining - 1;
        Some(HypothesisId::new(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SubsetIter {}
