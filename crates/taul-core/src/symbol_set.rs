//! Symbol sets.
//!
//! A set of symbol ids stored as a sorted sequence of half-open
//! `[low, high)` ranges that are pairwise disjoint and never abut. All
//! operations restore this canonical form before returning, so structural
//! equality is set equality and iteration yields ids in strictly ascending
//! order. Membership is a binary search over the range table.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::symbol::{Glyph, Token};
use crate::symbol_id::SymbolId;

/// Half-open range of symbol ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdRange {
    pub low: u32,
    pub high: u32,
}

impl IdRange {
    #[inline]
    pub fn new(low: SymbolId, high: SymbolId) -> Self {
        Self {
            low: low.as_u32(),
            high: high.as_u32(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.low >= self.high
    }

    #[inline]
    pub fn contains(&self, id: SymbolId) -> bool {
        let raw = id.as_u32();
        self.low <= raw && raw < self.high
    }

    /// Number of ids covered.
    #[inline]
    pub fn count(&self) -> u64 {
        u64::from(self.high).saturating_sub(u64::from(self.low))
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.low + 1 == self.high {
            write!(f, "{}", SymbolId::new(self.low))
        } else {
            write!(f, "[{}, {})", SymbolId::new(self.low), SymbolId::new(self.high))
        }
    }
}

/// An ordered, disjoint union of id ranges over one symbol domain.
///
/// The type parameter is a domain marker only; it keeps glyph-domain and
/// token-domain sets from being mixed by accident. The impls below are
/// written by hand so no bounds land on the marker.
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
pub struct SymbolSet<S> {
    ranges: Vec<IdRange>,
    #[serde(skip)]
    _domain: PhantomData<fn() -> S>,
}

impl<S> Clone for SymbolSet<S> {
    fn clone(&self) -> Self {
        Self {
            ranges: self.ranges.clone(),
            _domain: PhantomData,
        }
    }
}

impl<S> PartialEq for SymbolSet<S> {
    fn eq(&self, other: &Self) -> bool {
        self.ranges == other.ranges
    }
}

impl<S> Eq for SymbolSet<S> {}

impl<S> std::hash::Hash for SymbolSet<S> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ranges.hash(state);
    }
}

pub type GlyphSet = SymbolSet<Glyph>;
pub type TokenSet = SymbolSet<Token>;

impl<S> Default for SymbolSet<S> {
    fn default() -> Self {
        Self {
            ranges: Vec::new(),
            _domain: PhantomData,
        }
    }
}

impl<S> SymbolSet<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from arbitrary (possibly overlapping, unsorted) ranges.
    pub fn from_ranges(ranges: impl IntoIterator<Item = IdRange>) -> Self {
        let mut raw: Vec<IdRange> = ranges.into_iter().filter(|r| !r.is_empty()).collect();
        raw.sort_by_key(|r| r.low);
        let mut result = Self::new();
        result.ranges = coalesce_sorted(raw);
        result
    }

    pub fn singleton(id: SymbolId) -> Self {
        let mut result = Self::new();
        result.add_id(id);
        result
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    #[inline]
    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    /// Number of ids in the set.
    pub fn count_ids(&self) -> u64 {
        self.ranges.iter().map(IdRange::count).sum()
    }

    /// O(log R) membership test.
    pub fn contains(&self, id: SymbolId) -> bool {
        let raw = id.as_u32();
        let idx = self.ranges.partition_point(|r| r.high <= raw);
        self.ranges.get(idx).is_some_and(|r| r.contains(id))
    }

    pub fn add_id(&mut self, id: SymbolId) {
        let raw = id.as_u32();
        debug_assert!(raw < u32::MAX);
        self.add_range_raw(raw, raw + 1);
    }

    /// Add `[low, high)`. Empty ranges are ignored.
    pub fn add_range(&mut self, low: SymbolId, high: SymbolId) {
        self.add_range_raw(low.as_u32(), high.as_u32());
    }

    fn add_range_raw(&mut self, low: u32, high: u32) {
        if low >= high {
            return;
        }
        let addition = Self::from_ranges([IdRange { low, high }]);
        *self = self.union(&addition);
    }

    /// Remove `[low, high)`. Empty ranges are ignored.
    pub fn remove_range(&mut self, low: SymbolId, high: SymbolId) {
        if low >= high {
            return;
        }
        let removal = Self::from_ranges([IdRange {
            low: low.as_u32(),
            high: high.as_u32(),
        }]);
        *self = self.difference(&removal);
    }

    /// Set union; commutative and idempotent.
    pub fn union(&self, other: &Self) -> Self {
        let mut merged = Vec::with_capacity(self.ranges.len() + other.ranges.len());
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            if self.ranges[i].low <= other.ranges[j].low {
                merged.push(self.ranges[i]);
                i += 1;
            } else {
                merged.push(other.ranges[j]);
                j += 1;
            }
        }
        merged.extend_from_slice(&self.ranges[i..]);
        merged.extend_from_slice(&other.ranges[j..]);
        let mut result = Self::new();
        result.ranges = coalesce_sorted(merged);
        result
    }

    pub fn union_with(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        *self = self.union(other);
    }

    /// Set intersection; commutative and idempotent.
    pub fn intersect(&self, other: &Self) -> Self {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let a = self.ranges[i];
            let b = other.ranges[j];
            let low = a.low.max(b.low);
            let high = a.high.min(b.high);
            if low < high {
                out.push(IdRange { low, high });
            }
            if a.high <= b.high {
                i += 1;
            } else {
                j += 1;
            }
        }
        let mut result = Self::new();
        result.ranges = out;
        result
    }

    /// Set difference `self \ other`.
    pub fn difference(&self, other: &Self) -> Self {
        let mut out = Vec::new();
        let mut j = 0;
        for &a in &self.ranges {
            let mut low = a.low;
            while j < other.ranges.len() && other.ranges[j].high <= low {
                j += 1;
            }
            let mut k = j;
            while k < other.ranges.len() && other.ranges[k].low < a.high {
                let b = other.ranges[k];
                if b.low > low {
                    out.push(IdRange { low, high: b.low });
                }
                low = low.max(b.high);
                if b.high >= a.high {
                    break;
                }
                k += 1;
            }
            if low < a.high {
                out.push(IdRange { low, high: a.high });
            }
        }
        let mut result = Self::new();
        result.ranges = out;
        result
    }

    /// Ascending iteration over the canonical ranges.
    pub fn ranges(&self) -> impl Iterator<Item = IdRange> + '_ {
        self.ranges.iter().copied()
    }

    /// Ascending iteration over every id in the set.
    pub fn ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.ranges
            .iter()
            .flat_map(|r| (r.low..r.high).map(SymbolId::new))
    }
}

/// Merge a low-sorted range list into canonical (disjoint, non-abutting)
/// form.
fn coalesce_sorted(ranges: Vec<IdRange>) -> Vec<IdRange> {
    let mut out: Vec<IdRange> = Vec::with_capacity(ranges.len());
    for r in ranges {
        if r.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if r.low <= last.high => last.high = last.high.max(r.high),
            _ => out.push(r),
        }
    }
    out
}

impl<S> fmt::Debug for SymbolSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ranges.iter()).finish()
    }
}

impl<S> fmt::Display for SymbolSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, r) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{r}")?;
        }
        f.write_str("}")
    }
}

impl<S> FromIterator<IdRange> for SymbolSet<S> {
    fn from_iter<T: IntoIterator<Item = IdRange>>(iter: T) -> Self {
        Self::from_ranges(iter)
    }
}
