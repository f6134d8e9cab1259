use core::cmp::Ordering;
use core::ops::Bound;

use crate::comparator::Comparator;
use crate::error::{Error, Result};

/// The key range and direction a view exposes over the shared tree.
///
/// Bounds are always stored in the tree's own (natural) order; `descending` only changes
/// which of them the view treats as its start. A window never changes once built.
#[derive(Clone, Debug)]
pub(crate) struct Window<K> {
    lo: Bound<K>,
    hi: Bound<K>,
    descending: bool,
}

/// Whether `key` lies on the inner side of `bound`, where `outside` is the ordering of
/// `key` against the bound key that puts it past the edge.
fn within<K>(comparator: &Comparator<K>, bound: &Bound<K>, key: &K, outside: Ordering) -> bool {
    match bound {
        Bound::Unbounded => true,
        Bound::Included(edge) => comparator.compare(key, edge) != outside,
        Bound::Excluded(edge) => comparator.compare(key, edge) == outside.reverse(),
    }
}

/// Picks the tighter of two bounds on the same side. `inward` is the ordering that moves
/// a key towards the inside of the range.
fn tighter<K>(comparator: &Comparator<K>, a: Bound<K>, b: Bound<K>, inward: Ordering) -> Bound<K> {
    let (ka, kb) = match (&a, &b) {
        (Bound::Unbounded, _) => return b,
        (_, Bound::Unbounded) => return a,
        (Bound::Included(ka) | Bound::Excluded(ka), Bound::Included(kb) | Bound::Excluded(kb)) => (ka, kb),
    };
    match comparator.compare(ka, kb) {
        Ordering::Equal if matches!(b, Bound::Excluded(_)) => b,
        Ordering::Equal => a,
        ordering if ordering == inward => a,
        _ => b,
    }
}

/// Rejects `lo > hi`. Equal keys are accepted whatever their inclusivity.
fn check_order<K>(comparator: &Comparator<K>, lo: &Bound<K>, hi: &Bound<K>) -> Result<()> {
    if let (Bound::Included(l) | Bound::Excluded(l), Bound::Included(h) | Bound::Excluded(h)) = (lo, hi)
        && comparator.compare(l, h) == Ordering::Greater
    {
        return Err(Error::InvalidRange);
    }
    Ok(())
}

impl<K> Window<K> {
    /// A window over the whole tree.
    pub(crate) const fn full(descending: bool) -> Self {
        Self {
            lo: Bound::Unbounded,
            hi: Bound::Unbounded,
            descending,
        }
    }

    /// A window over `[lo, hi]` in natural order, checked for `lo <= hi`.
    pub(crate) fn bounded(comparator: &Comparator<K>, lo: Bound<K>, hi: Bound<K>, descending: bool) -> Result<Self> {
        check_order(comparator, &lo, &hi)?;
        Ok(Self { lo, hi, descending })
    }

    /// A window with only an upper bound, in natural order.
    pub(crate) fn below(hi: Bound<K>, descending: bool) -> Self {
        Self {
            lo: Bound::Unbounded,
            hi,
            descending,
        }
    }

    /// A window with only a lower bound, in natural order.
    pub(crate) fn above(lo: Bound<K>, descending: bool) -> Self {
        Self {
            lo,
            hi: Bound::Unbounded,
            descending,
        }
    }

    /// Whether the window covers the whole tree.
    pub(crate) fn is_full(&self) -> bool {
        matches!((&self.lo, &self.hi), (Bound::Unbounded, Bound::Unbounded))
    }

    #[inline]
    pub(crate) const fn is_descending(&self) -> bool {
        self.descending
    }

    /// The lower bound in natural order.
    pub(crate) fn lo(&self) -> Bound<&K> {
        self.lo.as_ref()
    }

    /// The upper bound in natural order.
    pub(crate) fn hi(&self) -> Bound<&K> {
        self.hi.as_ref()
    }

    /// The bound iteration starts from.
    pub(crate) fn start(&self) -> Bound<&K> {
        if self.descending { self.hi() } else { self.lo() }
    }

    /// The bound iteration stops at.
    pub(crate) fn end(&self) -> Bound<&K> {
        if self.descending { self.lo() } else { self.hi() }
    }

    pub(crate) fn above_lo(&self, comparator: &Comparator<K>, key: &K) -> bool {
        within(comparator, &self.lo, key, Ordering::Less)
    }

    pub(crate) fn below_hi(&self, comparator: &Comparator<K>, key: &K) -> bool {
        within(comparator, &self.hi, key, Ordering::Greater)
    }

    pub(crate) fn contains(&self, comparator: &Comparator<K>, key: &K) -> bool {
        self.above_lo(comparator, key) && self.below_hi(comparator, key)
    }

    /// Whether `key` sorts before the window's start in iteration order.
    pub(crate) fn before_start(&self, comparator: &Comparator<K>, key: &K) -> bool {
        if self.descending {
            !self.below_hi(comparator, key)
        } else {
            !self.above_lo(comparator, key)
        }
    }

    /// Whether `key` sorts after the window's end in iteration order.
    pub(crate) fn after_end(&self, comparator: &Comparator<K>, key: &K) -> bool {
        if self.descending {
            !self.above_lo(comparator, key)
        } else {
            !self.below_hi(comparator, key)
        }
    }
}

impl<K: Clone> Window<K> {
    /// The same range iterated the other way round.
    pub(crate) fn reversed(&self) -> Self {
        Self {
            lo: self.lo.clone(),
            hi: self.hi.clone(),
            descending: !self.descending,
        }
    }

    /// Intersects this window with `[from, to]`, given in the window's iteration order.
    ///
    /// `from` must not sort after `to`, and the intersection must not be inverted.
    pub(crate) fn narrowed(&self, comparator: &Comparator<K>, from: Bound<K>, to: Bound<K>) -> Result<Self> {
        let (lo, hi) = if self.descending { (to, from) } else { (from, to) };
        check_order(comparator, &lo, &hi)?;
        let lo = tighter(comparator, self.lo.clone(), lo, Ordering::Greater);
        let hi = tighter(comparator, self.hi.clone(), hi, Ordering::Less);
        Self::bounded(comparator, lo, hi, self.descending)
    }
}
