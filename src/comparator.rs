use alloc::rc::Rc;
use core::cmp::Ordering;
use core::fmt;

/// A total order over keys, shared by a tree and every view derived from it.
///
/// Comparators are cheap to clone: clones share the same underlying function. A reversed
/// comparator is a flag over the same function and negates its results, so building one
/// never copies or rebuilds anything.
///
/// The function must be a total order and must be consistent for the lifetime of the map.
/// A panic raised inside it propagates to the caller of whichever map operation was
/// comparing keys at the time.
///
/// # Examples
///
/// ```
/// use core::cmp::Ordering;
/// use avl_navmap::Comparator;
///
/// let by_len = Comparator::new(|a: &&str, b: &&str| a.len().cmp(&b.len()));
/// assert_eq!(by_len.compare(&"ab", &"abc"), Ordering::Less);
/// assert_eq!(by_len.reversed().compare(&"ab", &"abc"), Ordering::Greater);
/// ```
pub struct Comparator<K> {
    order: Rc<dyn Fn(&K, &K) -> Ordering>,
    descending: bool,
}

impl<K> Comparator<K> {
    /// Wraps a comparison function.
    pub fn new<F>(order: F) -> Self
    where
        F: Fn(&K, &K) -> Ordering + 'static,
    {
        Self {
            order: Rc::new(order),
            descending: false,
        }
    }

    /// Compares two keys.
    #[inline]
    pub fn compare(&self, a: &K, b: &K) -> Ordering {
        let ordering = (self.order)(a, b);
        if self.descending { ordering.reverse() } else { ordering }
    }

    /// Returns the comparator imposing the opposite order.
    ///
    /// Reversing twice yields a comparator equivalent to the original.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            order: Rc::clone(&self.order),
            descending: !self.descending,
        }
    }

    /// Returns `true` if this comparator is the reverse of the function it was built from.
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.descending
    }
}

impl<K: Ord + 'static> Comparator<K> {
    /// The natural order of `K` as given by its [`Ord`] implementation.
    #[must_use]
    pub fn natural() -> Self {
        Self::new(K::cmp)
    }
}

impl<K: Ord + 'static> Default for Comparator<K> {
    fn default() -> Self {
        Self::natural()
    }
}

impl<K> Clone for Comparator<K> {
    fn clone(&self) -> Self {
        Self {
            order: Rc::clone(&self.order),
            descending: self.descending,
        }
    }
}

impl<K> fmt::Debug for Comparator<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparator").field("reversed", &self.descending).finish_non_exhaustive()
    }
}
