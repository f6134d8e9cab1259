use super::handle::Handle;

/// Cached entry count of a subtree.
///
/// Bounded by [`Handle::MAX`]: a subtree can never hold more nodes than the arena has slots.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
#[repr(transparent)]
pub(crate) struct Size(u32);

impl Size {
    pub(crate) const MAX: usize = Handle::MAX;
    pub(crate) const ZERO: Self = Self(0);
    pub(crate) const ONE: Self = Self(1);

    #[inline]
    pub(crate) const fn from_usize(size: usize) -> Self {
        assert!(size <= Self::MAX, "`Size::from_usize()` - `size` > `Size::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        Self(size as u32)
    }

    #[inline]
    pub(crate) const fn to_usize(self) -> usize {
        self.0 as usize
    }

    /// Size of a node whose children have sizes `left` and `right`.
    #[inline]
    pub(crate) const fn joined(left: Self, right: Self) -> Self {
        Self::from_usize(left.to_usize() + right.to_usize() + 1)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    #[should_panic(expected = "`Size::from_usize()` - `size` > `Size::MAX`!")]
    fn size_beyond_max_is_rejected() {
        let _ = Size::from_usize(Size::MAX + 1);
    }

    #[test]
    fn joined_counts_the_parent() {
        assert_eq!(Size::joined(Size::ZERO, Size::ZERO), Size::ONE);
        assert_eq!(Size::joined(Size::from_usize(3), Size::from_usize(4)).to_usize(), 8);
    }

    proptest! {
        #[test]
        fn size_preserves_count(count in 0..=Size::MAX) {
            prop_assert_eq!(Size::from_usize(count).to_usize(), count);
        }
    }
}
