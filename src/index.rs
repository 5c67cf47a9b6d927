//! Index arithmetic for a complete binary tree embedded in an array.
//!
//! The root lives at index 0, and the children of node `i` live at `2i + 1`
//! and `2i + 2`. These helpers know nothing about storage, so they can be
//! used to reason about any array laid out this way.
//!
//! # Examples
//!
//! ```
//! use fixed_kv_heap::index::{left, level, parent, right};
//!
//! assert_eq!(left(1), 3);
//! assert_eq!(right(1), 4);
//! assert_eq!(parent(4), 1);
//! assert_eq!(level(4), 2);
//! ```

/// Returns the parent index of `index`.
///
/// `parent(0)` is `0`. The root has no parent, so callers only use this
/// value to stop walking upwards, never as a distinct slot.
#[inline]
#[must_use]
pub const fn parent(index: usize) -> usize {
    if index == 0 {
        return 0;
    }
    (index - 1) / 2
}

/// Returns the index of the left child of `index`.
///
/// Saturates at `usize::MAX`, which is never an occupied slot.
#[inline]
#[must_use]
pub const fn left(index: usize) -> usize {
    index.saturating_mul(2).saturating_add(1)
}

/// Returns the index of the right child of `index`.
///
/// Saturates at `usize::MAX`, which is never an occupied slot.
#[inline]
#[must_use]
pub const fn right(index: usize) -> usize {
    index.saturating_mul(2).saturating_add(2)
}

/// Returns the depth of `index` in the tree, i.e. `floor(log2(index + 1))`.
/// The root is at level 0.
#[inline]
#[must_use]
pub const fn level(index: usize) -> usize {
    match index.checked_add(1) {
        Some(n) => (usize::BITS - n.leading_zeros() - 1) as usize,
        None => usize::BITS as usize,
    }
}
