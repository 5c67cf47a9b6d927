//! A fixed-capacity binary min-heap storing key-value pairs.
//!
//! The heap reserves storage for all of its slots when it is created and
//! never grows afterwards. Inserting into a full heap or extracting from an
//! empty one is reported through [`HeapError`] instead of corrupting state or
//! returning a sentinel value.

use core::fmt;
use core::iter::{Enumerate, FusedIterator};

use std::slice;
use std::vec::Vec;

use log::{debug, trace};

mod error;
pub mod index;

pub use error::{HeapError, Result};

#[derive(Debug, Clone)]
pub struct HeapNode<K, V> {
    pub key: K,
    pub value: V,
}

impl<K: PartialEq, V> PartialEq for HeapNode<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key.eq(&other.key)
    }
}

impl<K: Eq, V> Eq for HeapNode<K, V> {}

impl<K: PartialOrd, V> PartialOrd for HeapNode<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.key.partial_cmp(&other.key)
    }
}

impl<K: Ord, V> Ord for HeapNode<K, V> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl<K: Copy, V: Copy> Copy for HeapNode<K, V> {}

/// A priority queue implemented with a binary min-heap of fixed capacity.
///
/// Every node carries a key, which decides its position, and a value, which
/// the heap only moves around. [`extract_min`] always yields the value
/// attached to the smallest key. Nodes with equal keys come out in an
/// unspecified order.
///
/// All storage is reserved by [`with_capacity`]; the heap never reallocates.
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key, as determined by the [`Ord`] trait,
/// changes while it is in the heap. This is normally only possible through
/// [`Cell`], [`RefCell`], global state, I/O, or unsafe code.
///
/// # Examples
///
/// ```
/// use fixed_kv_heap::{FixedKeyValueHeap, HeapError, HeapNode};
///
/// let mut heap = FixedKeyValueHeap::with_capacity(3)?;
///
/// // There's nothing in there yet.
/// assert_eq!(heap.peek(), None);
///
/// heap.insert(5, "Alice")?;
/// heap.insert(1, "Bob")?;
/// heap.insert(2, "Eve")?;
///
/// // The heap is full now, so further inserts are rejected.
/// assert!(heap.is_full());
/// assert!(matches!(heap.insert(0, "Mallory"), Err(HeapError::CapacityExceeded { capacity: 3 })));
///
/// // The smallest key sits at the root.
/// assert_eq!(heap.peek(), Some(&HeapNode { key: 1, value: "Bob" }));
///
/// // Extraction yields values in key order.
/// assert_eq!(heap.extract_min()?, "Bob");
/// assert_eq!(heap.extract_min()?, "Eve");
/// assert_eq!(heap.extract_min()?, "Alice");
/// assert!(matches!(heap.extract_min(), Err(HeapError::Empty)));
/// # Ok::<(), HeapError>(())
/// ```
///
/// # Time complexity
///
/// | [insert]      | [extract\_min] | [peek] |
/// |---------------|----------------|--------|
/// | *O*(log(*n*)) | *O*(log(*n*))  | *O*(1) |
///
/// [`Cell`]: core::cell::Cell
/// [`RefCell`]: core::cell::RefCell
/// [`with_capacity`]: FixedKeyValueHeap::with_capacity
/// [`extract_min`]: FixedKeyValueHeap::extract_min
/// [insert]: FixedKeyValueHeap::insert
/// [extract\_min]: FixedKeyValueHeap::extract_min
/// [peek]: FixedKeyValueHeap::peek
pub struct FixedKeyValueHeap<K, V> {
    // The vector's length is the occupied prefix `[0, len)`.
    data: Vec<HeapNode<K, V>>,
    capacity: usize,
}

impl<K: Clone, V: Clone> Clone for FixedKeyValueHeap<K, V> {
    /// Clones the heap, reserving the same fixed capacity for the copy.
    fn clone(&self) -> Self {
        let mut data = Vec::with_capacity(self.capacity);
        data.extend(self.data.iter().cloned());
        FixedKeyValueHeap {
            data,
            capacity: self.capacity,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for FixedKeyValueHeap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedKeyValueHeap")
            .field("capacity", &self.capacity)
            .field("data", &self.data)
            .finish()
    }
}

/// Prints one line per occupied slot, in storage order, as
/// `level - index : key`, followed by an empty line.
///
/// ```
/// use fixed_kv_heap::FixedKeyValueHeap;
///
/// let mut heap = FixedKeyValueHeap::with_capacity(4)?;
/// heap.insert(7, ())?;
/// heap.insert(3, ())?;
///
/// assert_eq!(heap.to_string(), "  0 -   0 : 3\n  1 -   1 : 7\n\n");
/// # Ok::<(), fixed_kv_heap::HeapError>(())
/// ```
impl<K: fmt::Display, V> fmt::Display for FixedKeyValueHeap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (level, index, key) in self.levels() {
            writeln!(f, "{:3} - {:3} : {}", level, index, key)?;
        }
        writeln!(f)
    }
}

impl<K: Ord, V> FixedKeyValueHeap<K, V> {
    /// Creates an empty heap with storage reserved for exactly `capacity`
    /// nodes.
    ///
    /// # Errors
    ///
    /// Returns [`HeapError::ZeroCapacity`] if `capacity` is zero and
    /// [`HeapError::Allocation`] if the storage cannot be reserved.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use fixed_kv_heap::{FixedKeyValueHeap, HeapError};
    ///
    /// let mut heap = FixedKeyValueHeap::with_capacity(10)?;
    /// heap.insert(4, "Eve")?;
    /// assert_eq!(heap.capacity(), 10);
    ///
    /// assert!(matches!(
    ///     FixedKeyValueHeap::<i32, &str>::with_capacity(0),
    ///     Err(HeapError::ZeroCapacity)
    /// ));
    /// # Ok::<(), HeapError>(())
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<FixedKeyValueHeap<K, V>> {
        if capacity == 0 {
            return Err(HeapError::ZeroCapacity);
        }

        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|source| HeapError::Allocation { capacity, source })?;

        debug!("created heap with capacity {}", capacity);
        Ok(FixedKeyValueHeap { data, capacity })
    }

    /// Inserts a node into the heap.
    ///
    /// # Errors
    ///
    /// Returns [`HeapError::CapacityExceeded`] if the heap is full. The heap
    /// is left untouched in that case and the rejected key and value are
    /// dropped.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use fixed_kv_heap::{FixedKeyValueHeap, HeapNode};
    ///
    /// let mut heap = FixedKeyValueHeap::with_capacity(3)?;
    /// heap.insert(3, "Bob")?;
    /// heap.insert(5, "Alice")?;
    /// heap.insert(1, "Eve")?;
    ///
    /// assert_eq!(heap.len(), 3);
    /// assert_eq!(heap.peek(), Some(&HeapNode { key: 1, value: "Eve" }));
    /// assert!(heap.insert(0, "Steven").is_err());
    /// assert_eq!(heap.len(), 3);
    /// # Ok::<(), fixed_kv_heap::HeapError>(())
    /// ```
    ///
    /// # Time complexity
    ///
    /// The worst case cost of `insert` on a heap containing *n* elements is
    /// *O*(log(*n*)). It never reallocates.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        if self.is_full() {
            debug!("rejected insert into full heap (capacity {})", self.capacity);
            return Err(HeapError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let tail = self.data.len();
        self.data.push(HeapNode { key, value });
        let pos = self.sift_up(tail);
        trace!("inserted node at index {} (len {})", pos, self.data.len());
        Ok(())
    }

    /// Removes the node with the smallest key and returns its value.
    ///
    /// # Errors
    ///
    /// Returns [`HeapError::Empty`] if there is nothing to extract. The heap
    /// is left untouched in that case.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use fixed_kv_heap::{FixedKeyValueHeap, HeapError};
    ///
    /// let mut heap = FixedKeyValueHeap::with_capacity(2)?;
    /// heap.insert(3, "three")?;
    /// heap.insert(1, "one")?;
    ///
    /// assert_eq!(heap.extract_min()?, "one");
    /// assert_eq!(heap.extract_min()?, "three");
    /// assert!(matches!(heap.extract_min(), Err(HeapError::Empty)));
    /// # Ok::<(), HeapError>(())
    /// ```
    ///
    /// # Time complexity
    ///
    /// The worst case cost of `extract_min` on a heap containing *n*
    /// elements is *O*(log(*n*)).
    pub fn extract_min(&mut self) -> Result<V> {
        match self.pop() {
            Some(node) => Ok(node.value),
            None => {
                debug!("rejected extraction from empty heap");
                Err(HeapError::Empty)
            }
        }
    }

    /// Removes the node with the smallest key and returns it, or `None` if
    /// the heap is empty.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use fixed_kv_heap::{FixedKeyValueHeap, HeapNode};
    ///
    /// let mut heap = FixedKeyValueHeap::with_capacity(2)?;
    /// heap.insert(3, 'c')?;
    /// heap.insert(1, 'a')?;
    ///
    /// assert_eq!(heap.pop(), Some(HeapNode { key: 1, value: 'a' }));
    /// assert_eq!(heap.pop(), Some(HeapNode { key: 3, value: 'c' }));
    /// assert_eq!(heap.pop(), None);
    /// # Ok::<(), fixed_kv_heap::HeapError>(())
    /// ```
    pub fn pop(&mut self) -> Option<HeapNode<K, V>> {
        if self.data.is_empty() {
            return None;
        }

        // Moves the former last node into the root slot.
        let min = self.data.swap_remove(0);
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        trace!("extracted root (len {})", self.data.len());
        Some(min)
    }

    /// Checks the min-heap invariant over the occupied prefix: no node has
    /// a key smaller than its parent's.
    ///
    /// ```
    /// use fixed_kv_heap::FixedKeyValueHeap;
    ///
    /// let mut heap = FixedKeyValueHeap::with_capacity(8)?;
    /// for key in [4, 8, 1, 9, 2] {
    ///     heap.insert(key, ())?;
    /// }
    /// assert!(heap.check_integrity());
    /// # Ok::<(), fixed_kv_heap::HeapError>(())
    /// ```
    #[must_use]
    pub fn check_integrity(&self) -> bool {
        (1..self.data.len()).all(|i| self.data[index::parent(i)].key <= self.data[i].key)
    }

    /// Consumes the heap and returns its values in ascending key order.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use fixed_kv_heap::FixedKeyValueHeap;
    ///
    /// let mut heap = FixedKeyValueHeap::with_capacity(5)?;
    /// for key in [4, 1, 5, 2, 3] {
    ///     heap.insert(key, key * 10)?;
    /// }
    ///
    /// assert_eq!(heap.into_sorted_vec(), [10, 20, 30, 40, 50]);
    /// # Ok::<(), fixed_kv_heap::HeapError>(())
    /// ```
    #[must_use = "`self` will be dropped if the result is not used"]
    pub fn into_sorted_vec(mut self) -> Vec<V> {
        let mut sorted = Vec::with_capacity(self.len());
        while let Some(node) = self.pop() {
            sorted.push(node.value);
        }
        sorted
    }

    /// Clears the heap, returning an iterator over the removed values in
    /// ascending key order. If the iterator is dropped before being fully
    /// consumed, the remaining nodes are dropped in key order as well.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use fixed_kv_heap::FixedKeyValueHeap;
    ///
    /// let mut heap = FixedKeyValueHeap::with_capacity(5)?;
    /// for key in [3, 5, 1, 4, 2] {
    ///     heap.insert(key, key)?;
    /// }
    ///
    /// assert_eq!(heap.drain_sorted().take(2).collect::<Vec<_>>(), [1, 2]);
    /// assert!(heap.is_empty());
    /// # Ok::<(), fixed_kv_heap::HeapError>(())
    /// ```
    #[inline]
    pub fn drain_sorted(&mut self) -> DrainSorted<'_, K, V> {
        DrainSorted { inner: self }
    }

    /// Moves the node at `pos` towards the root while its key is strictly
    /// smaller than its parent's. Returns the final position.
    ///
    /// The caller must guarantee that `pos < self.len()`.
    fn sift_up(&mut self, mut pos: usize) -> usize {
        debug_assert!(pos < self.data.len());

        while pos > 0 {
            let parent = index::parent(pos);
            if self.data[pos].key >= self.data[parent].key {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }

        pos
    }

    /// Moves the node at `pos` towards the leaves while one of its children
    /// has a strictly smaller key. On a tie between the two children the
    /// left one is taken.
    ///
    /// The caller must guarantee that `pos < self.len()`.
    fn sift_down(&mut self, mut pos: usize) {
        let len = self.data.len();
        debug_assert!(pos < len);

        loop {
            let left = index::left(pos);
            let right = index::right(pos);
            let mut smallest = pos;

            if left < len && self.data[left].key < self.data[smallest].key {
                smallest = left;
            }
            if right < len && self.data[right].key < self.data[smallest].key {
                smallest = right;
            }

            // Also covers the leaf case, where neither child exists.
            if smallest == pos {
                return;
            }

            self.swap(pos, smallest);
            pos = smallest;
        }
    }

    /// Both indices must be occupied.
    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        debug_assert!(a < self.data.len() && b < self.data.len());
        self.data.swap(a, b);
    }
}

impl<K, V> FixedKeyValueHeap<K, V> {
    /// Returns an iterator visiting all values in storage order, which is
    /// not sorted.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use fixed_kv_heap::FixedKeyValueHeap;
    ///
    /// let mut heap = FixedKeyValueHeap::with_capacity(4)?;
    /// heap.insert(2, "two")?;
    /// heap.insert(1, "one")?;
    ///
    /// let mut values: Vec<_> = heap.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, ["one", "two"]);
    /// # Ok::<(), fixed_kv_heap::HeapError>(())
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            iter: self.data.iter(),
        }
    }

    /// Returns an iterator over `(level, index, key)` for every occupied
    /// slot in storage order. Meant for diagnostics; it carries no ordering
    /// guarantee beyond the array layout.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_kv_heap::FixedKeyValueHeap;
    ///
    /// let mut heap = FixedKeyValueHeap::with_capacity(4)?;
    /// for key in [5, 3, 8, 1] {
    ///     heap.insert(key, ())?;
    /// }
    ///
    /// let dump: Vec<_> = heap.levels().collect();
    /// assert_eq!(dump, [(0, 0, &1), (1, 1, &3), (1, 2, &8), (2, 3, &5)]);
    /// # Ok::<(), fixed_kv_heap::HeapError>(())
    /// ```
    pub fn levels(&self) -> Levels<'_, K, V> {
        Levels {
            iter: self.data.iter().enumerate(),
        }
    }

    /// Returns the node with the smallest key, or `None` if the heap is
    /// empty.
    ///
    /// # Time complexity
    ///
    /// Cost is *O*(1) in the worst case.
    #[must_use]
    pub fn peek(&self) -> Option<&HeapNode<K, V>> {
        self.data.first()
    }

    /// Returns the fixed number of nodes the heap can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of occupied slots.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use fixed_kv_heap::FixedKeyValueHeap;
    ///
    /// let mut heap = FixedKeyValueHeap::with_capacity(4)?;
    /// heap.insert(1, "one")?;
    /// heap.insert(3, "three")?;
    ///
    /// assert_eq!(heap.len(), 2);
    /// # Ok::<(), fixed_kv_heap::HeapError>(())
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Drops all nodes. The reserved storage is kept.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

/// An iterator over the values of a `FixedKeyValueHeap`.
///
/// This `struct` is created by [`FixedKeyValueHeap::iter()`]. See its
/// documentation for more.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K: 'a, V: 'a> {
    iter: slice::Iter<'a, HeapNode<K, V>>,
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.iter.as_slice()).finish()
    }
}

// `#[derive(Clone)]` would require `K: Clone` and `V: Clone`.
impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            iter: self.iter.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.iter.next().map(|node| &node.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }

    #[inline]
    fn last(self) -> Option<&'a V> {
        self.iter.last().map(|node| &node.value)
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a V> {
        self.iter.next_back().map(|node| &node.value)
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a FixedKeyValueHeap<K, V> {
    type Item = &'a V;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// A diagnostic iterator over `(level, index, key)` triples of a
/// `FixedKeyValueHeap`.
///
/// This `struct` is created by [`FixedKeyValueHeap::levels()`]. A clone
/// continues independently from the current position; call `levels()` again
/// to start over.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Levels<'a, K: 'a, V: 'a> {
    iter: Enumerate<slice::Iter<'a, HeapNode<K, V>>>,
}

impl<K, V> Clone for Levels<'_, K, V> {
    fn clone(&self) -> Self {
        Levels {
            iter: self.iter.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Levels<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Levels<'a, K, V> {
    type Item = (usize, usize, &'a K);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .next()
            .map(|(i, node)| (index::level(i), i, &node.key))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Levels<'_, K, V> {}

impl<K, V> FusedIterator for Levels<'_, K, V> {}

/// A draining iterator over the values of a `FixedKeyValueHeap`, in
/// ascending key order.
///
/// This `struct` is created by [`FixedKeyValueHeap::drain_sorted()`]. See
/// its documentation for more.
#[derive(Debug)]
pub struct DrainSorted<'a, K: Ord, V> {
    inner: &'a mut FixedKeyValueHeap<K, V>,
}

impl<'a, K: Ord, V> Drop for DrainSorted<'a, K, V> {
    /// Removes heap elements in heap order.
    fn drop(&mut self) {
        struct DropGuard<'r, 'a, K: Ord, V>(&'r mut DrainSorted<'a, K, V>);

        impl<'r, 'a, K: Ord, V> Drop for DropGuard<'r, 'a, K, V> {
            fn drop(&mut self) {
                while self.0.inner.pop().is_some() {}
            }
        }

        while let Some(item) = self.inner.pop() {
            let guard = DropGuard(self);
            drop(item);
            core::mem::forget(guard);
        }
    }
}

impl<K: Ord, V> Iterator for DrainSorted<'_, K, V> {
    type Item = V;

    #[inline]
    fn next(&mut self) -> Option<V> {
        self.inner.pop().map(|node| node.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let exact = self.inner.len();
        (exact, Some(exact))
    }
}

impl<K: Ord, V> ExactSizeIterator for DrainSorted<'_, K, V> {}

impl<K: Ord, V> FusedIterator for DrainSorted<'_, K, V> {}
