//! A sparse set of instruction indexes, cleared in constant time.
//!
//! Iteration yields members in insertion order, which is what the VM relies
//! on to keep its threads in priority order.

use crate::util::DebugCheckIndex;

#[derive(Clone)]
pub struct SparseSet {
    dense: Vec<usize>,
    sparse: Vec<usize>,
}

impl SparseSet {
    /// Create a set able to hold values in `0..capacity`.
    pub fn new(capacity: usize) -> SparseSet {
        SparseSet {
            dense: Vec::with_capacity(capacity),
            sparse: vec![0; capacity],
        }
    }

    /// \return the number of values the set can hold.
    pub fn capacity(&self) -> usize {
        self.sparse.len()
    }

    /// Grow or shrink the set to hold values in `0..capacity`.
    /// This clears the set.
    pub fn resize(&mut self, capacity: usize) {
        self.clear();
        self.sparse.resize(capacity, 0);
        self.dense.reserve(capacity);
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Insert \p val, which must be less than the capacity.
    /// \return true if the value was newly inserted.
    #[inline]
    pub fn insert(&mut self, val: usize) -> bool {
        if self.contains(val) {
            return false;
        }
        *self.sparse.mat(val) = self.dense.len();
        self.dense.push(val);
        true
    }

    #[inline]
    pub fn contains(&self, val: usize) -> bool {
        match self.sparse.get(val) {
            Some(&idx) => self.dense.get(idx) == Some(&val),
            // Out of range values are never members.
            None => false,
        }
    }

    /// \return the value at position \p idx in insertion order.
    #[inline]
    pub fn get(&self, idx: usize) -> usize {
        *self.dense.iat(idx)
    }

    /// Remove all values.
    #[inline]
    pub fn clear(&mut self) {
        self.dense.clear();
    }
}

impl core::fmt::Debug for SparseSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SparseSet({:?})", &self.dense)
    }
}
