//! Fixed-capacity circular queue backing the snake body.
//!
//! Storage is allocated once; `left` and `right` only ever move through
//! [`wrap::incr`] and [`wrap::decr`], so nothing is reallocated while the
//! game runs. Live elements sit in `[left, right)` modulo the capacity.
//!
//! The snake sizes its ring one slot past the grid area, so a snake that
//! fills the grid while still growing can put its head on its tail once and
//! be reported dead by the next collision check instead of overflowing.

use std::fmt;

use crate::wrap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    Full { capacity: usize },
    Empty,
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingError::Full { capacity } => {
                write!(f, "tried to push into a full ring buffer (capacity {})", capacity)
            }
            RingError::Empty => write!(f, "tried to take an element from an empty ring buffer"),
        }
    }
}

impl std::error::Error for RingError {}

#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    data: Box<[T]>,
    left: usize,
    right: usize,
    size: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        RingBuffer {
            data: vec![T::default(); capacity].into_boxed_slice(),
            left: 0,
            right: 0,
            size: 0,
        }
    }
}

impl<T: Copy> RingBuffer<T> {
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn is_full(&self) -> bool {
        self.size == self.data.len()
    }

    pub fn push_back(&mut self, x: T) -> Result<(), RingError> {
        if self.is_full() {
            return Err(RingError::Full { capacity: self.capacity() });
        }
        self.data[self.right] = x;
        self.right = wrap::incr(self.right, self.capacity());
        self.size += 1;
        Ok(())
    }

    /// Removes the most recently pushed element.
    pub fn pop_back(&mut self) -> Result<T, RingError> {
        if self.is_empty() {
            return Err(RingError::Empty);
        }
        self.right = wrap::decr(self.right, self.capacity());
        self.size -= 1;
        Ok(self.data[self.right])
    }

    pub fn pop_front(&mut self) -> Result<T, RingError> {
        if self.is_empty() {
            return Err(RingError::Empty);
        }
        let x = self.data[self.left];
        self.left = wrap::incr(self.left, self.capacity());
        self.size -= 1;
        Ok(x)
    }

    pub fn peek_back(&self) -> Result<T, RingError> {
        if self.is_empty() {
            return Err(RingError::Empty);
        }
        Ok(self.data[wrap::decr(self.right, self.capacity())])
    }

    pub fn peek_front(&self) -> Result<T, RingError> {
        if self.is_empty() {
            return Err(RingError::Empty);
        }
        Ok(self.data[self.left])
    }

    /// Front-to-back traversal. A full buffer has `left == right`, so the
    /// iterator counts remaining elements instead of comparing cursors.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { ring: self, index: self.left, remaining: self.size }
    }

    /// Short-circuits on the first element failing `pred`.
    pub fn all<F>(&self, pred: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().all(pred)
    }
}

pub struct Iter<'a, T> {
    ring: &'a RingBuffer<T>,
    index: usize,
    remaining: usize,
}

impl<'a, T: Copy> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let item = &self.ring.data[self.index];
        self.index = wrap::incr(self.index, self.ring.capacity());
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: Copy> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T: Copy> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
