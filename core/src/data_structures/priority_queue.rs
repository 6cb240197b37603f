//! Binary min-heap keyed by `f64` priorities.
//!
//! Dijkstra, Prim, and the potential-based flow search all need a frontier
//! ordered by a floating-point key. `std::collections::BinaryHeap` is a
//! max-heap over `Ord` payloads, which `f64` is not, so this module keeps a
//! small sift-up/sift-down heap of `(key, item)` pairs instead of wrapping
//! everything in `Reverse` + total-order shims at each call site.
//!
//! Decrease-key is handled lazily: callers re-insert an item with the
//! improved key and skip stale pops via their own visited bookkeeping. The
//! heap never stores NaN keys; pushes assert finiteness in debug builds.

/// Min-heap of items ordered by an `f64` key.
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    entries: Vec<(f64, T)>,
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts `item` with priority `key`.
    pub fn push(&mut self, key: f64, item: T) {
        debug_assert!(!key.is_nan(), "heap keys must not be NaN");
        self.entries.push((key, item));
        self.sift_up(self.entries.len() - 1);
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop(&mut self) -> Option<(f64, T)> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let top = self.entries.pop();
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        top
    }

    /// Smallest key currently stored, if any.
    pub fn peek_key(&self) -> Option<f64> {
        self.entries.first().map(|&(key, _)| key)
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.entries[index].0 < self.entries[parent].0 {
                self.entries.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;
            if left < len && self.entries[left].0 < self.entries[smallest].0 {
                smallest = left;
            }
            if right < len && self.entries[right].0 < self.entries[smallest].0 {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.entries.swap(index, smallest);
            index = smallest;
        }
    }
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_ascending_key_order() {
        let mut heap = MinHeap::new();
        for (key, item) in [(3.5, 'c'), (0.5, 'a'), (2.0, 'b'), (9.0, 'd')] {
            heap.push(key, item);
        }
        let order: Vec<char> = std::iter::from_fn(|| heap.pop().map(|(_, i)| i)).collect();
        assert_eq!(order, vec!['a', 'b', 'c', 'd']);
    }

    #[test]
    fn handles_duplicate_keys() {
        let mut heap = MinHeap::new();
        heap.push(1.0, 1usize);
        heap.push(1.0, 2usize);
        heap.push(0.0, 0usize);
        assert_eq!(heap.pop().map(|(_, i)| i), Some(0));
        let mut rest: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|(_, i)| i)).collect();
        rest.sort_unstable();
        assert_eq!(rest, vec![1, 2]);
    }

    #[test]
    fn peek_tracks_minimum() {
        let mut heap = MinHeap::new();
        assert!(heap.peek_key().is_none());
        heap.push(4.0, ());
        heap.push(-2.0, ());
        assert_eq!(heap.peek_key(), Some(-2.0));
        heap.pop();
        assert_eq!(heap.peek_key(), Some(4.0));
    }

    #[test]
    fn empty_after_draining() {
        let mut heap = MinHeap::new();
        heap.push(1.0, ());
        assert!(!heap.is_empty());
        heap.pop();
        assert!(heap.is_empty());
        assert!(heap.pop().is_none());
    }
}
