//! Bounded LIFO stack with move-to-top semantics.
//!
//! `push` first removes any entry with the same identity (as decided by the
//! identity function given at construction), then places the new entry on top.
//! When the stack grows past its capacity the bottom entry, the oldest, is
//! evicted. Push and remove are O(n) because of the identity scan; pop and
//! peek are O(1).

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct BoundedStack<T> {
    // front is the top of the stack
    items: VecDeque<T>,
    capacity: usize,
    same: fn(&T, &T) -> bool,
}

impl<T> BoundedStack<T> {
    pub fn new(capacity: usize, same: fn(&T, &T) -> bool) -> Self {
        BoundedStack {
            items: VecDeque::new(),
            capacity: capacity.max(1),
            same,
        }
    }

    /// Pushes `item` on top. Returns the bottom entry if it was evicted.
    pub fn push(&mut self, item: T) -> Option<T> {
        if let Some(pos) = self.items.iter().position(|e| (self.same)(e, &item)) {
            self.items.remove(pos);
        }
        self.items.push_front(item);
        if self.items.len() > self.capacity {
            return self.items.pop_back();
        }
        None
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    /// Removes every entry matching `predicate`.
    pub fn remove_where<P: Fn(&T) -> bool>(&mut self, predicate: P) -> usize {
        let before = self.items.len();
        self.items.retain(|e| !predicate(e));
        before - self.items.len()
    }

    pub fn contains_where<P: Fn(&T) -> bool>(&self, predicate: P) -> bool {
        self.items.iter().any(predicate)
    }

    /// Entries from the top (most recent) down.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
