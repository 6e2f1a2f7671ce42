//! Binary heap keyed by an explicit priority, in max or min order.
//!
//! | operation         | cost                         |
//! |-------------------|------------------------------|
//! | `insert`          | O(log n)                     |
//! | `extract`         | O(log n)                     |
//! | `peek`            | O(1)                         |
//! | `update_priority` | O(n) scan + O(log n) repair  |
//! | `top_n`           | O(n + k log n) on a copy     |

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapOrder {
    Max,
    Min,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeapEntry<T, P> {
    pub data: T,
    pub priority: P,
}

#[derive(Debug, Clone)]
pub struct Heap<T, P> {
    entries: Vec<HeapEntry<T, P>>,
    order: HeapOrder,
}

impl<T, P: Ord> Heap<T, P> {
    pub fn new(order: HeapOrder) -> Self {
        Heap {
            entries: Vec::new(),
            order,
        }
    }

    pub fn max() -> Self {
        Self::new(HeapOrder::Max)
    }

    pub fn min() -> Self {
        Self::new(HeapOrder::Min)
    }

    /// Whether the entry at `a` belongs above the entry at `b`.
    fn above(&self, a: usize, b: usize) -> bool {
        let (a, b) = (&self.entries[a].priority, &self.entries[b].priority);
        match self.order {
            HeapOrder::Max => a > b,
            HeapOrder::Min => a < b,
        }
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.above(index, parent) {
                break;
            }
            self.entries.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut top = index;
            if left < len && self.above(left, top) {
                top = left;
            }
            if right < len && self.above(right, top) {
                top = right;
            }
            if top == index {
                break;
            }
            self.entries.swap(index, top);
            index = top;
        }
    }

    pub fn insert(&mut self, data: T, priority: P) {
        self.entries.push(HeapEntry { data, priority });
        let last = self.entries.len() - 1;
        self.sift_up(last);
    }

    pub fn extract(&mut self) -> Option<HeapEntry<T, P>> {
        self.remove_at(0)
    }

    pub fn peek(&self) -> Option<&HeapEntry<T, P>> {
        self.entries.first()
    }

    pub fn find<F: Fn(&T) -> bool>(&self, matches: F) -> Option<&HeapEntry<T, P>> {
        self.entries.iter().find(|e| matches(&e.data))
    }

    /// Changes the priority of the first entry whose data matches and restores
    /// the heap order around it. Returns false when nothing matched.
    pub fn update_priority<F: Fn(&T) -> bool>(&mut self, matches: F, priority: P) -> bool {
        let Some(index) = self.entries.iter().position(|e| matches(&e.data)) else {
            return false;
        };
        self.entries[index].priority = priority;
        self.sift_up(index);
        self.sift_down(index);
        true
    }

    pub fn remove<F: Fn(&T) -> bool>(&mut self, matches: F) -> Option<HeapEntry<T, P>> {
        let index = self.entries.iter().position(|e| matches(&e.data))?;
        self.remove_at(index)
    }

    fn remove_at(&mut self, index: usize) -> Option<HeapEntry<T, P>> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.swap_remove(index);
        if index < self.entries.len() {
            self.sift_down(index);
            self.sift_up(index);
        }
        Some(removed)
    }

    /// The first `n` entries in heap order. Works on a copy, the live heap is
    /// left untouched.
    pub fn top_n(&self, n: usize) -> Vec<HeapEntry<T, P>>
    where
        T: Clone,
        P: Clone,
    {
        let mut copy = self.clone();
        let mut out = Vec::with_capacity(n.min(self.entries.len()));
        while out.len() < n {
            match copy.extract() {
                Some(entry) => out.push(entry),
                None => break,
            }
        }
        out
    }

    pub fn to_sorted_vec(&self) -> Vec<HeapEntry<T, P>>
    where
        T: Clone,
        P: Clone,
    {
        self.top_n(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
