//! Doubly linked list stored in an arena.
//!
//! Nodes live in a slot vector and link to each other by index. Appending,
//! prepending and removing through a [`NodeHandle`] are O(1); removing by value
//! and positional lookup are O(n). Handles carry a generation so a handle to a
//! removed node never resolves to whatever reuses its slot.
//!
//! The list also carries an optional cursor used for playlist navigation:
//! it can be placed by value in O(n) and moved forwards or backwards in O(1),
//! wrapping around at either end.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle {
    index: usize,
    generation: u64,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: Option<T>,
    prev: Option<usize>,
    next: Option<usize>,
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct DoublyLinkedList<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    current: Option<usize>,
    len: usize,
}

impl<T> Default for DoublyLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DoublyLinkedList<T> {
    pub fn new() -> Self {
        DoublyLinkedList {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            current: None,
            len: 0,
        }
    }

    fn allocate(&mut self, value: T) -> usize {
        match self.free.pop() {
            Some(index) => {
                self.slots[index].value = Some(value);
                index
            }
            None => {
                self.slots.push(Slot {
                    value: Some(value),
                    prev: None,
                    next: None,
                    generation: 0,
                });
                self.slots.len() - 1
            }
        }
    }

    fn handle_of(&self, index: usize) -> NodeHandle {
        NodeHandle {
            index,
            generation: self.slots[index].generation,
        }
    }

    fn resolve(&self, handle: NodeHandle) -> Option<usize> {
        let slot = self.slots.get(handle.index)?;
        (slot.generation == handle.generation && slot.value.is_some()).then_some(handle.index)
    }

    pub fn append(&mut self, value: T) -> NodeHandle {
        let index = self.allocate(value);
        self.slots[index].prev = self.tail;
        self.slots[index].next = None;
        match self.tail {
            Some(tail) => self.slots[tail].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
        self.handle_of(index)
    }

    pub fn prepend(&mut self, value: T) -> NodeHandle {
        let index = self.allocate(value);
        self.slots[index].prev = None;
        self.slots[index].next = self.head;
        match self.head {
            Some(head) => self.slots[head].prev = Some(index),
            None => self.tail = Some(index),
        }
        self.head = Some(index);
        self.len += 1;
        self.handle_of(index)
    }

    /// O(1) removal. A cursor resting on the removed node steps back to its
    /// predecessor, so advancing afterwards lands on the node that followed.
    pub fn remove_node(&mut self, handle: NodeHandle) -> Option<T> {
        let index = self.resolve(handle)?;
        let (prev, next) = (self.slots[index].prev, self.slots[index].next);
        match prev {
            Some(prev) => self.slots[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slots[next].prev = prev,
            None => self.tail = prev,
        }
        if self.current == Some(index) {
            self.current = prev;
        }

        let slot = &mut self.slots[index];
        slot.prev = None;
        slot.next = None;
        slot.generation += 1;
        let value = slot.value.take();
        self.free.push(index);
        self.len -= 1;
        value
    }

    pub fn find<P: Fn(&T) -> bool>(&self, predicate: P) -> Option<NodeHandle> {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            if self.slots[index].value.as_ref().is_some_and(&predicate) {
                return Some(self.handle_of(index));
            }
            cursor = self.slots[index].next;
        }
        None
    }

    /// Removes the first element matching `predicate`.
    pub fn remove_first<P: Fn(&T) -> bool>(&mut self, predicate: P) -> Option<T> {
        let handle = self.find(predicate)?;
        self.remove_node(handle)
    }

    /// Removes every element matching `predicate`, returning how many went.
    pub fn remove_all<P: Fn(&T) -> bool>(&mut self, predicate: P) -> usize {
        let mut removed = 0;
        while self.remove_first(&predicate).is_some() {
            removed += 1;
        }
        removed
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        let index = self.resolve(handle)?;
        self.slots[index].value.as_ref()
    }

    pub fn get_at(&self, position: usize) -> Option<&T> {
        self.iter().nth(position)
    }

    pub fn first(&self) -> Option<&T> {
        self.head.and_then(|i| self.slots[i].value.as_ref())
    }

    pub fn last(&self) -> Option<&T> {
        self.tail.and_then(|i| self.slots[i].value.as_ref())
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn current(&self) -> Option<&T> {
        self.current.and_then(|i| self.slots[i].value.as_ref())
    }

    /// Places the cursor on the first element matching `predicate`.
    pub fn set_current_by<P: Fn(&T) -> bool>(&mut self, predicate: P) -> bool {
        match self.find(predicate) {
            Some(handle) => {
                self.current = Some(handle.index);
                true
            }
            None => false,
        }
    }

    pub fn reset_cursor(&mut self) {
        self.current = None;
    }

    /// Moves the cursor forward, wrapping from the tail to the head. Without a
    /// cursor this starts at the head.
    pub fn advance(&mut self) -> Option<&T> {
        self.current = match self.current {
            Some(index) => self.slots[index].next.or(self.head),
            None => self.head,
        };
        self.current()
    }

    /// Moves the cursor backward, wrapping from the head to the tail. Without a
    /// cursor this starts at the tail.
    pub fn retreat(&mut self) -> Option<&T> {
        self.current = match self.current {
            Some(index) => self.slots[index].prev.or(self.tail),
            None => self.tail,
        };
        self.current()
    }
}

impl<T: PartialEq> DoublyLinkedList<T> {
    pub fn contains(&self, value: &T) -> bool {
        self.iter().any(|v| v == value)
    }

    pub fn remove(&mut self, value: &T) -> bool {
        self.remove_first(|v| v == value).is_some()
    }
}

pub struct Iter<'a, T> {
    list: &'a DoublyLinkedList<T>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front?;
        let slot = &self.list.slots[index];
        self.front = slot.next;
        self.remaining -= 1;
        slot.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back?;
        let slot = &self.list.slots[index];
        self.back = slot.prev;
        self.remaining -= 1;
        slot.value.as_ref()
    }
}

impl<'a, T> IntoIterator for &'a DoublyLinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
