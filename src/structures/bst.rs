//! Unbalanced binary search tree over case-normalized string keys.
//!
//! The key of an item is produced by a caller supplied function and lowercased
//! before comparison. Several items may share a key (two songs with the same
//! title): each node carries a bucket, and removal of a single item only drops
//! the node once its bucket is empty.
//!
//! Complexity: insert, search and delete are O(h) where h is the tree height.
//! No rebalancing is performed, so inserting keys in sorted order degrades the
//! tree into a list and h becomes n. Prefix search and range queries visit
//! O(h + k) nodes; substring search is always a full O(n) scan.

use std::cmp::Ordering;

type Link<T> = Option<Box<Node<T>>>;

#[derive(Debug)]
struct Node<T> {
    key: String,
    items: Vec<T>,
    left: Link<T>,
    right: Link<T>,
}

impl<T> Node<T> {
    fn new(key: String, item: T) -> Self {
        Node {
            key,
            items: vec![item],
            left: None,
            right: None,
        }
    }
}

pub struct BinarySearchTree<T> {
    root: Link<T>,
    len: usize,
    key_of: fn(&T) -> String,
}

fn normalize(key: &str) -> String {
    key.to_lowercase()
}

impl<T: PartialEq> BinarySearchTree<T> {
    pub fn new(key_of: fn(&T) -> String) -> Self {
        BinarySearchTree {
            root: None,
            len: 0,
            key_of,
        }
    }

    /// Inserts `item` under its extracted key. Returns false when an equal item
    /// is already stored under that key.
    pub fn insert(&mut self, item: T) -> bool {
        let key = normalize(&(self.key_of)(&item));
        let mut link = &mut self.root;
        while let Some(node) = link {
            match key.cmp(&node.key) {
                Ordering::Less => link = &mut node.left,
                Ordering::Greater => link = &mut node.right,
                Ordering::Equal => {
                    if node.items.contains(&item) {
                        return false;
                    }
                    node.items.push(item);
                    self.len += 1;
                    return true;
                }
            }
        }
        *link = Some(Box::new(Node::new(key, item)));
        self.len += 1;
        true
    }

    /// Returns the first item stored under `key`.
    pub fn search(&self, key: &str) -> Option<&T> {
        self.search_all(key).first()
    }

    /// Returns every item stored under `key`, in insertion order.
    pub fn search_all(&self, key: &str) -> &[T] {
        let key = normalize(key);
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return &node.items,
            };
        }
        &[]
    }

    /// Items whose key starts with `prefix`, in key order. Subtrees that
    /// cannot hold a matching key are skipped.
    pub fn search_by_prefix(&self, prefix: &str) -> Vec<&T> {
        let prefix = normalize(prefix);
        let mut out = Vec::new();
        self.walk(
            |key| prefix.as_str() < key,
            |key| key < prefix.as_str() || key.starts_with(prefix.as_str()),
            |node| {
                if node.key.starts_with(prefix.as_str()) {
                    out.extend(node.items.iter());
                }
            },
        );
        out
    }

    /// Items whose key contains `needle`. Always scans the whole tree.
    pub fn search_containing(&self, needle: &str) -> Vec<&T> {
        let needle = normalize(needle);
        let mut out = Vec::new();
        self.walk(
            |_| true,
            |_| true,
            |node| {
                if node.key.contains(needle.as_str()) {
                    out.extend(node.items.iter());
                }
            },
        );
        out
    }

    /// Items with `start <= key <= end`, in key order.
    pub fn get_range(&self, start: &str, end: &str) -> Vec<&T> {
        let start = normalize(start);
        let end = normalize(end);
        let mut out = Vec::new();
        self.walk(
            |key| start.as_str() < key,
            |key| key < end.as_str(),
            |node| {
                if node.key.as_str() >= start.as_str() && node.key.as_str() <= end.as_str() {
                    out.extend(node.items.iter());
                }
            },
        );
        out
    }

    /// Removes the node for `key` with all of its items.
    pub fn delete(&mut self, key: &str) -> Option<Vec<T>> {
        let key = normalize(key);
        let link = Self::find_link(&mut self.root, &key);
        let node = Self::detach(link)?;
        self.len -= node.items.len();
        Some(node.items)
    }

    /// Removes a single item stored under `key`. The node itself goes away
    /// only when this was its last item.
    pub fn delete_item(&mut self, key: &str, item: &T) -> bool {
        let key = normalize(key);
        let link = Self::find_link(&mut self.root, &key);
        let emptied = match link.as_mut() {
            None => return false,
            Some(node) => match node.items.iter().position(|i| i == item) {
                None => return false,
                Some(pos) => {
                    node.items.remove(pos);
                    node.items.is_empty()
                }
            },
        };
        self.len -= 1;
        if emptied {
            Self::detach(link);
        }
        true
    }

    /// Every item in key order.
    pub fn in_order(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.len);
        self.walk(|_| true, |_| true, |node| out.extend(node.items.iter()));
        out
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.in_order().into_iter().cloned().collect()
    }

    pub fn min(&self) -> Option<&T> {
        let mut current = self.root.as_deref()?;
        while let Some(left) = current.left.as_deref() {
            current = left;
        }
        current.items.first()
    }

    pub fn max(&self) -> Option<&T> {
        let mut current = self.root.as_deref()?;
        while let Some(right) = current.right.as_deref() {
            current = right;
        }
        current.items.first()
    }

    /// Number of items, not nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        drop_links(self.root.take());
        self.len = 0;
    }

    /// Height of the tree, 0 when empty.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut level: Vec<&Node<T>> = self.root.as_deref().into_iter().collect();
        while !level.is_empty() {
            depth += 1;
            level = level
                .iter()
                .flat_map(|n| n.left.as_deref().into_iter().chain(n.right.as_deref()))
                .collect();
        }
        depth
    }

    /// In-order walk. `go_left`/`go_right` decide, from a node key, whether its
    /// subtrees may hold anything of interest.
    fn walk<'a, L, R, V>(&'a self, go_left: L, go_right: R, mut visit: V)
    where
        L: Fn(&str) -> bool,
        R: Fn(&str) -> bool,
        V: FnMut(&'a Node<T>),
    {
        let mut stack: Vec<&'a Node<T>> = Vec::new();
        let mut current = self.root.as_deref();
        loop {
            while let Some(node) = current {
                stack.push(node);
                current = if go_left(&node.key) {
                    node.left.as_deref()
                } else {
                    None
                };
            }
            let Some(node) = stack.pop() else {
                break;
            };
            visit(node);
            current = if go_right(&node.key) {
                node.right.as_deref()
            } else {
                None
            };
        }
    }

    /// Link holding the node for `key`, or the empty link where it would go.
    fn find_link<'a>(mut link: &'a mut Link<T>, key: &str) -> &'a mut Link<T> {
        loop {
            let ordering = match link.as_ref().map(|node| key.cmp(node.key.as_str())) {
                None | Some(Ordering::Equal) => return link,
                Some(ordering) => ordering,
            };
            if let Some(node) = link {
                link = if ordering == Ordering::Less {
                    &mut node.left
                } else {
                    &mut node.right
                };
            }
        }
    }

    /// Unlinks the node at `link`: leaves are dropped, a single child is
    /// spliced in, and with two children the in-order successor takes its place.
    fn detach(link: &mut Link<T>) -> Option<Box<Node<T>>> {
        let mut node = link.take()?;
        *link = match (node.left.take(), node.right.take()) {
            (None, None) => None,
            (Some(child), None) | (None, Some(child)) => Some(child),
            (Some(left), Some(right)) => {
                let (mut successor, rest) = Self::take_min(right);
                successor.left = Some(left);
                successor.right = rest;
                Some(successor)
            }
        };
        Some(node)
    }

    fn take_min(mut node: Box<Node<T>>) -> (Box<Node<T>>, Link<T>) {
        match node.left.take() {
            None => {
                let rest = node.right.take();
                (node, rest)
            }
            Some(left) => {
                let (min, rest) = Self::take_min(left);
                node.left = rest;
                (min, Some(node))
            }
        }
    }
}

impl<T> Drop for BinarySearchTree<T> {
    fn drop(&mut self) {
        drop_links(self.root.take());
    }
}

/// Frees a subtree without recursing, so a degenerate tree built from sorted
/// keys cannot blow the stack.
fn drop_links<T>(root: Link<T>) {
    let mut stack: Vec<Box<Node<T>>> = root.into_iter().collect();
    while let Some(mut node) = stack.pop() {
        stack.extend(node.left.take());
        stack.extend(node.right.take());
    }
}
