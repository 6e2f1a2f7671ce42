//! Values grouped under a key: artist -> songs, category -> members,
//! user -> library. Each group is a linked list kept in insertion order and
//! never holds the same value twice. Empty groups are dropped so a key with
//! no members is never listed.

use crate::structures::{DoublyLinkedList, HashTable};
use std::fmt::Display;

pub struct GroupedIndex<K, V> {
    groups: HashTable<K, DoublyLinkedList<V>>,
}

impl<K: Eq + Display + Clone, V: PartialEq + Clone> Default for GroupedIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Display + Clone, V: PartialEq + Clone> GroupedIndex<K, V> {
    pub fn new() -> Self {
        GroupedIndex {
            groups: HashTable::new(),
        }
    }

    pub fn with_buckets(buckets: usize) -> Self {
        GroupedIndex {
            groups: HashTable::with_buckets(buckets),
        }
    }

    /// Appends `value` to the group of `key`. Returns false if it was already
    /// a member.
    pub fn add(&mut self, key: K, value: V) -> bool {
        let group = self.groups.get_or_insert_with(key, DoublyLinkedList::new);
        if group.contains(&value) {
            return false;
        }
        group.append(value);
        true
    }

    pub fn remove(&mut self, key: &K, value: &V) -> bool {
        let Some(group) = self.groups.get_mut(key) else {
            return false;
        };
        let removed = group.remove(value);
        if group.is_empty() {
            self.groups.delete(key);
        }
        removed
    }

    /// Drops the whole group, returning its members in order.
    pub fn remove_group(&mut self, key: &K) -> Vec<V> {
        self.groups
            .remove(key)
            .map(|group| group.to_vec())
            .unwrap_or_default()
    }

    /// Removes `value` from every group it belongs to.
    pub fn remove_everywhere(&mut self, value: &V) -> usize {
        let mut removed = 0;
        for group in self.groups.values_mut() {
            removed += group.remove_all(|v| v == value);
        }
        if removed > 0 {
            self.drop_empty_groups();
        }
        removed
    }

    fn drop_empty_groups(&mut self) {
        let empty: Vec<K> = self
            .groups
            .entries()
            .filter(|(_, group)| group.is_empty())
            .map(|(key, _)| key.clone())
            .collect();
        for key in empty {
            self.groups.delete(&key);
        }
    }

    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.groups
            .get(key)
            .is_some_and(|group| group.contains(value))
    }

    pub fn members(&self, key: &K) -> Vec<V> {
        self.groups
            .get(key)
            .map(|group| group.to_vec())
            .unwrap_or_default()
    }

    pub fn first(&self, key: &K) -> Option<&V> {
        self.groups.get(key).and_then(|group| group.first())
    }

    pub fn group_len(&self, key: &K) -> usize {
        self.groups.get(key).map_or(0, |group| group.len())
    }

    pub fn keys(&self) -> Vec<K> {
        self.groups.keys().cloned().collect()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&K, &DoublyLinkedList<V>)> {
        self.groups.entries()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Members across all groups.
    pub fn total_len(&self) -> usize {
        self.groups.values().map(|group| group.len()).sum()
    }
}
