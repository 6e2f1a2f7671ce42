//! Hash table with separate chaining.
//!
//! Keys are hashed with a polynomial rolling hash (base 31) over their string
//! form, reduced modulo the bucket count. Every operation is O(1) expected and
//! O(n) in the worst case, when all keys land in one chain. Keys here are small
//! integer ids or short category strings, never attacker controlled.
//!
//! `set` on an existing key replaces the value in place, so the entry keeps its
//! position in its chain.

use std::fmt::Display;

const DEFAULT_BUCKETS: usize = 64;

/// Average chain length above which the table doubles its bucket count.
const MAX_LOAD_FACTOR: usize = 4;

const HASH_BASE: u64 = 31;

#[derive(Debug, Clone)]
pub struct HashTable<K, V> {
    buckets: Vec<Vec<(K, V)>>,
    len: usize,
}

fn polynomial_hash(text: &str, modulus: usize) -> usize {
    let modulus = modulus as u64;
    let hash = text
        .bytes()
        .fold(0u64, |acc, byte| (acc * HASH_BASE + byte as u64) % modulus);
    hash as usize
}

impl<K: Eq + Display, V> Default for HashTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Display, V> HashTable<K, V> {
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    pub fn with_buckets(bucket_count: usize) -> Self {
        let bucket_count = bucket_count.max(1);
        HashTable {
            buckets: (0..bucket_count).map(|_| Vec::new()).collect(),
            len: 0,
        }
    }

    fn bucket_index(&self, key: &K) -> usize {
        polynomial_hash(&key.to_string(), self.buckets.len())
    }

    fn position_in_bucket(&self, bucket: usize, key: &K) -> Option<usize> {
        self.buckets[bucket].iter().position(|(k, _)| k == key)
    }

    fn grow_if_needed(&mut self, incoming: usize) {
        if self.len + incoming <= self.buckets.len() * MAX_LOAD_FACTOR {
            return;
        }
        let new_count = self.buckets.len() * 2;
        let old = std::mem::replace(
            &mut self.buckets,
            (0..new_count).map(|_| Vec::new()).collect(),
        );
        for (key, value) in old.into_iter().flatten() {
            let index = self.bucket_index(&key);
            self.buckets[index].push((key, value));
        }
    }

    /// Inserts or replaces. Returns the previous value when the key existed.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let bucket = self.bucket_index(&key);
        if let Some(pos) = self.position_in_bucket(bucket, &key) {
            return Some(std::mem::replace(&mut self.buckets[bucket][pos].1, value));
        }
        self.grow_if_needed(1);
        let bucket = self.bucket_index(&key);
        self.buckets[bucket].push((key, value));
        self.len += 1;
        None
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let bucket = self.bucket_index(key);
        self.buckets[bucket]
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let bucket = self.bucket_index(key);
        self.buckets[bucket]
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns the value for `key`, inserting the result of `make` first when
    /// the key is absent.
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, make: F) -> &mut V {
        let mut bucket = self.bucket_index(&key);
        let pos = match self.position_in_bucket(bucket, &key) {
            Some(pos) => pos,
            None => {
                self.grow_if_needed(1);
                bucket = self.bucket_index(&key);
                self.buckets[bucket].push((key, make()));
                self.len += 1;
                self.buckets[bucket].len() - 1
            }
        };
        &mut self.buckets[bucket][pos].1
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let bucket = self.bucket_index(key);
        let pos = self.position_in_bucket(bucket, key)?;
        self.len -= 1;
        Some(self.buckets[bucket].remove(pos).1)
    }

    pub fn delete(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    /// Keys in bucket order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.buckets.iter().flatten().map(|(k, _)| k)
    }

    /// Values in bucket order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.buckets.iter().flatten().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.buckets.iter_mut().flatten().map(|(_, v)| v)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets.iter().flatten().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_and_gets_values() {
        let mut table = HashTable::new();
        assert_eq!(table.set(1i64, "one"), None);
        assert_eq!(table.set(2i64, "two"), None);

        assert_eq!(table.get(&1), Some(&"one"));
        assert_eq!(table.get(&2), Some(&"two"));
        assert_eq!(table.get(&3), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn set_replaces_existing_value_in_place() {
        let mut table = HashTable::with_buckets(1);
        table.set("a".to_string(), 1);
        table.set("b".to_string(), 2);
        table.set("c".to_string(), 3);

        assert_eq!(table.set("b".to_string(), 20), Some(2));
        assert_eq!(table.len(), 3);

        // Single bucket, so key order is chain order.
        let keys: Vec<&String> = table.keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(table.get(&"b".to_string()), Some(&20));
    }

    #[test]
    fn deletes_from_the_middle_of_a_chain() {
        let mut table = HashTable::with_buckets(1);
        for i in 0..5i64 {
            table.set(i, i * 10);
        }

        assert!(table.delete(&2));
        assert!(!table.delete(&2));
        assert_eq!(table.len(), 4);
        assert_eq!(table.get(&3), Some(&30));
        assert_eq!(table.get(&2), None);
    }

    #[test]
    fn grows_without_losing_entries() {
        let mut table = HashTable::with_buckets(2);
        for i in 0..500i64 {
            table.set(i, i.to_string());
        }

        assert!(table.bucket_count() > 2);
        assert_eq!(table.len(), 500);
        for i in 0..500i64 {
            assert_eq!(table.get(&i), Some(&i.to_string()));
        }
        assert_eq!(table.entries().count(), 500);
    }

    #[test]
    fn get_or_insert_with_only_builds_missing_values() {
        let mut table: HashTable<String, Vec<i64>> = HashTable::with_buckets(1);
        table.get_or_insert_with("pop".to_string(), Vec::new).push(1);
        table.get_or_insert_with("pop".to_string(), Vec::new).push(2);

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&"pop".to_string()), Some(&vec![1, 2]));
    }

    #[test]
    fn hash_is_stable_for_the_same_string_form() {
        assert_eq!(polynomial_hash("42", 97), polynomial_hash("42", 97));
        assert!(polynomial_hash("rock", 13) < 13);
        assert_eq!(polynomial_hash("", 13), 0);
    }

    #[test]
    fn clear_empties_every_bucket() {
        let mut table = HashTable::new();
        table.set(1i64, 1);
        table.set(2i64, 2);
        table.clear();

        assert!(table.is_empty());
        assert_eq!(table.get(&1), None);
        assert_eq!(table.values().count(), 0);
    }
}
