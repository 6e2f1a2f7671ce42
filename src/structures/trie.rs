//! Prefix trie used for autocomplete.
//!
//! Words are lowercased before insertion. The node that terminates a word holds
//! a bucket of every item inserted under that exact word, without duplicates.
//! Children are kept in insertion order, so a prefix search walks depth-first
//! and reports items in the order they were added within each node.
//!
//! Insert and exact search are O(m) in the word length; collecting k results
//! after reaching the prefix node is O(k) plus the nodes visited. Memory grows
//! with the number of distinct character paths, so shared prefixes are cheap.

#[derive(Debug)]
struct TrieNode<T> {
    children: Vec<(char, TrieNode<T>)>,
    items: Vec<T>,
}

impl<T> TrieNode<T> {
    fn new() -> Self {
        TrieNode {
            children: Vec::new(),
            items: Vec::new(),
        }
    }

    fn child(&self, c: char) -> Option<&TrieNode<T>> {
        self.children
            .iter()
            .find(|(k, _)| *k == c)
            .map(|(_, node)| node)
    }

    fn is_prunable(&self) -> bool {
        self.items.is_empty() && self.children.is_empty()
    }
}

#[derive(Debug)]
pub struct Trie<T> {
    root: TrieNode<T>,
    len: usize,
}

impl<T: PartialEq> Default for Trie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> Trie<T> {
    pub fn new() -> Self {
        Trie {
            root: TrieNode::new(),
            len: 0,
        }
    }

    /// Adds `item` to the bucket of `word`. Returns false for an empty word or
    /// when the bucket already holds an equal item.
    pub fn insert(&mut self, word: &str, item: T) -> bool {
        let word = word.to_lowercase();
        if word.is_empty() {
            return false;
        }
        let mut node = &mut self.root;
        for c in word.chars() {
            let pos = match node.children.iter().position(|(k, _)| *k == c) {
                Some(pos) => pos,
                None => {
                    node.children.push((c, TrieNode::new()));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[pos].1;
        }
        if node.items.contains(&item) {
            return false;
        }
        node.items.push(item);
        self.len += 1;
        true
    }

    fn find_node(&self, prefix: &str) -> Option<&TrieNode<T>> {
        let mut node = &self.root;
        for c in prefix.to_lowercase().chars() {
            node = node.child(c)?;
        }
        Some(node)
    }

    /// Items stored under exactly `word`.
    pub fn search(&self, word: &str) -> &[T] {
        match self.find_node(word) {
            Some(node) => &node.items,
            None => &[],
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        !self.search(word).is_empty()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        !prefix.is_empty() && self.find_node(prefix).is_some()
    }

    /// Collects at most `limit` distinct items stored under any word starting
    /// with `prefix`. An empty or unknown prefix yields nothing.
    pub fn search_by_prefix(&self, prefix: &str, limit: usize) -> Vec<&T> {
        let mut out: Vec<&T> = Vec::new();
        if prefix.is_empty() || limit == 0 {
            return out;
        }
        let Some(start) = self.find_node(prefix) else {
            return out;
        };

        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            for item in &node.items {
                if !out.contains(&item) {
                    out.push(item);
                    if out.len() == limit {
                        return out;
                    }
                }
            }
            // reversed so the first child is visited first
            stack.extend(node.children.iter().rev().map(|(_, child)| child));
        }
        out
    }

    /// Removes `item` from the bucket of `word`, or the whole bucket when no
    /// item is given. Nodes left without items or children are pruned. Returns
    /// the number of items removed.
    pub fn delete(&mut self, word: &str, item: Option<&T>) -> usize {
        let chars: Vec<char> = word.to_lowercase().chars().collect();
        if chars.is_empty() {
            return 0;
        }
        let removed = Self::remove_path(&mut self.root, &chars, item).unwrap_or(0);
        self.len -= removed;
        removed
    }

    fn remove_path(node: &mut TrieNode<T>, chars: &[char], item: Option<&T>) -> Option<usize> {
        match chars.split_first() {
            None => {
                let before = node.items.len();
                match item {
                    Some(item) => node.items.retain(|existing| existing != item),
                    None => node.items.clear(),
                }
                Some(before - node.items.len())
            }
            Some((c, rest)) => {
                let pos = node.children.iter().position(|(k, _)| k == c)?;
                let removed = Self::remove_path(&mut node.children[pos].1, rest, item)?;
                if node.children[pos].1.is_prunable() {
                    node.children.remove(pos);
                }
                Some(removed)
            }
        }
    }

    /// Total items across all buckets.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes below the root.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += node.children.len();
            stack.extend(node.children.iter().map(|(_, child)| child));
        }
        count
    }

    pub fn clear(&mut self) {
        self.root = TrieNode::new();
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_items_by_prefix_case_insensitively() {
        let mut trie = Trie::new();
        trie.insert("Hello", 1);
        trie.insert("help", 2);
        trie.insert("world", 3);

        assert_eq!(trie.search_by_prefix("HEL", 10), vec![&1, &2]);
        assert_eq!(trie.search_by_prefix("w", 10), vec![&3]);
        assert_eq!(trie.search("hello"), &[1]);
        assert!(trie.contains("HELP"));
        assert!(!trie.contains("hel"));
        assert!(trie.starts_with("hel"));
    }

    #[test]
    fn empty_or_unknown_prefix_yields_nothing() {
        let mut trie = Trie::new();
        trie.insert("abc", 1);

        assert!(trie.search_by_prefix("", 10).is_empty());
        assert!(trie.search_by_prefix("zzz", 10).is_empty());
        assert!(trie.search_by_prefix("abcd", 10).is_empty());
        assert!(trie.search_by_prefix("a", 0).is_empty());
    }

    #[test]
    fn stops_at_limit_in_depth_first_order() {
        let mut trie = Trie::new();
        trie.insert("ab", 1);
        trie.insert("abc", 2);
        trie.insert("abd", 3);
        trie.insert("ac", 4);

        assert_eq!(trie.search_by_prefix("a", 10), vec![&1, &2, &3, &4]);
        assert_eq!(trie.search_by_prefix("a", 2), vec![&1, &2]);
    }

    #[test]
    fn deduplicates_within_bucket_and_across_words() {
        let mut trie = Trie::new();
        assert!(trie.insert("love", 7));
        assert!(!trie.insert("LOVE", 7));
        trie.insert("love story", 7);

        assert_eq!(trie.len(), 2);
        assert_eq!(trie.search_by_prefix("lo", 10), vec![&7]);
    }

    #[test]
    fn delete_prunes_empty_childless_nodes() {
        let mut trie = Trie::new();
        trie.insert("car", 1);
        trie.insert("cart", 2);
        let nodes = trie.node_count();

        assert_eq!(trie.delete("cart", Some(&2)), 1);
        assert_eq!(trie.node_count(), nodes - 1);
        assert_eq!(trie.search_by_prefix("car", 10), vec![&1]);

        assert_eq!(trie.delete("car", None), 1);
        assert_eq!(trie.node_count(), 0);
        assert!(trie.is_empty());
    }

    #[test]
    fn delete_keeps_other_items_in_the_bucket() {
        let mut trie = Trie::new();
        trie.insert("intro", 1);
        trie.insert("intro", 2);

        assert_eq!(trie.delete("intro", Some(&1)), 1);
        assert_eq!(trie.search("intro"), &[2]);
        assert_eq!(trie.delete("intro", Some(&1)), 0);
        assert_eq!(trie.delete("missing", None), 0);
    }

    #[test]
    fn shared_prefixes_share_nodes() {
        let mut trie = Trie::new();
        trie.insert("stream", 1);
        trie.insert("streams", 2);
        trie.insert("streaming", 3);

        // s-t-r-e-a-m + s + i-n-g
        assert_eq!(trie.node_count(), 10);
    }
}
