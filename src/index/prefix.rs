use crate::structures::Trie;
use unicode_segmentation::UnicodeSegmentation;

/// Autocomplete over entity texts.
///
/// An entity is filed under the whole of each of its texts and under every
/// word in them, so "sto" finds "Love Story". Callers always index and
/// unindex the complete set of texts of an entity at once; two texts sharing
/// a word would otherwise drop each other's entry.
pub struct PrefixIndex<T> {
    trie: Trie<T>,
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Distinct trie keys for a set of texts.
fn keys_for(texts: &[&str]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for text in texts {
        let full = normalize(text);
        if full.is_empty() {
            continue;
        }
        let words = full.unicode_words().map(str::to_string).collect::<Vec<_>>();
        for key in std::iter::once(full.clone()).chain(words) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys
}

impl<T: PartialEq + Clone> Default for PrefixIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq + Clone> PrefixIndex<T> {
    pub fn new() -> Self {
        PrefixIndex { trie: Trie::new() }
    }

    pub fn index(&mut self, texts: &[&str], item: T) {
        for key in keys_for(texts) {
            self.trie.insert(&key, item.clone());
        }
    }

    pub fn unindex(&mut self, texts: &[&str], item: &T) {
        for key in keys_for(texts) {
            self.trie.delete(&key, Some(item));
        }
    }

    /// Up to `limit` distinct items with a key starting with `query`. A blank
    /// query matches nothing.
    pub fn search(&self, query: &str, limit: usize) -> Vec<T> {
        let query = normalize(query);
        self.trie
            .search_by_prefix(&query, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn contains_key(&self, text: &str) -> bool {
        self.trie.contains(&normalize(text))
    }

    /// Number of (key, item) entries.
    pub fn entry_count(&self) -> usize {
        self.trie.len()
    }

    pub fn node_count(&self) -> usize {
        self.trie.node_count()
    }
}
