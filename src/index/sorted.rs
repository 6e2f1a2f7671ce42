use crate::structures::BinarySearchTree;

#[derive(Debug, Clone, PartialEq)]
struct SortedEntry<Id> {
    key: String,
    id: Id,
}

/// Ids ordered by a text key (song title, artist name), case-insensitively.
/// Keys may repeat; each (key, id) pair is one entry.
pub struct SortedIndex<Id> {
    tree: BinarySearchTree<SortedEntry<Id>>,
}

impl<Id: PartialEq + Copy> Default for SortedIndex<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: PartialEq + Copy> SortedIndex<Id> {
    pub fn new() -> Self {
        SortedIndex {
            tree: BinarySearchTree::new(|entry: &SortedEntry<Id>| entry.key.clone()),
        }
    }

    pub fn insert(&mut self, key: &str, id: Id) -> bool {
        self.tree.insert(SortedEntry {
            key: key.to_string(),
            id,
        })
    }

    /// `key` must be the text the id was inserted under.
    pub fn remove(&mut self, key: &str, id: Id) -> bool {
        let entry = SortedEntry {
            key: key.to_string(),
            id,
        };
        self.tree.delete_item(key, &entry)
    }

    pub fn find(&self, key: &str) -> Option<Id> {
        self.tree.search(key).map(|e| e.id)
    }

    pub fn find_all(&self, key: &str) -> Vec<Id> {
        self.tree.search_all(key).iter().map(|e| e.id).collect()
    }

    pub fn containing(&self, needle: &str) -> Vec<Id> {
        Self::ids(self.tree.search_containing(needle))
    }

    pub fn range(&self, start: &str, end: &str) -> Vec<Id> {
        Self::ids(self.tree.get_range(start, end))
    }

    pub fn ordered(&self) -> Vec<Id> {
        Self::ids(self.tree.in_order())
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    fn ids(entries: Vec<&SortedEntry<Id>>) -> Vec<Id> {
        entries.into_iter().map(|e| e.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_ids_by_key() {
        let mut index = SortedIndex::new();
        index.insert("Yellow", 1);
        index.insert("blue", 2);
        index.insert("Green", 3);

        assert_eq!(index.ordered(), vec![2, 3, 1]);
        assert_eq!(index.find("GREEN"), Some(3));
        assert_eq!(index.range("b", "h"), vec![2, 3]);
        assert_eq!(index.containing("l"), vec![2, 1]);
    }

    #[test]
    fn duplicate_keys_are_removed_one_id_at_a_time() {
        let mut index = SortedIndex::new();
        index.insert("Intro", 1);
        index.insert("Intro", 2);

        assert_eq!(index.find_all("intro"), vec![1, 2]);
        assert!(index.remove("Intro", 1));
        assert!(!index.remove("Intro", 1));
        assert_eq!(index.find_all("intro"), vec![2]);
        assert_eq!(index.len(), 1);
    }
}
