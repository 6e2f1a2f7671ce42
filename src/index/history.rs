use crate::catalog::HistoryEntry;
use crate::catalog_store::{SongId, UserId};
use crate::structures::{BoundedStack, HashTable};

/// Per-user play history, most recent first, bounded to `capacity` slots.
/// Replaying a song moves its slot to the front.
pub struct HistoryIndex {
    stacks: HashTable<UserId, BoundedStack<HistoryEntry>>,
    capacity: usize,
}

impl HistoryIndex {
    pub fn new(capacity: usize) -> Self {
        HistoryIndex {
            stacks: HashTable::new(),
            capacity,
        }
    }

    /// Returns the entry that fell off the bottom, if any.
    pub fn record(&mut self, user_id: UserId, entry: HistoryEntry) -> Option<HistoryEntry> {
        let capacity = self.capacity;
        self.stacks
            .get_or_insert_with(user_id, || {
                BoundedStack::new(capacity, HistoryEntry::same_song)
            })
            .push(entry)
    }

    pub fn recent(&self, user_id: UserId, limit: usize) -> Vec<HistoryEntry> {
        self.stacks
            .get(&user_id)
            .map(|stack| stack.iter().take(limit).copied().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, user_id: UserId, song_id: SongId) -> bool {
        self.stacks
            .get(&user_id)
            .is_some_and(|stack| stack.contains_where(|e| e.song_id == song_id))
    }

    /// Drops the user's history, returning how many slots it had.
    pub fn clear(&mut self, user_id: UserId) -> usize {
        self.stacks.remove(&user_id).map_or(0, |stack| stack.len())
    }

    /// Scrubs a song from every user's history.
    pub fn remove_song(&mut self, song_id: SongId) -> usize {
        self.stacks
            .values_mut()
            .map(|stack| stack.remove_where(|e| e.song_id == song_id))
            .sum()
    }

    pub fn users(&self) -> impl Iterator<Item = (&UserId, &BoundedStack<HistoryEntry>)> {
        self.stacks.entries()
    }

    pub fn total_len(&self) -> usize {
        self.stacks.values().map(|stack| stack.len()).sum()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn play(song_id: SongId, second: i64) -> HistoryEntry {
        HistoryEntry {
            song_id,
            played_at: Utc.timestamp_opt(1_700_000_000 + second, 0).unwrap(),
        }
    }

    fn songs(index: &HistoryIndex, user: UserId) -> Vec<SongId> {
        index.recent(user, 100).iter().map(|e| e.song_id).collect()
    }

    #[test]
    fn replay_moves_song_to_front() {
        let mut index = HistoryIndex::new(10);
        index.record(1, play(10, 1));
        index.record(1, play(20, 2));
        index.record(1, play(10, 3));

        assert_eq!(songs(&index, 1), vec![10, 20]);
        assert_eq!(index.recent(1, 1)[0].played_at, play(10, 3).played_at);
    }

    #[test]
    fn bounded_per_user() {
        let mut index = HistoryIndex::new(2);
        index.record(1, play(1, 1));
        index.record(1, play(2, 2));
        let evicted = index.record(1, play(3, 3));
        index.record(2, play(1, 4));

        assert_eq!(evicted.map(|e| e.song_id), Some(1));
        assert_eq!(songs(&index, 1), vec![3, 2]);
        assert_eq!(songs(&index, 2), vec![1]);
        assert_eq!(index.total_len(), 3);
    }

    #[test]
    fn song_removal_and_clear() {
        let mut index = HistoryIndex::new(10);
        index.record(1, play(1, 1));
        index.record(1, play(2, 2));
        index.record(2, play(2, 3));

        assert_eq!(index.remove_song(2), 2);
        assert!(!index.contains(1, 2));
        assert_eq!(index.clear(1), 1);
        assert!(index.recent(1, 10).is_empty());
        assert_eq!(index.clear(42), 0);
    }
}
