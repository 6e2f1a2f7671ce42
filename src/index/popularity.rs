use crate::catalog_store::SongId;
use crate::structures::{HashTable, Heap};
use std::cmp::Reverse;

/// Max-heap priority: higher play count first, lower song id on ties.
type Priority = (u64, Reverse<SongId>);

/// Play counts of every known song, ranked through a max-heap.
///
/// Counts are derived from play history; they are rebuilt on every load and
/// never written back.
pub struct PopularityIndex {
    counts: HashTable<SongId, u64>,
    ranking: Heap<SongId, Priority>,
}

impl Default for PopularityIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PopularityIndex {
    pub fn new() -> Self {
        PopularityIndex {
            counts: HashTable::new(),
            ranking: Heap::max(),
        }
    }

    pub fn with_buckets(buckets: usize) -> Self {
        PopularityIndex {
            counts: HashTable::with_buckets(buckets),
            ranking: Heap::max(),
        }
    }

    /// Starts tracking `song_id` at zero plays. No-op if already tracked.
    pub fn track(&mut self, song_id: SongId) {
        if self.counts.contains_key(&song_id) {
            return;
        }
        self.counts.set(song_id, 0);
        self.ranking.insert(song_id, (0, Reverse(song_id)));
    }

    pub fn untrack(&mut self, song_id: SongId) -> bool {
        if self.counts.remove(&song_id).is_none() {
            return false;
        }
        self.ranking.remove(|id| *id == song_id);
        true
    }

    /// Adds one play, tracking the song first if needed. Returns the new count.
    pub fn increment(&mut self, song_id: SongId) -> u64 {
        self.track(song_id);
        let count = match self.counts.get_mut(&song_id) {
            Some(count) => {
                *count += 1;
                *count
            }
            None => return 0,
        };
        self.ranking
            .update_priority(|id| *id == song_id, (count, Reverse(song_id)));
        count
    }

    pub fn count(&self, song_id: SongId) -> u64 {
        self.counts.get(&song_id).copied().unwrap_or(0)
    }

    /// Most played songs with their counts. Reads a copy of the heap.
    pub fn top(&self, limit: usize) -> Vec<(SongId, u64)> {
        self.ranking
            .top_n(limit)
            .into_iter()
            .map(|entry| (entry.data, entry.priority.0))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total_plays(&self) -> u64 {
        self.counts.values().sum()
    }
}
