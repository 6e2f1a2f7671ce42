use crate::config::{
    DEFAULT_ARTWORK_PLACEHOLDER, DEFAULT_HISTORY_CAPACITY, DEFAULT_POPULAR_LIMIT,
    DEFAULT_QUEUE_CAPACITY, DEFAULT_RELATED_LIMIT, DEFAULT_SEARCH_LIMIT,
};

/// Initial bucket counts of the id tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashBuckets {
    pub songs: usize,
    pub artists: usize,
    pub users: usize,
}

impl Default for HashBuckets {
    fn default() -> Self {
        HashBuckets {
            songs: 1024,
            artists: 256,
            users: 64,
        }
    }
}

/// Tunables of [`super::CatalogCache`].
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Slots kept per user in the play history.
    pub history_capacity: usize,
    /// Songs a user can queue ahead of the playlist.
    pub playback_queue_capacity: usize,
    pub default_search_limit: usize,
    pub default_popular_limit: usize,
    pub default_related_limit: usize,
    /// Artwork for songs without one; `{id}` expands to the song id.
    pub artwork_placeholder: String,
    pub hash_buckets: HashBuckets,
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            playback_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            default_search_limit: DEFAULT_SEARCH_LIMIT,
            default_popular_limit: DEFAULT_POPULAR_LIMIT,
            default_related_limit: DEFAULT_RELATED_LIMIT,
            artwork_placeholder: DEFAULT_ARTWORK_PLACEHOLDER.to_string(),
            hash_buckets: HashBuckets::default(),
        }
    }
}
