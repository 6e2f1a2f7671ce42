//! Every index of the catalog, plus the per-entity maintenance routines that
//! keep them describing one entity set. Nothing here touches the durable
//! store except [`CatalogIndexes::load`], which only reads.

use super::CacheSettings;
use crate::catalog::{Artist, CatalogStats, HistoryEntry, Song, User};
use crate::catalog_store::{ArtistId, CatalogDb, SongId, UserId};
use crate::index::{
    GroupedIndex, HistoryIndex, PlaybackIndex, PopularityIndex, PrefixIndex, RelatedIndex,
    SortedIndex,
};
use crate::structures::HashTable;
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::{debug, info, warn};

pub(super) struct CatalogIndexes {
    pub songs: HashTable<SongId, Song>,
    pub artists: HashTable<ArtistId, Artist>,
    pub users: HashTable<UserId, User>,

    pub artists_by_slug: GroupedIndex<String, ArtistId>,
    pub song_titles: SortedIndex<SongId>,
    pub artist_names: SortedIndex<ArtistId>,
    pub song_search: PrefixIndex<SongId>,
    pub artist_search: PrefixIndex<ArtistId>,

    pub songs_by_artist: GroupedIndex<ArtistId, SongId>,
    pub songs_by_category: GroupedIndex<String, SongId>,
    pub artists_by_category: GroupedIndex<String, ArtistId>,

    pub libraries: GroupedIndex<UserId, SongId>,
    pub history: HistoryIndex,
    pub popularity: PopularityIndex,
    pub related: RelatedIndex,
    pub playback: PlaybackIndex,
}

/// Group key of a category, `None` for missing or blank ones.
pub(super) fn category_key(category: &Option<String>) -> Option<String> {
    category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

impl CatalogIndexes {
    pub fn new(settings: &CacheSettings) -> Self {
        let buckets = settings.hash_buckets;
        CatalogIndexes {
            songs: HashTable::with_buckets(buckets.songs),
            artists: HashTable::with_buckets(buckets.artists),
            users: HashTable::with_buckets(buckets.users),
            artists_by_slug: GroupedIndex::with_buckets(buckets.artists),
            song_titles: SortedIndex::new(),
            artist_names: SortedIndex::new(),
            song_search: PrefixIndex::new(),
            artist_search: PrefixIndex::new(),
            songs_by_artist: GroupedIndex::with_buckets(buckets.artists),
            songs_by_category: GroupedIndex::new(),
            artists_by_category: GroupedIndex::new(),
            libraries: GroupedIndex::with_buckets(buckets.users),
            history: HistoryIndex::new(settings.history_capacity),
            popularity: PopularityIndex::with_buckets(buckets.songs),
            related: RelatedIndex::new(),
            playback: PlaybackIndex::new(settings.playback_queue_capacity),
        }
    }

    /// Builds a complete index set from the durable store. Artists go first
    /// so songs can copy their artist's fields; history is replayed oldest
    /// first so each user's most recent play ends up on top.
    pub fn load(db: &dyn CatalogDb, settings: &CacheSettings) -> Result<Self> {
        let start = Instant::now();
        let mut indexes = CatalogIndexes::new(settings);

        let artists = db.fetch_artists().context("Failed to load artists")?;
        info!("Loaded {} artists", artists.len());
        for row in artists {
            indexes.insert_artist(Artist::from(row));
        }

        let songs = db.fetch_songs().context("Failed to load songs")?;
        info!("Loaded {} songs", songs.len());
        for row in songs {
            indexes.insert_song(Song::from_row(row, &settings.artwork_placeholder));
        }

        let users = db.fetch_users().context("Failed to load users")?;
        info!("Loaded {} users", users.len());
        for row in users {
            indexes.insert_user(User::from(row));
        }

        let library = db.fetch_library().context("Failed to load libraries")?;
        let mut skipped = 0;
        for row in &library {
            if indexes.users.contains_key(&row.user_id) && indexes.songs.contains_key(&row.song_id)
            {
                indexes.libraries.add(row.user_id, row.song_id);
            } else {
                skipped += 1;
            }
        }
        info!("Loaded {} library entries", library.len() - skipped);
        if skipped > 0 {
            warn!("Skipped {} library entries with unknown user or song", skipped);
        }

        let history = db.fetch_history().context("Failed to load play history")?;
        let mut skipped = 0;
        for row in history.iter().rev() {
            if indexes.users.contains_key(&row.user_id) && indexes.songs.contains_key(&row.song_id)
            {
                indexes.record_play(
                    row.user_id,
                    HistoryEntry {
                        song_id: row.song_id,
                        played_at: row.played_at,
                    },
                );
            } else {
                skipped += 1;
            }
        }
        info!("Replayed {} history entries", history.len() - skipped);
        if skipped > 0 {
            warn!("Skipped {} history entries with unknown user or song", skipped);
        }

        let stats = indexes.stats();
        info!(
            "Catalog indexes built in {:?}: {} songs, {} artists, {} users, {} categories, {} library entries, {} history entries",
            start.elapsed(),
            stats.songs,
            stats.artists,
            stats.users,
            stats.categories,
            stats.library_entries,
            stats.history_entries
        );
        Ok(indexes)
    }

    // =========================================================================
    // Artists
    // =========================================================================

    fn link_artist(&mut self, artist: &Artist) {
        if !artist.slug.is_empty() {
            self.artists_by_slug.add(artist.slug.clone(), artist.id);
        }
        self.artist_names.insert(&artist.name, artist.id);
        self.artist_search.index(&[artist.name.as_str()], artist.id);
        match category_key(&artist.category) {
            Some(category) => {
                let peers = self.artists_by_category.members(&category);
                self.related.add_artist(artist.id, peers);
                self.artists_by_category.add(category, artist.id);
            }
            None => self.related.add_artist(artist.id, []),
        }
    }

    fn unlink_artist(&mut self, artist: &Artist) {
        self.artists_by_slug.remove(&artist.slug, &artist.id);
        self.artist_names.remove(&artist.name, artist.id);
        self.artist_search.unindex(&[artist.name.as_str()], &artist.id);
        if let Some(category) = category_key(&artist.category) {
            self.artists_by_category.remove(&category, &artist.id);
        }
        self.related.remove_artist(artist.id);
    }

    pub fn insert_artist(&mut self, artist: Artist) {
        debug!("Indexing artist {} ({})", artist.id, artist.name);
        self.link_artist(&artist);
        self.artists.set(artist.id, artist);
    }

    /// Swaps in the new version of an artist and refreshes the copies of its
    /// fields held by each of its songs.
    pub fn replace_artist(&mut self, artist: Artist) {
        if let Some(old) = self.artists.remove(&artist.id) {
            self.unlink_artist(&old);
        }
        self.insert_artist(artist.clone());

        for song_id in self.songs_by_artist.members(&artist.id) {
            if let Some(song) = self.songs.get(&song_id).cloned() {
                self.replace_song(song);
            }
        }
    }

    /// Callers remove the artist's songs first.
    pub fn remove_artist(&mut self, artist_id: ArtistId) -> Option<Artist> {
        let artist = self.artists.remove(&artist_id)?;
        debug!("Unindexing artist {} ({})", artist.id, artist.name);
        self.unlink_artist(&artist);
        self.songs_by_artist.remove_group(&artist_id);
        Some(artist)
    }

    // =========================================================================
    // Songs
    // =========================================================================

    /// Copies name and category from the indexed artist.
    fn denormalize(&self, song: &mut Song) {
        let artist = song.artist_id.and_then(|id| self.artists.get(&id));
        song.artist_name = artist.map(|a| a.name.clone());
        song.category = artist.and_then(|a| a.category.clone());
    }

    fn link_song(&mut self, song: &Song) {
        self.song_titles.insert(&song.title, song.id);
        self.song_search.index(&song.search_texts(), song.id);
        if let Some(artist_id) = song.artist_id {
            self.songs_by_artist.add(artist_id, song.id);
        }
        if let Some(category) = category_key(&song.category) {
            self.songs_by_category.add(category, song.id);
        }
    }

    fn unlink_song(&mut self, song: &Song) {
        self.song_titles.remove(&song.title, song.id);
        self.song_search.unindex(&song.search_texts(), &song.id);
        if let Some(artist_id) = song.artist_id {
            self.songs_by_artist.remove(&artist_id, &song.id);
        }
        if let Some(category) = category_key(&song.category) {
            self.songs_by_category.remove(&category, &song.id);
        }
    }

    pub fn insert_song(&mut self, mut song: Song) {
        self.denormalize(&mut song);
        debug!("Indexing song {} ({})", song.id, song.title);
        self.link_song(&song);
        self.popularity.track(song.id);
        self.songs.set(song.id, song);
    }

    /// Removes the old version's value keys, then files the new version.
    pub fn replace_song(&mut self, mut song: Song) {
        if let Some(old) = self.songs.remove(&song.id) {
            self.unlink_song(&old);
        }
        self.denormalize(&mut song);
        debug!("Re-indexing song {} ({})", song.id, song.title);
        self.link_song(&song);
        self.popularity.track(song.id);
        self.songs.set(song.id, song);
    }

    /// Drops the song from every index, libraries, histories and playback
    /// sessions included.
    pub fn remove_song(&mut self, song_id: SongId) -> Option<Song> {
        let song = self.songs.remove(&song_id)?;
        debug!("Unindexing song {} ({})", song.id, song.title);
        self.unlink_song(&song);
        self.libraries.remove_everywhere(&song_id);
        self.history.remove_song(song_id);
        self.popularity.untrack(song_id);
        self.playback.remove_song(song_id);
        Some(song)
    }

    /// The song as handed out to callers, play count filled in.
    pub fn song(&self, song_id: SongId) -> Option<Song> {
        self.songs.get(&song_id).map(|song| Song {
            play_count: self.popularity.count(song_id),
            ..song.clone()
        })
    }

    pub fn songs_for(&self, ids: impl IntoIterator<Item = SongId>) -> Vec<Song> {
        ids.into_iter().filter_map(|id| self.song(id)).collect()
    }

    pub fn artists_for(&self, ids: impl IntoIterator<Item = ArtistId>) -> Vec<Artist> {
        ids.into_iter()
            .filter_map(|id| self.artists.get(&id).cloned())
            .collect()
    }

    // =========================================================================
    // Users, history
    // =========================================================================

    pub fn insert_user(&mut self, user: User) {
        self.users.set(user.id, user);
    }

    pub fn remove_user(&mut self, user_id: UserId) -> Option<User> {
        let user = self.users.remove(&user_id)?;
        self.libraries.remove_group(&user_id);
        self.history.clear(user_id);
        self.playback.stop(user_id);
        Some(user)
    }

    pub fn record_play(&mut self, user_id: UserId, entry: HistoryEntry) {
        self.history.record(user_id, entry);
        self.popularity.increment(entry.song_id);
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    /// Distinct categories across songs and artists, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut categories = self.artists_by_category.keys();
        for key in self.songs_by_category.keys() {
            if !categories.contains(&key) {
                categories.push(key);
            }
        }
        categories.sort();
        categories
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            songs: self.songs.len(),
            artists: self.artists.len(),
            users: self.users.len(),
            categories: self.categories().len(),
            library_entries: self.libraries.total_len(),
            history_entries: self.history.total_len(),
        }
    }
}
