use super::indexes::CatalogIndexes;
use super::{CatalogCache, CatalogError, CatalogResult};
use crate::catalog::{HistoryEntry, PlayedSong, Song};
use crate::catalog_store::{SongId, UserId};
use chrono::Utc;
use tracing::info;

fn require_user_and_song(
    indexes: &CatalogIndexes,
    user_id: UserId,
    song_id: SongId,
) -> CatalogResult<()> {
    if !indexes.users.contains_key(&user_id) {
        return Err(CatalogError::user_not_found(user_id));
    }
    if !indexes.songs.contains_key(&song_id) {
        return Err(CatalogError::song_not_found(song_id));
    }
    Ok(())
}

impl CatalogCache {
    // =========================================================================
    // Library
    // =========================================================================

    /// Adding a song twice is a `Conflict` and leaves the library as it was.
    pub fn add_to_library(&self, user_id: UserId, song_id: SongId) -> CatalogResult<()> {
        let _writer = self.begin_write()?;
        {
            let indexes = self.read()?;
            require_user_and_song(&indexes, user_id, song_id)?;
            if indexes.libraries.contains(&user_id, &song_id) {
                return Err(CatalogError::Conflict(format!(
                    "song {} already in the library of user {}",
                    song_id, user_id
                )));
            }
        }

        self.durable(
            "insert library entry",
            self.db.insert_library_entry(user_id, song_id),
        )?;
        self.apply().libraries.add(user_id, song_id);
        info!("User {} added song {} to their library", user_id, song_id);
        Ok(())
    }

    pub fn remove_from_library(&self, user_id: UserId, song_id: SongId) -> CatalogResult<()> {
        let _writer = self.begin_write()?;
        if !self.read()?.libraries.contains(&user_id, &song_id) {
            return Err(CatalogError::NotFound(format!(
                "song {} in the library of user {}",
                song_id, user_id
            )));
        }

        self.durable(
            "delete library entry",
            self.db.delete_library_entry(user_id, song_id),
        )?;
        self.apply().libraries.remove(&user_id, &song_id);
        info!("User {} removed song {} from their library", user_id, song_id);
        Ok(())
    }

    pub fn is_in_library(&self, user_id: UserId, song_id: SongId) -> CatalogResult<bool> {
        Ok(self.read()?.libraries.contains(&user_id, &song_id))
    }

    /// The user's library in the order songs were added.
    pub fn get_library(&self, user_id: UserId) -> CatalogResult<Vec<Song>> {
        let indexes = self.read()?;
        if !indexes.users.contains_key(&user_id) {
            return Err(CatalogError::user_not_found(user_id));
        }
        Ok(indexes.songs_for(indexes.libraries.members(&user_id)))
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Records a play now: moves the song to the top of the user's history
    /// and counts it towards popularity.
    pub fn record_play(&self, user_id: UserId, song_id: SongId) -> CatalogResult<PlayedSong> {
        let _writer = self.begin_write()?;
        require_user_and_song(&*self.read()?, user_id, song_id)?;

        let played_at = Utc::now();
        self.durable(
            "insert history entry",
            self.db.insert_history_entry(user_id, song_id, played_at),
        )?;
        let mut indexes = self.apply();
        indexes.record_play(user_id, HistoryEntry { song_id, played_at });
        info!("User {} played song {}", user_id, song_id);
        let song = indexes
            .song(song_id)
            .ok_or_else(|| CatalogError::song_not_found(song_id))?;
        Ok(PlayedSong { song, played_at })
    }

    /// Most recent plays first, one slot per song.
    pub fn get_history(&self, user_id: UserId, limit: usize) -> CatalogResult<Vec<PlayedSong>> {
        let indexes = self.read()?;
        if !indexes.users.contains_key(&user_id) {
            return Err(CatalogError::user_not_found(user_id));
        }
        Ok(indexes
            .history
            .recent(user_id, limit)
            .into_iter()
            .filter_map(|entry| {
                indexes.song(entry.song_id).map(|song| PlayedSong {
                    song,
                    played_at: entry.played_at,
                })
            })
            .collect())
    }

    /// Returns how many history slots the user had. Play counts already
    /// credited to songs are kept until the next load.
    pub fn clear_history(&self, user_id: UserId) -> CatalogResult<usize> {
        let _writer = self.begin_write()?;
        if !self.read()?.users.contains_key(&user_id) {
            return Err(CatalogError::user_not_found(user_id));
        }

        let rows = self.durable("clear history", self.db.clear_history(user_id))?;
        let cleared = self.apply().history.clear(user_id);
        info!(
            "Cleared history of user {} ({} slots, {} rows)",
            user_id, cleared, rows
        );
        Ok(cleared)
    }
}
