use super::indexes::{category_key, CatalogIndexes};
use super::{CatalogCache, CatalogError, CatalogResult};
use crate::catalog::Song;
use crate::catalog_store::{ArtistId, NewSong, SongId, SongUpdate};
use tracing::{info, warn};

pub(super) fn require_text(field: &str, value: &str) -> CatalogResult<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

fn require_artist(indexes: &CatalogIndexes, artist_id: ArtistId) -> CatalogResult<()> {
    if !indexes.artists.contains_key(&artist_id) {
        return Err(CatalogError::InvalidInput(format!(
            "artist {} does not exist",
            artist_id
        )));
    }
    Ok(())
}

impl CatalogCache {
    pub fn get_song(&self, song_id: SongId) -> CatalogResult<Song> {
        self.read()?
            .song(song_id)
            .ok_or_else(|| CatalogError::song_not_found(song_id))
    }

    /// Every song, ordered by id.
    pub fn get_all_songs(&self) -> CatalogResult<Vec<Song>> {
        let indexes = self.read()?;
        let mut ids: Vec<SongId> = indexes.songs.keys().copied().collect();
        ids.sort_unstable();
        Ok(indexes.songs_for(ids))
    }

    /// Songs of an artist in catalog order; empty for an unknown artist.
    pub fn get_songs_by_artist(&self, artist_id: ArtistId) -> CatalogResult<Vec<Song>> {
        let indexes = self.read()?;
        Ok(indexes.songs_for(indexes.songs_by_artist.members(&artist_id)))
    }

    pub fn get_songs_by_category(&self, category: &str) -> CatalogResult<Vec<Song>> {
        let indexes = self.read()?;
        let Some(key) = category_key(&Some(category.to_string())) else {
            return Ok(Vec::new());
        };
        Ok(indexes.songs_for(indexes.songs_by_category.members(&key)))
    }

    /// Most played songs, highest count first.
    pub fn get_popular(&self, limit: usize) -> CatalogResult<Vec<Song>> {
        let indexes = self.read()?;
        let ids = indexes.popularity.top(limit).into_iter().map(|(id, _)| id);
        Ok(indexes.songs_for(ids))
    }

    pub fn search_songs(&self, query: &str, limit: usize) -> CatalogResult<Vec<Song>> {
        let indexes = self.read()?;
        Ok(indexes.songs_for(indexes.song_search.search(query, limit)))
    }

    /// Songs ordered by title, case-insensitively.
    pub fn get_songs_sorted(&self) -> CatalogResult<Vec<Song>> {
        let indexes = self.read()?;
        Ok(indexes.songs_for(indexes.song_titles.ordered()))
    }

    /// Songs whose title falls within `[start, end]`, case-insensitively.
    pub fn get_songs_in_title_range(&self, start: &str, end: &str) -> CatalogResult<Vec<Song>> {
        let indexes = self.read()?;
        Ok(indexes.songs_for(indexes.song_titles.range(start, end)))
    }

    /// Full scan of the title index for `text` anywhere in a title.
    pub fn search_songs_containing(&self, text: &str) -> CatalogResult<Vec<Song>> {
        let indexes = self.read()?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(indexes.songs_for(indexes.song_titles.containing(text)))
    }

    pub fn add_song(&self, new_song: NewSong) -> CatalogResult<Song> {
        let _writer = self.begin_write()?;
        require_text("title", &new_song.title)?;
        require_text("song_url", &new_song.song_url)?;
        {
            let indexes = self.read()?;
            match new_song.artist_id {
                Some(artist_id) => require_artist(&indexes, artist_id)?,
                None => return Err(CatalogError::InvalidInput("artist is required".into())),
            }
        }

        let row = self.durable("insert song", self.db.insert_song(&new_song))?;
        let song_id = row.song_id;
        let mut indexes = self.apply();
        indexes.insert_song(Song::from_row(row, &self.settings.artwork_placeholder));
        info!("Added song {} ({})", song_id, new_song.title);
        indexes
            .song(song_id)
            .ok_or_else(|| CatalogError::song_not_found(song_id))
    }

    /// Merges `update` into the song. The old title and artist keys are
    /// dropped from every index before the new ones are filed.
    pub fn update_song(&self, song_id: SongId, update: SongUpdate) -> CatalogResult<Song> {
        let _writer = self.begin_write()?;
        {
            let indexes = self.read()?;
            if !indexes.songs.contains_key(&song_id) {
                return Err(CatalogError::song_not_found(song_id));
            }
            if let Some(title) = &update.title {
                require_text("title", title)?;
            }
            if let Some(song_url) = &update.song_url {
                require_text("song_url", song_url)?;
            }
            if let Some(artist_id) = update.artist_id {
                require_artist(&indexes, artist_id)?;
            }
            if update.is_empty() {
                return indexes
                    .song(song_id)
                    .ok_or_else(|| CatalogError::song_not_found(song_id));
            }
        }

        let row = self
            .durable("update song", self.db.update_song(song_id, &update))?
            .ok_or_else(|| CatalogError::song_not_found(song_id))?;
        let mut indexes = self.apply();
        indexes.replace_song(Song::from_row(row, &self.settings.artwork_placeholder));
        info!("Updated song {}", song_id);
        indexes
            .song(song_id)
            .ok_or_else(|| CatalogError::song_not_found(song_id))
    }

    /// Deletes the song everywhere: durable row, indexes, libraries,
    /// histories and playback sessions.
    pub fn delete_song(&self, song_id: SongId) -> CatalogResult<Song> {
        let _writer = self.begin_write()?;
        self.delete_song_locked(song_id)?
            .ok_or_else(|| CatalogError::song_not_found(song_id))
    }

    /// Song cascade, for callers already holding the writer guard. `None`
    /// when the durable row was already gone; the song is unindexed anyway.
    pub(super) fn delete_song_locked(&self, song_id: SongId) -> CatalogResult<Option<Song>> {
        if !self.read()?.songs.contains_key(&song_id) {
            return Err(CatalogError::song_not_found(song_id));
        }
        if !self.durable("delete song", self.db.delete_song(song_id))? {
            warn!(
                "Song {} was already gone from the store, dropping it from the indexes",
                song_id
            );
            self.apply().remove_song(song_id);
            return Ok(None);
        }
        let song = self
            .apply()
            .remove_song(song_id)
            .ok_or_else(|| CatalogError::song_not_found(song_id))?;
        info!("Deleted song {} ({})", song.id, song.title);
        Ok(Some(song))
    }
}
