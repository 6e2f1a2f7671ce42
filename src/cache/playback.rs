use super::indexes::{category_key, CatalogIndexes};
use super::{CatalogCache, CatalogError, CatalogResult};
use crate::catalog::{PlaybackSource, Song};
use crate::catalog_store::{SongId, UserId};
use tracing::{debug, info};

fn playlist_for(indexes: &CatalogIndexes, source: &PlaybackSource) -> CatalogResult<Vec<SongId>> {
    let playlist = match source {
        PlaybackSource::Artist(artist_id) => {
            if !indexes.artists.contains_key(artist_id) {
                return Err(CatalogError::artist_not_found(*artist_id));
            }
            indexes.songs_by_artist.members(artist_id)
        }
        PlaybackSource::Category(category) => match category_key(&Some(category.clone())) {
            Some(key) => indexes.songs_by_category.members(&key),
            None => Vec::new(),
        },
        PlaybackSource::Library(owner) => {
            if !indexes.users.contains_key(owner) {
                return Err(CatalogError::user_not_found(*owner));
            }
            indexes.libraries.members(owner)
        }
    };
    if playlist.is_empty() {
        return Err(CatalogError::InvalidInput(format!(
            "nothing to play from {:?}",
            source
        )));
    }
    Ok(playlist)
}

fn no_session(user_id: UserId) -> CatalogError {
    CatalogError::NotFound(format!("playback session of user {}", user_id))
}

/// Playback sessions live only in memory and never reach the durable store.
impl CatalogCache {
    /// Starts a session over the songs of `source`, at `start` when it is one
    /// of them. Replaces any session the user had.
    pub fn start_playback(
        &self,
        user_id: UserId,
        source: PlaybackSource,
        start: Option<SongId>,
    ) -> CatalogResult<Option<Song>> {
        self.ensure_ready()?;
        let mut indexes = self.apply();
        if !indexes.users.contains_key(&user_id) {
            return Err(CatalogError::user_not_found(user_id));
        }
        let playlist = playlist_for(&indexes, &source)?;
        debug!(
            "User {} starts playback of {} songs from {:?}",
            user_id,
            playlist.len(),
            source
        );
        let now_playing = indexes.playback.start(user_id, source, playlist, start);
        Ok(now_playing.and_then(|id| indexes.song(id)))
    }

    pub fn now_playing(&self, user_id: UserId) -> CatalogResult<Option<Song>> {
        let indexes = self.read()?;
        let session = indexes
            .playback
            .session(user_id)
            .ok_or_else(|| no_session(user_id))?;
        Ok(session.now_playing().and_then(|id| indexes.song(id)))
    }

    /// Plays the next queued song, or the next playlist song when the queue
    /// is empty. Wraps at the end of the playlist.
    pub fn next_track(&self, user_id: UserId) -> CatalogResult<Option<Song>> {
        self.ensure_ready()?;
        let mut indexes = self.apply();
        if indexes.playback.session(user_id).is_none() {
            return Err(no_session(user_id));
        }
        let next = indexes.playback.next(user_id);
        Ok(next.and_then(|id| indexes.song(id)))
    }

    pub fn previous_track(&self, user_id: UserId) -> CatalogResult<Option<Song>> {
        self.ensure_ready()?;
        let mut indexes = self.apply();
        if indexes.playback.session(user_id).is_none() {
            return Err(no_session(user_id));
        }
        let previous = indexes.playback.previous(user_id);
        Ok(previous.and_then(|id| indexes.song(id)))
    }

    /// Queues a song ahead of the playlist. Returns the song pushed out of a
    /// full queue, if any.
    pub fn enqueue(&self, user_id: UserId, song_id: SongId) -> CatalogResult<Option<SongId>> {
        self.ensure_ready()?;
        let mut indexes = self.apply();
        if !indexes.songs.contains_key(&song_id) {
            return Err(CatalogError::song_not_found(song_id));
        }
        let evicted = indexes
            .playback
            .enqueue(user_id, song_id)
            .ok_or_else(|| no_session(user_id))?;
        debug!("User {} queued song {}", user_id, song_id);
        Ok(evicted)
    }

    /// Queued songs in play order; empty without a session.
    pub fn get_up_next(&self, user_id: UserId) -> CatalogResult<Vec<Song>> {
        let indexes = self.read()?;
        let queued = indexes
            .playback
            .session(user_id)
            .map(|session| session.up_next())
            .unwrap_or_default();
        Ok(indexes.songs_for(queued))
    }

    pub fn stop_playback(&self, user_id: UserId) -> CatalogResult<bool> {
        self.ensure_ready()?;
        let stopped = self.apply().playback.stop(user_id);
        if stopped {
            info!("Stopped playback of user {}", user_id);
        }
        Ok(stopped)
    }
}
