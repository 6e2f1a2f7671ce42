//! Shapes returned to callers that are not plain entities.

use super::{Artist, Song};
use crate::catalog_store::{ArtistId, SongId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One slot of a user's play history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub song_id: SongId,
    pub played_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// History identity is the song: replaying moves the slot instead of
    /// adding one.
    pub fn same_song(a: &HistoryEntry, b: &HistoryEntry) -> bool {
        a.song_id == b.song_id
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayedSong {
    #[serde(flatten)]
    pub song: Song,
    pub played_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SearchResults {
    pub songs: Vec<Song>,
    pub artists: Vec<Artist>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Song,
    Artist,
}

/// Autocomplete dropdown entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub image: Option<String>,
}

impl Suggestion {
    pub fn for_song(song: &Song) -> Self {
        Suggestion {
            kind: SuggestionKind::Song,
            id: song.id,
            title: song.title.clone(),
            subtitle: song.artist_name.clone().unwrap_or_default(),
            image: Some(song.image_url.clone()),
        }
    }

    pub fn for_artist(artist: &Artist) -> Self {
        Suggestion {
            kind: SuggestionKind::Artist,
            id: artist.id,
            title: artist.name.clone(),
            subtitle: artist.category.clone().unwrap_or_default(),
            image: artist.image_url.clone(),
        }
    }
}

/// Where a playback session takes its playlist from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum PlaybackSource {
    Artist(ArtistId),
    Category(String),
    Library(UserId),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub songs: usize,
    pub artists: usize,
    pub users: usize,
    pub categories: usize,
    pub library_entries: usize,
    pub history_entries: usize,
}
