//! CatalogDb trait definition.
//!
//! The durable store is consumed as a row-oriented interface: typed rows come
//! back from fetches and every command reports its outcome. Only the cache
//! composition layer talks to it.

use super::models::*;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Durable source of truth for the catalog.
///
/// Implementations must be usable from several threads. Every failure is an
/// error value, nothing is retried internally.
pub trait CatalogDb: Send + Sync {
    // =========================================================================
    // Bulk fetches (startup load)
    // =========================================================================

    /// All artists ordered by id.
    fn fetch_artists(&self) -> Result<Vec<ArtistRow>>;

    /// All songs ordered by id, joined with their artist's name and category.
    fn fetch_songs(&self) -> Result<Vec<SongRow>>;

    /// All users ordered by id, public projection only.
    fn fetch_users(&self) -> Result<Vec<UserRow>>;

    /// Library memberships grouped by user, in insertion order.
    fn fetch_library(&self) -> Result<Vec<LibraryRow>>;

    /// Play history ordered by user, then newest first.
    fn fetch_history(&self) -> Result<Vec<HistoryRow>>;

    // =========================================================================
    // Artists
    // =========================================================================

    fn insert_artist(&self, artist: &NewArtist) -> Result<ArtistRow>;

    /// Merges the given fields into the stored row. `None` when the id does not
    /// exist.
    fn update_artist(&self, id: ArtistId, update: &ArtistUpdate) -> Result<Option<ArtistRow>>;

    fn delete_artist(&self, id: ArtistId) -> Result<bool>;

    // =========================================================================
    // Songs
    // =========================================================================

    fn insert_song(&self, song: &NewSong) -> Result<SongRow>;

    fn update_song(&self, id: SongId, update: &SongUpdate) -> Result<Option<SongRow>>;

    /// Deletes the song together with every library and history row that
    /// references it.
    fn delete_song(&self, id: SongId) -> Result<bool>;

    // =========================================================================
    // Users
    // =========================================================================

    fn insert_user(&self, user: &NewUser) -> Result<UserRow>;

    fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<Option<UserRow>>;

    /// Deletes the user together with their library and history rows.
    fn delete_user(&self, id: UserId) -> Result<bool>;

    // =========================================================================
    // Library and history
    // =========================================================================

    fn insert_library_entry(&self, user_id: UserId, song_id: SongId) -> Result<()>;

    fn delete_library_entry(&self, user_id: UserId, song_id: SongId) -> Result<bool>;

    fn insert_history_entry(
        &self,
        user_id: UserId,
        song_id: SongId,
        played_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Returns the number of rows removed.
    fn clear_history(&self, user_id: UserId) -> Result<usize>;
}
