//! A [`CatalogDb`] that fails on demand.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use melodia_catalog_server::catalog_store::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Delegates to a real store until told to fail. Reads and writes can be
/// broken independently.
pub struct FailingDb {
    inner: SqliteCatalogDb,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FailingDb {
    pub fn new(inner: SqliteCatalogDb) -> Self {
        FailingDb {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("injected read failure");
        }
        Ok(())
    }

    fn write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("injected write failure");
        }
        Ok(())
    }
}

impl CatalogDb for FailingDb {
    fn fetch_artists(&self) -> Result<Vec<ArtistRow>> {
        self.read()?;
        self.inner.fetch_artists()
    }

    fn fetch_songs(&self) -> Result<Vec<SongRow>> {
        self.read()?;
        self.inner.fetch_songs()
    }

    fn fetch_users(&self) -> Result<Vec<UserRow>> {
        self.read()?;
        self.inner.fetch_users()
    }

    fn fetch_library(&self) -> Result<Vec<LibraryRow>> {
        self.read()?;
        self.inner.fetch_library()
    }

    fn fetch_history(&self) -> Result<Vec<HistoryRow>> {
        self.read()?;
        self.inner.fetch_history()
    }

    fn insert_artist(&self, artist: &NewArtist) -> Result<ArtistRow> {
        self.write()?;
        self.inner.insert_artist(artist)
    }

    fn update_artist(&self, id: ArtistId, update: &ArtistUpdate) -> Result<Option<ArtistRow>> {
        self.write()?;
        self.inner.update_artist(id, update)
    }

    fn delete_artist(&self, id: ArtistId) -> Result<bool> {
        self.write()?;
        self.inner.delete_artist(id)
    }

    fn insert_song(&self, song: &NewSong) -> Result<SongRow> {
        self.write()?;
        self.inner.insert_song(song)
    }

    fn update_song(&self, id: SongId, update: &SongUpdate) -> Result<Option<SongRow>> {
        self.write()?;
        self.inner.update_song(id, update)
    }

    fn delete_song(&self, id: SongId) -> Result<bool> {
        self.write()?;
        self.inner.delete_song(id)
    }

    fn insert_user(&self, user: &NewUser) -> Result<UserRow> {
        self.write()?;
        self.inner.insert_user(user)
    }

    fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<Option<UserRow>> {
        self.write()?;
        self.inner.update_user(id, update)
    }

    fn delete_user(&self, id: UserId) -> Result<bool> {
        self.write()?;
        self.inner.delete_user(id)
    }

    fn insert_library_entry(&self, user_id: UserId, song_id: SongId) -> Result<()> {
        self.write()?;
        self.inner.insert_library_entry(user_id, song_id)
    }

    fn delete_library_entry(&self, user_id: UserId, song_id: SongId) -> Result<bool> {
        self.write()?;
        self.inner.delete_library_entry(user_id, song_id)
    }

    fn insert_history_entry(
        &self,
        user_id: UserId,
        song_id: SongId,
        played_at: DateTime<Utc>,
    ) -> Result<()> {
        self.write()?;
        self.inner.insert_history_entry(user_id, song_id, played_at)
    }

    fn clear_history(&self, user_id: UserId) -> Result<usize> {
        self.write()?;
        self.inner.clear_history(user_id)
    }
}
