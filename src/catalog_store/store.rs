//! SQLite-backed implementation of [`CatalogDb`].

use super::models::*;
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogDb;
use crate::sqlite_persistence::migrate_if_needed;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

const SONG_SELECT: &str = "SELECT s.song_id, s.title, s.image_url, s.song_url, s.artist_id, \
     a.artist_name, a.category \
     FROM songs s LEFT JOIN artists a ON a.artist_id = s.artist_id";

pub struct SqliteCatalogDb {
    conn: Mutex<Connection>,
}

fn artist_from_row(row: &Row) -> rusqlite::Result<ArtistRow> {
    Ok(ArtistRow {
        artist_id: row.get(0)?,
        artist_name: row.get(1)?,
        category: row.get(2)?,
        image_url: row.get(3)?,
    })
}

fn song_from_row(row: &Row) -> rusqlite::Result<SongRow> {
    Ok(SongRow {
        song_id: row.get(0)?,
        title: row.get(1)?,
        image_url: row.get(2)?,
        song_url: row.get(3)?,
        artist_id: row.get(4)?,
        artist_name: row.get(5)?,
        category: row.get(6)?,
    })
}

fn user_from_row(row: &Row) -> rusqlite::Result<UserRow> {
    let role: String = row.get(3)?;
    Ok(UserRow {
        user_id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: UserRole::from_db_str(&role).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unknown role '{}'", role).into(),
            )
        })?,
    })
}

fn history_from_row(row: &Row) -> rusqlite::Result<HistoryRow> {
    let millis: i64 = row.get(2)?;
    Ok(HistoryRow {
        user_id: row.get(0)?,
        song_id: row.get(1)?,
        played_at: DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            rusqlite::Error::IntegralValueOutOfRange(2, millis)
        })?,
    })
}

impl SqliteCatalogDb {
    /// Opens (creating if needed) the catalog database at `db_path` and brings
    /// its schema to the latest version.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open catalog database {:?}", db_path))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrate_if_needed(&mut conn, CATALOG_VERSIONED_SCHEMAS)
            .context("Failed to prepare catalog schema")?;

        let count = |table: &str| -> Result<i64> {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?)
        };
        info!(
            "Opened catalog db: {} artists, {} songs, {} users",
            count("artists")?,
            count("songs")?,
            count("users")?
        );

        Ok(SqliteCatalogDb {
            conn: Mutex::new(conn),
        })
    }

    fn artist_by_id(conn: &Connection, id: ArtistId) -> Result<Option<ArtistRow>> {
        Ok(conn
            .query_row(
                "SELECT artist_id, artist_name, category, image_url FROM artists WHERE artist_id = ?1",
                params![id],
                artist_from_row,
            )
            .optional()?)
    }

    fn song_by_id(conn: &Connection, id: SongId) -> Result<Option<SongRow>> {
        Ok(conn
            .query_row(
                &format!("{} WHERE s.song_id = ?1", SONG_SELECT),
                params![id],
                song_from_row,
            )
            .optional()?)
    }

    fn user_by_id(conn: &Connection, id: UserId) -> Result<Option<UserRow>> {
        Ok(conn
            .query_row(
                "SELECT user_id, name, email, role FROM users WHERE user_id = ?1",
                params![id],
                user_from_row,
            )
            .optional()?)
    }
}

impl CatalogDb for SqliteCatalogDb {
    fn fetch_artists(&self) -> Result<Vec<ArtistRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT artist_id, artist_name, category, image_url FROM artists ORDER BY artist_id",
        )?;
        let rows = stmt
            .query_map([], artist_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read artists")?;
        Ok(rows)
    }

    fn fetch_songs(&self) -> Result<Vec<SongRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{} ORDER BY s.song_id", SONG_SELECT))?;
        let rows = stmt
            .query_map([], song_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read songs")?;
        Ok(rows)
    }

    fn fetch_users(&self) -> Result<Vec<UserRow>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT user_id, name, email, role FROM users ORDER BY user_id")?;
        let rows = stmt
            .query_map([], user_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read users")?;
        Ok(rows)
    }

    fn fetch_library(&self) -> Result<Vec<LibraryRow>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT user_id, song_id FROM user_library ORDER BY user_id, rowid")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(LibraryRow {
                    user_id: row.get(0)?,
                    song_id: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read library entries")?;
        Ok(rows)
    }

    fn fetch_history(&self) -> Result<Vec<HistoryRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT user_id, song_id, played_at FROM user_song_history \
             ORDER BY user_id, played_at DESC, id DESC",
        )?;
        let rows = stmt
            .query_map([], history_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read play history")?;
        Ok(rows)
    }

    fn insert_artist(&self, artist: &NewArtist) -> Result<ArtistRow> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO artists (artist_name, category, image_url) VALUES (?1, ?2, ?3)",
            params![artist.name, artist.category, artist.image_url],
        )
        .context("Failed to insert artist")?;
        let id = conn.last_insert_rowid();
        debug!("Inserted artist row {}", id);
        Self::artist_by_id(&conn, id)?.context("Inserted artist row not found")
    }

    fn update_artist(&self, id: ArtistId, update: &ArtistUpdate) -> Result<Option<ArtistRow>> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE artists SET \
                 artist_name = COALESCE(?1, artist_name), \
                 category = COALESCE(?2, category), \
                 image_url = COALESCE(?3, image_url) \
                 WHERE artist_id = ?4",
                params![update.name, update.category, update.image_url, id],
            )
            .with_context(|| format!("Failed to update artist {}", id))?;
        if changed == 0 {
            return Ok(None);
        }
        Self::artist_by_id(&conn, id)
    }

    fn delete_artist(&self, id: ArtistId) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute("DELETE FROM artists WHERE artist_id = ?1", params![id])
            .with_context(|| format!("Failed to delete artist {}", id))?;
        Ok(deleted > 0)
    }

    fn insert_song(&self, song: &NewSong) -> Result<SongRow> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO songs (title, image_url, song_url, artist_id) VALUES (?1, ?2, ?3, ?4)",
            params![song.title, song.image_url, song.song_url, song.artist_id],
        )
        .context("Failed to insert song")?;
        let id = conn.last_insert_rowid();
        debug!("Inserted song row {}", id);
        Self::song_by_id(&conn, id)?.context("Inserted song row not found")
    }

    fn update_song(&self, id: SongId, update: &SongUpdate) -> Result<Option<SongRow>> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE songs SET \
                 title = COALESCE(?1, title), \
                 image_url = COALESCE(?2, image_url), \
                 song_url = COALESCE(?3, song_url), \
                 artist_id = COALESCE(?4, artist_id) \
                 WHERE song_id = ?5",
                params![
                    update.title,
                    update.image_url,
                    update.song_url,
                    update.artist_id,
                    id
                ],
            )
            .with_context(|| format!("Failed to update song {}", id))?;
        if changed == 0 {
            return Ok(None);
        }
        Self::song_by_id(&conn, id)
    }

    fn delete_song(&self, id: SongId) -> Result<bool> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM user_library WHERE song_id = ?1", params![id])?;
        tx.execute("DELETE FROM user_song_history WHERE song_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM songs WHERE song_id = ?1", params![id])?;
        tx.commit()
            .with_context(|| format!("Failed to delete song {}", id))?;
        Ok(deleted > 0)
    }

    fn insert_user(&self, user: &NewUser) -> Result<UserRow> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (name, email, role) VALUES (?1, ?2, ?3)",
            params![user.name, user.email, user.role.to_db_str()],
        )
        .context("Failed to insert user")?;
        let id = conn.last_insert_rowid();
        Self::user_by_id(&conn, id)?.context("Inserted user row not found")
    }

    fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<Option<UserRow>> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE users SET \
                 name = COALESCE(?1, name), \
                 email = COALESCE(?2, email), \
                 role = COALESCE(?3, role) \
                 WHERE user_id = ?4",
                params![
                    update.name,
                    update.email,
                    update.role.map(|r| r.to_db_str()),
                    id
                ],
            )
            .with_context(|| format!("Failed to update user {}", id))?;
        if changed == 0 {
            return Ok(None);
        }
        Self::user_by_id(&conn, id)
    }

    fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM user_library WHERE user_id = ?1", params![id])?;
        tx.execute("DELETE FROM user_song_history WHERE user_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM users WHERE user_id = ?1", params![id])?;
        tx.commit()
            .with_context(|| format!("Failed to delete user {}", id))?;
        Ok(deleted > 0)
    }

    fn insert_library_entry(&self, user_id: UserId, song_id: SongId) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO user_library (user_id, song_id) VALUES (?1, ?2)",
            params![user_id, song_id],
        )
        .with_context(|| format!("Failed to add song {} to library of {}", song_id, user_id))?;
        Ok(())
    }

    fn delete_library_entry(&self, user_id: UserId, song_id: SongId) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute(
                "DELETE FROM user_library WHERE user_id = ?1 AND song_id = ?2",
                params![user_id, song_id],
            )
            .with_context(|| {
                format!("Failed to remove song {} from library of {}", song_id, user_id)
            })?;
        Ok(deleted > 0)
    }

    fn insert_history_entry(
        &self,
        user_id: UserId,
        song_id: SongId,
        played_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO user_song_history (user_id, song_id, played_at) VALUES (?1, ?2, ?3)",
            params![user_id, song_id, played_at.timestamp_millis()],
        )
        .with_context(|| format!("Failed to record play of {} by {}", song_id, user_id))?;
        Ok(())
    }

    fn clear_history(&self, user_id: UserId) -> Result<usize> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute(
                "DELETE FROM user_song_history WHERE user_id = ?1",
                params![user_id],
            )
            .with_context(|| format!("Failed to clear history of {}", user_id))?;
        Ok(deleted)
    }
}
