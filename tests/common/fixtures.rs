//! Temporary SQLite catalogs for the integration tests.

use super::constants::*;
use super::failing_db::FailingDb;
use anyhow::Result;
use melodia_catalog_server::{CacheSettings, CatalogCache, SqliteCatalogDb};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Creates a temporary catalog with 3 artists, 5 songs and 2 users.
/// Returns (temp_dir, catalog_db_path).
pub fn create_test_catalog() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("catalog.db");

    // Creates the schema
    drop(SqliteCatalogDb::open(&db_path)?);

    let conn = Connection::open(&db_path)?;
    for (id, name, category) in [
        (ARTIST_1_ID, ARTIST_1_NAME, POP),
        (ARTIST_2_ID, ARTIST_2_NAME, POP),
        (ARTIST_3_ID, ARTIST_3_NAME, ROCK),
    ] {
        conn.execute(
            "INSERT INTO artists (artist_id, artist_name, category, image_url) VALUES (?1, ?2, ?3, ?4)",
            params![id, name, category, format!("https://img.example/artist-{}.png", id)],
        )?;
    }

    for (id, title, artist_id) in [
        (SONG_1_ID, SONG_1_TITLE, ARTIST_1_ID),
        (SONG_2_ID, SONG_2_TITLE, ARTIST_1_ID),
        (SONG_3_ID, SONG_3_TITLE, ARTIST_2_ID),
        (SONG_4_ID, SONG_4_TITLE, ARTIST_2_ID),
        (SONG_5_ID, SONG_5_TITLE, ARTIST_3_ID),
    ] {
        let image_url = (id != SONG_5_ID).then(|| format!("https://img.example/song-{}.png", id));
        conn.execute(
            "INSERT INTO songs (song_id, title, image_url, song_url, artist_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, title, image_url, format!("https://cdn.example/{}.mp3", id), artist_id],
        )?;
    }

    conn.execute(
        "INSERT INTO users (user_id, name, email, role) VALUES (?1, 'Ada', ?2, 'user')",
        params![USER_1_ID, USER_1_EMAIL],
    )?;
    conn.execute(
        "INSERT INTO users (user_id, name, email, role) VALUES (?1, 'Grace', ?2, 'admin')",
        params![USER_2_ID, USER_2_EMAIL],
    )?;

    for song_id in [SONG_1_ID, SONG_3_ID] {
        conn.execute(
            "INSERT INTO user_library (user_id, song_id) VALUES (?1, ?2)",
            params![USER_1_ID, song_id],
        )?;
    }

    for (song_id, played_at) in [
        (SONG_2_ID, 1_700_000_000_000_i64),
        (SONG_1_ID, 1_700_000_060_000),
        (SONG_2_ID, 1_700_000_120_000),
    ] {
        conn.execute(
            "INSERT INTO user_song_history (user_id, song_id, played_at) VALUES (?1, ?2, ?3)",
            params![USER_1_ID, song_id, played_at],
        )?;
    }

    Ok((dir, db_path))
}

/// Opens and loads the catalog at `db_path`.
pub fn open_cache(db_path: &Path) -> CatalogCache {
    let db = SqliteCatalogDb::open(db_path).expect("open catalog db");
    let cache = CatalogCache::new(Arc::new(db), CacheSettings::default());
    cache.initialize().expect("load catalog");
    cache
}

/// The fixture catalog, loaded. Keep the `TempDir` alive for the whole test.
pub fn loaded_cache() -> (CatalogCache, TempDir) {
    let (dir, db_path) = create_test_catalog().expect("create test catalog");
    (open_cache(&db_path), dir)
}

/// The fixture catalog behind a [`FailingDb`], loaded with failures off.
pub fn open_failing_cache() -> (CatalogCache, Arc<FailingDb>, TempDir) {
    let (dir, db_path) = create_test_catalog().expect("create test catalog");
    let db = Arc::new(FailingDb::new(
        SqliteCatalogDb::open(&db_path).expect("open catalog db"),
    ));
    let cache = CatalogCache::new(db.clone(), CacheSettings::default());
    cache.initialize().expect("load catalog");
    (cache, db, dir)
}
