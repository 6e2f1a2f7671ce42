//! SQLite schema of the durable catalog.
//!
//! Integer primary keys are generated by SQLite and are the authoritative
//! identifiers used by every in-memory index. History timestamps are unix
//! milliseconds.
//!
//! Databases created before the history load index existed are at version 0;
//! opening one runs the v0 -> v1 migration in place. Fresh databases are
//! created directly at the latest version.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};
use anyhow::Result;
use rusqlite::Connection;

// =============================================================================
// Catalog Tables
// =============================================================================

const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("artist_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("artist_name", &SqlType::Text, non_null = true),
        sqlite_column!("category", &SqlType::Text),
        sqlite_column!("image_url", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_artists_category", "category")],
    unique_constraints: &[],
};

const ARTIST_FK: ForeignKey = ForeignKey {
    foreign_table: "artists",
    foreign_column: "artist_id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const SONGS_TABLE: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("song_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("image_url", &SqlType::Text),
        sqlite_column!("song_url", &SqlType::Text, non_null = true),
        sqlite_column!(
            "artist_id",
            &SqlType::Integer,
            foreign_key = Some(&ARTIST_FK)
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_songs_artist", "artist_id")],
    unique_constraints: &[],
};

// =============================================================================
// User Tables
// =============================================================================

const USERS_TABLE: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!("user_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("email", &SqlType::Text, non_null = true),
        sqlite_column!(
            "role",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'user'")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["email"]],
};

const USER_FK: ForeignKey = ForeignKey {
    foreign_table: "users",
    foreign_column: "user_id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const SONG_FK: ForeignKey = ForeignKey {
    foreign_table: "songs",
    foreign_column: "song_id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const USER_LIBRARY_TABLE: Table = Table {
    name: "user_library",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!(
            "song_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&SONG_FK)
        ),
        sqlite_column!(
            "added_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_user_library_song", "song_id")],
    unique_constraints: &[&["user_id", "song_id"]],
};

const USER_SONG_HISTORY_COLUMNS: &[Column<'static, &'static str>] = &[
    sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
    sqlite_column!(
        "user_id",
        &SqlType::Integer,
        non_null = true,
        foreign_key = Some(&USER_FK)
    ),
    sqlite_column!(
        "song_id",
        &SqlType::Integer,
        non_null = true,
        foreign_key = Some(&SONG_FK)
    ),
    sqlite_column!("played_at", &SqlType::Integer, non_null = true),
];

const USER_SONG_HISTORY_TABLE_V0: Table = Table {
    name: "user_song_history",
    columns: USER_SONG_HISTORY_COLUMNS,
    indices: &[("idx_history_song", "song_id")],
    unique_constraints: &[],
};

/// V1 adds a composite index serving the `user_id, played_at DESC` load order.
const USER_SONG_HISTORY_TABLE_V1: Table = Table {
    name: "user_song_history",
    columns: USER_SONG_HISTORY_COLUMNS,
    indices: &[
        ("idx_history_song", "song_id"),
        ("idx_history_user_played", "user_id, played_at"),
    ],
    unique_constraints: &[],
};

fn migrate_to_v1(conn: &Connection) -> Result<()> {
    USER_SONG_HISTORY_TABLE_V1.create_index(conn, "idx_history_user_played", "user_id, played_at")
}

// =============================================================================
// Versioned Schema Definition
// =============================================================================

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[
            ARTISTS_TABLE,
            SONGS_TABLE,
            USERS_TABLE,
            USER_LIBRARY_TABLE,
            USER_SONG_HISTORY_TABLE_V0,
        ],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[
            ARTISTS_TABLE,
            SONGS_TABLE,
            USERS_TABLE,
            USER_LIBRARY_TABLE,
            USER_SONG_HISTORY_TABLE_V1,
        ],
        migration: Some(migrate_to_v1),
    },
];
