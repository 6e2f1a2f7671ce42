//! Shared constants for the integration tests.
//!
//! When the fixture catalog changes, update only this file and
//! `fixtures.rs`.

use melodia_catalog_server::catalog_store::{ArtistId, SongId, UserId};

// ============================================================================
// Artists
// ============================================================================

/// "Nova Pulse", category "pop"
pub const ARTIST_1_ID: ArtistId = 1;
pub const ARTIST_1_NAME: &str = "Nova Pulse";

/// "Echo Bloom", category "pop"
pub const ARTIST_2_ID: ArtistId = 2;
pub const ARTIST_2_NAME: &str = "Echo Bloom";

/// "Iron Tide", category "rock"
pub const ARTIST_3_ID: ArtistId = 3;
pub const ARTIST_3_NAME: &str = "Iron Tide";

pub const POP: &str = "pop";
pub const ROCK: &str = "rock";

// ============================================================================
// Songs
// ============================================================================

/// "Glow Up" by Nova Pulse
pub const SONG_1_ID: SongId = 1;
pub const SONG_1_TITLE: &str = "Glow Up";

/// "Midnight Drive" by Nova Pulse
pub const SONG_2_ID: SongId = 2;
pub const SONG_2_TITLE: &str = "Midnight Drive";

/// "Paper Hearts" by Echo Bloom
pub const SONG_3_ID: SongId = 3;
pub const SONG_3_TITLE: &str = "Paper Hearts";

/// "Quiet Storm" by Echo Bloom
pub const SONG_4_ID: SongId = 4;
pub const SONG_4_TITLE: &str = "Quiet Storm";

/// "Steel Rain" by Iron Tide, stored without artwork
pub const SONG_5_ID: SongId = 5;
pub const SONG_5_TITLE: &str = "Steel Rain";

// ============================================================================
// Users
// ============================================================================

/// Regular user with songs 1 and 3 in their library and a play history of
/// song 2, song 1, song 2 (oldest first).
pub const USER_1_ID: UserId = 1;
pub const USER_1_EMAIL: &str = "ada@example.com";

/// Admin with an empty library and no history.
pub const USER_2_ID: UserId = 2;
pub const USER_2_EMAIL: &str = "grace@example.com";

/// An id no fixture entity uses.
pub const MISSING_ID: i64 = 999;
