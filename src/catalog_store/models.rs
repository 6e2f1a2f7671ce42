//! Row types exchanged with the durable catalog store, plus the inputs of
//! add/update operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type SongId = i64;
pub type ArtistId = i64;
pub type UserId = i64;

// =============================================================================
// Enumerations
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtistRow {
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// A song joined with the name and category of its artist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SongRow {
    pub song_id: SongId,
    pub title: String,
    pub image_url: Option<String>,
    pub song_url: String,
    pub artist_id: Option<ArtistId>,
    pub artist_name: Option<String>,
    pub category: Option<String>,
}

/// Public projection of a user, no credential material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LibraryRow {
    pub user_id: UserId,
    pub song_id: SongId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryRow {
    pub user_id: UserId,
    pub song_id: SongId,
    pub played_at: DateTime<Utc>,
}

// =============================================================================
// Inputs
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArtist {
    pub name: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// Partial artist update, `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtistUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub image_url: Option<String>,
    pub song_url: String,
    pub artist_id: Option<ArtistId>,
}

/// Partial song update, `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongUpdate {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub song_url: Option<String>,
    pub artist_id: Option<ArtistId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

impl ArtistUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none() && self.image_url.is_none()
    }
}

impl SongUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.image_url.is_none()
            && self.song_url.is_none()
            && self.artist_id.is_none()
    }
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_role_round_trips_through_db_strings() {
        assert_eq!(UserRole::from_db_str("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_db_str(UserRole::User.to_db_str()), Some(UserRole::User));
        assert_eq!(UserRole::from_db_str("root"), None);
    }

    #[test]
    fn partial_updates_deserialize_with_missing_fields() {
        let update: SongUpdate = serde_json::from_str(r#"{"title": "New"}"#).unwrap();
        assert_eq!(update.title.as_deref(), Some("New"));
        assert!(update.song_url.is_none());
        assert!(!update.is_empty());
        assert!(SongUpdate::default().is_empty());
    }
}
