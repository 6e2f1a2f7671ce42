use super::Song;
use crate::catalog_store::{ArtistId, ArtistRow};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub slug: String,
}

/// An artist together with its songs in catalog order.
#[derive(Clone, Debug, Serialize)]
pub struct ResolvedArtist {
    #[serde(flatten)]
    pub artist: Artist,
    pub songs: Vec<Song>,
}

/// Lowercases `name`, turns every run of characters outside `[a-z0-9]` into a
/// single `-` and trims dashes from both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

impl From<ArtistRow> for Artist {
    fn from(row: ArtistRow) -> Self {
        Artist {
            id: row.artist_id,
            slug: slugify(&row.artist_name),
            name: row.artist_name,
            category: row.category,
            image_url: row.image_url,
        }
    }
}
