use crate::catalog_store::{ArtistId, SongId, SongRow};
use serde::Serialize;

/// A song as held by the cache. Artist name and category are copies of the
/// owning artist's fields, refreshed whenever that artist changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub image_url: String,
    pub song_url: String,
    pub artist_id: Option<ArtistId>,
    pub artist_name: Option<String>,
    pub category: Option<String>,
    /// Filled from the popularity index when the song is handed out.
    pub play_count: u64,
}

/// Expands `{id}` in the artwork placeholder template.
pub fn placeholder_artwork(template: &str, id: SongId) -> String {
    template.replace("{id}", &id.to_string())
}

impl Song {
    /// Builds a song from its durable row. Missing or blank artwork falls back
    /// to the placeholder derived from the song id.
    pub fn from_row(row: SongRow, artwork_template: &str) -> Self {
        let image_url = match row.image_url {
            Some(url) if !url.trim().is_empty() => url,
            _ => placeholder_artwork(artwork_template, row.song_id),
        };
        Song {
            id: row.song_id,
            title: row.title,
            image_url,
            song_url: row.song_url,
            artist_id: row.artist_id,
            artist_name: row.artist_name,
            category: row.category,
            play_count: 0,
        }
    }

    /// Words the prefix index files this song under: its title and, when
    /// known, its artist's name.
    pub fn search_texts(&self) -> Vec<&str> {
        let mut texts = vec![self.title.as_str()];
        if let Some(artist_name) = &self.artist_name {
            texts.push(artist_name);
        }
        texts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "https://picsum.photos/seed/song-{id}/400";

    fn row(image_url: Option<&str>) -> SongRow {
        SongRow {
            song_id: 42,
            title: "Glow".to_string(),
            image_url: image_url.map(String::from),
            song_url: "https://cdn/glow.mp3".to_string(),
            artist_id: Some(1),
            artist_name: Some("Nova".to_string()),
            category: None,
        }
    }

    #[test]
    fn missing_artwork_uses_placeholder() {
        let song = Song::from_row(row(None), TEMPLATE);
        assert_eq!(song.image_url, "https://picsum.photos/seed/song-42/400");

        let blank = Song::from_row(row(Some("  ")), TEMPLATE);
        assert_eq!(blank.image_url, "https://picsum.photos/seed/song-42/400");
    }

    #[test]
    fn present_artwork_is_kept() {
        let song = Song::from_row(row(Some("https://img/glow.png")), TEMPLATE);
        assert_eq!(song.image_url, "https://img/glow.png");
        assert_eq!(song.search_texts(), vec!["Glow", "Nova"]);
    }
}
