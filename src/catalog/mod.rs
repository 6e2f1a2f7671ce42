mod artist;
mod song;
mod user;
mod views;

pub use artist::{slugify, Artist, ResolvedArtist};
pub use song::{placeholder_artwork, Song};
pub use user::User;
pub use views::{
    CatalogStats, HistoryEntry, PlaybackSource, PlayedSong, SearchResults, Suggestion,
    SuggestionKind,
};
