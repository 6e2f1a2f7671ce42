use super::{CatalogCache, CatalogResult};
use crate::catalog::{SearchResults, Suggestion};

impl CatalogCache {
    /// Songs and artists matching `query`, each list capped at `limit`.
    pub fn search(&self, query: &str, limit: usize) -> CatalogResult<SearchResults> {
        let indexes = self.read()?;
        Ok(SearchResults {
            songs: indexes.songs_for(indexes.song_search.search(query, limit)),
            artists: indexes.artists_for(indexes.artist_search.search(query, limit)),
        })
    }

    /// Autocomplete entries: up to half of `limit` (rounded up) songs, then
    /// artists for the rest.
    pub fn suggest(&self, query: &str, limit: usize) -> CatalogResult<Vec<Suggestion>> {
        let song_limit = limit.div_ceil(2);
        let artist_limit = limit / 2;
        let indexes = self.read()?;

        let songs = indexes.songs_for(indexes.song_search.search(query, song_limit));
        let artists = indexes.artists_for(indexes.artist_search.search(query, artist_limit));
        Ok(songs
            .iter()
            .map(Suggestion::for_song)
            .chain(artists.iter().map(Suggestion::for_artist))
            .collect())
    }
}
