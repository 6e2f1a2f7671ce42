use super::indexes::category_key;
use super::songs::require_text;
use super::{CatalogCache, CatalogError, CatalogResult};
use crate::catalog::{slugify, Artist, ResolvedArtist};
use crate::catalog_store::{ArtistId, ArtistUpdate, NewArtist};
use tracing::{info, warn};

impl CatalogCache {
    pub fn get_artist(&self, artist_id: ArtistId) -> CatalogResult<Artist> {
        self.read()?
            .artists
            .get(&artist_id)
            .cloned()
            .ok_or_else(|| CatalogError::artist_not_found(artist_id))
    }

    /// First artist filed under the slug of `slug`.
    pub fn get_artist_by_slug(&self, slug: &str) -> CatalogResult<Artist> {
        let indexes = self.read()?;
        let key = slugify(slug);
        indexes
            .artists_by_slug
            .first(&key)
            .and_then(|id| indexes.artists.get(id))
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("artist '{}'", slug)))
    }

    /// Numeric text is tried as an id first, anything else as a slug.
    pub fn get_artist_by_id_or_slug(&self, text: &str) -> CatalogResult<Artist> {
        if let Ok(artist_id) = text.trim().parse::<ArtistId>() {
            match self.get_artist(artist_id) {
                Err(CatalogError::NotFound(_)) => {}
                found => return found,
            }
        }
        self.get_artist_by_slug(text)
    }

    /// Every artist, ordered by id.
    pub fn get_all_artists(&self) -> CatalogResult<Vec<Artist>> {
        let indexes = self.read()?;
        let mut artists: Vec<Artist> = indexes.artists.values().cloned().collect();
        artists.sort_by_key(|a| a.id);
        Ok(artists)
    }

    pub fn get_artists_by_category(&self, category: &str) -> CatalogResult<Vec<Artist>> {
        let indexes = self.read()?;
        let Some(key) = category_key(&Some(category.to_string())) else {
            return Ok(Vec::new());
        };
        Ok(indexes.artists_for(indexes.artists_by_category.members(&key)))
    }

    pub fn get_all_categories(&self) -> CatalogResult<Vec<String>> {
        Ok(self.read()?.categories())
    }

    /// Artists related to `artist_id`, never the artist itself.
    pub fn get_related_artists(
        &self,
        artist_id: ArtistId,
        limit: usize,
    ) -> CatalogResult<Vec<Artist>> {
        let indexes = self.read()?;
        if !indexes.artists.contains_key(&artist_id) {
            return Err(CatalogError::artist_not_found(artist_id));
        }
        Ok(indexes.artists_for(indexes.related.related(artist_id, limit)))
    }

    /// The artist with its songs in catalog order.
    pub fn get_resolved_artist(&self, artist_id: ArtistId) -> CatalogResult<ResolvedArtist> {
        let indexes = self.read()?;
        let artist = indexes
            .artists
            .get(&artist_id)
            .cloned()
            .ok_or_else(|| CatalogError::artist_not_found(artist_id))?;
        let songs = indexes.songs_for(indexes.songs_by_artist.members(&artist_id));
        Ok(ResolvedArtist { artist, songs })
    }

    pub fn search_artists(&self, query: &str, limit: usize) -> CatalogResult<Vec<Artist>> {
        let indexes = self.read()?;
        Ok(indexes.artists_for(indexes.artist_search.search(query, limit)))
    }

    pub fn get_artists_sorted(&self) -> CatalogResult<Vec<Artist>> {
        let indexes = self.read()?;
        Ok(indexes.artists_for(indexes.artist_names.ordered()))
    }

    /// Exact, case-insensitive name match.
    pub fn find_artist_by_name(&self, name: &str) -> CatalogResult<Artist> {
        let indexes = self.read()?;
        indexes
            .artist_names
            .find(name)
            .and_then(|id| indexes.artists.get(&id))
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("artist '{}'", name)))
    }

    pub fn add_artist(&self, new_artist: NewArtist) -> CatalogResult<Artist> {
        let _writer = self.begin_write()?;
        require_text("name", &new_artist.name)?;

        let row = self.durable("insert artist", self.db.insert_artist(&new_artist))?;
        let artist = Artist::from(row);
        self.apply().insert_artist(artist.clone());
        info!("Added artist {} ({})", artist.id, artist.name);
        Ok(artist)
    }

    /// Merges `update` into the artist and refreshes the name and category
    /// copies held by its songs.
    pub fn update_artist(
        &self,
        artist_id: ArtistId,
        update: ArtistUpdate,
    ) -> CatalogResult<Artist> {
        let _writer = self.begin_write()?;
        {
            let indexes = self.read()?;
            let Some(current) = indexes.artists.get(&artist_id) else {
                return Err(CatalogError::artist_not_found(artist_id));
            };
            if let Some(name) = &update.name {
                require_text("name", name)?;
            }
            if update.is_empty() {
                return Ok(current.clone());
            }
        }

        let row = self
            .durable("update artist", self.db.update_artist(artist_id, &update))?
            .ok_or_else(|| CatalogError::artist_not_found(artist_id))?;
        let artist = Artist::from(row);
        self.apply().replace_artist(artist.clone());
        info!("Updated artist {} ({})", artist.id, artist.name);
        Ok(artist)
    }

    /// Deletes every song of the artist, one full song cascade at a time,
    /// then the artist itself. A durable failure part way leaves the songs
    /// deleted so far gone and everything else intact.
    pub fn delete_artist(&self, artist_id: ArtistId) -> CatalogResult<Artist> {
        let _writer = self.begin_write()?;
        let song_ids = {
            let indexes = self.read()?;
            if !indexes.artists.contains_key(&artist_id) {
                return Err(CatalogError::artist_not_found(artist_id));
            }
            indexes.songs_by_artist.members(&artist_id)
        };

        for song_id in &song_ids {
            self.delete_song_locked(*song_id)?;
        }

        if !self.durable("delete artist", self.db.delete_artist(artist_id))? {
            warn!(
                "Artist {} was already gone from the store, dropping it from the indexes",
                artist_id
            );
            self.apply().remove_artist(artist_id);
            return Err(CatalogError::artist_not_found(artist_id));
        }
        let artist = self
            .apply()
            .remove_artist(artist_id)
            .ok_or_else(|| CatalogError::artist_not_found(artist_id))?;
        info!(
            "Deleted artist {} ({}) with {} songs",
            artist.id,
            artist.name,
            song_ids.len()
        );
        Ok(artist)
    }
}
