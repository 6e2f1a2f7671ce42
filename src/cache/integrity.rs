use super::indexes::{category_key, CatalogIndexes};
use super::{CatalogCache, CatalogResult};
use crate::catalog_store::SongId;
use std::collections::HashSet;
use tracing::{info, warn};

fn check_songs(indexes: &CatalogIndexes, problems: &mut Vec<String>) {
    for song in indexes.songs.values() {
        if let Some(artist_id) = song.artist_id {
            match indexes.artists.get(&artist_id) {
                None => problems.push(format!(
                    "song {} references missing artist {}",
                    song.id, artist_id
                )),
                Some(artist) => {
                    if song.artist_name.as_deref() != Some(artist.name.as_str()) {
                        problems.push(format!(
                            "song {} has artist name {:?}, artist {} is named {:?}",
                            song.id, song.artist_name, artist_id, artist.name
                        ));
                    }
                    if song.category != artist.category {
                        problems.push(format!(
                            "song {} has category {:?}, artist {} has {:?}",
                            song.id, song.category, artist_id, artist.category
                        ));
                    }
                    if !indexes.songs_by_artist.contains(&artist_id, &song.id) {
                        problems.push(format!(
                            "song {} missing from the songs of artist {}",
                            song.id, artist_id
                        ));
                    }
                }
            }
        }
        if let Some(category) = category_key(&song.category) {
            if !indexes.songs_by_category.contains(&category, &song.id) {
                problems.push(format!(
                    "song {} missing from category '{}'",
                    song.id, category
                ));
            }
        }
        if !indexes.song_titles.find_all(&song.title).contains(&song.id) {
            problems.push(format!("song {} missing from the title index", song.id));
        }
        if !indexes.song_search.contains_key(&song.title) {
            problems.push(format!("song {} missing from the search index", song.id));
        }
    }
    if indexes.song_titles.len() != indexes.songs.len() {
        problems.push(format!(
            "title index holds {} entries for {} songs",
            indexes.song_titles.len(),
            indexes.songs.len()
        ));
    }
}

fn check_groups(indexes: &CatalogIndexes, problems: &mut Vec<String>) {
    for (artist_id, group) in indexes.songs_by_artist.groups() {
        if !indexes.artists.contains_key(artist_id) {
            problems.push(format!("songs grouped under missing artist {}", artist_id));
        }
        let mut seen = HashSet::new();
        for song_id in group.iter() {
            if !seen.insert(*song_id) {
                problems.push(format!(
                    "song {} listed twice for artist {}",
                    song_id, artist_id
                ));
            }
            match indexes.songs.get(song_id) {
                Some(song) if song.artist_id == Some(*artist_id) => {}
                Some(_) => problems.push(format!(
                    "song {} listed for artist {} it does not belong to",
                    song_id, artist_id
                )),
                None => problems.push(format!(
                    "missing song {} listed for artist {}",
                    song_id, artist_id
                )),
            }
        }
    }

    for (category, group) in indexes.songs_by_category.groups() {
        if category.trim().is_empty() {
            problems.push("songs grouped under a blank category".to_string());
        }
        for song_id in group.iter() {
            let song_category = indexes.songs.get(song_id).and_then(|s| category_key(&s.category));
            if song_category.as_ref() != Some(category) {
                problems.push(format!(
                    "song {} wrongly listed in category '{}'",
                    song_id, category
                ));
            }
        }
    }

    for (category, group) in indexes.artists_by_category.groups() {
        if category.trim().is_empty() {
            problems.push("artists grouped under a blank category".to_string());
        }
        for artist_id in group.iter() {
            let artist_category = indexes
                .artists
                .get(artist_id)
                .and_then(|a| category_key(&a.category));
            if artist_category.as_ref() != Some(category) {
                problems.push(format!(
                    "artist {} wrongly listed in category '{}'",
                    artist_id, category
                ));
            }
        }
    }
}

fn check_users(indexes: &CatalogIndexes, capacity: usize, problems: &mut Vec<String>) {
    for (user_id, library) in indexes.libraries.groups() {
        if !indexes.users.contains_key(user_id) {
            problems.push(format!("library of missing user {}", user_id));
        }
        for song_id in library.iter() {
            if !indexes.songs.contains_key(song_id) {
                problems.push(format!(
                    "library of user {} holds missing song {}",
                    user_id, song_id
                ));
            }
        }
    }

    for (user_id, stack) in indexes.history.users() {
        if stack.len() > capacity {
            problems.push(format!(
                "history of user {} holds {} slots, capacity is {}",
                user_id,
                stack.len(),
                capacity
            ));
        }
        let mut seen: HashSet<SongId> = HashSet::new();
        let mut previous = None;
        for entry in stack.iter() {
            if !seen.insert(entry.song_id) {
                problems.push(format!(
                    "history of user {} repeats song {}",
                    user_id, entry.song_id
                ));
            }
            if !indexes.songs.contains_key(&entry.song_id) {
                problems.push(format!(
                    "history of user {} holds missing song {}",
                    user_id, entry.song_id
                ));
            }
            if previous.is_some_and(|newer| entry.played_at > newer) {
                problems.push(format!(
                    "history of user {} is out of order at song {}",
                    user_id, entry.song_id
                ));
            }
            previous = Some(entry.played_at);
        }
    }
}

impl CatalogCache {
    /// Walks every index and reports each inconsistency found. An empty list
    /// means the indexes agree with each other.
    pub fn check_integrity(&self) -> CatalogResult<Vec<String>> {
        let indexes = self.read()?;
        let mut problems = Vec::new();
        check_songs(&indexes, &mut problems);
        check_groups(&indexes, &mut problems);
        check_users(&indexes, self.settings.history_capacity, &mut problems);

        for problem in &problems {
            warn!("Catalog integrity: {}", problem);
        }
        info!(
            "Catalog integrity check done, {} problems found",
            problems.len()
        );
        Ok(problems)
    }
}
