//! Lifecycle and load sequence of the catalog cache.

mod common;

use common::*;
use melodia_catalog_server::catalog_store::{NewSong, SqliteCatalogDb};
use melodia_catalog_server::{CacheSettings, CacheState, CatalogCache, CatalogError};
use std::sync::Arc;

#[test]
fn test_operations_before_initialize_are_not_ready() {
    let (_dir, db_path) = create_test_catalog().unwrap();
    let cache = CatalogCache::new(
        Arc::new(SqliteCatalogDb::open(&db_path).unwrap()),
        CacheSettings::default(),
    );

    assert_eq!(cache.state(), CacheState::Uninitialized);
    assert!(!cache.is_ready());
    assert!(matches!(
        cache.get_song(SONG_1_ID),
        Err(CatalogError::NotReady(CacheState::Uninitialized))
    ));
    assert!(matches!(
        cache.add_song(NewSong {
            title: "Early".to_string(),
            song_url: "https://cdn.example/early.mp3".to_string(),
            artist_id: Some(ARTIST_1_ID),
            ..Default::default()
        }),
        Err(CatalogError::NotReady(_))
    ));
    assert!(matches!(cache.stats(), Err(CatalogError::NotReady(_))));
}

#[test]
fn test_initialize_twice_is_a_conflict() {
    let (cache, _dir) = loaded_cache();
    assert!(cache.is_ready());
    assert!(matches!(cache.initialize(), Err(CatalogError::Conflict(_))));
    assert!(cache.is_ready());
}

#[test]
fn test_failed_load_leaves_cache_unusable() {
    let (_dir, db_path) = create_test_catalog().unwrap();
    let db = Arc::new(FailingDb::new(SqliteCatalogDb::open(&db_path).unwrap()));
    db.fail_reads(true);
    let cache = CatalogCache::new(db.clone(), CacheSettings::default());

    assert!(matches!(
        cache.initialize(),
        Err(CatalogError::DependencyFailure(_))
    ));
    assert_eq!(cache.state(), CacheState::Failed);

    db.fail_reads(false);
    assert!(matches!(
        cache.get_all_songs(),
        Err(CatalogError::NotReady(CacheState::Failed))
    ));
    assert!(matches!(cache.initialize(), Err(CatalogError::Conflict(_))));
}

#[test]
fn test_load_populates_every_entity_kind() {
    let (cache, _dir) = loaded_cache();

    let stats = cache.stats().unwrap();
    assert_eq!(stats.songs, 5);
    assert_eq!(stats.artists, 3);
    assert_eq!(stats.users, 2);
    assert_eq!(stats.categories, 2);
    assert_eq!(stats.library_entries, 2);
    assert_eq!(stats.history_entries, 2);

    let glow = cache.get_song(SONG_1_ID).unwrap();
    assert_eq!(glow.title, SONG_1_TITLE);
    assert_eq!(glow.artist_name.as_deref(), Some(ARTIST_1_NAME));
    assert_eq!(glow.category.as_deref(), Some(POP));
    assert_eq!(glow.image_url, "https://img.example/song-1.png");

    let artist = cache.get_artist(ARTIST_3_ID).unwrap();
    assert_eq!(artist.slug, "iron-tide");

    assert!(cache.get_user(USER_2_ID).unwrap().is_admin());
    assert!(cache.check_integrity().unwrap().is_empty());
}

#[test]
fn test_missing_artwork_falls_back_to_placeholder() {
    let (cache, _dir) = loaded_cache();
    let steel = cache.get_song(SONG_5_ID).unwrap();
    assert_eq!(steel.image_url, "https://picsum.photos/seed/song-5/400");
}

#[test]
fn test_history_is_replayed_newest_first_with_play_counts() {
    let (cache, _dir) = loaded_cache();

    let history = cache.get_history(USER_1_ID, 10).unwrap();
    let ids: Vec<_> = history.iter().map(|p| p.song.id).collect();
    assert_eq!(ids, vec![SONG_2_ID, SONG_1_ID]);
    assert_eq!(history[0].played_at.timestamp_millis(), 1_700_000_120_000);

    assert_eq!(cache.get_song(SONG_2_ID).unwrap().play_count, 2);
    assert_eq!(cache.get_song(SONG_1_ID).unwrap().play_count, 1);
    assert_eq!(cache.get_song(SONG_3_ID).unwrap().play_count, 0);

    let popular: Vec<_> = cache
        .get_popular(3)
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(popular, vec![SONG_2_ID, SONG_1_ID, SONG_3_ID]);
}

#[test]
fn test_library_keeps_insertion_order() {
    let (cache, _dir) = loaded_cache();
    let library: Vec<_> = cache
        .get_library(USER_1_ID)
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(library, vec![SONG_1_ID, SONG_3_ID]);
    assert!(cache.get_library(USER_2_ID).unwrap().is_empty());
}

#[test]
fn test_history_capacity_bounds_loaded_history() {
    let (_dir, db_path) = create_test_catalog().unwrap();
    let settings = CacheSettings {
        history_capacity: 1,
        ..Default::default()
    };
    let cache = CatalogCache::new(Arc::new(SqliteCatalogDb::open(&db_path).unwrap()), settings);
    cache.initialize().unwrap();

    let history = cache.get_history(USER_1_ID, 10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].song.id, SONG_2_ID);
    assert_eq!(cache.get_song(SONG_1_ID).unwrap().play_count, 1);
}

#[test]
fn test_restart_reloads_the_same_catalog() {
    let (dir, db_path) = create_test_catalog().unwrap();
    let cache = open_cache(&db_path);

    let song = cache
        .add_song(NewSong {
            title: "New Dawn".to_string(),
            song_url: "https://cdn.example/new-dawn.mp3".to_string(),
            artist_id: Some(ARTIST_3_ID),
            ..Default::default()
        })
        .unwrap();
    cache.add_to_library(USER_2_ID, song.id).unwrap();
    cache.record_play(USER_2_ID, song.id).unwrap();
    cache.record_play(USER_2_ID, SONG_4_ID).unwrap();
    cache.delete_song(SONG_1_ID).unwrap();
    cache.delete_artist(ARTIST_2_ID).unwrap();
    let before = cache.stats().unwrap();
    drop(cache);

    let reloaded = open_cache(&db_path);
    assert_eq!(reloaded.stats().unwrap(), before);

    let reloaded_song = reloaded.get_song(song.id).unwrap();
    assert_eq!(reloaded_song.artist_name.as_deref(), Some(ARTIST_3_NAME));
    assert_eq!(reloaded_song.play_count, 1);
    assert!(matches!(
        reloaded.get_song(SONG_1_ID),
        Err(CatalogError::NotFound(_))
    ));
    assert!(reloaded.get_songs_by_artist(ARTIST_2_ID).unwrap().is_empty());
    let library: Vec<_> = reloaded
        .get_library(USER_2_ID)
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(library, vec![song.id]);
    let history: Vec<_> = reloaded
        .get_history(USER_2_ID, 10)
        .unwrap()
        .iter()
        .map(|p| p.song.id)
        .collect();
    assert_eq!(history, vec![song.id]);
    assert!(reloaded.check_integrity().unwrap().is_empty());
    drop(dir);
}
