//! Users, libraries, play history and playback sessions.

mod common;

use common::*;
use melodia_catalog_server::catalog::PlaybackSource;
use melodia_catalog_server::catalog_store::{NewUser, SqliteCatalogDb, UserRole, UserUpdate};
use melodia_catalog_server::{CacheSettings, CatalogCache, CatalogError};
use std::sync::Arc;

fn history_ids(cache: &CatalogCache, user_id: i64) -> Vec<i64> {
    cache
        .get_history(user_id, 100)
        .unwrap()
        .iter()
        .map(|p| p.song.id)
        .collect()
}

fn library_ids(cache: &CatalogCache, user_id: i64) -> Vec<i64> {
    cache
        .get_library(user_id)
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect()
}

fn now_playing_id(cache: &CatalogCache, user_id: i64) -> Option<i64> {
    cache.now_playing(user_id).unwrap().map(|s| s.id)
}

#[test]
fn test_library_add_is_idempotent_and_duplicates_conflict() {
    let (cache, _dir) = loaded_cache();

    cache.add_to_library(USER_2_ID, SONG_4_ID).unwrap();
    assert!(matches!(
        cache.add_to_library(USER_2_ID, SONG_4_ID),
        Err(CatalogError::Conflict(_))
    ));
    assert_eq!(library_ids(&cache, USER_2_ID), vec![SONG_4_ID]);
    assert!(cache.is_in_library(USER_2_ID, SONG_4_ID).unwrap());

    cache.remove_from_library(USER_2_ID, SONG_4_ID).unwrap();
    assert!(!cache.is_in_library(USER_2_ID, SONG_4_ID).unwrap());
    assert!(matches!(
        cache.remove_from_library(USER_2_ID, SONG_4_ID),
        Err(CatalogError::NotFound(_))
    ));
}

#[test]
fn test_library_requires_known_user_and_song() {
    let (cache, _dir) = loaded_cache();

    assert!(matches!(
        cache.add_to_library(MISSING_ID, SONG_1_ID),
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        cache.add_to_library(USER_1_ID, MISSING_ID),
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        cache.get_library(MISSING_ID),
        Err(CatalogError::NotFound(_))
    ));
    assert_eq!(library_ids(&cache, USER_1_ID), vec![SONG_1_ID, SONG_3_ID]);
}

#[test]
fn test_replaying_a_song_moves_it_to_the_top() {
    let (cache, _dir) = loaded_cache();

    cache.record_play(USER_2_ID, SONG_1_ID).unwrap();
    cache.record_play(USER_2_ID, SONG_2_ID).unwrap();
    let played = cache.record_play(USER_2_ID, SONG_1_ID).unwrap();

    assert_eq!(played.song.id, SONG_1_ID);
    assert_eq!(played.song.play_count, 3);
    assert_eq!(history_ids(&cache, USER_2_ID), vec![SONG_1_ID, SONG_2_ID]);
    assert_eq!(
        cache.get_history(USER_2_ID, 1).unwrap()[0].played_at,
        played.played_at
    );
    assert_eq!(cache.get_song(SONG_2_ID).unwrap().play_count, 3);
    assert!(cache.check_integrity().unwrap().is_empty());
}

#[test]
fn test_history_is_bounded_by_capacity() {
    let (_dir, db_path) = create_test_catalog().unwrap();
    let settings = CacheSettings {
        history_capacity: 2,
        ..Default::default()
    };
    let cache = CatalogCache::new(Arc::new(SqliteCatalogDb::open(&db_path).unwrap()), settings);
    cache.initialize().unwrap();

    for song_id in [SONG_3_ID, SONG_4_ID, SONG_5_ID] {
        cache.record_play(USER_2_ID, song_id).unwrap();
    }
    assert_eq!(history_ids(&cache, USER_2_ID), vec![SONG_5_ID, SONG_4_ID]);
    assert_eq!(cache.get_song(SONG_3_ID).unwrap().play_count, 1);
}

#[test]
fn test_clear_history_keeps_play_counts() {
    let (cache, _dir) = loaded_cache();

    assert_eq!(cache.clear_history(USER_1_ID).unwrap(), 2);
    assert!(history_ids(&cache, USER_1_ID).is_empty());
    assert_eq!(cache.get_song(SONG_2_ID).unwrap().play_count, 2);
    assert_eq!(cache.clear_history(USER_1_ID).unwrap(), 0);
    assert!(matches!(
        cache.clear_history(MISSING_ID),
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        cache.record_play(USER_1_ID, MISSING_ID),
        Err(CatalogError::NotFound(_))
    ));
}

#[test]
fn test_user_crud() {
    let (cache, _dir) = loaded_cache();

    let user = cache
        .add_user(NewUser {
            name: "Linus".to_string(),
            email: "linus@example.com".to_string(),
            role: UserRole::User,
        })
        .unwrap();
    assert!(!user.is_admin());
    assert_eq!(cache.get_all_users().unwrap().len(), 3);

    assert!(matches!(
        cache.add_user(NewUser {
            name: "Copy".to_string(),
            email: USER_1_EMAIL.to_uppercase(),
            role: UserRole::User,
        }),
        Err(CatalogError::Conflict(_))
    ));
    assert!(matches!(
        cache.update_user(
            user.id,
            UserUpdate {
                email: Some(USER_2_EMAIL.to_string()),
                ..Default::default()
            }
        ),
        Err(CatalogError::Conflict(_))
    ));
    assert!(matches!(
        cache.add_user(NewUser::default()),
        Err(CatalogError::InvalidInput(_))
    ));

    let promoted = cache
        .update_user(
            user.id,
            UserUpdate {
                role: Some(UserRole::Admin),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(promoted.is_admin());
    assert_eq!(promoted.email, "linus@example.com");
    assert_eq!(cache.get_user(user.id).unwrap(), promoted);

    cache.delete_user(user.id).unwrap();
    assert!(matches!(
        cache.get_user(user.id),
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        cache.delete_user(user.id),
        Err(CatalogError::NotFound(_))
    ));
}

#[test]
fn test_delete_user_drops_library_and_history() {
    let (cache, _dir) = loaded_cache();

    cache.delete_user(USER_1_ID).unwrap();
    let stats = cache.stats().unwrap();
    assert_eq!(stats.users, 1);
    assert_eq!(stats.library_entries, 0);
    assert_eq!(stats.history_entries, 0);
    assert!(!cache.is_in_library(USER_1_ID, SONG_1_ID).unwrap());
    assert!(cache.check_integrity().unwrap().is_empty());
}

#[test]
fn test_playback_walks_playlist_and_wraps() {
    let (cache, _dir) = loaded_cache();

    let first = cache
        .start_playback(USER_1_ID, PlaybackSource::Artist(ARTIST_1_ID), None)
        .unwrap();
    assert_eq!(first.map(|s| s.id), Some(SONG_1_ID));

    assert_eq!(cache.next_track(USER_1_ID).unwrap().map(|s| s.id), Some(SONG_2_ID));
    assert_eq!(cache.next_track(USER_1_ID).unwrap().map(|s| s.id), Some(SONG_1_ID));
    assert_eq!(
        cache.previous_track(USER_1_ID).unwrap().map(|s| s.id),
        Some(SONG_2_ID)
    );
    assert_eq!(now_playing_id(&cache, USER_1_ID), Some(SONG_2_ID));

    // playback never touches history
    assert_eq!(history_ids(&cache, USER_1_ID), vec![SONG_2_ID, SONG_1_ID]);
}

#[test]
fn test_queued_songs_play_before_the_playlist() {
    let (cache, _dir) = loaded_cache();

    let started = cache
        .start_playback(USER_1_ID, PlaybackSource::Library(USER_1_ID), Some(SONG_3_ID))
        .unwrap();
    assert_eq!(started.map(|s| s.id), Some(SONG_3_ID));

    assert_eq!(cache.enqueue(USER_1_ID, SONG_5_ID).unwrap(), None);
    assert_eq!(cache.enqueue(USER_1_ID, SONG_4_ID).unwrap(), None);
    let queued: Vec<_> = cache
        .get_up_next(USER_1_ID)
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(queued, vec![SONG_5_ID, SONG_4_ID]);

    assert_eq!(cache.next_track(USER_1_ID).unwrap().map(|s| s.id), Some(SONG_5_ID));
    assert_eq!(cache.next_track(USER_1_ID).unwrap().map(|s| s.id), Some(SONG_4_ID));
    assert!(cache.get_up_next(USER_1_ID).unwrap().is_empty());

    assert!(matches!(
        cache.enqueue(USER_1_ID, MISSING_ID),
        Err(CatalogError::NotFound(_))
    ));
}

#[test]
fn test_full_queue_evicts_the_oldest_entry() {
    let (_dir, db_path) = create_test_catalog().unwrap();
    let settings = CacheSettings {
        playback_queue_capacity: 2,
        ..Default::default()
    };
    let cache = CatalogCache::new(Arc::new(SqliteCatalogDb::open(&db_path).unwrap()), settings);
    cache.initialize().unwrap();

    cache
        .start_playback(USER_2_ID, PlaybackSource::Category(ROCK.to_string()), None)
        .unwrap();
    cache.enqueue(USER_2_ID, SONG_1_ID).unwrap();
    cache.enqueue(USER_2_ID, SONG_2_ID).unwrap();
    assert_eq!(cache.enqueue(USER_2_ID, SONG_3_ID).unwrap(), Some(SONG_1_ID));
}

#[test]
fn test_playback_session_errors() {
    let (cache, _dir) = loaded_cache();

    assert!(matches!(
        cache.now_playing(USER_2_ID),
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        cache.next_track(USER_2_ID),
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        cache.enqueue(USER_2_ID, SONG_1_ID),
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        cache.start_playback(USER_2_ID, PlaybackSource::Library(USER_2_ID), None),
        Err(CatalogError::InvalidInput(_))
    ));
    assert!(matches!(
        cache.start_playback(USER_2_ID, PlaybackSource::Artist(MISSING_ID), None),
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        cache.start_playback(MISSING_ID, PlaybackSource::Category(POP.to_string()), None),
        Err(CatalogError::NotFound(_))
    ));
    assert!(!cache.stop_playback(USER_2_ID).unwrap());
    assert!(cache.get_up_next(USER_2_ID).unwrap().is_empty());
}

#[test]
fn test_deleting_a_song_removes_it_from_sessions() {
    let (cache, _dir) = loaded_cache();

    cache
        .start_playback(USER_2_ID, PlaybackSource::Category(POP.to_string()), None)
        .unwrap();
    cache.enqueue(USER_2_ID, SONG_1_ID).unwrap();
    cache.delete_song(SONG_1_ID).unwrap();

    assert_eq!(now_playing_id(&cache, USER_2_ID), None);
    assert!(cache.get_up_next(USER_2_ID).unwrap().is_empty());
    assert_eq!(cache.next_track(USER_2_ID).unwrap().map(|s| s.id), Some(SONG_2_ID));
    assert!(cache.stop_playback(USER_2_ID).unwrap());
}

#[test]
fn test_previous_after_deleting_the_playing_song() {
    let (cache, _dir) = loaded_cache();

    cache
        .start_playback(
            USER_2_ID,
            PlaybackSource::Category(POP.to_string()),
            Some(SONG_2_ID),
        )
        .unwrap();
    cache.delete_song(SONG_2_ID).unwrap();

    assert_eq!(now_playing_id(&cache, USER_2_ID), None);
    assert_eq!(
        cache.previous_track(USER_2_ID).unwrap().map(|s| s.id),
        Some(SONG_1_ID)
    );
    assert_eq!(now_playing_id(&cache, USER_2_ID), Some(SONG_1_ID));
}
