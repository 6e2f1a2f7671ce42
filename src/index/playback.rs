//! In-memory playback sessions. A session walks a playlist with a cursor
//! that wraps at both ends; songs explicitly queued by the user play first.
//! Sessions are never persisted.

use crate::catalog::PlaybackSource;
use crate::catalog_store::{SongId, UserId};
use crate::structures::{BoundedQueue, DoublyLinkedList, HashTable};

pub struct PlaybackSession {
    pub source: PlaybackSource,
    playlist: DoublyLinkedList<SongId>,
    up_next: BoundedQueue<SongId>,
    now_playing: Option<SongId>,
}

impl PlaybackSession {
    pub fn now_playing(&self) -> Option<SongId> {
        self.now_playing
    }

    pub fn playlist(&self) -> Vec<SongId> {
        self.playlist.to_vec()
    }

    pub fn up_next(&self) -> Vec<SongId> {
        self.up_next.iter().copied().collect()
    }
}

pub struct PlaybackIndex {
    sessions: HashTable<UserId, PlaybackSession>,
    queue_capacity: usize,
}

impl PlaybackIndex {
    pub fn new(queue_capacity: usize) -> Self {
        PlaybackIndex {
            sessions: HashTable::new(),
            queue_capacity,
        }
    }

    /// Replaces the user's session with a new one over `playlist`, starting
    /// at `start` when it is part of the playlist and at the first song
    /// otherwise. Returns the song now playing.
    pub fn start(
        &mut self,
        user_id: UserId,
        source: PlaybackSource,
        playlist: Vec<SongId>,
        start: Option<SongId>,
    ) -> Option<SongId> {
        let mut list = DoublyLinkedList::new();
        for song_id in playlist {
            list.append(song_id);
        }
        let positioned = start.is_some_and(|start| list.set_current_by(|id| *id == start));
        if !positioned {
            list.advance();
        }
        let now_playing = list.current().copied();
        self.sessions.set(
            user_id,
            PlaybackSession {
                source,
                playlist: list,
                up_next: BoundedQueue::new(self.queue_capacity),
                now_playing,
            },
        );
        now_playing
    }

    pub fn session(&self, user_id: UserId) -> Option<&PlaybackSession> {
        self.sessions.get(&user_id)
    }

    /// Next song: the head of the up-next queue if any, else the playlist
    /// song after the cursor.
    pub fn next(&mut self, user_id: UserId) -> Option<SongId> {
        let session = self.sessions.get_mut(&user_id)?;
        let next = match session.up_next.dequeue() {
            Some(queued) => Some(queued),
            None => session.playlist.advance().copied(),
        };
        session.now_playing = next;
        next
    }

    pub fn previous(&mut self, user_id: UserId) -> Option<SongId> {
        let session = self.sessions.get_mut(&user_id)?;
        // After the playing song was removed the cursor already rests on its
        // predecessor.
        let resting = match session.now_playing {
            None => session.playlist.current().copied(),
            Some(_) => None,
        };
        let previous = match resting {
            Some(song_id) => Some(song_id),
            None => session.playlist.retreat().copied(),
        };
        session.now_playing = previous;
        previous
    }

    /// Queues a song for the user's session. `None` when there is no session;
    /// otherwise whatever had to be evicted from a full queue.
    pub fn enqueue(&mut self, user_id: UserId, song_id: SongId) -> Option<Option<SongId>> {
        let session = self.sessions.get_mut(&user_id)?;
        Some(session.up_next.enqueue(song_id))
    }

    pub fn stop(&mut self, user_id: UserId) -> bool {
        self.sessions.delete(&user_id)
    }

    /// Removes a song from every playlist and queue.
    pub fn remove_song(&mut self, song_id: SongId) {
        for session in self.sessions.values_mut() {
            session.playlist.remove_all(|id| *id == song_id);
            session.up_next.remove(&song_id);
            if session.now_playing == Some(song_id) {
                session.now_playing = None;
            }
        }
    }

    pub fn sessions(&self) -> impl Iterator<Item = (&UserId, &PlaybackSession)> {
        self.sessions.entries()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
