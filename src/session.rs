//! Per-conversation session storage.
//!
//! Holds the filtered result list of each conversation's last search and
//! the last-rendered page. Backed by a bounded [`moka`] cache with TTL so
//! abandoned conversations are eventually evicted rather than retained
//! forever; an evicted session is indistinguishable from "no prior
//! search", which every caller already handles as a normal outcome.
//!
//! Concurrency: the cache itself is concurrent, so different
//! conversations never block one another. Accesses to a single
//! conversation's entry are serialized through that entry's own mutex,
//! and reads hand out immutable snapshots.

use lyrebird_catalog::Track;
use moka::future::Cache;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Addressable chat context identifier (the chat platform's chat id).
pub type ConversationId = i64;

/// Immutable snapshot of one conversation's session.
#[derive(Debug, Clone)]
pub struct SessionView {
    /// Filtered result list of the last search, in catalog order.
    /// Selection indices refer into this list by position.
    pub tracks: Arc<Vec<Track>>,
    /// Index of the last-rendered pagination page.
    pub page: usize,
}

#[derive(Debug)]
struct SessionState {
    tracks: Arc<Vec<Track>>,
    page: usize,
}

/// Store of per-conversation sessions.
pub struct SessionStore {
    sessions: Cache<ConversationId, Arc<Mutex<SessionState>>>,
}

impl SessionStore {
    /// Create a store bounded to `max_entries` sessions with the given
    /// time-to-live.
    #[must_use]
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Replace any existing session for `conversation` with a fresh one
    /// at page 0, returning a snapshot of it.
    pub async fn put(&self, conversation: ConversationId, tracks: Vec<Track>) -> SessionView {
        let tracks = Arc::new(tracks);
        let state = SessionState {
            tracks: Arc::clone(&tracks),
            page: 0,
        };
        self.sessions
            .insert(conversation, Arc::new(Mutex::new(state)))
            .await;
        SessionView { tracks, page: 0 }
    }

    /// Snapshot the session for `conversation`, if one exists.
    ///
    /// `None` is a normal outcome: a paging or selection action arriving
    /// with no prior (or an evicted) search.
    pub async fn get(&self, conversation: ConversationId) -> Option<SessionView> {
        let entry = self.sessions.get(&conversation).await?;
        let state = entry.lock().ok()?;
        Some(SessionView {
            tracks: Arc::clone(&state.tracks),
            page: state.page,
        })
    }

    /// Update the page field of an existing session. Silent no-op when
    /// the session no longer exists; the conversation may have started
    /// a new search in between.
    pub async fn set_page(&self, conversation: ConversationId, page: usize) {
        if let Some(entry) = self.sessions.get(&conversation).await {
            if let Ok(mut state) = entry.lock() {
                state.page = page;
            }
        }
    }
}
