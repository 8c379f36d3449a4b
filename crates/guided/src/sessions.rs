//! Per-session conversation history.
//!
//! The core holds no dialogue state; the daemon owns it and isolates it per
//! session id. Each session keeps only the most recent turns.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Most recent turns kept per session
pub const MAX_TURNS: usize = 20;

/// One completed query/response turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub response_text: String,
    pub confidence: f64,
    pub timestamp: DateTime<Local>,
}

/// All live sessions, keyed by uuid
#[derive(Default)]
pub struct SessionStore {
    sessions: HashMap<Uuid, Vec<HistoryEntry>>,
}

impl SessionStore {
    pub fn append(&mut self, session: Uuid, entry: HistoryEntry) {
        let history = self.sessions.entry(session).or_default();
        history.push(entry);
        if history.len() > MAX_TURNS {
            let excess = history.len() - MAX_TURNS;
            history.drain(..excess);
        }
    }

    /// A session's history, oldest first. Unknown sessions are empty.
    pub fn history(&self, session: &Uuid) -> Vec<HistoryEntry> {
        self.sessions.get(session).cloned().unwrap_or_default()
    }

    pub fn clear(&mut self, session: &Uuid) {
        self.sessions.remove(session);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry {
            query: format!("query {}", n),
            response_text: format!("response {}", n),
            confidence: 0.5,
            timestamp: Local::now(),
        }
    }

    #[test]
    fn test_sessions_are_isolated() {
        let mut store = SessionStore::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.append(a, entry(1));
        store.append(b, entry(2));

        assert_eq!(store.history(&a).len(), 1);
        assert_eq!(store.history(&a)[0].query, "query 1");
        assert_eq!(store.history(&b)[0].query, "query 2");
    }

    #[test]
    fn test_history_capped_to_recent_turns() {
        let mut store = SessionStore::default();
        let session = Uuid::new_v4();
        for n in 0..30 {
            store.append(session, entry(n));
        }

        let history = store.history(&session);
        assert_eq!(history.len(), MAX_TURNS);
        // Oldest turns dropped first
        assert_eq!(history[0].query, "query 10");
        assert_eq!(history[MAX_TURNS - 1].query, "query 29");
    }

    #[test]
    fn test_clear_removes_only_that_session() {
        let mut store = SessionStore::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.append(a, entry(1));
        store.append(b, entry(2));

        store.clear(&a);
        assert!(store.history(&a).is_empty());
        assert_eq!(store.history(&b).len(), 1);
        assert_eq!(store.session_count(), 1);
    }
}
