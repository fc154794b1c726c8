//! Keyed store of live interview sessions.
//!
//! The room name issued by the real-time layer is the key. The registry is an
//! explicit value owned by whoever manages interview lifecycles; clone it to share.

use crate::session::InterviewSession;
use dashmap::{DashMap, mapref::entry::Entry};
use std::sync::Arc;
use tracing::trace;

/// Registry of interview sessions by room name.
///
/// Operations are atomic per key; sessions in different rooms never contend on a
/// common lock. Thread-safe and cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, Arc<InterviewSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a fresh session for `id`.
    ///
    /// An existing session under the same id is replaced, not merged. Holders of the
    /// old session keep it, but it is no longer reachable through the registry.
    pub fn create(&self, id: impl Into<String>) -> Arc<InterviewSession> {
        let id = id.into();
        let session = Arc::new(InterviewSession::new(id.clone()));
        if let Some(previous) = self.sessions.insert(id.clone(), Arc::clone(&session)) {
            if !previous.is_ended() {
                trace!(session = %id, "Replaced a session that was still active");
            }
        }
        trace!(session = %id, "Session created");
        session
    }

    /// Returns the session for `id`, creating it if no one has yet.
    pub fn get_or_create(&self, id: &str) -> Arc<InterviewSession> {
        match self.sessions.entry(id.to_string()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                trace!(session = %id, "Session created on first use");
                let session = Arc::new(InterviewSession::new(id));
                entry.insert(Arc::clone(&session));
                session
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<InterviewSession>> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Drops the session for `id`. Removing an unknown id is a no-op.
    pub fn remove(&self, id: &str) -> Option<Arc<InterviewSession>> {
        let removed = self.sessions.remove(id).map(|(_, session)| session);
        if removed.is_some() {
            trace!(session = %id, "Session removed");
        }
        removed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Ids of all registered sessions, in no particular order.
    pub fn ids(&self) -> Vec<String> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }
}
