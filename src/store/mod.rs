// REFCUE Session Store
// Copyright (c) 2026 Xing_The_Creator | REFCUE
//
// One practice session per browser session, keyed by a random id.

pub mod reaper;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use crate::practice::catalog::Catalog;
use crate::practice::cursor::EndDetection;
use crate::practice::session::{PracticeSession, SessionSnapshot};

struct SessionEntry {
    session: PracticeSession,
    last_seen: Instant,
}

pub struct SessionStore {
    catalog: Arc<Catalog>,
    end_detection: EndDetection,
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    pub fn new(catalog: Arc<Catalog>, end_detection: EndDetection) -> Self {
        Self {
            catalog,
            end_detection,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    // A handler that panicked mid-event leaves a usable map behind.
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(|poisoned| {
            warn!("[SESSION] Store mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn insert(&self, session: PracticeSession) -> (Uuid, SessionSnapshot) {
        let id = Uuid::new_v4();
        let snapshot = session.snapshot();
        self.lock().insert(
            id,
            SessionEntry {
                session,
                last_seen: Instant::now(),
            },
        );
        info!("[SESSION] Created session {}", id);
        (id, snapshot)
    }

    pub fn create(&self) -> (Uuid, SessionSnapshot) {
        self.insert(PracticeSession::new(self.catalog.clone(), self.end_detection))
    }

    /// New session seeded from what the browser had stored.
    pub fn create_from(&self, snapshot: SessionSnapshot) -> (Uuid, SessionSnapshot) {
        self.insert(PracticeSession::restore(
            self.catalog.clone(),
            snapshot,
            self.end_detection,
        ))
    }

    /// Run `f` against a session and mark it as seen. `None` if the id is unknown.
    pub fn with_session<T>(&self, id: &Uuid, f: impl FnOnce(&mut PracticeSession) -> T) -> Option<T> {
        let mut sessions = self.lock();
        let entry = sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(f(&mut entry.session))
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.lock().remove(id).is_some();
        if removed {
            info!("[SESSION] Closed session {}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop sessions not touched for `ttl`. Returns how many were dropped.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() < ttl);
        before - sessions.len()
    }
}
