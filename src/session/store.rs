//! In-memory session table.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::Session;
use crate::catalog::Catalog;
use crate::context::OrgContext;
use crate::routing::Router;

/// Live sessions keyed by id. Sessions are never persisted.
#[derive(Debug)]
pub struct SessionStore {
    catalog: Arc<Catalog>,
    router: Router,
    sessions: DashMap<Uuid, Arc<Session>>,
}

impl SessionStore {
    pub fn new(catalog: Arc<Catalog>, router: Router) -> Self {
        Self {
            catalog,
            router,
            sessions: DashMap::new(),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Open a new session for an organization profile.
    pub fn create(&self, context: OrgContext) -> Arc<Session> {
        let session = Arc::new(Session::new(
            self.catalog.clone(),
            self.router.clone(),
            context,
        ));
        self.sessions.insert(session.id(), session.clone());
        log::debug!("Opened session {}", session.id());
        session
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Remove and close a session, cancelling its in-flight request.
    pub fn remove(&self, id: &Uuid) -> Option<Arc<Session>> {
        let (_, session) = self.sessions.remove(id)?;
        session.close();
        Some(session)
    }

    /// Close and drop every session idle for longer than `max_idle`.
    ///
    /// Sessions with a request in flight are kept. Returns how many were
    /// removed.
    pub fn sweep(&self, max_idle: Duration) -> usize {
        self.sweep_at(Utc::now(), max_idle)
    }

    fn sweep_at(&self, now: DateTime<Utc>, max_idle: Duration) -> usize {
        let expired = |session: &Arc<Session>| {
            session.status().is_idle() && now - session.last_activity() > max_idle
        };
        let stale: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|entry| expired(entry.value()))
            .map(|entry| *entry.key())
            .collect();

        let mut removed = 0;
        for id in stale {
            if let Some((_, session)) = self.sessions.remove_if(&id, |_, s| expired(s)) {
                session.close();
                removed += 1;
            }
        }
        if removed > 0 {
            log::info!("Expired {} idle session(s)", removed);
        }
        removed
    }

    /// Close every session, cancelling in-flight requests. Used on shutdown.
    pub fn close_all(&self) {
        let count = self.sessions.len();
        self.sessions.retain(|_, session| {
            session.close();
            false
        });
        log::info!("Closed {} session(s)", count);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
