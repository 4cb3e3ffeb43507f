//! Per-user wizard session.
//!
//! A [`Session`] exclusively owns its selection, organization profile,
//! transcript and request status; nothing crosses session boundaries except
//! the read-only catalog and the stateless router.
//!
//! Concurrency policy: one request in flight per session. A second
//! [`Session::submit`] while the first is awaiting its reply is rejected
//! with [`SessionError::Busy`]; nothing is queued.
//!
//! Closing a session cancels an in-flight request: the responder future is
//! dropped (releasing its connection) and the late reply is never appended.

pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::catalog::{Catalog, StrategicIntent};
use crate::collaborators::{refine_or_none, Refiner};
use crate::composition::{resolve, Composition, SelectionState};
use crate::context::OrgContext;
use crate::routing::{ChatMessage, RequestPhase, Router, StatusTracker};

pub use store::SessionStore;

/// Instruction used when polishing a mission statement.
pub const MISSION_REFINE_INSTRUCTION: &str =
    "Rewrite this organization's mission statement to be concise, concrete and ambitious.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Blank chat input never reaches the router.
    #[error("message is empty")]
    EmptyMessage,

    /// Another request is still awaiting its reply.
    #[error("a request is already in flight for this session")]
    Busy,

    /// The session was closed before the request started.
    #[error("session is closed")]
    Closed,

    /// The session was closed while the request was in flight.
    #[error("request cancelled because the session closed")]
    Cancelled,
}

/// Serializable view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub context: OrgContext,
    pub selection: SelectionState,
    pub composition: Composition,
    pub transcript: Vec<ChatMessage>,
    pub status: RequestPhase,
    pub closed: bool,
}

pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_activity: Mutex<DateTime<Utc>>,
    catalog: Arc<Catalog>,
    router: Router,
    selection: Mutex<SelectionState>,
    context: Mutex<OrgContext>,
    transcript: Mutex<Vec<ChatMessage>>,
    status: StatusTracker,
    closed: watch::Sender<bool>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("status", &self.status.current())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(catalog: Arc<Catalog>, router: Router, context: OrgContext) -> Self {
        let (closed, _rx) = watch::channel(false);
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_activity: Mutex::new(now),
            catalog,
            router,
            selection: Mutex::new(SelectionState::new()),
            context: Mutex::new(context),
            transcript: Mutex::new(Vec::new()),
            status: StatusTracker::new(),
            closed,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Time of the last user-driven operation on this session.
    pub fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.lock()
    }

    fn touch(&self) {
        *self.last_activity.lock() = Utc::now();
    }

    // --- Selection & composition ---

    /// Flip an intent's membership. Returns `true` if now selected.
    pub fn toggle_intent(&self, intent_id: &str) -> bool {
        self.touch();
        self.selection.lock().toggle(intent_id)
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.lock().clone()
    }

    /// Active modules for the current selection.
    pub fn composition(&self) -> Composition {
        let selection = self.selection.lock();
        resolve(&self.catalog, &selection)
    }

    /// Intents suggested for the session's organization type.
    pub fn suggested_intents(&self) -> Vec<StrategicIntent> {
        let org_type = self.context.lock().org_type.clone();
        self.catalog
            .intents_for(&org_type)
            .into_iter()
            .cloned()
            .collect()
    }

    // --- Organization profile ---

    pub fn context(&self) -> OrgContext {
        self.context.lock().clone()
    }

    pub fn set_context(&self, context: OrgContext) {
        self.touch();
        *self.context.lock() = context;
    }

    /// Polish the mission statement through `refiner`.
    ///
    /// On success the refined text replaces the stored mission and is
    /// returned. `None` means no refinement was available, or the mission
    /// changed (or the session closed) while the refiner was working; the
    /// profile is left untouched either way.
    pub async fn refine_mission(&self, refiner: &dyn Refiner) -> Option<String> {
        self.touch();
        let mission = self.context.lock().mission.clone()?;
        if mission.trim().is_empty() {
            return None;
        }
        let refined = refine_or_none(refiner, &mission, MISSION_REFINE_INSTRUCTION).await?;
        if self.is_closed() {
            return None;
        }
        let mut context = self.context.lock();
        if context.mission.as_deref() != Some(mission.as_str()) {
            log::debug!(
                "Session {} mission edited during refinement; discarding result",
                self.id
            );
            return None;
        }
        context.mission = Some(refined.clone());
        Some(refined)
    }

    // --- Chat ---

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.lock().clone()
    }

    pub fn status(&self) -> RequestPhase {
        self.status.current()
    }

    /// Watch status transitions (drives the "processing" indicator).
    pub fn subscribe_status(&self) -> watch::Receiver<RequestPhase> {
        self.status.subscribe()
    }

    /// Submit a chat message and wait for the routed reply.
    ///
    /// The user message is appended before routing; the agent message is
    /// appended and returned once the reply arrives.
    pub async fn submit(&self, text: &str) -> Result<ChatMessage, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        self.touch();
        let guard = self.status.try_begin().ok_or(SessionError::Busy)?;

        self.transcript.lock().push(ChatMessage::user(text));
        let context = self.context.lock().clone();
        let closed = self.closed.subscribe();

        let reply = tokio::select! {
            reply = self.router.route_tracked(text, &context, &guard) => reply,
            _ = wait_closed(closed) => {
                log::info!("Session {} closed with a request in flight; dropping it", self.id);
                return Err(SessionError::Cancelled);
            }
        };

        if self.is_closed() {
            log::debug!("Session {} closed before reply delivery; discarding", self.id);
            return Err(SessionError::Cancelled);
        }

        let message = ChatMessage::agent(reply);
        self.transcript.lock().push(message.clone());
        self.touch();
        Ok(message)
    }

    // --- Lifecycle ---

    /// Close the session, cancelling any in-flight request.
    pub fn close(&self) {
        if !self.closed.send_replace(true) {
            log::debug!("Session {} closed", self.id);
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            created_at: self.created_at,
            last_activity: self.last_activity(),
            context: self.context(),
            selection: self.selection(),
            composition: self.composition(),
            transcript: self.transcript(),
            status: self.status(),
            closed: self.is_closed(),
        }
    }
}

/// Resolves once the close flag is set.
async fn wait_closed(mut closed: watch::Receiver<bool>) {
    while !*closed.borrow_and_update() {
        if closed.changed().await.is_err() {
            // Sender lives as long as the session; nothing left to wait for.
            std::future::pending::<()>().await;
        }
    }
}
