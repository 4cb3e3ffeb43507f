//! Per-request status lifecycle ("agent busy" indicator).

use serde::Serialize;
use tokio::sync::watch;

use super::agent::AgentTag;

/// Where the current request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RequestPhase {
    Idle,
    Classifying,
    /// The responder is working; `agent` is shown as "processing".
    AwaitingResponse { agent: AgentTag },
    Delivered { agent: AgentTag },
    Degraded,
}

impl RequestPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Agent currently shown as busy, if any.
    pub fn processing_agent(&self) -> Option<AgentTag> {
        match self {
            Self::AwaitingResponse { agent } => Some(*agent),
            _ => None,
        }
    }
}

/// Observable status slot; at most one request holds it at a time.
#[derive(Debug)]
pub struct StatusTracker {
    tx: watch::Sender<RequestPhase>,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RequestPhase::Idle);
        Self { tx }
    }

    pub fn current(&self) -> RequestPhase {
        *self.tx.borrow()
    }

    /// Watch phase transitions.
    pub fn subscribe(&self) -> watch::Receiver<RequestPhase> {
        self.tx.subscribe()
    }

    /// Claim the slot if idle, moving it to `Classifying`.
    ///
    /// Returns `None` while another request holds it. The check and the
    /// transition happen under one lock.
    pub fn try_begin(&self) -> Option<StatusGuard<'_>> {
        let claimed = self.tx.send_if_modified(|phase| {
            if phase.is_idle() {
                *phase = RequestPhase::Classifying;
                true
            } else {
                false
            }
        });
        claimed.then(|| StatusGuard { tracker: self })
    }
}

/// Exclusive hold on a [`StatusTracker`]. Dropping it resets to `Idle`.
#[derive(Debug)]
pub struct StatusGuard<'a> {
    tracker: &'a StatusTracker,
}

impl StatusGuard<'_> {
    pub fn advance(&self, phase: RequestPhase) {
        log::trace!("Request phase -> {:?}", phase);
        self.tracker.tx.send_replace(phase);
    }

    pub fn phase(&self) -> RequestPhase {
        self.tracker.current()
    }
}

impl Drop for StatusGuard<'_> {
    fn drop(&mut self) {
        self.tracker.tx.send_replace(RequestPhase::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_claims_and_drop_releases() {
        let tracker = StatusTracker::new();
        assert!(tracker.current().is_idle());
        {
            let guard = tracker.try_begin().unwrap();
            assert_eq!(tracker.current(), RequestPhase::Classifying);
            guard.advance(RequestPhase::AwaitingResponse {
                agent: AgentTag::Diplomat,
            });
            assert_eq!(tracker.current().processing_agent(), Some(AgentTag::Diplomat));
        }
        assert!(tracker.current().is_idle());
    }

    #[test]
    fn test_second_claim_rejected_while_held() {
        let tracker = StatusTracker::new();
        let guard = tracker.try_begin().unwrap();
        assert!(tracker.try_begin().is_none());
        drop(guard);
        assert!(tracker.try_begin().is_some());
    }

    #[test]
    fn test_terminal_phases_have_no_processing_agent() {
        assert_eq!(
            RequestPhase::Delivered {
                agent: AgentTag::Scout
            }
            .processing_agent(),
            None
        );
        assert_eq!(RequestPhase::Degraded.processing_agent(), None);
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let tracker = StatusTracker::new();
        let mut rx = tracker.subscribe();
        let guard = tracker.try_begin().unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), RequestPhase::Classifying);
        drop(guard);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_idle());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(RequestPhase::AwaitingResponse {
            agent: AgentTag::Scout,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"state": "awaiting_response", "agent": "scout"}));
    }
}
