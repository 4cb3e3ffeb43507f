//! Request Router: keyword classification of chat input into a fixed set
//! of agents, delegation to the external responder, and the per-request
//! status lifecycle.
//!
//! ```text
//! idle → classifying → awaiting-response → { delivered | degraded } → idle
//! ```
//!
//! The return to `idle` is owned by [`StatusGuard`]'s `Drop`, so it happens
//! on success, on collaborator failure, and when the request future is
//! dropped mid-flight.

pub mod agent;
pub mod message;
pub mod router;
pub mod status;

pub use agent::AgentTag;
pub use message::{ChatMessage, Sender, Source, MAX_DISPLAY_SOURCES};
pub use router::{RouteReply, Router, FALLBACK_REPLY};
pub use status::{RequestPhase, StatusGuard, StatusTracker};
