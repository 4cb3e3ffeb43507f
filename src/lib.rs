//! # Compass
//!
//! Backend for a strategic configuration wizard. A user declares an
//! organization profile and one or more strategic intents; Compass derives
//! the phase-grouped set of analysis modules to activate and routes
//! free-text questions to one of a fixed set of response agents.
//!
//! - [`catalog`] — immutable intent and module reference tables
//! - [`composition`] — intents to active modules (pure)
//! - [`routing`] — keyword classification and responder delegation
//! - [`session`] — per-user ownership, concurrency and cancellation
//! - [`server`] — axum HTTP surface

pub mod catalog;
pub mod collaborators;
pub mod composition;
pub mod config;
pub mod context;
pub mod routing;
pub mod server;
pub mod session;

pub use catalog::{Catalog, Phase, StrategicIntent};
pub use composition::{resolve, Composition, SelectionState};
pub use context::OrgContext;
pub use routing::{AgentTag, ChatMessage, RouteReply, Router};
pub use session::{Session, SessionError, SessionStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
