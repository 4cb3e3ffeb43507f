//! HTTP server for the configuration wizard.
//!
//! Exposes the catalog, stateless composition previews, text refinement and
//! per-session selection and chat routing.

pub mod routes;

pub use routes::{app_router, AppState};
