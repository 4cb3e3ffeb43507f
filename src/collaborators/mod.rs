//! External text generators the router and wizard delegate to.
//!
//! Both collaborators are traits so sessions can run against the HTTP
//! implementations in production and scripted ones in tests. Failures are
//! always recoverable: the router degrades to a fallback reply and
//! [`refine_or_none`] degrades to "no refinement available".

pub mod error;
pub mod http;
pub mod refiner;
pub mod responder;

pub use error::CollaboratorError;
pub use http::{HttpRefiner, HttpResponder};
pub use refiner::{refine_or_none, Refiner};
pub use responder::{Responder, ResponderReply};
