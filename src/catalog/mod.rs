//! Static reference tables: strategic intents and the module catalog.
//!
//! Both tables are immutable once loaded. A process installs one
//! [`Catalog`] through [`init`] (or lets [`global`] fall back to the
//! builtin table) and only ever reads it afterwards.

pub mod error;
pub mod intent;
pub mod module;
pub mod registry;

pub use error::CatalogError;
pub use intent::{IntentId, StrategicIntent, WILDCARD_PERSONA};
pub use module::{ModuleId, ModuleSpec, Phase};
pub use registry::{global, init, Catalog, BASELINE_SIZE};
