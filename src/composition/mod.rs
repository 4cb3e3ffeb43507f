//! Composition Resolver: selected intents to a phase-grouped module set.
//!
//! ```
//! use compass::catalog::Catalog;
//! use compass::composition::{resolve, SelectionState};
//!
//! let catalog = Catalog::builtin().unwrap();
//! let mut selection = SelectionState::new();
//! selection.toggle("market_entry");
//!
//! let composition = resolve(&catalog, &selection);
//! assert!(composition.contains("macro_pulse"));
//! assert!(composition.contains("entry_playbook"));
//! ```

pub mod resolver;
pub mod selection;

pub use resolver::{resolve, Composition};
pub use selection::SelectionState;
