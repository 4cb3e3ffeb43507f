//! Module ("engine") entries and the fixed pipeline phases.

use serde::{Deserialize, Serialize};

/// Module identifier, e.g. `"tariff_monitor"`.
pub type ModuleId = String;

/// Pipeline stage a module belongs to.
///
/// Variant order is the display order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Macro,
    Integrity,
    Expansion,
    Execution,
}

impl Phase {
    /// All phases in pipeline order.
    pub const ALL: [Phase; 4] = [
        Phase::Macro,
        Phase::Integrity,
        Phase::Expansion,
        Phase::Execution,
    ];

    /// Phase assigned to modules missing from the catalog.
    pub const FALLBACK: Phase = Phase::Execution;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Macro => "macro",
            Self::Integrity => "integrity",
            Self::Expansion => "expansion",
            Self::Execution => "execution",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entry for a single module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Human-readable label shown in the preview.
    pub display_name: String,
    /// Pipeline stage.
    pub phase: Phase,
}
