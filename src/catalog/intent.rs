//! Strategic intent entries.

use serde::{Deserialize, Serialize};

use super::module::ModuleId;

/// Intent identifier, e.g. `"market_entry"`.
pub type IntentId = String;

/// Persona tag that aligns an intent with every organization type.
pub const WILDCARD_PERSONA: &str = "all";

/// A strategic goal the user can select in the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategicIntent {
    pub id: IntentId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Modules this intent activates, in recommendation order.
    #[serde(default)]
    pub recommended_modules: Vec<ModuleId>,
    /// Organization types this intent is suggested for, or `"all"`.
    #[serde(default)]
    pub persona_alignment: Vec<String>,
}

impl StrategicIntent {
    /// Whether this intent is suggested for the given organization type.
    pub fn aligns_with(&self, org_type: &str) -> bool {
        self.persona_alignment.iter().any(|tag| {
            tag.eq_ignore_ascii_case(WILDCARD_PERSONA) || tag.eq_ignore_ascii_case(org_type)
        })
    }
}
