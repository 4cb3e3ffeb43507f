//! Catalog registry — the loaded intent and module tables.
//!
//! A catalog is loaded from YAML:
//!
//! ```yaml
//! baseline: [macro_pulse, integrity_shield]
//! modules:
//!   macro_pulse: { display_name: "Macro Pulse", phase: macro }
//! intents:
//!   - id: market_entry
//!     title: "Enter a New Market"
//!     recommended_modules: [macro_pulse]
//!     persona_alignment: [all]
//! ```
//!
//! The builtin catalog is compiled into the binary; [`init`] installs a
//! process-wide table exactly once.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use super::error::CatalogError;
use super::intent::StrategicIntent;
use super::module::{ModuleId, ModuleSpec, Phase};

const BUILTIN_CATALOG: &str = include_str!("default.yaml");

static GLOBAL: OnceCell<Arc<Catalog>> = OnceCell::new();

/// Number of modules active regardless of selection.
pub const BASELINE_SIZE: usize = 2;

/// On-disk shape of a catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    baseline: Vec<ModuleId>,
    #[serde(default)]
    modules: HashMap<ModuleId, ModuleSpec>,
    #[serde(default)]
    intents: Vec<StrategicIntent>,
}

/// Immutable intent and module reference tables.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    /// Modules active regardless of selection.
    baseline: Vec<ModuleId>,
    /// Module table keyed by id.
    modules: HashMap<ModuleId, ModuleSpec>,
    /// Intents in catalog order.
    intents: Vec<StrategicIntent>,
    /// Intent id -> position in `intents`.
    #[serde(skip)]
    intent_index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from its parts, validating them.
    pub fn new(
        baseline: Vec<ModuleId>,
        modules: HashMap<ModuleId, ModuleSpec>,
        intents: Vec<StrategicIntent>,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let baseline: Vec<ModuleId> = baseline
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        if baseline.len() != BASELINE_SIZE {
            return Err(CatalogError::Validation(format!(
                "catalog must declare exactly {} distinct baseline modules, found {}",
                BASELINE_SIZE,
                baseline.len()
            )));
        }
        if let Some(missing) = baseline.iter().find(|id| !modules.contains_key(*id)) {
            return Err(CatalogError::Validation(format!(
                "baseline module '{}' has no module entry",
                missing
            )));
        }

        let mut intent_index = HashMap::with_capacity(intents.len());
        for (pos, intent) in intents.iter().enumerate() {
            if intent.id.trim().is_empty() {
                return Err(CatalogError::Validation(format!(
                    "intent at position {} has an empty id",
                    pos
                )));
            }
            if intent_index.insert(intent.id.clone(), pos).is_some() {
                return Err(CatalogError::Validation(format!(
                    "duplicate intent id '{}'",
                    intent.id
                )));
            }
            for module_id in &intent.recommended_modules {
                if !modules.contains_key(module_id) {
                    log::debug!(
                        "Intent '{}' recommends uncatalogued module '{}' (phase falls back to {})",
                        intent.id,
                        module_id,
                        Phase::FALLBACK
                    );
                }
            }
        }

        Ok(Self {
            baseline,
            modules,
            intents,
            intent_index,
        })
    }

    /// Parse a catalog from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::new(file.baseline, file.modules, file.intents)
    }

    /// Parse a catalog from a YAML file on disk.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_yaml(&content)?;
        log::info!(
            "Loaded catalog from {} ({} intents, {} modules)",
            path.as_ref().display(),
            catalog.intents.len(),
            catalog.modules.len()
        );
        Ok(catalog)
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// Baseline module ids in declaration order.
    pub fn baseline(&self) -> &[ModuleId] {
        &self.baseline
    }

    /// All intents in catalog order.
    pub fn intents(&self) -> &[StrategicIntent] {
        &self.intents
    }

    /// Look up an intent by id.
    pub fn intent(&self, id: &str) -> Option<&StrategicIntent> {
        self.intent_index.get(id).map(|&pos| &self.intents[pos])
    }

    /// Look up a module by id.
    pub fn module(&self, id: &str) -> Option<&ModuleSpec> {
        self.modules.get(id)
    }

    /// Number of catalogued modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Phase of a module, with the fallback phase for unknown ids.
    pub fn phase_of(&self, id: &str) -> Phase {
        self.modules
            .get(id)
            .map(|m| m.phase)
            .unwrap_or(Phase::FALLBACK)
    }

    /// Display name of a module, or the id itself when uncatalogued.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.modules
            .get(id)
            .map(|m| m.display_name.as_str())
            .unwrap_or(id)
    }

    /// Intents suggested for an organization type, in catalog order.
    pub fn intents_for(&self, org_type: &str) -> Vec<&StrategicIntent> {
        self.intents
            .iter()
            .filter(|intent| intent.aligns_with(org_type))
            .collect()
    }
}

/// Install the process-wide catalog. Fails if one is already installed.
pub fn init(catalog: Catalog) -> Result<Arc<Catalog>, CatalogError> {
    let catalog = Arc::new(catalog);
    GLOBAL
        .set(catalog.clone())
        .map_err(|_| CatalogError::AlreadyLoaded)?;
    Ok(catalog)
}

/// The process-wide catalog; installs the builtin one if none was loaded.
pub fn global() -> Result<Arc<Catalog>, CatalogError> {
    GLOBAL
        .get_or_try_init(|| Catalog::builtin().map(Arc::new))
        .cloned()
}
