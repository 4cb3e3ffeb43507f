//! Resolve an intent selection into the active module set.
//!
//! The active set always starts with the catalog's baseline modules and then
//! takes the union of every selected intent's `recommended_modules`. Intents
//! are visited in catalog order, so the display order depends only on which
//! intents are selected, never on the order they were toggled in.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::catalog::{Catalog, ModuleId, Phase};

use super::selection::SelectionState;

/// Derived module set for a selection. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Composition {
    /// Deduplicated modules in first-seen order.
    pub active_modules: Vec<ModuleId>,
    /// Active modules grouped by phase. Every phase is present.
    pub by_phase: BTreeMap<Phase, Vec<ModuleId>>,
}

impl Composition {
    pub fn contains(&self, module_id: &str) -> bool {
        self.active_modules.iter().any(|m| m == module_id)
    }

    /// Phase group a module landed in, if active.
    pub fn phase_of(&self, module_id: &str) -> Option<Phase> {
        self.by_phase
            .iter()
            .find(|(_, modules)| modules.iter().any(|m| m == module_id))
            .map(|(phase, _)| *phase)
    }

    pub fn len(&self) -> usize {
        self.active_modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active_modules.is_empty()
    }
}

/// Compute the active modules for `selection`.
///
/// Unknown intent ids are ignored. Modules without a catalog entry are
/// grouped under [`Phase::FALLBACK`].
pub fn resolve(catalog: &Catalog, selection: &SelectionState) -> Composition {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut active_modules: Vec<ModuleId> = Vec::new();

    let selected = catalog
        .intents()
        .iter()
        .filter(|intent| selection.contains(&intent.id));
    let candidates = catalog
        .baseline()
        .iter()
        .chain(selected.flat_map(|intent| intent.recommended_modules.iter()));

    for module_id in candidates {
        if seen.insert(module_id.as_str()) {
            active_modules.push(module_id.clone());
        }
    }

    let mut by_phase: BTreeMap<Phase, Vec<ModuleId>> =
        Phase::ALL.iter().map(|phase| (*phase, Vec::new())).collect();
    for module_id in &active_modules {
        by_phase
            .entry(catalog.phase_of(module_id))
            .or_default()
            .push(module_id.clone());
    }

    log::trace!(
        "Resolved {} selected intents into {} modules",
        selection.len(),
        active_modules.len()
    );

    Composition {
        active_modules,
        by_phase,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    fn all_subsets(catalog: &Catalog) -> Vec<SelectionState> {
        let ids: Vec<&str> = catalog.intents().iter().map(|i| i.id.as_str()).collect();
        (0..(1u32 << ids.len()))
            .map(|mask| {
                ids.iter()
                    .enumerate()
                    .filter(|(bit, _)| mask & (1 << bit) != 0)
                    .map(|(_, id)| *id)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_empty_selection_yields_baseline() {
        let catalog = catalog();
        let composition = resolve(&catalog, &SelectionState::new());
        assert_eq!(composition.active_modules, catalog.baseline().to_vec());
        assert_eq!(composition.by_phase[&Phase::Macro], vec!["macro_pulse".to_string()]);
        assert_eq!(
            composition.by_phase[&Phase::Integrity],
            vec!["integrity_shield".to_string()]
        );
        assert!(composition.by_phase[&Phase::Expansion].is_empty());
        assert!(composition.by_phase[&Phase::Execution].is_empty());
    }

    #[test]
    fn test_all_phases_present_even_when_empty() {
        let composition = resolve(&catalog(), &SelectionState::new());
        assert_eq!(composition.by_phase.len(), 4);
        let phases: Vec<Phase> = composition.by_phase.keys().copied().collect();
        assert_eq!(phases, Phase::ALL.to_vec());
    }

    #[test]
    fn test_union_is_deduplicated() {
        let catalog = catalog();
        // market_entry and strategic_partnership both recommend regulatory_scan.
        let selection: SelectionState = ["market_entry", "strategic_partnership", "trade_resilience"]
            .into_iter()
            .collect();
        let composition = resolve(&catalog, &selection);
        let unique: HashSet<&String> = composition.active_modules.iter().collect();
        assert_eq!(unique.len(), composition.len());
        assert_eq!(
            composition
                .active_modules
                .iter()
                .filter(|m| *m == "regulatory_scan")
                .count(),
            1
        );
    }

    #[test]
    fn test_first_seen_order() {
        let catalog = catalog();
        let selection: SelectionState = ["market_entry"].into_iter().collect();
        let composition = resolve(&catalog, &selection);
        assert_eq!(
            composition.active_modules,
            vec![
                "macro_pulse",
                "integrity_shield",
                "geo_risk_radar",
                "regulatory_scan",
                "market_sizing",
                "entry_playbook"
            ]
        );
    }

    #[test]
    fn test_unknown_intents_ignored() {
        let catalog = catalog();
        let selection: SelectionState = ["no_such_intent"].into_iter().collect();
        assert_eq!(
            resolve(&catalog, &selection),
            resolve(&catalog, &SelectionState::new())
        );
    }

    #[test]
    fn test_uncatalogued_module_goes_to_execution() {
        let catalog = Catalog::from_yaml(
            r#"
baseline: [core, guard]
modules:
  core: { display_name: Core, phase: macro }
  guard: { display_name: Guard, phase: integrity }
intents:
  - id: odd
    title: Odd
    recommended_modules: [ghost_engine]
"#,
        )
        .unwrap();
        let selection: SelectionState = ["odd"].into_iter().collect();
        let composition = resolve(&catalog, &selection);
        assert_eq!(composition.phase_of("ghost_engine"), Some(Phase::Execution));
        assert_eq!(
            composition.by_phase[&Phase::Execution],
            vec!["ghost_engine".to_string()]
        );
    }

    #[test]
    fn test_every_selection_contains_baseline_and_is_idempotent() {
        let catalog = catalog();
        for selection in all_subsets(&catalog) {
            let first = resolve(&catalog, &selection);
            for id in catalog.baseline() {
                assert!(first.contains(id));
            }
            assert_eq!(first, resolve(&catalog, &selection));
        }
    }

    #[test]
    fn test_phase_groups_partition_active_set() {
        let catalog = catalog();
        for selection in all_subsets(&catalog) {
            let composition = resolve(&catalog, &selection);
            let grouped: Vec<&ModuleId> = composition.by_phase.values().flatten().collect();
            assert_eq!(grouped.len(), composition.len());
            for module_id in &composition.active_modules {
                let hits = composition
                    .by_phase
                    .values()
                    .filter(|group| group.contains(module_id))
                    .count();
                assert_eq!(hits, 1, "{} appears in {} groups", module_id, hits);
            }
        }
    }

    #[test]
    fn test_monotonic_under_union() {
        let catalog = catalog();
        let subsets = all_subsets(&catalog);
        for small in &subsets {
            for large in &subsets {
                if !small.iter().all(|id| large.contains(id)) {
                    continue;
                }
                let small_set = resolve(&catalog, small);
                let large_set = resolve(&catalog, large);
                for module_id in &small_set.active_modules {
                    assert!(large_set.contains(module_id));
                }
            }
        }
    }
}
