//! The user's current intent selection.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::IntentId;

/// Set of selected intent ids. Only membership matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState {
    selected: BTreeSet<IntentId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns `true` if it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    pub fn select(&mut self, id: impl Into<IntentId>) {
        self.selected.insert(id.into());
    }

    pub fn deselect(&mut self, id: &str) {
        self.selected.remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }
}

impl<S: Into<IntentId>> FromIterator<S> for SelectionState {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().map(Into::into).collect(),
        }
    }
}
