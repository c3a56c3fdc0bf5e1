use std::collections::BTreeSet;

use crate::CompanyId;

/// Drives a tri-state "select all" indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    #[default]
    None,
    Partial,
    All,
}

/// Chosen company ids. Meaningful only relative to the page they were picked
/// from; the owner clears it on every scope change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    ids: BTreeSet<CompanyId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_all(&mut self, visible: impl IntoIterator<Item = CompanyId>) {
        self.ids = visible.into_iter().collect();
    }

    pub fn select_none(&mut self) {
        self.ids.clear();
    }

    /// Returns whether `id` is selected afterwards.
    pub fn toggle(&mut self, id: CompanyId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn contains(&self, id: CompanyId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ascending copy, detached from later edits.
    pub fn snapshot(&self) -> Vec<CompanyId> {
        self.ids.iter().copied().collect()
    }

    pub fn tri_state(&self, visible_len: usize) -> TriState {
        let selected = self.ids.len();
        if visible_len > 0 && selected == visible_len {
            TriState::All
        } else if selected > 0 && selected < visible_len {
            TriState::Partial
        } else {
            TriState::None
        }
    }
}
