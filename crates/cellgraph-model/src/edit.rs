use crate::cell::CellId;
use crate::change::AtomicChange;
use crate::store::{CellStore, HashSet};

/// The ordered changes of one outermost transaction; the unit of undo and redo.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    changes: Vec<AtomicChange>,
    significant: bool,
    undone: bool,
    redone: bool,
}

impl Default for Edit {
    fn default() -> Self {
        Self {
            changes: Vec::new(),
            significant: true,
            undone: false,
            redone: false,
        }
    }
}

impl Edit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_significant(mut self, significant: bool) -> Self {
        self.significant = significant;
        self
    }

    /// Undo and redo stop after replaying a significant edit.
    pub fn is_significant(&self) -> bool {
        self.significant
    }

    pub fn is_undone(&self) -> bool {
        self.undone
    }

    pub fn is_redone(&self) -> bool {
        self.redone
    }

    pub fn push(&mut self, change: AtomicChange) {
        self.changes.push(change);
    }

    pub(crate) fn append(&mut self, other: Edit) {
        self.changes.extend(other.changes);
    }

    pub fn changes(&self) -> &[AtomicChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Reverts the changes, last first.
    pub fn undo(&mut self, store: &mut CellStore) {
        for change in self.changes.iter_mut().rev() {
            change.undo(store);
        }
        self.undone = true;
        self.redone = false;
    }

    /// Re-applies the changes in their original order.
    pub fn redo(&mut self, store: &mut CellStore) {
        for change in &mut self.changes {
            change.redo(store);
        }
        self.undone = false;
        self.redone = true;
    }

    /// Distinct cells touched by the edit, in order of first appearance.
    pub fn cells(&self) -> Vec<CellId> {
        let mut seen: HashSet<CellId> = HashSet::default();
        self.changes
            .iter()
            .filter_map(|c| c.change().cell())
            .filter(|c| seen.insert(*c))
            .collect()
    }
}
