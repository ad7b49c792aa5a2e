//! Bounded undo/redo history of dispatched edits.

use crate::edit::Edit;
use crate::event::{EventKind, ListenerId, Listeners};
use crate::model::{Model, ModelEvent};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoOptions {
    /// Maximum number of edits kept; 0 keeps everything.
    pub size: usize,
}

impl Default for UndoOptions {
    fn default() -> Self {
        Self { size: 100 }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum UndoEvent<'a> {
    Add { edit: &'a Edit },
    Undo { edit: &'a Edit },
    Redo { edit: &'a Edit },
    Clear,
}

impl UndoEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            UndoEvent::Add { .. } => EventKind::Add,
            UndoEvent::Undo { .. } => EventKind::Undo,
            UndoEvent::Redo { .. } => EventKind::Redo,
            UndoEvent::Clear => EventKind::Clear,
        }
    }
}

pub type UndoListener = dyn FnMut(&UndoEvent<'_>);

#[derive(Debug)]
pub struct UndoManager {
    size: usize,
    history: Vec<Edit>,
    index_of_next_add: usize,
    listeners: Listeners<UndoListener>,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoManager {
    pub fn new() -> Self {
        Self::with_options(UndoOptions::default())
    }

    pub fn with_options(options: UndoOptions) -> Self {
        Self {
            size: options.size,
            history: Vec::new(),
            index_of_next_add: 0,
            listeners: Listeners::default(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn history(&self) -> &[Edit] {
        &self.history
    }

    /// Position where the next edit will be stored; edits before it can be undone.
    pub fn index_of_next_add(&self) -> usize {
        self.index_of_next_add
    }

    pub fn add_listener<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&UndoEvent<'_>) + 'static,
    {
        let callback: Rc<RefCell<UndoListener>> = Rc::new(RefCell::new(listener));
        self.listeners.add(kind, callback)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn fire(&self, event: &UndoEvent<'_>) {
        for listener in self.listeners.matching(event.kind()) {
            let Ok(mut callback) = listener.try_borrow_mut() else {
                continue;
            };
            (&mut *callback)(event);
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.index_of_next_add = 0;
        self.fire(&UndoEvent::Clear);
    }

    pub fn can_undo(&self) -> bool {
        self.index_of_next_add > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index_of_next_add < self.history.len()
    }

    /// Undoes edits backwards from the cursor until a significant one has been undone.
    pub fn undo(&mut self, model: &mut Model) {
        while self.index_of_next_add > 0 {
            self.index_of_next_add -= 1;
            let index = self.index_of_next_add;
            model.undo_edit(&mut self.history[index]);
            if self.history[index].is_significant() {
                tracing::debug!(index, "undo");
                self.fire(&UndoEvent::Undo {
                    edit: &self.history[index],
                });
                break;
            }
        }
    }

    /// Redoes edits forwards from the cursor until a significant one has been redone.
    pub fn redo(&mut self, model: &mut Model) {
        while self.index_of_next_add < self.history.len() {
            let index = self.index_of_next_add;
            self.index_of_next_add += 1;
            model.redo_edit(&mut self.history[index]);
            if self.history[index].is_significant() {
                tracing::debug!(index, "redo");
                self.fire(&UndoEvent::Redo {
                    edit: &self.history[index],
                });
                break;
            }
        }
    }

    /// Records `edit`, dropping any redoable edits and the oldest edit when full.
    pub fn undoable_edit_happened(&mut self, edit: Edit) {
        self.history.truncate(self.index_of_next_add);
        if self.size > 0 && self.size == self.history.len() {
            self.history.remove(0);
        }
        self.history.push(edit);
        self.index_of_next_add = self.history.len();
        if let Some(edit) = self.history.last() {
            self.fire(&UndoEvent::Add { edit });
        }
    }
}

/// Records every edit dispatched by `model` into `manager`.
pub fn track(model: &mut Model, manager: Rc<RefCell<UndoManager>>) -> ListenerId {
    model.add_listener(EventKind::Undo, move |_, event| {
        let ModelEvent::Undo { edit } = event else {
            return;
        };
        if let Ok(mut manager) = manager.try_borrow_mut() {
            manager.undoable_edit_happened(Edit::clone(edit));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;
    use crate::geometry::Geometry;
    use crate::style::Style;

    fn edit_for(model: &mut Model, label: &str) -> Edit {
        let captured = Rc::new(RefCell::new(None));
        let sink = captured.clone();
        let id = model.add_listener(EventKind::Change, move |_, event| {
            if let Some(edit) = event.edit() {
                *sink.borrow_mut() = Some(edit.clone());
            }
        });
        let layer = model.children(model.root().unwrap())[0];
        let v = model.create_cell(Cell::vertex(label, Geometry::new(0.0, 0.0, 1.0, 1.0), Style::new()));
        model.add(layer, v, None);
        model.remove_listener(id);
        captured.borrow_mut().take().unwrap()
    }

    #[test]
    fn default_size_is_one_hundred() {
        assert_eq!(UndoManager::new().size(), 100);
    }

    #[test]
    fn capacity_evicts_the_oldest_edit() {
        let mut model = Model::new();
        let e1 = edit_for(&mut model, "e1");
        let e2 = edit_for(&mut model, "e2");
        let e3 = edit_for(&mut model, "e3");

        let mut undo = UndoManager::with_options(UndoOptions { size: 2 });
        undo.undoable_edit_happened(e1);
        undo.undoable_edit_happened(e2.clone());
        undo.undoable_edit_happened(e3.clone());
        assert_eq!(undo.history(), &[e2, e3]);
        assert!(undo.can_undo());

        undo.undo(&mut model);
        undo.undo(&mut model);
        assert!(!undo.can_undo());
        assert!(undo.can_redo());
    }

    #[test]
    fn zero_size_is_unbounded() {
        let mut model = Model::new();
        let mut undo = UndoManager::with_options(UndoOptions { size: 0 });
        for i in 0..5 {
            let edit = edit_for(&mut model, &format!("v{i}"));
            undo.undoable_edit_happened(edit);
        }
        assert_eq!(undo.len(), 5);
    }

    #[test]
    fn new_edit_discards_redo_history() {
        let mut model = Model::new();
        let mut undo = UndoManager::new();
        undo.undoable_edit_happened(edit_for(&mut model, "a"));
        undo.undoable_edit_happened(edit_for(&mut model, "b"));
        undo.undo(&mut model);
        assert!(undo.can_redo());
        undo.undoable_edit_happened(edit_for(&mut model, "c"));
        assert!(!undo.can_redo());
        assert_eq!(undo.len(), 2);
    }

    #[test]
    fn insignificant_edits_are_walked_over() {
        let mut model = Model::new();
        let mut undo = UndoManager::new();
        let undone = Rc::new(RefCell::new(0usize));
        let counter = undone.clone();
        undo.add_listener(EventKind::Undo, move |_| *counter.borrow_mut() += 1);

        undo.undoable_edit_happened(edit_for(&mut model, "a"));
        undo.undoable_edit_happened(edit_for(&mut model, "b").with_significant(false));
        undo.undo(&mut model);

        assert_eq!(undo.index_of_next_add(), 0);
        assert_eq!(*undone.borrow(), 1);
    }

    #[test]
    fn clear_fires_clear() {
        let mut undo = UndoManager::new();
        let cleared = Rc::new(RefCell::new(false));
        let flag = cleared.clone();
        undo.add_listener(EventKind::Clear, move |_| *flag.borrow_mut() = true);
        undo.clear();
        assert!(*cleared.borrow());
        assert!(undo.is_empty());
    }
}
