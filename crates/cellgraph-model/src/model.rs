//! Transactional facade over [`CellStore`].
//!
//! Every mutation is expressed as a [`Change`], executed immediately and recorded in the current
//! [`Edit`]. Transactions nest through [`Model::begin_update`] / [`Model::end_update`]; the
//! outermost `end_update` dispatches the collected edit to listeners exactly once.

use crate::cell::{Cell, CellId};
use crate::change::{AtomicChange, Change};
use crate::edit::Edit;
use crate::event::{EventKind, ListenerId, Listeners};
use crate::geometry::Geometry;
use crate::store::{CellStore, HashMap};
use crate::style::Style;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelOptions {
    /// Re-parent edges to the nearest common ancestor of their terminals after structural changes.
    pub maintain_edge_parent: bool,
    /// Generate ids for cells that enter the document without one.
    pub create_ids: bool,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            maintain_edge_parent: true,
            create_ids: true,
        }
    }
}

/// Notifications fired by [`Model`].
#[derive(Debug, Clone, Copy)]
pub enum ModelEvent<'a> {
    Execute { change: &'a AtomicChange },
    BeginUpdate,
    EndUpdate { edit: &'a Edit },
    BeforeUndo { edit: &'a Edit },
    Change { edit: &'a Edit },
    Undo { edit: &'a Edit },
}

impl ModelEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            ModelEvent::Execute { .. } => EventKind::Execute,
            ModelEvent::BeginUpdate => EventKind::BeginUpdate,
            ModelEvent::EndUpdate { .. } => EventKind::EndUpdate,
            ModelEvent::BeforeUndo { .. } => EventKind::BeforeUndo,
            ModelEvent::Change { .. } => EventKind::Change,
            ModelEvent::Undo { .. } => EventKind::Undo,
        }
    }

    pub fn edit(&self) -> Option<&Edit> {
        match self {
            ModelEvent::EndUpdate { edit }
            | ModelEvent::BeforeUndo { edit }
            | ModelEvent::Change { edit }
            | ModelEvent::Undo { edit } => Some(edit),
            ModelEvent::Execute { .. } | ModelEvent::BeginUpdate => None,
        }
    }
}

pub type ModelListener = dyn FnMut(&mut Model, &ModelEvent<'_>);

#[derive(Debug)]
pub struct Model {
    store: CellStore,
    current_edit: Edit,
    update_level: usize,
    ending_update: bool,
    options: ModelOptions,
    listeners: Listeners<ModelListener>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// A model with a default root holding one layer.
    pub fn new() -> Self {
        Self::with_options(ModelOptions::default())
    }

    pub fn with_options(options: ModelOptions) -> Self {
        let mut store = CellStore::new();
        store.set_create_ids(options.create_ids);
        let mut model = Self {
            store,
            current_edit: Edit::new(),
            update_level: 0,
            ending_update: false,
            options,
            listeners: Listeners::default(),
        };
        model.clear();
        model
    }

    pub fn store(&self) -> &CellStore {
        &self.store
    }

    pub fn options(&self) -> ModelOptions {
        self.options
    }

    pub fn set_maintain_edge_parent(&mut self, value: bool) {
        self.options.maintain_edge_parent = value;
    }

    pub fn set_create_ids(&mut self, value: bool) {
        self.options.create_ids = value;
        self.store.set_create_ids(value);
    }

    pub fn root(&self) -> Option<CellId> {
        self.store.root()
    }

    pub fn get(&self, cell: CellId) -> Option<&Cell> {
        self.store.get(cell)
    }

    pub fn parent(&self, cell: CellId) -> Option<CellId> {
        self.store.parent(cell)
    }

    pub fn children(&self, cell: CellId) -> &[CellId] {
        self.store.children(cell)
    }

    pub fn terminal(&self, edge: CellId, is_source: bool) -> Option<CellId> {
        self.store.terminal(edge, is_source)
    }

    pub fn geometry(&self, cell: CellId) -> Option<&Geometry> {
        self.store.geometry(cell)
    }

    pub fn style(&self, cell: CellId) -> Option<&Style> {
        self.store.style(cell)
    }

    pub fn value(&self, cell: CellId) -> Option<&Value> {
        self.store.value(cell)
    }

    pub fn cell_by_id(&self, id: &str) -> Option<CellId> {
        self.store.cell_by_id(id)
    }

    /// The edit collecting changes of the transaction in progress.
    pub fn current_edit(&self) -> &Edit {
        &self.current_edit
    }

    pub fn update_level(&self) -> usize {
        self.update_level
    }

    pub fn add_listener<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&mut Model, &ModelEvent<'_>) + 'static,
    {
        let callback: Rc<RefCell<ModelListener>> = Rc::new(RefCell::new(listener));
        self.listeners.add(kind, callback)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn fire(&mut self, event: &ModelEvent<'_>) {
        for listener in self.listeners.matching(event.kind()) {
            let Ok(mut callback) = listener.try_borrow_mut() else {
                continue;
            };
            (&mut *callback)(self, event);
        }
    }

    /// Fires an event carrying the current edit. Changes made by listeners are appended to it.
    fn fire_with_current_edit(&mut self, kind: EventKind) {
        let edit = std::mem::take(&mut self.current_edit);
        let event = match kind {
            EventKind::BeforeUndo => ModelEvent::BeforeUndo { edit: &edit },
            _ => ModelEvent::EndUpdate { edit: &edit },
        };
        self.fire(&event);
        let added = std::mem::replace(&mut self.current_edit, edit);
        self.current_edit.append(added);
    }

    /// Allocates a detached cell. It joins the document through [`Model::add`].
    pub fn create_cell(&mut self, cell: Cell) -> CellId {
        self.store.create(cell)
    }

    /// Allocates a root group holding one layer, without installing it.
    pub fn create_root(&mut self) -> CellId {
        let root = self.store.create(Cell::group());
        let layer = self.store.create(Cell::group());
        self.store.insert(root, layer, 0);
        root
    }

    /// Replaces the document with an empty root and layer.
    pub fn clear(&mut self) {
        let root = self.create_root();
        self.set_root(Some(root));
    }

    /// Copies of `cells` as new detached cells; see [`CellStore::clone_cells`].
    pub fn clone_cells(&mut self, cells: &[CellId], include_children: bool) -> Vec<CellId> {
        self.store.clone_cells(cells, include_children)
    }

    /// Executes `change`, records it in the current edit and fires [`EventKind::Execute`].
    pub fn execute(&mut self, change: Change) {
        let record = AtomicChange::execute(change, &mut self.store);
        tracing::trace!(change = record.change().name(), "executed change");
        self.begin_update();
        let snapshot = self
            .listeners
            .has(EventKind::Execute)
            .then(|| record.clone());
        self.current_edit.push(record);
        if let Some(record) = snapshot {
            self.fire(&ModelEvent::Execute { change: &record });
        }
        self.end_update();
    }

    pub fn begin_update(&mut self) {
        self.update_level += 1;
        self.fire(&ModelEvent::BeginUpdate);
    }

    /// Closes one transaction level. The call that closes the outermost level fires
    /// [`EventKind::BeforeUndo`], swaps in a fresh edit, and dispatches the closed one through
    /// [`EventKind::Change`] and [`EventKind::Undo`].
    pub fn end_update(&mut self) {
        self.update_level = self.update_level.saturating_sub(1);
        if self.ending_update {
            self.fire_with_current_edit(EventKind::EndUpdate);
            return;
        }
        self.ending_update = self.update_level == 0;
        self.fire_with_current_edit(EventKind::EndUpdate);
        if self.ending_update && !self.current_edit.is_empty() {
            self.fire_with_current_edit(EventKind::BeforeUndo);
            let edit = std::mem::take(&mut self.current_edit);
            tracing::debug!(changes = edit.len(), "dispatching edit");
            self.fire(&ModelEvent::Change { edit: &edit });
            self.fire(&ModelEvent::Undo { edit: &edit });
        }
        self.ending_update = false;
    }

    /// Opens a transaction that is closed when the returned guard is dropped.
    pub fn transaction(&mut self) -> Transaction<'_> {
        self.begin_update();
        Transaction { model: self }
    }

    /// Runs `f` inside one transaction.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut Model) -> R) -> R {
        let mut tx = self.transaction();
        f(&mut tx)
    }

    /// Reverts a dispatched edit and notifies [`EventKind::Change`] listeners.
    pub fn undo_edit(&mut self, edit: &mut Edit) {
        edit.undo(&mut self.store);
        self.fire(&ModelEvent::Change { edit });
    }

    /// Re-applies a reverted edit and notifies [`EventKind::Change`] listeners.
    pub fn redo_edit(&mut self, edit: &mut Edit) {
        edit.redo(&mut self.store);
        self.fire(&ModelEvent::Change { edit });
    }

    pub fn set_root(&mut self, root: Option<CellId>) -> Option<CellId> {
        self.execute(Change::Root { root });
        root
    }

    /// Inserts `child` into `parent` at `index`, or appends it for `None`.
    pub fn add(&mut self, parent: CellId, child: CellId, index: Option<usize>) -> CellId {
        if child == parent || self.store.get(parent).is_none() || self.store.get(child).is_none() {
            return child;
        }
        let index = index.unwrap_or_else(|| self.store.child_count(parent));
        let parent_changed = self.store.parent(child) != Some(parent);
        self.update(|model| {
            model.execute(Change::Child {
                child,
                parent: Some(parent),
                index,
            });
            if model.options.maintain_edge_parent && parent_changed {
                model.update_edge_parents(child);
            }
        });
        child
    }

    /// Removes `cell` and its descendants from the document. Edges connected to the removed cells
    /// stay where they are and keep referencing them.
    pub fn remove(&mut self, cell: CellId) -> CellId {
        if Some(cell) == self.store.root() {
            self.set_root(None);
        } else if self.store.parent(cell).is_some() {
            self.execute(Change::Child {
                child: cell,
                parent: None,
                index: 0,
            });
        }
        cell
    }

    pub fn set_terminal(
        &mut self,
        edge: CellId,
        terminal: Option<CellId>,
        is_source: bool,
    ) -> Option<CellId> {
        let changed = terminal != self.store.terminal(edge, is_source);
        self.update(|model| {
            model.execute(Change::Terminal {
                edge,
                terminal,
                source: is_source,
            });
            if model.options.maintain_edge_parent && changed {
                if let Some(root) = model.store.root() {
                    model.update_edge_parent(edge, root);
                }
            }
        });
        terminal
    }

    pub fn set_terminals(&mut self, edge: CellId, source: Option<CellId>, target: Option<CellId>) {
        self.update(|model| {
            model.set_terminal(edge, source, true);
            model.set_terminal(edge, target, false);
        });
    }

    pub fn set_value(&mut self, cell: CellId, value: impl Into<Value>) {
        self.execute(Change::Value {
            cell,
            value: value.into(),
        });
    }

    pub fn set_style(&mut self, cell: CellId, style: Style) {
        if self.store.style(cell) != Some(&style) {
            self.execute(Change::Style { cell, style });
        }
    }

    pub fn set_geometry(&mut self, cell: CellId, geometry: Geometry) {
        if self.store.geometry(cell) != Some(&geometry) {
            self.execute(Change::Geometry {
                cell,
                geometry: Some(geometry),
            });
        }
    }

    pub fn set_collapsed(&mut self, cell: CellId, collapsed: bool) {
        if self.store.is_collapsed(cell) != collapsed {
            self.execute(Change::Collapsed { cell, collapsed });
        }
    }

    pub fn set_visible(&mut self, cell: CellId, visible: bool) {
        if self.store.is_visible(cell) != visible {
            self.execute(Change::Visible { cell, visible });
        }
    }

    /// Re-parents every edge connected to `cell` or its descendants.
    pub fn update_edge_parents(&mut self, cell: CellId) {
        let root = self.store.top_ancestor(cell);
        for c in self.store.descendants(cell).into_iter().rev() {
            for edge in self.store.edges(c).to_vec() {
                if self.store.is_ancestor(root, edge) {
                    self.update_edge_parent(edge, root);
                }
            }
        }
    }

    /// Moves `edge` under the nearest common ancestor of its terminals, keeping its absolute
    /// position. Edges are never moved into a layer they are not already part of.
    pub fn update_edge_parent(&mut self, edge: CellId, root: CellId) {
        let source = self.effective_terminal(edge, true);
        let target = self.effective_terminal(edge, false);
        let (Some(source), Some(target)) = (source, target) else {
            return;
        };
        if !self.store.is_ancestor(root, source) || !self.store.is_ancestor(root, target) {
            return;
        }
        let cell = if source == target {
            self.store.parent(source)
        } else {
            self.store.nearest_common_ancestor(source, target)
        };
        let Some(cell) = cell else {
            return;
        };
        if (self.store.parent(cell) == Some(root) && !self.store.is_ancestor(cell, edge))
            || self.store.parent(edge) == Some(cell)
        {
            return;
        }
        if let Some(mut geo) = self.store.geometry(edge).cloned() {
            let from = self.store.origin(self.store.parent(edge));
            let to = self.store.origin(Some(cell));
            geo.translate(from.x - to.x, from.y - to.y);
            self.set_geometry(edge, geo);
        }
        self.add(cell, edge, None);
    }

    /// The terminal of `edge`, skipping relative-geometry cells (such as ports) up to their
    /// first non-relative ancestor.
    fn effective_terminal(&self, edge: CellId, is_source: bool) -> Option<CellId> {
        let mut terminal = self.store.terminal(edge, is_source);
        for _ in 0..=self.store.len() {
            let Some(t) = terminal else {
                break;
            };
            let relative = self.store.geometry(t).is_some_and(|g| g.relative);
            if self.store.is_edge(t) || !relative {
                break;
            }
            terminal = self.store.parent(t);
        }
        terminal
    }

    /// Copies the children of `from_parent` in another store under `to_parent`, inside one
    /// transaction. Cells whose id already exists here are reused instead of copied (edges only
    /// when `clone_all_edges` is false). Terminals are remapped onto the merged cells.
    pub fn merge_children(
        &mut self,
        from: &CellStore,
        from_parent: CellId,
        to_parent: CellId,
        clone_all_edges: bool,
    ) {
        let mut mapping: Vec<(CellId, CellId)> = Vec::new();
        let mut index: HashMap<CellId, CellId> = HashMap::default();
        self.update(|model| {
            model.merge_children_into(
                from,
                from_parent,
                to_parent,
                clone_all_edges,
                &mut mapping,
                &mut index,
            );
            for &(original, merged) in &mapping {
                for is_source in [true, false] {
                    let terminal = from
                        .terminal(original, is_source)
                        .and_then(|t| index.get(&t).copied());
                    if let Some(t) = terminal {
                        model.set_terminal(merged, Some(t), is_source);
                    }
                }
            }
        });
    }

    fn merge_children_into(
        &mut self,
        from: &CellStore,
        from_parent: CellId,
        to_parent: CellId,
        clone_all_edges: bool,
        mapping: &mut Vec<(CellId, CellId)>,
        index: &mut HashMap<CellId, CellId>,
    ) {
        for &child in from.children(from_parent) {
            let Some(cell) = from.get(child) else {
                continue;
            };
            if index.contains_key(&child) {
                continue;
            }
            let existing = cell
                .id()
                .filter(|_| !cell.is_edge() || !clone_all_edges)
                .and_then(|id| self.store.cell_by_id(id));
            let merged = match existing {
                Some(existing) => existing,
                None => {
                    let mut copy = cell.detached_copy();
                    copy.id = cell.id.clone();
                    let created = self.store.create(copy);
                    self.add(to_parent, created, None)
                }
            };
            mapping.push((child, merged));
            index.insert(child, merged);
            self.merge_children_into(from, child, merged, clone_all_edges, mapping, index);
        }
    }
}

/// Guard returned by [`Model::transaction`]; closes the transaction on drop.
pub struct Transaction<'a> {
    model: &'a mut Model,
}

impl Deref for Transaction<'_> {
    type Target = Model;

    fn deref(&self) -> &Model {
        self.model
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut Model {
        self.model
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.model.end_update();
    }
}
