use crate::{GraphConfig, Result};
use cellgraph_model::undo::track;
use cellgraph_model::{Cell, CellId, EventKind, Geometry, Model, Rect, Style, UndoManager};
use cellgraph_view::{CellState, View};
use rustc_hash::FxHashSet;
use serde_json::Value;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// A model, its view and its undo history wired together.
///
/// Every edit the model dispatches invalidates the affected view states and is recorded by the
/// undo manager, including edits replayed by [`Graph::undo`] and [`Graph::redo`]. Geometry queries
/// validate the view first.
#[derive(Debug)]
pub struct Graph {
    model: Model,
    view: Rc<RefCell<View>>,
    undo: Rc<RefCell<UndoManager>>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self::with_view(config, |view| view)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::with_config(GraphConfig::from_json(json)?))
    }

    /// Like [`Graph::with_config`], letting `customize` install a registry, style resolver or text
    /// measurer on the view before it is wired up.
    pub fn with_view(config: GraphConfig, customize: impl FnOnce(View) -> View) -> Self {
        let mut model = Model::with_options(config.model);
        let view = Rc::new(RefCell::new(customize(View::with_options(config.view))));
        let undo = Rc::new(RefCell::new(UndoManager::with_options(config.undo)));

        let sink = view.clone();
        model.add_listener(EventKind::Change, move |model, event| {
            let Some(edit) = event.edit() else {
                return;
            };
            if let Ok(mut view) = sink.try_borrow_mut() {
                view.process_edit(model.store(), edit);
            }
        });
        track(&mut model, undo.clone());

        Self { model, view, undo }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Direct access to the model. Edits made through it still reach the view and the history.
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    /// The view as last validated. Use [`Graph::validate`] first for current geometry.
    pub fn view(&self) -> Ref<'_, View> {
        self.view.borrow()
    }

    pub fn undo_manager(&self) -> Ref<'_, UndoManager> {
        self.undo.borrow()
    }

    /// The first layer, where cells go when no parent is given.
    pub fn default_parent(&self) -> Option<CellId> {
        let root = self.model.root()?;
        self.model.children(root).first().copied()
    }

    pub fn cell(&self, id: &str) -> Result<CellId> {
        Ok(self.model.store().try_cell_by_id(id)?)
    }

    /// Runs `f` as one transaction, producing a single undoable edit.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut Model) -> R) -> R {
        self.model.update(f)
    }

    pub fn insert_vertex(
        &mut self,
        parent: Option<CellId>,
        id: Option<&str>,
        value: impl Into<Value>,
        geometry: Geometry,
        style: &str,
    ) -> Option<CellId> {
        let parent = parent.or_else(|| self.default_parent())?;
        let mut cell = Cell::vertex(value, geometry, Style::parse(style));
        if let Some(id) = id {
            cell = cell.with_id(id);
        }
        let vertex = self.model.create_cell(cell);
        Some(self.model.add(parent, vertex, None))
    }

    pub fn insert_edge(
        &mut self,
        parent: Option<CellId>,
        id: Option<&str>,
        value: impl Into<Value>,
        source: Option<CellId>,
        target: Option<CellId>,
        style: &str,
    ) -> Option<CellId> {
        let parent = parent.or_else(|| self.default_parent())?;
        let mut cell = Cell::edge(value, Style::parse(style));
        if let Some(id) = id {
            cell = cell.with_id(id);
        }
        let edge = self.model.create_cell(cell);
        self.model.update(|model| {
            model.add(parent, edge, None);
            model.set_terminals(edge, source, target);
        });
        Some(edge)
    }

    /// Removes `cells` in one transaction. With `include_edges`, edges connected to the removed
    /// subtrees are removed as well.
    pub fn remove_cells(&mut self, cells: &[CellId], include_edges: bool) {
        let store = self.model.store();
        let mut targets: Vec<CellId> = Vec::new();
        for &cell in cells {
            if include_edges {
                for c in store.descendants(cell) {
                    targets.extend(store.edges(c).iter().copied());
                }
            }
            targets.push(cell);
        }
        let mut seen = FxHashSet::default();
        targets.retain(|c| seen.insert(*c));
        tracing::debug!(cells = targets.len(), "removing cells");

        self.model.update(|model| {
            for cell in targets {
                model.remove(cell);
            }
        });
    }

    /// Translates the geometry of `cells` by `(dx, dy)` in one transaction.
    pub fn move_cells(&mut self, cells: &[CellId], dx: f64, dy: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.model.update(|model| {
            for &cell in cells {
                if let Some(mut geo) = model.geometry(cell).cloned() {
                    geo.translate(dx, dy);
                    model.set_geometry(cell, geo);
                }
            }
        });
    }

    pub fn set_cell_style(&mut self, cell: CellId, style: &str) {
        self.model.set_style(cell, Style::parse(style));
    }

    pub fn can_undo(&self) -> bool {
        self.undo.borrow().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.borrow().can_redo()
    }

    pub fn undo(&mut self) {
        self.undo.borrow_mut().undo(&mut self.model);
    }

    pub fn redo(&mut self) {
        self.undo.borrow_mut().redo(&mut self.model);
    }

    pub fn validate(&mut self) {
        self.view.borrow_mut().validate(self.model.store());
    }

    /// The validated state of `cell`, or `None` when it is not displayed.
    pub fn state(&mut self, cell: CellId) -> Option<CellState> {
        self.validate();
        self.view.borrow().state(cell).cloned()
    }

    pub fn graph_bounds(&mut self) -> Rect {
        self.validate();
        self.view.borrow().graph_bounds()
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.view.borrow_mut().set_scale(self.model.store(), scale);
    }

    pub fn set_translate(&mut self, dx: f64, dy: f64) {
        self.view.borrow_mut().set_translate(self.model.store(), dx, dy);
    }

    /// Displays the subtree of `cell` only, or the whole document for `None`.
    pub fn set_current_root(&mut self, cell: Option<CellId>) -> Option<CellId> {
        self.view
            .borrow_mut()
            .set_current_root(self.model.store(), cell)
    }
}
