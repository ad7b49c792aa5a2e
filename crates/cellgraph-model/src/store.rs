//! Arena-backed cell tree with terminal links and incident-edge indexes.
//!
//! The store is pure structural bookkeeping: it knows nothing about transactions or listeners.
//! Every mutation that should be undoable goes through [`crate::Model`] instead.

mod query;

use crate::cell::{Cell, CellId, CellKind};
use crate::error::{Error, Result};
use crate::geom::{Point, point};
use crate::geometry::Geometry;
use crate::path;
use crate::style::Style;
use rustc_hash::FxBuildHasher;
use serde_json::Value;

pub(crate) type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
pub(crate) type HashSet<K> = hashbrown::HashSet<K, FxBuildHasher>;

#[derive(Debug, Clone)]
pub struct CellStore {
    cells: Vec<Cell>,
    root: Option<CellId>,
    ids: HashMap<String, CellId>,
    next_id: u64,
    create_ids: bool,
}

impl Default for CellStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CellStore {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            root: None,
            ids: HashMap::default(),
            next_id: 0,
            create_ids: true,
        }
    }

    /// Whether cells entering the document without an id get a generated one.
    pub fn set_create_ids(&mut self, create_ids: bool) {
        self.create_ids = create_ids;
    }

    pub fn is_create_ids(&self) -> bool {
        self.create_ids
    }

    /// Allocates a detached cell. It becomes part of the document once inserted under the root.
    pub fn create(&mut self, cell: Cell) -> CellId {
        let id = CellId(self.cells.len() as u32);
        self.cells.push(cell);
        id
    }

    /// Number of allocated cells, attached or not.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, cell: CellId) -> Option<&Cell> {
        self.cells.get(cell.index())
    }

    pub fn try_get(&self, cell: CellId) -> Result<&Cell> {
        self.get(cell).ok_or(Error::UnknownCell(cell))
    }

    fn get_mut(&mut self, cell: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(cell.index())
    }

    fn has(&self, cell: CellId) -> bool {
        cell.index() < self.cells.len()
    }

    pub fn root(&self) -> Option<CellId> {
        self.root
    }

    pub fn parent(&self, cell: CellId) -> Option<CellId> {
        self.get(cell).and_then(|c| c.parent)
    }

    pub fn children(&self, cell: CellId) -> &[CellId] {
        self.get(cell).map(|c| c.children.as_slice()).unwrap_or(&[])
    }

    pub fn child_count(&self, cell: CellId) -> usize {
        self.children(cell).len()
    }

    pub fn child_at(&self, cell: CellId, index: usize) -> Option<CellId> {
        self.children(cell).get(index).copied()
    }

    pub fn index_of(&self, parent: CellId, child: CellId) -> Option<usize> {
        self.children(parent).iter().position(|c| *c == child)
    }

    /// Edges whose source or target is `cell`.
    pub fn edges(&self, cell: CellId) -> &[CellId] {
        self.get(cell).map(|c| c.edges.as_slice()).unwrap_or(&[])
    }

    pub fn edge_count(&self, cell: CellId) -> usize {
        self.edges(cell).len()
    }

    pub fn terminal(&self, edge: CellId, is_source: bool) -> Option<CellId> {
        self.get(edge).and_then(|c| c.terminal(is_source))
    }

    pub fn geometry(&self, cell: CellId) -> Option<&Geometry> {
        self.get(cell).and_then(|c| c.geometry.as_ref())
    }

    pub fn style(&self, cell: CellId) -> Option<&Style> {
        self.get(cell).map(|c| &c.style)
    }

    pub fn value(&self, cell: CellId) -> Option<&Value> {
        self.get(cell).map(|c| &c.value)
    }

    pub fn kind(&self, cell: CellId) -> Option<CellKind> {
        self.get(cell).map(|c| c.kind)
    }

    pub fn is_vertex(&self, cell: CellId) -> bool {
        self.kind(cell) == Some(CellKind::Vertex)
    }

    pub fn is_edge(&self, cell: CellId) -> bool {
        self.kind(cell) == Some(CellKind::Edge)
    }

    pub fn is_visible(&self, cell: CellId) -> bool {
        self.get(cell).is_some_and(|c| c.visible)
    }

    pub fn is_collapsed(&self, cell: CellId) -> bool {
        self.get(cell).is_some_and(|c| c.collapsed)
    }

    pub fn is_connectable(&self, cell: CellId) -> bool {
        self.get(cell).is_some_and(|c| c.connectable)
    }

    pub fn id_of(&self, cell: CellId) -> Option<&str> {
        self.get(cell).and_then(|c| c.id.as_deref())
    }

    /// Looks up a cell of the document by its string id.
    pub fn cell_by_id(&self, id: &str) -> Option<CellId> {
        self.ids.get(id).copied()
    }

    pub fn try_cell_by_id(&self, id: &str) -> Result<CellId> {
        self.cell_by_id(id).ok_or_else(|| Error::UnknownId { id: id.to_string() })
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Ancestors of `cell`, nearest first, excluding `cell` itself.
    pub fn ancestors(&self, cell: CellId) -> impl Iterator<Item = CellId> + '_ {
        let mut current = self.parent(cell);
        let mut steps = 0usize;
        std::iter::from_fn(move || {
            let c = current?;
            steps += 1;
            if steps > self.cells.len() {
                return None;
            }
            current = self.parent(c);
            Some(c)
        })
    }

    /// True if `parent` is `child` or one of its ancestors.
    pub fn is_ancestor(&self, parent: CellId, child: CellId) -> bool {
        parent == child || self.ancestors(child).any(|a| a == parent)
    }

    /// True if `cell` is reachable from the root.
    pub fn contains(&self, cell: CellId) -> bool {
        self.root.is_some_and(|root| self.is_ancestor(root, cell))
    }

    /// Direct children of the root.
    pub fn is_layer(&self, cell: CellId) -> bool {
        self.root.is_some() && self.parent(cell) == self.root
    }

    /// Top-most ancestor of `cell`, which is the root for cells in the document.
    pub fn top_ancestor(&self, cell: CellId) -> CellId {
        self.ancestors(cell).last().unwrap_or(cell)
    }

    /// Absolute offset of `cell`: the sum of the geometry origins of it and its non-edge ancestors.
    pub fn origin(&self, cell: Option<CellId>) -> Point {
        let Some(cell) = cell else {
            return point(0.0, 0.0);
        };
        let mut out = point(0.0, 0.0);
        for c in std::iter::once(cell).chain(self.ancestors(cell)) {
            if self.is_edge(c) {
                continue;
            }
            if let Some(geo) = self.geometry(c) {
                out.x += geo.x;
                out.y += geo.y;
            }
        }
        out
    }

    pub fn nearest_common_ancestor(&self, a: CellId, b: CellId) -> Option<CellId> {
        let mut path = path::create(self, b);
        if path.is_empty() {
            return None;
        }
        let mut cell = Some(a);
        let mut current = path::create(self, a);
        if path.len() < current.len() {
            cell = Some(b);
            std::mem::swap(&mut path, &mut current);
        }
        while let Some(c) = cell {
            let parent = self.parent(c);
            if parent.is_some()
                && path.starts_with(&current)
                && path[current.len()..].starts_with(path::SEPARATOR)
            {
                return Some(c);
            }
            current = path::parent_path(&current).to_string();
            cell = parent;
        }
        None
    }

    /// `cell` and all of its descendants in pre-order. Each cell is visited once even if the tree
    /// was made cyclic.
    pub fn descendants(&self, cell: CellId) -> Vec<CellId> {
        let mut out = Vec::new();
        if !self.has(cell) {
            return out;
        }
        let mut seen: HashSet<CellId> = HashSet::default();
        let mut stack = vec![cell];
        while let Some(c) = stack.pop() {
            if !seen.insert(c) {
                continue;
            }
            out.push(c);
            stack.extend(self.children(c).iter().rev().copied());
        }
        out
    }

    /// Inserts `child` into `parent` at `index` (clamped), detaching it from its previous parent.
    pub fn insert(&mut self, parent: CellId, child: CellId, index: usize) {
        if !self.has(parent) || !self.has(child) {
            return;
        }
        self.remove(child);
        let children = &mut self.cells[parent.index()].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.cells[child.index()].parent = Some(parent);
    }

    /// Detaches `child` from its parent, returning the previous parent and index. Connected edges
    /// are left alone.
    pub fn remove(&mut self, child: CellId) -> Option<(CellId, usize)> {
        let parent = self.parent(child)?;
        let index = self.index_of(parent, child);
        if let Some(index) = index {
            self.cells[parent.index()].children.remove(index);
        }
        self.cells[child.index()].parent = None;
        index.map(|i| (parent, i))
    }

    /// Connects `edge` to `terminal` (or disconnects it for `None`), returning the previous
    /// terminal on that side.
    pub fn set_terminal(
        &mut self,
        edge: CellId,
        terminal: Option<CellId>,
        is_source: bool,
    ) -> Option<CellId> {
        if !self.has(edge) {
            return None;
        }
        let previous = self.terminal(edge, is_source);
        match terminal {
            Some(t) if self.has(t) => self.insert_edge(t, edge, is_source),
            Some(_) => {}
            None => self.remove_from_terminal(edge, is_source),
        }
        previous
    }

    fn insert_edge(&mut self, terminal: CellId, edge: CellId, is_outgoing: bool) {
        self.remove_from_terminal(edge, is_outgoing);
        self.cells[edge.index()].set_terminal_field(Some(terminal), is_outgoing);
        let other = self.cells[edge.index()].terminal(!is_outgoing);
        let edges = &mut self.cells[terminal.index()].edges;
        if other != Some(terminal) || !edges.contains(&edge) {
            edges.push(edge);
        }
    }

    fn remove_edge(&mut self, terminal: CellId, edge: CellId, is_outgoing: bool) {
        if self.cells[edge.index()].terminal(!is_outgoing) != Some(terminal) {
            self.cells[terminal.index()].edges.retain(|e| *e != edge);
        }
        self.cells[edge.index()].set_terminal_field(None, is_outgoing);
    }

    fn remove_from_terminal(&mut self, edge: CellId, is_source: bool) {
        if let Some(t) = self.terminal(edge, is_source) {
            if self.has(t) {
                self.remove_edge(t, edge, is_source);
            } else {
                self.cells[edge.index()].set_terminal_field(None, is_source);
            }
        }
    }

    pub fn set_value(&mut self, cell: CellId, value: Value) -> Value {
        match self.get_mut(cell) {
            Some(c) => std::mem::replace(&mut c.value, value),
            None => Value::Null,
        }
    }

    pub fn set_style(&mut self, cell: CellId, style: Style) -> Style {
        match self.get_mut(cell) {
            Some(c) => std::mem::replace(&mut c.style, style),
            None => Style::default(),
        }
    }

    pub fn set_geometry(&mut self, cell: CellId, geometry: Option<Geometry>) -> Option<Geometry> {
        self.get_mut(cell)
            .and_then(|c| std::mem::replace(&mut c.geometry, geometry))
    }

    pub fn set_collapsed(&mut self, cell: CellId, collapsed: bool) -> bool {
        self.get_mut(cell)
            .is_some_and(|c| std::mem::replace(&mut c.collapsed, collapsed))
    }

    pub fn set_visible(&mut self, cell: CellId, visible: bool) -> bool {
        self.get_mut(cell)
            .is_some_and(|c| std::mem::replace(&mut c.visible, visible))
    }

    /// Replaces the root and rebuilds the id index from the new tree.
    pub fn set_root(&mut self, root: Option<CellId>) -> Option<CellId> {
        let previous = self.root;
        self.root = root.filter(|r| self.has(*r));
        self.next_id = 0;
        self.ids.clear();
        if let Some(root) = self.root {
            self.cell_added(root);
        }
        previous
    }

    /// Moves `cell` under `parent` (or out of the document for `None`) and keeps the id index in
    /// sync. Returns the previous parent.
    pub fn parent_changed(
        &mut self,
        cell: CellId,
        parent: Option<CellId>,
        index: usize,
    ) -> Option<CellId> {
        let previous = self.parent(cell);
        let was_contained = previous.is_some_and(|p| self.contains(p));
        match parent {
            Some(p) => {
                if Some(p) != previous || self.index_of(p, cell) != Some(index) {
                    self.insert(p, cell, index);
                }
            }
            None => {
                self.remove(cell);
            }
        }
        if parent.is_none() {
            self.cell_removed(cell);
        } else if !was_contained {
            self.cell_added(cell);
        }
        previous
    }

    /// Adds (`connect == true`) or removes the edges of the subtree from their terminals'
    /// incident lists. The edges' own terminal fields are kept either way.
    pub fn connect(&mut self, cell: CellId, connect: bool) {
        for c in self.descendants(cell) {
            let source = self.terminal(c, true);
            let target = self.terminal(c, false);
            for (terminal, is_source) in [(source, true), (target, false)] {
                let Some(t) = terminal.filter(|t| self.has(*t)) else {
                    continue;
                };
                if connect {
                    self.insert_edge(t, c, is_source);
                } else {
                    self.remove_edge(t, c, is_source);
                }
            }
            let entry = &mut self.cells[c.index()];
            entry.source = source;
            entry.target = target;
        }
    }

    pub fn create_id(&mut self) -> String {
        let id = self.next_id.to_string();
        self.next_id += 1;
        id
    }

    fn cell_added(&mut self, cell: CellId) {
        for c in self.descendants(cell) {
            self.register_id(c);
        }
    }

    fn register_id(&mut self, cell: CellId) {
        let mut id = match self.cells[cell.index()].id.clone() {
            None if self.create_ids => self.create_id(),
            None => return,
            Some(id) => id,
        };
        if self.ids.get(&id).is_some_and(|other| *other != cell) {
            while self.ids.contains_key(&id) {
                id = self.create_id();
            }
        }
        if let Ok(n) = id.parse::<u64>() {
            self.next_id = self.next_id.max(n.saturating_add(1));
        }
        self.ids.insert(id.clone(), cell);
        self.cells[cell.index()].id = Some(id);
    }

    fn cell_removed(&mut self, cell: CellId) {
        for c in self.descendants(cell) {
            let Some(id) = self.cells[c.index()].id.as_deref() else {
                continue;
            };
            if self.ids.get(id) == Some(&c) {
                self.ids.remove(id);
            }
        }
    }

    /// Deep-copies `cells` into new detached cells. Terminals pointing at other cloned cells are
    /// redirected to their clones; terminals outside the cloned set are dropped.
    pub fn clone_cells(&mut self, cells: &[CellId], include_children: bool) -> Vec<CellId> {
        let mut mapping: Vec<(CellId, CellId)> = Vec::new();
        let mut index: HashMap<CellId, CellId> = HashMap::default();
        let mut out = Vec::with_capacity(cells.len());
        for &cell in cells {
            if !self.has(cell) {
                continue;
            }
            out.push(self.clone_subtree(cell, include_children, &mut mapping, &mut index));
        }
        for &(original, clone) in &mapping {
            for is_source in [true, false] {
                let mapped = self
                    .terminal(original, is_source)
                    .and_then(|t| index.get(&t).copied());
                if let Some(t) = mapped {
                    self.insert_edge(t, clone, is_source);
                }
            }
        }
        out
    }

    fn clone_subtree(
        &mut self,
        cell: CellId,
        include_children: bool,
        mapping: &mut Vec<(CellId, CellId)>,
        index: &mut HashMap<CellId, CellId>,
    ) -> CellId {
        if let Some(existing) = index.get(&cell) {
            return *existing;
        }
        let copy = self.cells[cell.index()].detached_copy();
        let clone = self.create(copy);
        mapping.push((cell, clone));
        index.insert(cell, clone);
        if include_children {
            for child in self.children(cell).to_vec() {
                if index.contains_key(&child) {
                    continue;
                }
                let child_clone = self.clone_subtree(child, true, mapping, index);
                let n = self.child_count(clone);
                self.insert(clone, child_clone, n);
            }
        }
        clone
    }
}

#[cfg(test)]
mod tests;
