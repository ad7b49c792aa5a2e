use cellgraph_model::{CellId, CellKind, CellStore, Geometry, Model, Style};

/// Read-only access to the document a [`crate::View`] projects.
///
/// Kept object-safe so the view can be driven from a [`CellStore`], a [`Model`], or a wrapper that
/// instruments access.
pub trait CellSource {
    fn root(&self) -> Option<CellId>;
    fn parent(&self, cell: CellId) -> Option<CellId>;
    fn children(&self, cell: CellId) -> &[CellId];
    fn edges(&self, cell: CellId) -> &[CellId];
    fn terminal(&self, edge: CellId, is_source: bool) -> Option<CellId>;
    fn geometry(&self, cell: CellId) -> Option<&Geometry>;
    fn style(&self, cell: CellId) -> Option<&Style>;
    fn kind(&self, cell: CellId) -> Option<CellKind>;
    fn is_visible(&self, cell: CellId) -> bool;
    fn is_collapsed(&self, cell: CellId) -> bool;
    fn label(&self, cell: CellId) -> Option<String>;
    fn cell_by_id(&self, id: &str) -> Option<CellId>;

    fn is_edge(&self, cell: CellId) -> bool {
        self.kind(cell) == Some(CellKind::Edge)
    }

    fn is_vertex(&self, cell: CellId) -> bool {
        self.kind(cell) == Some(CellKind::Vertex)
    }

    fn is_layer(&self, cell: CellId) -> bool {
        let root = self.root();
        root.is_some() && self.parent(cell) == root
    }
}

impl CellSource for CellStore {
    fn root(&self) -> Option<CellId> {
        CellStore::root(self)
    }

    fn parent(&self, cell: CellId) -> Option<CellId> {
        CellStore::parent(self, cell)
    }

    fn children(&self, cell: CellId) -> &[CellId] {
        CellStore::children(self, cell)
    }

    fn edges(&self, cell: CellId) -> &[CellId] {
        CellStore::edges(self, cell)
    }

    fn terminal(&self, edge: CellId, is_source: bool) -> Option<CellId> {
        CellStore::terminal(self, edge, is_source)
    }

    fn geometry(&self, cell: CellId) -> Option<&Geometry> {
        CellStore::geometry(self, cell)
    }

    fn style(&self, cell: CellId) -> Option<&Style> {
        CellStore::style(self, cell)
    }

    fn kind(&self, cell: CellId) -> Option<CellKind> {
        CellStore::kind(self, cell)
    }

    fn is_visible(&self, cell: CellId) -> bool {
        CellStore::is_visible(self, cell)
    }

    fn is_collapsed(&self, cell: CellId) -> bool {
        CellStore::is_collapsed(self, cell)
    }

    fn label(&self, cell: CellId) -> Option<String> {
        self.get(cell).and_then(|c| c.label())
    }

    fn cell_by_id(&self, id: &str) -> Option<CellId> {
        CellStore::cell_by_id(self, id)
    }
}

impl CellSource for Model {
    fn root(&self) -> Option<CellId> {
        self.store().root()
    }

    fn parent(&self, cell: CellId) -> Option<CellId> {
        self.store().parent(cell)
    }

    fn children(&self, cell: CellId) -> &[CellId] {
        self.store().children(cell)
    }

    fn edges(&self, cell: CellId) -> &[CellId] {
        self.store().edges(cell)
    }

    fn terminal(&self, edge: CellId, is_source: bool) -> Option<CellId> {
        self.store().terminal(edge, is_source)
    }

    fn geometry(&self, cell: CellId) -> Option<&Geometry> {
        self.store().geometry(cell)
    }

    fn style(&self, cell: CellId) -> Option<&Style> {
        self.store().style(cell)
    }

    fn kind(&self, cell: CellId) -> Option<CellKind> {
        self.store().kind(cell)
    }

    fn is_visible(&self, cell: CellId) -> bool {
        self.store().is_visible(cell)
    }

    fn is_collapsed(&self, cell: CellId) -> bool {
        self.store().is_collapsed(cell)
    }

    fn label(&self, cell: CellId) -> Option<String> {
        CellSource::label(self.store(), cell)
    }

    fn cell_by_id(&self, id: &str) -> Option<CellId> {
        self.store().cell_by_id(id)
    }
}
