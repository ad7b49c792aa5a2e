use crate::geometry::Geometry;
use crate::style::Style;
use serde_json::Value;

/// Handle of a cell inside a [`crate::CellStore`] arena.
///
/// Handles are never reused, so a cell detached from the document stays addressable and can be
/// re-inserted by undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub(crate) u32);

impl CellId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Vertex,
    Edge,
    /// Non-visual container: the root, layers and plain groups.
    Group,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub(crate) id: Option<String>,
    pub(crate) value: Value,
    pub(crate) geometry: Option<Geometry>,
    pub(crate) style: Style,
    pub(crate) kind: CellKind,
    pub(crate) connectable: bool,
    pub(crate) visible: bool,
    pub(crate) collapsed: bool,

    pub(crate) parent: Option<CellId>,
    pub(crate) source: Option<CellId>,
    pub(crate) target: Option<CellId>,
    pub(crate) children: Vec<CellId>,
    pub(crate) edges: Vec<CellId>,
}

impl Cell {
    pub fn new(kind: CellKind) -> Self {
        Self {
            id: None,
            value: Value::Null,
            geometry: None,
            style: Style::default(),
            kind,
            connectable: kind != CellKind::Group,
            visible: true,
            collapsed: false,
            parent: None,
            source: None,
            target: None,
            children: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn vertex(value: impl Into<Value>, geometry: Geometry, style: Style) -> Self {
        Self::new(CellKind::Vertex)
            .with_value(value)
            .with_geometry(geometry)
            .with_style(style)
    }

    /// An edge with a default relative geometry.
    pub fn edge(value: impl Into<Value>, style: Style) -> Self {
        Self::new(CellKind::Edge)
            .with_value(value)
            .with_geometry(Geometry::relative(0.0, 0.0))
            .with_style(style)
    }

    pub fn group() -> Self {
        Self::new(CellKind::Group)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_connectable(mut self, connectable: bool) -> Self {
        self.connectable = connectable;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn is_vertex(&self) -> bool {
        self.kind == CellKind::Vertex
    }

    pub fn is_edge(&self) -> bool {
        self.kind == CellKind::Edge
    }

    pub fn is_connectable(&self) -> bool {
        self.connectable
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn parent(&self) -> Option<CellId> {
        self.parent
    }

    pub fn terminal(&self, is_source: bool) -> Option<CellId> {
        if is_source { self.source } else { self.target }
    }

    pub fn children(&self) -> &[CellId] {
        &self.children
    }

    pub fn edges(&self) -> &[CellId] {
        &self.edges
    }

    /// The value rendered as label text. Strings are used as-is, `null` has no label.
    pub fn label(&self) -> Option<String> {
        match &self.value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// A copy carrying the attributes of this cell but none of its structural links.
    pub(crate) fn detached_copy(&self) -> Self {
        Self {
            id: None,
            value: self.value.clone(),
            geometry: self.geometry.clone(),
            style: self.style.clone(),
            kind: self.kind,
            connectable: self.connectable,
            visible: self.visible,
            collapsed: self.collapsed,
            parent: None,
            source: None,
            target: None,
            children: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub(crate) fn set_terminal_field(&mut self, terminal: Option<CellId>, is_source: bool) {
        if is_source {
            self.source = terminal;
        } else {
            self.target = terminal;
        }
    }
}
