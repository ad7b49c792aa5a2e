use cellgraph_model::geom::{point, rect};
use cellgraph_model::{CellId, Point, Rect, Style};

/// Cached absolute geometry of one cell, in view coordinates (scaled and translated).
#[derive(Debug, Clone, PartialEq)]
pub struct CellState {
    pub(crate) cell: CellId,
    pub(crate) style: Style,
    pub(crate) invalid: bool,
    /// Unscaled position of the cell relative to the current root.
    pub(crate) origin: Point,
    /// Label anchor for vertices, arc-length point for edges.
    pub(crate) absolute_offset: Point,
    pub(crate) bounds: Rect,
    pub(crate) absolute_points: Vec<Point>,
    pub(crate) terminal_distance: f64,
    pub(crate) length: f64,
    pub(crate) segments: Vec<f64>,
    pub(crate) label: Option<String>,
    pub(crate) label_bounds: Option<Rect>,
    pub(crate) bounding_box: Option<Rect>,
    pub(crate) visible_source: Option<CellId>,
    pub(crate) visible_target: Option<CellId>,
}

impl CellState {
    pub(crate) fn new(cell: CellId, style: Style) -> Self {
        Self {
            cell,
            style,
            invalid: true,
            origin: point(0.0, 0.0),
            absolute_offset: point(0.0, 0.0),
            bounds: rect(0.0, 0.0, 0.0, 0.0),
            absolute_points: Vec::new(),
            terminal_distance: 0.0,
            length: 0.0,
            segments: Vec::new(),
            label: None,
            label_bounds: None,
            bounding_box: None,
            visible_source: None,
            visible_target: None,
        }
    }

    pub fn cell(&self) -> CellId {
        self.cell
    }

    /// Resolved style, base styles merged with the cell's own.
    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn absolute_offset(&self) -> Point {
        self.absolute_offset
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn x(&self) -> f64 {
        self.bounds.origin.x
    }

    pub fn y(&self) -> f64 {
        self.bounds.origin.y
    }

    pub fn width(&self) -> f64 {
        self.bounds.size.width
    }

    pub fn height(&self) -> f64 {
        self.bounds.size.height
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Routed polyline of an edge, terminal points included. Empty for vertices.
    pub fn absolute_points(&self) -> &[Point] {
        &self.absolute_points
    }

    /// Straight-line distance between the two terminal points.
    pub fn terminal_distance(&self) -> f64 {
        self.terminal_distance
    }

    /// Total length of the routed polyline.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn segments(&self) -> &[f64] {
        &self.segments
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn label_bounds(&self) -> Option<Rect> {
        self.label_bounds
    }

    pub fn bounding_box(&self) -> Option<Rect> {
        self.bounding_box
    }

    /// State of the terminal the edge is drawn to, after skipping hidden and collapsed ancestors.
    pub fn visible_terminal(&self, is_source: bool) -> Option<CellId> {
        if is_source {
            self.visible_source
        } else {
            self.visible_target
        }
    }

    /// `bounds` grown by `border` on every side.
    pub fn perimeter_bounds(&self, border: f64) -> Rect {
        cellgraph_model::geom::grow(&self.bounds, border)
    }

    pub(crate) fn reset(&mut self) {
        self.origin = point(0.0, 0.0);
        self.absolute_offset = point(0.0, 0.0);
        self.length = 0.0;
    }
}
