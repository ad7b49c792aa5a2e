use crate::geom::{Point, Rect, point, rect};

/// Position and size of a cell, in the coordinate space of its parent.
///
/// For cells with `relative == true`, `x` and `y` are not coordinates:
/// - children of vertices use them as fractions of the parent size;
/// - edges and children of edges use `x` in `[-1, 1]` as a position along the routed polyline and
///   `y` as a perpendicular offset from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub relative: bool,
    /// User waypoints of an edge, in model coordinates.
    pub points: Vec<Point>,
    pub offset: Option<Point>,
    pub source_point: Option<Point>,
    pub target_point: Option<Point>,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    /// A relative geometry, as used by edges and edge labels.
    pub fn relative(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            relative: true,
            ..Default::default()
        }
    }

    pub fn with_points(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.points = points.into_iter().collect();
        self
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_terminal_point(mut self, p: Point, is_source: bool) -> Self {
        self.set_terminal_point(Some(p), is_source);
        self
    }

    pub fn bounds(&self) -> Rect {
        rect(self.x, self.y, self.width, self.height)
    }

    pub fn terminal_point(&self, is_source: bool) -> Option<Point> {
        if is_source {
            self.source_point
        } else {
            self.target_point
        }
    }

    pub fn set_terminal_point(&mut self, p: Option<Point>, is_source: bool) {
        if is_source {
            self.source_point = p;
        } else {
            self.target_point = p;
        }
    }

    /// Moves the geometry by `(dx, dy)`.
    ///
    /// Relative geometries keep their `x`/`y`; waypoints and terminal points always move.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        if !self.relative {
            self.x += dx;
            self.y += dy;
        }
        for p in [&mut self.source_point, &mut self.target_point]
            .into_iter()
            .flatten()
        {
            *p = point(p.x + dx, p.y + dy);
        }
        for p in &mut self.points {
            *p = point(p.x + dx, p.y + dy);
        }
    }
}
