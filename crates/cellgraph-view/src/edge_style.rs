//! Edge routing functions.
//!
//! An edge style receives the edge being routed, the (port-resolved) terminal states and the
//! edge's waypoints in model coordinates, and returns the interior points of the route in view
//! coordinates. Terminal points are resolved by the view before and after the call.

use crate::state::CellState;
use cellgraph_model::geom::{Point, Vector, point};
use cellgraph_model::style::keys;

pub type EdgeStyleFn =
    fn(&RouteContext<'_>, Option<&CellState>, Option<&CellState>, &[Point]) -> Vec<Point>;

pub const LOOP: &str = "loop";
pub const DEFAULT_SEGMENT: f64 = 10.0;

/// The edge being routed together with the view transform.
#[derive(Debug, Clone, Copy)]
pub struct RouteContext<'a> {
    pub edge: &'a CellState,
    pub scale: f64,
    pub translate: Vector,
    /// Terminal points fixed by connection constraints or geometry fallbacks before routing.
    pub source_point: Option<Point>,
    pub target_point: Option<Point>,
}

impl RouteContext<'_> {
    /// Maps a waypoint from model to view coordinates, relative to the edge's origin.
    pub fn transform_control_point(&self, pt: Point) -> Point {
        let origin = self.edge.origin();
        point(
            self.scale * (pt.x + self.translate.x + origin.x),
            self.scale * (pt.y + self.translate.y + origin.y),
        )
    }
}

/// Waypoints mapped to view coordinates, in order.
pub fn pass_through(
    ctx: &RouteContext<'_>,
    _source: Option<&CellState>,
    _target: Option<&CellState>,
    points: &[Point],
) -> Vec<Point> {
    points
        .iter()
        .map(|p| ctx.transform_control_point(*p))
        .collect()
}

/// Self-loop around the source: two points beside the terminal, on the side named by `direction`
/// (west by default), `segment` apart.
pub fn loop_style(
    ctx: &RouteContext<'_>,
    source: Option<&CellState>,
    _target: Option<&CellState>,
    points: &[Point],
) -> Vec<Point> {
    let Some(source) = source else {
        return pass_through(ctx, None, None, points);
    };
    if ctx.source_point.is_some() && ctx.target_point.is_some() {
        return pass_through(ctx, None, None, points);
    }

    let style = ctx.edge.style();
    let b = source.bounds();
    let mut pt = points.first().map(|p| ctx.transform_control_point(*p));
    if pt.is_some_and(|p| b.contains(p)) {
        pt = None;
    }

    let seg = style.f64_or(keys::SEGMENT, DEFAULT_SEGMENT) * ctx.scale;
    let dir = style.get(keys::DIRECTION).unwrap_or("west");
    let c = source.center();

    let (mut x, mut dx, mut y, mut dy) = (0.0, 0.0, 0.0, 0.0);
    if dir == "north" || dir == "south" {
        x = c.x;
        dx = seg;
    } else {
        y = c.y;
        dy = seg;
    }

    match pt {
        Some(p) if p.x >= b.min_x() && p.x <= b.max_x() => {
            x = c.x;
            dx = (x - p.x).abs().max(dy);
            y = p.y;
            dy = 0.0;
        }
        Some(p) => {
            x = p.x;
            dy = (y - p.y).abs().max(dy);
        }
        None => match dir {
            "north" => y = b.min_y() - 2.0 * dx,
            "south" => y = b.max_y() + 2.0 * dx,
            "east" => x = b.min_x() - 2.0 * dy,
            _ => x = b.max_x() + 2.0 * dy,
        },
    }

    vec![point(x - dx, y - dy), point(x + dx, y + dy)]
}
