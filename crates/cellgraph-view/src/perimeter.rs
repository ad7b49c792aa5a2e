//! Shape perimeters used to attach floating edge ends.
//!
//! A perimeter function receives the (spacing-grown) bounds of the terminal, its state, the next
//! point of the edge and the orthogonal flag, and returns where the edge meets the outline. In
//! orthogonal mode the result is snapped so that the final edge segment stays axis-aligned whenever
//! `next` lies within the shape's horizontal or vertical extent.

use crate::state::CellState;
use cellgraph_model::geom::{Point, Rect, is_finite_point, point, segment_intersection};

pub type PerimeterFn = fn(Rect, Option<&CellState>, Point, bool) -> Point;

pub const RECTANGLE: &str = "rectanglePerimeter";
pub const ELLIPSE: &str = "ellipsePerimeter";
pub const RHOMBUS: &str = "rhombusPerimeter";
pub const TRIANGLE: &str = "trianglePerimeter";
pub const HEXAGON: &str = "hexagonPerimeter";

pub const DIRECTION_NORTH: &str = "north";
pub const DIRECTION_SOUTH: &str = "south";
pub const DIRECTION_EAST: &str = "east";
pub const DIRECTION_WEST: &str = "west";

fn direction(vertex: Option<&CellState>) -> &str {
    vertex
        .and_then(|s| s.style().get(cellgraph_model::style::keys::DIRECTION))
        .unwrap_or(DIRECTION_EAST)
}

pub fn rectangle(bounds: Rect, _vertex: Option<&CellState>, next: Point, orthogonal: bool) -> Point {
    let c = bounds.center();
    let dx = next.x - c.x;
    let dy = next.y - c.y;
    if dx == 0.0 && dy == 0.0 {
        return c;
    }

    let mut w = bounds.width() / 2.0;
    let mut h = bounds.height() / 2.0;
    let mut p = if dy.abs() * w > dx.abs() * h {
        if dy < 0.0 {
            h = -h;
        }
        point(c.x + h * dx / dy, c.y + h)
    } else {
        if dx < 0.0 {
            w = -w;
        }
        point(c.x + w, c.y + w * dy / dx)
    };

    if orthogonal {
        let (min_x, max_x) = (bounds.min_x(), bounds.max_x());
        let (min_y, max_y) = (bounds.min_y(), bounds.max_y());
        if next.x >= min_x && next.x <= max_x {
            p.x = next.x;
        } else if next.y >= min_y && next.y <= max_y {
            p.y = next.y;
        }
        if next.x < min_x {
            p.x = min_x;
        } else if next.x > max_x {
            p.x = max_x;
        }
        if next.y < min_y {
            p.y = min_y;
        } else if next.y > max_y {
            p.y = max_y;
        }
    }
    p
}

pub fn ellipse(bounds: Rect, _vertex: Option<&CellState>, next: Point, orthogonal: bool) -> Point {
    let x = bounds.min_x();
    let y = bounds.min_y();
    let a = bounds.width() / 2.0;
    let b = bounds.height() / 2.0;
    let cx = x + a;
    let cy = y + b;
    let px = next.x;
    let py = next.y;

    let dx = px - cx;
    let dy = py - cy;
    if dx == 0.0 && dy != 0.0 {
        return point(cx, cy + b * dy.signum());
    }
    if dx == 0.0 && dy == 0.0 {
        return point(cx, cy);
    }

    if orthogonal {
        if py >= y && py <= y + bounds.height() {
            let ty = py - cy;
            let mut tx = (a * a * (1.0 - (ty * ty) / (b * b))).sqrt();
            if tx.is_nan() {
                tx = 0.0;
            }
            if px <= x {
                tx = -tx;
            }
            return point(cx + tx, py);
        }
        if px >= x && px <= x + bounds.width() {
            let tx = px - cx;
            let mut ty = (b * b * (1.0 - (tx * tx) / (a * a))).sqrt();
            if ty.is_nan() {
                ty = 0.0;
            }
            if py <= y {
                ty = -ty;
            }
            return point(px, cy + ty);
        }
    }

    // Line through `next` and the centre, y = d * x + h, intersected with the ellipse.
    let d = dy / dx;
    let h = cy - d * cx;
    let e = a * a * d * d + b * b;
    let f = -2.0 * cx * e;
    let g = a * a * d * d * cx * cx + b * b * cx * cx - a * a * b * b;
    let det = (f * f - 4.0 * e * g).sqrt();
    if !det.is_finite() || e == 0.0 {
        return point(cx, cy);
    }

    let x1 = (-f + det) / (2.0 * e);
    let x2 = (-f - det) / (2.0 * e);
    let p1 = point(x1, d * x1 + h);
    let p2 = point(x2, d * x2 + h);
    if (p1 - next).length() < (p2 - next).length() {
        p1
    } else {
        p2
    }
}

pub fn rhombus(bounds: Rect, _vertex: Option<&CellState>, next: Point, orthogonal: bool) -> Point {
    let x = bounds.min_x();
    let y = bounds.min_y();
    let w = bounds.width();
    let h = bounds.height();
    let cx = x + w / 2.0;
    let cy = y + h / 2.0;
    let px = next.x;
    let py = next.y;

    // Corners.
    if cx == px {
        return if cy > py { point(cx, y) } else { point(cx, y + h) };
    }
    if cy == py {
        return if cx > px { point(x, cy) } else { point(x + w, cy) };
    }

    let mut tx = cx;
    let mut ty = cy;
    if orthogonal {
        if px >= x && px <= x + w {
            tx = px;
        } else if py >= y && py <= y + h {
            ty = py;
        }
    }

    let (a, b) = if px < cx {
        if py < cy {
            (point(cx, y), point(x, cy))
        } else {
            (point(cx, y + h), point(x, cy))
        }
    } else if py < cy {
        (point(cx, y), point(x + w, cy))
    } else {
        (point(cx, y + h), point(x + w, cy))
    };
    segment_intersection(next, point(tx, ty), a, b).unwrap_or(point(cx, cy))
}

pub fn triangle(bounds: Rect, vertex: Option<&CellState>, next: Point, orthogonal: bool) -> Point {
    let direction = direction(vertex);
    let vertical = direction == DIRECTION_NORTH || direction == DIRECTION_SOUTH;

    let x = bounds.min_x();
    let y = bounds.min_y();
    let w = bounds.width();
    let h = bounds.height();
    let mut cx = x + w / 2.0;
    let mut cy = y + h / 2.0;

    let (start, corner, end) = match direction {
        DIRECTION_NORTH => (point(x, y + h), point(cx, y), point(x + w, y + h)),
        DIRECTION_SOUTH => (point(x, y), point(cx, y + h), point(x + w, y)),
        DIRECTION_WEST => (point(x + w, y), point(x, cy), point(x + w, y + h)),
        _ => (point(x, y), point(x + w, cy), point(x, y + h)),
    };

    let dx = next.x - cx;
    let dy = next.y - cy;
    let alpha = if vertical { dx.atan2(dy) } else { dy.atan2(dx) };
    let t = if vertical { w.atan2(h) } else { h.atan2(w) };
    let pi = std::f64::consts::PI;

    let base = if direction == DIRECTION_NORTH || direction == DIRECTION_WEST {
        alpha > -t && alpha < t
    } else {
        alpha < -pi + t || alpha > pi - t
    };

    let result = if base {
        let within = if vertical {
            next.x >= start.x && next.x <= end.x
        } else {
            next.y >= start.y && next.y <= end.y
        };
        if orthogonal && within {
            Some(if vertical {
                point(next.x, start.y)
            } else {
                point(start.x, next.y)
            })
        } else {
            Some(match direction {
                DIRECTION_NORTH => point(x + w / 2.0 + h * alpha.tan() / 2.0, y + h),
                DIRECTION_SOUTH => point(x + w / 2.0 - h * alpha.tan() / 2.0, y),
                DIRECTION_WEST => point(x + w, y + h / 2.0 + w * alpha.tan() / 2.0),
                _ => point(x, y + h / 2.0 - w * alpha.tan() / 2.0),
            })
        }
    } else {
        if orthogonal {
            let mut pt = point(cx, cy);
            if next.y >= y && next.y <= y + h {
                pt.x = if vertical {
                    cx
                } else if direction == DIRECTION_WEST {
                    x + w
                } else {
                    x
                };
                pt.y = next.y;
            } else if next.x >= x && next.x <= x + w {
                pt.x = next.x;
                pt.y = if !vertical {
                    cy
                } else if direction == DIRECTION_NORTH {
                    y + h
                } else {
                    y
                };
            }
            cx = pt.x;
            cy = pt.y;
        }
        let upper = if vertical {
            next.x <= x + w / 2.0
        } else {
            next.y <= y + h / 2.0
        };
        if upper {
            segment_intersection(next, point(cx, cy), start, corner)
        } else {
            segment_intersection(next, point(cx, cy), corner, end)
        }
    };

    result
        .filter(|p| is_finite_point(*p))
        .unwrap_or(point(cx, cy))
}

pub fn hexagon(bounds: Rect, vertex: Option<&CellState>, next: Point, orthogonal: bool) -> Point {
    let x = bounds.min_x();
    let y = bounds.min_y();
    let w = bounds.width();
    let h = bounds.height();
    let c = bounds.center();

    let direction = direction(vertex);
    let vertical = direction == DIRECTION_NORTH || direction == DIRECTION_SOUTH;
    let outline = if vertical {
        [
            point(c.x, y),
            point(x + w, y + 0.25 * h),
            point(x + w, y + 0.75 * h),
            point(c.x, y + h),
            point(x, y + 0.75 * h),
            point(x, y + 0.25 * h),
        ]
    } else {
        [
            point(x + 0.25 * w, y),
            point(x + 0.75 * w, y),
            point(x + w, c.y),
            point(x + 0.75 * w, y + h),
            point(x + 0.25 * w, y + h),
            point(x, c.y),
        ]
    };

    let mut from = c;
    if orthogonal {
        if next.x >= x && next.x <= x + w {
            from.x = next.x;
        } else if next.y >= y && next.y <= y + h {
            from.y = next.y;
        }
    }

    let dir = next - from;
    let len = dir.length();
    if len == 0.0 || !len.is_finite() {
        return c;
    }
    // Extend the ray past the shape so that `next` inside the bounds still yields a hit.
    let reach = w + h + len;
    let far = from + dir / len * reach;
    let near = from - dir / len * reach;

    let mut best: Option<Point> = None;
    for i in 0..outline.len() {
        let a = outline[i];
        let b = outline[(i + 1) % outline.len()];
        if let Some(hit) = segment_intersection(near, far, a, b) {
            // Keep the hit on the side facing `next`.
            if (hit - from).dot(dir) < 0.0 {
                continue;
            }
            let closer = best.is_none_or(|p| (hit - next).length() < (p - next).length());
            if closer {
                best = Some(hit);
            }
        }
    }
    best.unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgraph_model::geom::rect;

    #[test]
    fn rectangle_hits_the_facing_side() {
        let b = rect(0.0, 0.0, 100.0, 40.0);
        assert_eq!(rectangle(b, None, point(250.0, 20.0), false), point(100.0, 20.0));
        assert_eq!(rectangle(b, None, point(50.0, -100.0), false), point(50.0, 0.0));
        assert_eq!(rectangle(b, None, point(-50.0, 20.0), false), point(0.0, 20.0));
    }

    #[test]
    fn rectangle_orthogonal_keeps_the_axis() {
        let b = rect(0.0, 0.0, 100.0, 40.0);
        assert_eq!(rectangle(b, None, point(80.0, 200.0), true), point(80.0, 40.0));
        assert_eq!(rectangle(b, None, point(300.0, 10.0), true), point(100.0, 10.0));
    }

    #[test]
    fn centre_hits_resolve_to_defined_points() {
        let b = rect(0.0, 0.0, 100.0, 40.0);
        let c = point(50.0, 20.0);
        assert_eq!(rectangle(b, None, c, false), c);
        assert_eq!(ellipse(b, None, c, false), c);
        assert_eq!(rhombus(b, None, point(50.0, 20.0), false), point(50.0, 40.0));
        assert_eq!(hexagon(b, None, c, false), c);
    }

    #[test]
    fn ellipse_meets_the_outline() {
        let b = rect(0.0, 0.0, 100.0, 100.0);
        let p = ellipse(b, None, point(200.0, 50.0), false);
        assert!((p.x - 100.0).abs() < 1e-9);
        assert!((p.y - 50.0).abs() < 1e-9);

        let p = ellipse(b, None, point(50.0, -20.0), false);
        assert_eq!(p, point(50.0, 0.0));
    }

    #[test]
    fn rhombus_uses_the_facing_edge() {
        let b = rect(0.0, 0.0, 100.0, 100.0);
        let p = rhombus(b, None, point(150.0, 150.0), false);
        assert!((p.x - 75.0).abs() < 1e-9);
        assert!((p.y - 75.0).abs() < 1e-9);
    }

    #[test]
    fn triangle_east_base_is_the_left_side() {
        let b = rect(0.0, 0.0, 100.0, 100.0);
        let p = triangle(b, None, point(-100.0, 50.0), false);
        assert!((p.x - 0.0).abs() < 1e-9);
        assert!((p.y - 50.0).abs() < 1e-9);

        let tip = triangle(b, None, point(200.0, 50.0), false);
        assert!((tip.x - 100.0).abs() < 1e-9);
        assert!((tip.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn hexagon_hits_the_side_points() {
        let b = rect(0.0, 0.0, 100.0, 40.0);
        let p = hexagon(b, None, point(300.0, 20.0), false);
        assert!((p.x - 100.0).abs() < 1e-9);
        assert!((p.y - 20.0).abs() < 1e-9);

        let top = hexagon(b, None, point(50.0, -100.0), false);
        assert!((top.x - 50.0).abs() < 1e-9);
        assert!((top.y - 0.0).abs() < 1e-9);
    }
}
